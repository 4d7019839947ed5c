//! The [`Operation`] classifier.
//!
//! Every request that reaches the ring is tagged with an [`Operation`]. The tag decides which
//! [`InstanceState`]s are allowed to take part in it, so that a node that is leaving the ring can
//! still serve reads while no longer accepting writes.
//!
//! The per-operation rules live in [`Operation::is_instance_in_state_healthy`] as an exhaustive match.
//! Adding a new variant without writing its rule is a compile error.
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::instance::InstanceState;

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// Point reads and range reads
    Read,
    /// New writes (including overwrites)
    Write,
    /// Tombstone writes
    Delete,
    /// Diagnostics, status pages and instance counting
    Reporting,
}

impl Operation {
    /// Returns true if an instance in the given `state` may take part in this operation.
    ///
    /// | state \ op | read | write | delete | reporting |
    /// |------------|------|-------|--------|-----------|
    /// | pending    |  no  |  no   |   no   |    yes    |
    /// | joining    |  no  |  no   |   no   |    yes    |
    /// | active     | yes  |  yes  |  yes   |    yes    |
    /// | leaving    | yes  |  no   |   no   |    yes    |
    /// | left       |  no  |  no   |   no   |    no     |
    pub fn is_instance_in_state_healthy(&self, state: InstanceState) -> bool {
        match self {
            Operation::Read => matches!(state, InstanceState::Active | InstanceState::Leaving),
            Operation::Write | Operation::Delete => state == InstanceState::Active,
            Operation::Reporting => state != InstanceState::Left,
        }
    }
}
