//! This file contains the [`Instance`] record: the ring's view of a single member.
//!
//! Records are created, updated and dropped by the membership subsystem (see [`super::ring::Ring`]).
//! Replication strategies only ever read them, and decide whether a member can take part in an
//! operation through [`Instance::is_healthy`].
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::utils::{serde_unix_secs, serde_utf8_bytes};

use super::operation::Operation;

/// Lifecycle of a ring member
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InstanceState {
    /// Registered but doesn't own tokens yet
    Pending,
    /// Owns tokens and is receiving data from the previous owners
    Joining,
    /// Fully part of the ring
    Active,
    /// Handing its data off before shutting down
    Leaving,
    /// Done handing off. Kept around until the membership subsystem forgets it
    Left,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    // the IP/PORT pair formatted as <ip>:<port>
    #[serde(with = "serde_utf8_bytes")]
    addr: Bytes,
    // Availability zone. Empty if zone awareness doesn't apply to this instance
    #[serde(default)]
    zone: String,
    state: InstanceState,
    // Only ever moves forward, see [`Instance::heartbeat`]
    #[serde(with = "serde_unix_secs")]
    last_heartbeat: SystemTime,
    #[serde(default)]
    tokens: Vec<u32>,
}

impl Instance {
    pub fn new(
        addr: Bytes,
        zone: impl Into<String>,
        state: InstanceState,
        last_heartbeat: SystemTime,
    ) -> Self {
        Self {
            addr,
            zone: zone.into(),
            state,
            last_heartbeat,
            tokens: Vec::new(),
        }
    }

    pub fn with_tokens(mut self, tokens: Vec<u32>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn addr(&self) -> &Bytes {
        &self.addr
    }

    /// Lossy utf8 rendering of [`Instance::addr`], used in diagnostics
    pub fn addr_string(&self) -> String {
        String::from_utf8_lossy(&self.addr).into_owned()
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn last_heartbeat(&self) -> SystemTime {
        self.last_heartbeat
    }

    pub fn tokens(&self) -> &[u32] {
        &self.tokens
    }

    /// Records a heartbeat received at `at`.
    ///
    /// Heartbeats can arrive out of order (eg: gossip relays), so an older timestamp never overrides a newer one.
    /// Returns true if the stored timestamp moved.
    pub fn heartbeat(&mut self, at: SystemTime) -> bool {
        if at > self.last_heartbeat {
            self.last_heartbeat = at;
            true
        } else {
            false
        }
    }

    pub fn set_state(&mut self, state: InstanceState) {
        self.state = state;
    }

    /// How long ago the last heartbeat was seen, as of `now`.
    /// A heartbeat in the future (clock skew between nodes) counts as fresh.
    pub fn heartbeat_age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.last_heartbeat)
            .unwrap_or(Duration::ZERO)
    }

    /// The health predicate. An instance is healthy for `op` if
    ///  1. it heartbeated within `heartbeat_timeout` of `now`
    ///  2. its [`InstanceState`] is allowed for `op`, see [`Operation::is_instance_in_state_healthy`]
    pub fn is_healthy(&self, op: Operation, heartbeat_timeout: Duration, now: SystemTime) -> bool {
        self.heartbeat_age(now) <= heartbeat_timeout && op.is_instance_in_state_healthy(self.state)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use bytes::Bytes;
    use strum::IntoEnumIterator;

    use super::{Instance, InstanceState};
    use crate::cluster::operation::Operation;

    const TIMEOUT: Duration = Duration::from_secs(60);

    fn instance(state: InstanceState, last_heartbeat: SystemTime) -> Instance {
        Instance::new(Bytes::from("127.0.0.1:3001"), "zone-a", state, last_heartbeat)
    }

    #[test]
    fn stale_heartbeat_is_unhealthy_for_every_operation() {
        let now = SystemTime::now();
        let node = instance(InstanceState::Active, now - TIMEOUT - Duration::from_secs(1));

        for op in Operation::iter() {
            assert!(!node.is_healthy(op, TIMEOUT, now));
        }
    }

    #[test]
    fn heartbeat_exactly_at_timeout_is_still_healthy() {
        let now = SystemTime::now();
        let node = instance(InstanceState::Active, now - TIMEOUT);

        assert!(node.is_healthy(Operation::Write, TIMEOUT, now));
    }

    #[test]
    fn heartbeat_in_the_future_counts_as_fresh() {
        let now = SystemTime::now();
        let node = instance(InstanceState::Active, now + Duration::from_secs(30));

        assert_eq!(node.heartbeat_age(now), Duration::ZERO);
        assert!(node.is_healthy(Operation::Read, TIMEOUT, now));
    }

    #[test]
    fn state_rules_apply_to_fresh_instances() {
        let now = SystemTime::now();
        let node = instance(InstanceState::Leaving, now);

        assert!(node.is_healthy(Operation::Read, TIMEOUT, now));
        assert!(!node.is_healthy(Operation::Write, TIMEOUT, now));
    }

    #[test]
    fn heartbeat_never_moves_backwards() {
        let now = SystemTime::now();
        let mut node = instance(InstanceState::Active, now);

        assert!(!node.heartbeat(now - Duration::from_secs(10)));
        assert_eq!(node.last_heartbeat(), now);

        let later = now + Duration::from_secs(5);
        assert!(node.heartbeat(later));
        assert_eq!(node.last_heartbeat(), later);
    }

    #[test]
    fn deserialize_from_json() {
        let json = r#"{
            "addr": "10.0.0.1:3001",
            "zone": "us-east-1a",
            "state": "leaving",
            "last_heartbeat": 1700000000,
            "tokens": [30, 10, 20]
        }"#;

        let node: Instance = serde_json::from_str(json).unwrap();
        assert_eq!(node.addr(), &Bytes::from("10.0.0.1:3001"));
        assert_eq!(node.zone(), "us-east-1a");
        assert_eq!(node.state(), InstanceState::Leaving);
        assert_eq!(
            node.last_heartbeat(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
        );
        assert_eq!(node.tokens(), &[30, 10, 20]);
    }

    #[test]
    fn zone_and_tokens_are_optional() {
        let json = r#"{"addr": "a", "state": "active", "last_heartbeat": 0}"#;
        let node: Instance = serde_json::from_str(json).unwrap();
        assert_eq!(node.zone(), "");
        assert!(node.tokens().is_empty());
    }

    #[test]
    fn out_of_range_heartbeat_is_a_deserialization_error() {
        let json = r#"{"addr": "a", "state": "active", "last_heartbeat": 18446744073709551615}"#;
        let err = serde_json::from_str::<Instance>(json).err().unwrap();
        assert!(err.to_string().contains("timestamp out of range"));
    }
}
