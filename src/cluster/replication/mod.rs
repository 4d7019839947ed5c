//! Replication strategies.
//!
//! Given the instances that own a key (as returned by the partitioning layer, in preference order),
//! a [`ReplicationStrategy`] decides
//!  1. which of them should actually be contacted (the healthy ones)
//!  2. how many of those can fail before the whole operation has to be considered failed
//!
//! Two strategies exist:
//!  - [`quorum::QuorumReplicationStrategy`]: requires a strict majority of the replica set. This is the default.
//!  - [`ignore_unhealthy::IgnoreUnhealthyInstancesReplicationStrategy`]: requires a single healthy instance.
//!
//! The strategy is picked once (see [`ReplicationStrategyKind`]) and shared by every request.
use std::{
    collections::BTreeSet,
    sync::Arc,
    time::{Duration, SystemTime},
};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::{error::Result, instance::Instance, operation::Operation};

pub mod ignore_unhealthy;
pub mod quorum;

pub use ignore_unhealthy::IgnoreUnhealthyInstancesReplicationStrategy;
pub use quorum::QuorumReplicationStrategy;

/// The output of [`ReplicationStrategy::filter`].
///
/// `instances` is a sub-sequence of the candidates, in the same order.
/// On success `max_failures < instances.len()` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationSet {
    pub instances: Vec<Instance>,
    /// How many of `instances` may fail while the operation still succeeds
    pub max_failures: usize,
}

impl ReplicationSet {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Minimum number of instances that have to succeed
    pub fn min_success(&self) -> usize {
        self.instances.len() - self.max_failures
    }

    pub fn includes(&self, addr: &[u8]) -> bool {
        self.instances.iter().any(|i| i.addr() == addr)
    }

    pub fn addrs(&self) -> Vec<Bytes> {
        self.instances.iter().map(|i| i.addr().clone()).collect()
    }

    /// Distinct, non empty zones spanned by this set, sorted
    pub fn zones(&self) -> Vec<String> {
        self.instances
            .iter()
            .map(|i| i.zone())
            .filter(|z| !z.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }
}

/// A replication strategy. Implementations must be stateless: the same inputs always produce the same output.
pub trait ReplicationStrategy: Send + Sync {
    /// Drops unhealthy instances and checks there are enough left for `op` to succeed.
    ///
    /// `now` is used for every health check of the call, so all candidates are judged against the same clock reading.
    /// The `instances` slice is never modified.
    fn filter(
        &self,
        instances: &[Instance],
        op: Operation,
        replication_factor: usize,
        heartbeat_timeout: Duration,
        zone_awareness_enabled: bool,
        now: SystemTime,
    ) -> Result<ReplicationSet>;

    /// Strategy name, for logging
    fn name(&self) -> &'static str;
}

/// Which [`ReplicationStrategy`] a ring should use
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReplicationStrategyKind {
    #[default]
    Quorum,
    IgnoreUnhealthy,
}

impl ReplicationStrategyKind {
    pub fn build(self) -> Arc<dyn ReplicationStrategy> {
        match self {
            ReplicationStrategyKind::Quorum => Arc::new(QuorumReplicationStrategy),
            ReplicationStrategyKind::IgnoreUnhealthy => {
                Arc::new(IgnoreUnhealthyInstancesReplicationStrategy)
            }
        }
    }
}

/// Splits `instances` into the healthy ones (cloned, order preserved) and the addresses of the unhealthy ones.
fn partition_by_health(
    instances: &[Instance],
    op: Operation,
    heartbeat_timeout: Duration,
    now: SystemTime,
) -> (Vec<Instance>, Vec<String>) {
    let mut healthy = Vec::with_capacity(instances.len());
    let mut unhealthy = Vec::new();
    for instance in instances {
        if instance.is_healthy(op, heartbeat_timeout, now) {
            healthy.push(instance.clone());
        } else {
            unhealthy.push(instance.addr_string());
        }
    }

    (healthy, unhealthy)
}
