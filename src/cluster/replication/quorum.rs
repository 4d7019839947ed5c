//! The default [`ReplicationStrategy`]: a strict majority of the replica set has to succeed.
//!
//! Majority is the smallest success threshold that stops two concurrent operations from both
//! succeeding against disjoint subsets of replicas (split brain).
//!
//! While a node is joining or leaving, the partitioning layer may hand us more candidates than the
//! configured replication factor (the old and the new owner of a token range). In that case the
//! quorum is computed over the bigger of the two numbers, otherwise we would both under-count the
//! quorum and fail operations that could still succeed.
use std::time::{Duration, SystemTime};

use tracing::{event, instrument, Level};

use super::{partition_by_health, ReplicationSet, ReplicationStrategy};
use crate::cluster::{
    error::{Error, Result},
    instance::Instance,
    operation::Operation,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct QuorumReplicationStrategy;

impl ReplicationStrategy for QuorumReplicationStrategy {
    #[instrument(
        name = "replication::quorum::filter",
        level = "trace",
        skip_all,
        fields(op = %op, replication_factor = replication_factor, candidates = instances.len())
    )]
    fn filter(
        &self,
        instances: &[Instance],
        op: Operation,
        replication_factor: usize,
        heartbeat_timeout: Duration,
        zone_awareness_enabled: bool,
        now: SystemTime,
    ) -> Result<ReplicationSet> {
        let (healthy, unhealthy) = partition_by_health(instances, op, heartbeat_timeout, now);

        let replication_factor = replication_factor.max(healthy.len());
        let min_success = replication_factor / 2 + 1;

        // not enough live instances left to ever reach quorum, don't even bother trying
        if healthy.len() < min_success {
            let err = Error::InsufficientReplicas {
                required: min_success,
                found: healthy.len(),
                zone_awareness_enabled,
                unhealthy,
            };
            event!(Level::DEBUG, "{}", err);
            return Err(err);
        }

        let max_failures = healthy.len() - min_success;
        Ok(ReplicationSet {
            instances: healthy,
            max_failures,
        })
    }

    fn name(&self) -> &'static str {
        "quorum"
    }
}
