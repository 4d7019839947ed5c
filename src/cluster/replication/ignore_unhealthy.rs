//! Best-effort [`ReplicationStrategy`]: any single healthy instance is enough.
//!
//! Meant for data that doesn't need quorum consistency (eg: metadata lookups where any replica
//! can answer). The replication factor and zone awareness are ignored.
use std::time::{Duration, SystemTime};

use tracing::{event, instrument, Level};

use super::{partition_by_health, ReplicationSet, ReplicationStrategy};
use crate::cluster::{
    error::{Error, Result},
    instance::Instance,
    operation::Operation,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreUnhealthyInstancesReplicationStrategy;

impl ReplicationStrategy for IgnoreUnhealthyInstancesReplicationStrategy {
    #[instrument(
        name = "replication::ignore_unhealthy::filter",
        level = "trace",
        skip_all,
        fields(op = %op, candidates = instances.len())
    )]
    fn filter(
        &self,
        instances: &[Instance],
        op: Operation,
        _replication_factor: usize,
        heartbeat_timeout: Duration,
        _zone_awareness_enabled: bool,
        now: SystemTime,
    ) -> Result<ReplicationSet> {
        let (healthy, unhealthy) = partition_by_health(instances, op, heartbeat_timeout, now);

        if healthy.is_empty() {
            let err = Error::NoHealthyReplica { unhealthy };
            event!(Level::DEBUG, "{}", err);
            return Err(err);
        }

        let max_failures = healthy.len() - 1;
        Ok(ReplicationSet {
            instances: healthy,
            max_failures,
        })
    }

    fn name(&self) -> &'static str {
        "ignore_unhealthy"
    }
}
