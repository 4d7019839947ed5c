//! This file contains the [`Ring`] data structure.
//! It owns the membership snapshot (every [`Instance`] known to this node) and the ring wide
//! configuration, and binds the installed [`ReplicationStrategy`] to that configuration.
//!
//! The snapshot is read on every request (health checks, instance counts, strategy evaluation)
//! and only written when the membership subsystem learns something new (a heartbeat, a state
//! transition, a node joining or being forgotten). For that reason it sits behind a [`RwLock`]:
//! readers never block each other and a writer never exposes a half updated [`Instance`].
//! No lock is ever held across a call into another component.
use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::{Duration, SystemTime},
};

use bytes::Bytes;
use tracing::{event, Level};

use super::{
    error::{Error, Result},
    instance::{Instance, InstanceState},
    operation::Operation,
    replication::{ReplicationSet, ReplicationStrategy, ReplicationStrategyKind},
};

/// Ring wide configuration. Immutable once the [`Ring`] is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingConfig {
    pub replication_factor: usize,
    pub heartbeat_timeout: Duration,
    pub zone_awareness_enabled: bool,
    pub replication_strategy: ReplicationStrategyKind,
}

impl RingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.replication_factor == 0 {
            return Err(Error::InvalidConfig {
                reason: "replication_factor must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct Ring {
    config: RingConfig,
    strategy: Arc<dyn ReplicationStrategy>,
    inner: Arc<RwLock<RingInner>>,
}

impl std::fmt::Debug for Ring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_read() {
            Ok(inner) => {
                write!(
                    f,
                    "Ring {{ config: {:?}, strategy: {}, instances: {:?} }}",
                    self.config,
                    self.strategy.name(),
                    inner.instances.values()
                )
            }
            Err(_) => {
                write!(f, "Unable to acquire lock for logging at this time...")
            }
        }
    }
}

#[derive(Default)]
struct RingInner {
    // Every instance known to this node, keyed by address
    instances: BTreeMap<Bytes, Instance>,
}

impl Ring {
    /// Builds a ring with the strategy named by [`RingConfig::replication_strategy`]
    pub fn new(config: RingConfig) -> Result<Self> {
        config.validate()?;
        let strategy = config.replication_strategy.build();
        event!(
            Level::INFO,
            "ring configured with replication_factor={} heartbeat_timeout={:?} zone_awareness_enabled={} strategy={}",
            config.replication_factor,
            config.heartbeat_timeout,
            config.zone_awareness_enabled,
            strategy.name()
        );

        Ok(Self {
            config,
            strategy,
            inner: Default::default(),
        })
    }

    fn acquire_read_lock(&self) -> Result<RwLockReadGuard<RingInner>> {
        self.inner.read().map_err(|_| Error::Logic {
            reason: "Unable to acquire read lock".to_string(),
        })
    }

    fn acquire_write_lock(&self) -> Result<RwLockWriteGuard<RingInner>> {
        self.inner.write().map_err(|_| Error::Logic {
            reason: "Unable to acquire write lock".to_string(),
        })
    }

    /// Health predicate bound to this ring's heartbeat timeout
    pub fn is_healthy(&self, instance: &Instance, op: Operation, now: SystemTime) -> bool {
        instance.is_healthy(op, self.config.heartbeat_timeout, now)
    }

    pub fn replication_factor(&self) -> usize {
        self.config.replication_factor
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        self.config.heartbeat_timeout
    }

    pub fn zone_awareness_enabled(&self) -> bool {
        self.config.zone_awareness_enabled
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    pub fn strategy(&self) -> &Arc<dyn ReplicationStrategy> {
        &self.strategy
    }

    /// Number of instances in the ring, regardless of their health
    pub fn instances_count(&self) -> Result<usize> {
        let guard = self.acquire_read_lock()?;
        Ok(guard.instances.len())
    }

    /// Number of instances that are healthy for `op` as of `now`
    pub fn healthy_instances_count(&self, op: Operation, now: SystemTime) -> Result<usize> {
        let guard = self.acquire_read_lock()?;
        Ok(guard
            .instances
            .values()
            .filter(|i| self.is_healthy(i, op, now))
            .count())
    }

    /// Adds an instance to the ring or replaces the existing record with the same address.
    ///
    /// When replacing, the stored heartbeat is kept if it's newer than the one provided
    /// so a stale membership update can't make a live instance look dead.
    pub fn add_instance(&self, mut instance: Instance) -> Result<()> {
        let mut guard = self.acquire_write_lock()?;
        if let Some(current) = guard.instances.get(instance.addr()) {
            instance.heartbeat(current.last_heartbeat());
            event!(Level::DEBUG, "updating instance {}", instance.addr_string());
        } else {
            event!(
                Level::INFO,
                "instance {} joined the ring in state {}",
                instance.addr_string(),
                instance.state()
            );
        }

        guard.instances.insert(instance.addr().clone(), instance);
        Ok(())
    }

    pub fn remove_instance(&self, addr: &[u8]) -> Result<Option<Instance>> {
        let mut guard = self.acquire_write_lock()?;
        let removed = guard.instances.remove(addr);
        if let Some(instance) = &removed {
            event!(
                Level::INFO,
                "instance {} removed from the ring",
                instance.addr_string()
            );
        }

        Ok(removed)
    }

    /// Records a heartbeat for the instance with the given address.
    /// Out of order heartbeats are ignored, see [`Instance::heartbeat`]
    pub fn heartbeat(&self, addr: &[u8], at: SystemTime) -> Result<()> {
        let mut guard = self.acquire_write_lock()?;
        let instance = guard
            .instances
            .get_mut(addr)
            .ok_or_else(|| unknown_instance(addr))?;
        if !instance.heartbeat(at) {
            event!(
                Level::TRACE,
                "ignoring out of order heartbeat for {}",
                instance.addr_string()
            );
        }

        Ok(())
    }

    pub fn set_instance_state(&self, addr: &[u8], state: InstanceState) -> Result<()> {
        let mut guard = self.acquire_write_lock()?;
        let instance = guard
            .instances
            .get_mut(addr)
            .ok_or_else(|| unknown_instance(addr))?;
        if instance.state() != state {
            event!(
                Level::INFO,
                "instance {} moved from {} to {}",
                instance.addr_string(),
                instance.state(),
                state
            );
            instance.set_state(state);
        }

        Ok(())
    }

    pub fn get_instance(&self, addr: &[u8]) -> Result<Option<Instance>> {
        let guard = self.acquire_read_lock()?;
        Ok(guard.instances.get(addr).cloned())
    }

    /// Snapshot of every instance, ordered by address
    pub fn get_instances(&self) -> Result<Vec<Instance>> {
        let guard = self.acquire_read_lock()?;
        Ok(guard.instances.values().cloned().collect())
    }

    /// Runs the installed [`ReplicationStrategy`] over `candidates` using this ring's configuration
    pub fn replication_set(
        &self,
        candidates: &[Instance],
        op: Operation,
        now: SystemTime,
    ) -> Result<ReplicationSet> {
        self.strategy.filter(
            candidates,
            op,
            self.config.replication_factor,
            self.config.heartbeat_timeout,
            self.config.zone_awareness_enabled,
            now,
        )
    }

    /// Same as [`Ring::replication_set`] but takes candidate addresses (eg: the preference list
    /// computed by the partitioning scheme) and resolves them against the current snapshot.
    ///
    /// The read lock is only held while cloning the candidates; the strategy runs without it.
    pub fn replication_set_for(
        &self,
        addrs: &[Bytes],
        op: Operation,
        now: SystemTime,
    ) -> Result<ReplicationSet> {
        let candidates = {
            let guard = self.acquire_read_lock()?;
            addrs
                .iter()
                .map(|addr| {
                    guard
                        .instances
                        .get(addr)
                        .cloned()
                        .ok_or_else(|| unknown_instance(addr))
                })
                .collect::<Result<Vec<Instance>>>()?
        };

        self.replication_set(&candidates, op, now)
    }
}

fn unknown_instance(addr: &[u8]) -> Error {
    Error::UnknownInstance {
        addr: String::from_utf8_lossy(addr).into_owned(),
    }
}
