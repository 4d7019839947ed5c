//! Module that contains helpers to build instances and randomized candidate lists in test code
use std::{
    ops::Range,
    time::{Duration, SystemTime},
};

use bytes::Bytes;
use quickcheck::Arbitrary;
use rand::Rng;

use crate::cluster::instance::{Instance, InstanceState};

pub const TIMEOUT: Duration = Duration::from_secs(60);

/// A fixed clock reading so randomized inputs are reproducible against the same `now`
pub fn test_now() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

pub fn zoned_instance(
    addr: &str,
    zone: &str,
    state: InstanceState,
    last_heartbeat: SystemTime,
) -> Instance {
    Instance::new(
        Bytes::copy_from_slice(addr.as_bytes()),
        zone,
        state,
        last_heartbeat,
    )
}

/// Active instance that heartbeated at `now`
pub fn fresh_instance(addr: &str, now: SystemTime) -> Instance {
    zoned_instance(addr, "", InstanceState::Active, now)
}

/// Active instance whose last heartbeat is older than [`TIMEOUT`]
pub fn stale_instance(addr: &str, now: SystemTime) -> Instance {
    zoned_instance(
        addr,
        "",
        InstanceState::Active,
        now - TIMEOUT - Duration::from_secs(1),
    )
}

fn random_state() -> InstanceState {
    match rand::thread_rng().gen_range(0..8) {
        0 => InstanceState::Pending,
        1 => InstanceState::Joining,
        2 => InstanceState::Leaving,
        3 => InstanceState::Left,
        _ => InstanceState::Active,
    }
}

fn generate_random_instances(range: Range<usize>, now: SystemTime) -> Vec<Instance> {
    let mut rng = rand::thread_rng();
    let n_instances = rng.gen_range(range);
    let mut instances = Vec::with_capacity(n_instances);
    for i in 0..n_instances {
        // roughly a third of the instances end up with a stale heartbeat
        let age = Duration::from_secs(rng.gen_range(0..(TIMEOUT.as_secs() * 3 / 2)));
        let zone = format!("zone-{}", rng.gen_range(0..3));
        instances.push(zoned_instance(
            &format!("10.0.0.{}:3001", i),
            &zone,
            random_state(),
            now - age,
        ));
    }

    instances
}

/// Randomized input for replication strategies: a candidate list and a replication factor
#[derive(Debug, Clone)]
pub struct CandidatesTestInput {
    pub instances: Vec<Instance>,
    pub replication_factor: usize,
    pub zone_awareness_enabled: bool,
}

impl Arbitrary for CandidatesTestInput {
    fn arbitrary(_: &mut quickcheck::Gen) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            instances: generate_random_instances(0..10, test_now()),
            replication_factor: rng.gen_range(1..6),
            zone_awareness_enabled: rng.gen_bool(0.5),
        }
    }
}
