//! Ring configuration as read from a json file.
//!
//! ```json
//! {
//!   "replication_factor": 3,
//!   "heartbeat_timeout_secs": 60,
//!   "zone_awareness_enabled": false,
//!   "replication_strategy": "quorum"
//! }
//! ```
use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    cluster::{replication::ReplicationStrategyKind, ring::RingConfig},
    error::Result,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    pub replication_factor: usize,
    pub heartbeat_timeout_secs: u64,
    #[serde(default)]
    pub zone_awareness_enabled: bool,
    #[serde(default)]
    pub replication_strategy: ReplicationStrategyKind,
}

impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let c = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&c)?)
    }

    /// Validates this config and turns it into a [`RingConfig`]
    pub fn ring_config(&self) -> Result<RingConfig> {
        let config = RingConfig {
            replication_factor: self.replication_factor,
            heartbeat_timeout: Duration::from_secs(self.heartbeat_timeout_secs),
            zone_awareness_enabled: self.zone_awareness_enabled,
            replication_strategy: self.replication_strategy,
        };
        config.validate()?;

        Ok(config)
    }
}
