//! This module defines the top level error returned when wiring a ring up from the outside world
//! (reading config files, membership snapshots etc).
//! Errors from the ring itself live in [`crate::cluster::error`].

use std::fmt::Display;

use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

/// Error enum with all possible variants
#[derive(Debug, Serialize)]
pub enum Error {
    Cluster(crate::cluster::error::Error),
    InvalidConfig { reason: String },
    Io { reason: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Cluster(err) => write!(f, "{}", err),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

impl From<crate::cluster::error::Error> for Error {
    fn from(err: crate::cluster::error::Error) -> Self {
        use crate::cluster::error::Error as ClusterError;
        match err {
            ClusterError::InvalidConfig { reason } => Self::InvalidConfig { reason },
            _ => Self::Cluster(err),
        }
    }
}
