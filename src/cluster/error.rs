use std::fmt::Display;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Error {
    /// Returned by the quorum strategy when, after dropping unhealthy instances, there are less
    /// instances left than a strict majority of the replica set.
    InsufficientReplicas {
        required: usize,
        found: usize,
        zone_awareness_enabled: bool,
        unhealthy: Vec<String>,
    },
    /// Returned by the best-effort strategy when not a single instance is healthy
    NoHealthyReplica { unhealthy: Vec<String> },
    /// The ring has no record for the given address
    UnknownInstance { addr: String },
    InvalidConfig { reason: String },
    Logic { reason: String },
}

impl Error {
    /// Addresses of the instances that were filtered out, if this error carries them
    pub fn unhealthy_instances(&self) -> &[String] {
        match self {
            Error::InsufficientReplicas { unhealthy, .. }
            | Error::NoHealthyReplica { unhealthy } => unhealthy.as_slice(),
            _ => &[],
        }
    }
}

fn write_unhealthy(f: &mut std::fmt::Formatter<'_>, unhealthy: &[String]) -> std::fmt::Result {
    if unhealthy.is_empty() {
        return Ok(());
    }

    write!(f, " - unhealthy instances: {}", unhealthy.join(","))
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InsufficientReplicas {
                required,
                found,
                zone_awareness_enabled,
                unhealthy,
            } => {
                write!(f, "at least {} live replicas required", required)?;
                if *zone_awareness_enabled {
                    write!(f, " across different availability zones")?;
                }
                write!(f, ", could only find {}", found)?;
                write_unhealthy(f, unhealthy)
            }
            Error::NoHealthyReplica { unhealthy } => {
                write!(f, "at least 1 healthy replica required, could only find 0")?;
                write_unhealthy(f, unhealthy)
            }
            _ => write!(f, "{:?}", self),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
