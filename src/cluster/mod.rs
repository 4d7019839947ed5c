//! Module that contains the ring membership view and the replication strategies built on top of it
pub mod error;
pub mod instance;
pub mod operation;
pub mod replication;
pub mod ring;
