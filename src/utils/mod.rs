pub mod serde_unix_secs;
pub mod serde_utf8_bytes;
