use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serializer};

/// Serializes a [`SystemTime`] as whole seconds since the unix epoch.
/// Sub-second precision is dropped, which is fine for heartbeat timestamps.
///
/// # Errors
/// This function returns an error if the timestamp is before the unix epoch
pub fn serialize<S: Serializer>(v: &SystemTime, s: S) -> Result<S::Ok, S::Error> {
    let secs = v
        .duration_since(UNIX_EPOCH)
        .map_err(|e| serde::ser::Error::custom(format!("timestamp before unix epoch - {}", e)))?
        .as_secs();
    s.serialize_u64(secs)
}

/// Deserializes whole seconds since the unix epoch into a [`SystemTime`]
///
/// # Errors
/// This function returns an error if the timestamp doesn't fit in a [`SystemTime`]
pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SystemTime, D::Error> {
    let secs = u64::deserialize(d)?;
    UNIX_EPOCH
        .checked_add(Duration::from_secs(secs))
        .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range - {}", secs)))
}
