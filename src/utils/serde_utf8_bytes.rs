use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serializer};

/// Serializes [`Bytes`] holding an utf8 address as a plain string
///
/// # Errors
/// This function returns an error if the bytes are not valid utf8
pub fn serialize<S: Serializer>(v: &Bytes, s: S) -> Result<S::Ok, S::Error> {
    let addr = std::str::from_utf8(v).map_err(|e| {
        serde::ser::Error::custom(format!("instance address is not valid utf8 - {}", e))
    })?;
    s.serialize_str(addr)
}

/// Deserializes a plain string into [`Bytes`]
pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Bytes, D::Error> {
    Ok(Bytes::from(String::deserialize(d)?))
}
