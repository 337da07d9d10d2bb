//! MessagePack framing for the client channel.
//!
//! Every framed record on the wire — inbound [`ClientMessage`]s and
//! outbound [`Delta`]s — is one MessagePack payload, encoded and decoded
//! through these helpers so codec failures always surface as [`NetError`].
//!
//! [`ClientMessage`]: crate::messages::ClientMessage
//! [`Delta`]: crate::messages::Delta

use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// Serialize one wire record to MessagePack bytes.
///
/// # Errors
///
/// Returns [`NetError::Encode`] when the value cannot be serialized.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, NetError> {
    rmp_serde::to_vec(value).map_err(NetError::Encode)
}

/// Deserialize one wire record from MessagePack bytes.
///
/// # Errors
///
/// Returns [`NetError::Decode`] for truncated or malformed payloads.
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, NetError> {
    rmp_serde::from_slice(bytes).map_err(NetError::Decode)
}
