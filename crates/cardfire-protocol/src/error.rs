//! Error types for the protocol layer.
//!
//! Each crate in Cardfire defines its own error enum. A `ProtocolError`
//! always means a frame could not be turned into a [`Command`] or a
//! message could not be turned into bytes; it says nothing about game
//! rules.
//!
//! [`Command`]: crate::Command

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `cmd`, a
    /// missing field, or a field of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
