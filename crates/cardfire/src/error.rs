//! Unified error type for the Cardfire server.

use cardfire_cards::CatalogError;
use cardfire_protocol::ProtocolError;
use cardfire_room::RoomError;
use cardfire_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CardfireError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rejected room command.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The card catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
