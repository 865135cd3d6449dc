use std::net::SocketAddr;
use std::time::Duration;

use crate::ConnectionId;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not be bound.
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Accepting a TCP stream failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The peer connected but never completed the WebSocket upgrade.
    #[error("handshake with {peer} failed: {reason}")]
    Handshake { peer: SocketAddr, reason: String },

    /// The peer did not finish the WebSocket upgrade in time.
    #[error("handshake with {peer} timed out after {after:?}")]
    HandshakeTimeout { peer: SocketAddr, after: Duration },

    /// The connection was already closed by either side.
    #[error("{0} is closed")]
    Closed(ConnectionId),

    /// Any other WebSocket failure on an established connection.
    #[error("{conn}: {reason}")]
    Socket { conn: ConnectionId, reason: String },
}
