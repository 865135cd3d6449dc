//! `CardfireServer` builder and server loop.
//!
//! This is the entry point for running a Cardfire server. It ties
//! together all the layers: transport → protocol → rooms.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cardfire_cards::AssetCatalog;
use cardfire_protocol::{Codec, JsonCodec};
use cardfire_room::{RoomConfig, RoomRegistry};
use cardfire_transport::{DEFAULT_HANDSHAKE_TIMEOUT, Incoming, Transport, WebSocketTransport};

use crate::CardfireError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry does its own locking.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: RoomRegistry,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Cardfire server.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use cardfire::prelude::*;
///
/// # async fn run() -> Result<(), CardfireError> {
/// let catalog = Arc::new(AssetCatalog::load_dir("./cards").await?);
/// let server = CardfireServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(catalog)
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct CardfireServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    handshake_timeout: Duration,
}

impl CardfireServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            room_config: RoomConfig::default(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration every new room starts with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets how long a client may take to complete the WebSocket upgrade.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Binds the listener. Uses `JsonCodec` and `WebSocketTransport`.
    ///
    /// The catalog must already be loaded: rooms never read from disk.
    pub async fn build(
        self,
        catalog: Arc<AssetCatalog>,
    ) -> Result<CardfireServer<JsonCodec>, CardfireError> {
        let transport = WebSocketTransport::bind(&self.bind_addr)
            .await?
            .with_handshake_timeout(self.handshake_timeout);

        let state = Arc::new(ServerState {
            rooms: RoomRegistry::new(catalog, self.room_config),
            codec: JsonCodec,
        });

        Ok(CardfireServer { transport, state })
    }
}

impl Default for CardfireServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Cardfire server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CardfireServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl CardfireServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> CardfireServerBuilder {
        CardfireServerBuilder::new()
    }
}

impl<C: Codec> CardfireServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), CardfireError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes, then closes every
    /// room and disconnects their players.
    ///
    /// Each accepted peer gets its own task, which runs the WebSocket
    /// upgrade and then the handler. A peer that stalls or fails the
    /// upgrade only ends its own task.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), CardfireError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Cardfire server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok(incoming) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            let peer = incoming.peer_addr();
                            let conn = match incoming.establish().await {
                                Ok(conn) => conn,
                                Err(e) => {
                                    tracing::debug!(%peer, error = %e, "handshake failed");
                                    return;
                                }
                            };
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                },
                () = &mut shutdown => break,
            }
        }

        tracing::info!("shutting down, closing rooms");
        self.state.rooms.shutdown().await;
        Ok(())
    }
}
