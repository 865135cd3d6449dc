//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::{Connection, ConnectionId, Incoming, Transport, TransportError};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// How long a peer gets to finish the WebSocket upgrade by default.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

type Socket = WebSocketStream<TcpStream>;

/// Listens for browser clients and upgrades each TCP stream to a
/// WebSocket.
pub struct WebSocketTransport {
    listener: TcpListener,
    handshake_timeout: Duration,
}

impl WebSocketTransport {
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        tracing::info!(addr = ?listener.local_addr().ok(), "listening for players");
        Ok(Self {
            listener,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        })
    }

    /// Sets how long a peer may take to complete the upgrade.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// The address actually bound, which differs from the requested one
    /// when binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Incoming = PendingWebSocket;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error> {
        let (tcp, peer) = self.listener.accept().await.map_err(TransportError::Accept)?;
        let _ = tcp.set_nodelay(true);
        Ok(PendingWebSocket {
            tcp,
            peer,
            timeout: self.handshake_timeout,
        })
    }
}

/// A TCP stream waiting for its WebSocket upgrade request.
pub struct PendingWebSocket {
    tcp: TcpStream,
    peer: SocketAddr,
    timeout: Duration,
}

impl Incoming for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    async fn establish(self) -> Result<Self::Connection, Self::Error> {
        let Self { tcp, peer, timeout } = self;
        let socket = tokio::time::timeout(timeout, tokio_tungstenite::accept_async(tcp))
            .await
            .map_err(|_| TransportError::HandshakeTimeout {
                peer,
                after: timeout,
            })?
            .map_err(|e| TransportError::Handshake {
                peer,
                reason: e.to_string(),
            })?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "player connected");
        Ok(WebSocketConnection::new(id, peer, socket))
    }
}

/// One player's socket.
///
/// Reads and writes go through separate locks so the room can push a
/// broadcast while the handler is parked in [`recv`](Connection::recv).
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    writer: Mutex<SplitSink<Socket, Message>>,
    reader: Mutex<SplitStream<Socket>>,
}

impl WebSocketConnection {
    fn new(id: ConnectionId, peer: SocketAddr, socket: Socket) -> Self {
        let (writer, reader) = socket.split();
        Self {
            id,
            peer,
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
        }
    }

    /// Remote address of the player.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn fail(&self, e: tungstenite::Error) -> TransportError {
        match e {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                TransportError::Closed(self.id)
            }
            other => TransportError::Socket {
                conn: self.id,
                reason: other.to_string(),
            },
        }
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    /// JSON goes out as a text frame so the browser can parse it
    /// directly. Non-UTF-8 payloads fall back to binary frames.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let frame = match String::from_utf8(data.to_vec()) {
            Ok(text) => Message::text(text),
            Err(raw) => Message::binary(raw.into_bytes()),
        };
        let mut writer = self.writer.lock().await;
        writer.send(frame).await.map_err(|e| self.fail(e))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut reader = self.reader.lock().await;
        while let Some(frame) = reader.next().await {
            match frame.map_err(|e| self.fail(e))? {
                Message::Text(text) => return Ok(Some(text.as_bytes().to_vec())),
                Message::Binary(data) => return Ok(Some(data.to_vec())),
                Message::Close(_) => return Ok(None),
                // Pings are answered by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        let mut writer = self.writer.lock().await;
        match writer.close().await {
            Ok(()) => Ok(()),
            Err(e) => match self.fail(e) {
                TransportError::Closed(_) => Ok(()),
                other => Err(other),
            },
        }
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
