//! Per-connection handler: command decoding, routing, and replies.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task. The flow is:
//!   1. The connection id becomes the player's id
//!   2. A writer task drains the player's outbound channel onto the socket
//!   3. Loop: receive frames → decode a `Command` → route it to the room
//!      registry; rejections go back to this player only
//!   4. On exit the drop guard takes the player out of their room
//!
//! When the room closes, the writer shuts the socket and wakes the reader,
//! so the handler ends even if the peer never answers the close frame.

use std::sync::Arc;

use cardfire_protocol::{Codec, Command, ErrorCode, PlayerId, ServerMessage};
use cardfire_room::{Action, NewPlayer, PlayerSender, RoomError, RoomOutbound};
use cardfire_transport::{Connection, WebSocketConnection};
use tokio::sync::{Notify, mpsc};

use crate::CardfireError;
use crate::server::ServerState;

/// Drop guard that removes a player from their room when the handler
/// exits, whether the client quit, dropped, or the task panicked.
///
/// Since `Drop` is synchronous, we spawn a fire-and-forget task for the
/// async leave.
struct PresenceGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for PresenceGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            match state.rooms.leave_room(player_id).await {
                Ok(()) => tracing::info!(%player_id, "left room on disconnect"),
                Err(RoomError::NotInRoom(_)) => {}
                Err(e) => tracing::debug!(%player_id, error = %e, "leave on disconnect failed"),
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), CardfireError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    tracing::debug!(%conn_id, %player_id, peer = %conn.peer_addr(), "handling new connection");

    let (tx, rx) = mpsc::unbounded_channel();
    let closed = Arc::new(Notify::new());
    tokio::spawn(write_loop(
        Arc::clone(&conn),
        Arc::clone(&state),
        rx,
        Arc::clone(&closed),
    ));

    let _guard = PresenceGuard {
        player_id,
        state: Arc::clone(&state),
    };

    loop {
        let received = tokio::select! {
            received = conn.recv() => received,
            () = closed.notified() => {
                tracing::debug!(%player_id, "writer closed the connection");
                break;
            }
        };
        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let command: Command = match state.codec.decode(&data) {
            Ok(cmd) => cmd,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "malformed command");
                reply(&tx, ServerMessage::error(ErrorCode::MalformedCommand, e.to_string()));
                continue;
            }
        };

        let name = command.name();
        tracing::debug!(%player_id, cmd = name, "command received");
        if let Err(e) = dispatch(&state, player_id, &tx, command).await {
            tracing::debug!(%player_id, cmd = name, error = %e, "command rejected");
            reply(&tx, ServerMessage::error(e.code(), e.to_string()));
        }
    }

    // _guard drops here → the player leaves their room.
    Ok(())
}

/// Routes one decoded command.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    tx: &PlayerSender,
    command: Command,
) -> Result<(), RoomError> {
    let action = match command {
        Command::New { player, avatar } => {
            let creator = NewPlayer::new(player_id, player, avatar);
            let token = state.rooms.create_room(creator, tx.clone()).await?;
            reply(tx, ServerMessage::SessionCreated { token });
            return Ok(());
        }
        Command::Join {
            player,
            token,
            avatar,
        } => {
            let joining = NewPlayer::new(player_id, player, avatar);
            return state.rooms.join_room(&token, joining, tx.clone()).await;
        }
        Command::Quit => return state.rooms.leave_room(player_id).await,
        Command::Start => Action::Start,
        Command::ThrowCard { card_index, card } => Action::ThrowCard {
            index: card_index,
            card,
        },
        Command::DrawFromDeck => Action::DrawFromDeck,
        Command::SaveInStock { card_index, card } => Action::SaveInStock {
            index: card_index,
            card,
        },
        Command::DrawFromStock => Action::DrawFromStock,
        Command::Fire { hand } => Action::Fire { hand },
        Command::End => Action::End,
    };

    let outcome = state.rooms.play(player_id, action).await?;
    tracing::trace!(%player_id, ?outcome, "action applied");
    Ok(())
}

/// Queues a message for this connection's writer.
fn reply(tx: &PlayerSender, msg: ServerMessage) {
    let _ = tx.send(RoomOutbound::Message(msg));
}

/// Drains a player's outbound channel onto the socket.
///
/// Runs until every sender is gone, the room asks for a disconnect, or a
/// send fails. The last two wake the reader through `closed`.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut rx: mpsc::UnboundedReceiver<RoomOutbound>,
    closed: Arc<Notify>,
) {
    let conn_id = conn.id();
    while let Some(item) = rx.recv().await {
        match item {
            RoomOutbound::Message(msg) => {
                let bytes = match state.codec.encode(&msg) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(%conn_id, error = %e, "failed to encode message");
                        continue;
                    }
                };
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
                    closed.notify_one();
                    break;
                }
            }
            RoomOutbound::Disconnect => {
                tracing::debug!(%conn_id, "room closed, disconnecting");
                let _ = conn.close().await;
                closed.notify_one();
                break;
            }
        }
    }
}
