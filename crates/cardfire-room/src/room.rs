//! Room actor: an isolated Tokio task that owns one [`Game`].
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. Commands for one room are applied one at a
//! time in arrival order; different rooms never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use cardfire_cards::AssetCatalog;
use cardfire_protocol::{PlayerId, Recipient, RoomId, RoomToken, ServerMessage};
use tokio::sync::{mpsc, oneshot};

use crate::{Game, NewPlayer, RoomConfig, RoomError, RoomState, Stash};

/// An outbound item from the room actor to a player's connection handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomOutbound {
    /// A message to encode and send.
    Message(ServerMessage),
    /// The room closed; drop the connection.
    Disconnect,
}

/// Channel sender for delivering outbound items to a player.
pub type PlayerSender = mpsc::UnboundedSender<RoomOutbound>;

/// A game command from a seated player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    ThrowCard { index: usize, card: String },
    DrawFromDeck,
    SaveInStock { index: usize, card: String },
    DrawFromStock,
    Fire { hand: Vec<String> },
    End,
}

impl Action {
    /// Wire name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::ThrowCard { .. } => "THROW A CARD",
            Self::DrawFromDeck => "DRAW FROM DECK",
            Self::SaveInStock { .. } => "SAVE IN STOCK",
            Self::DrawFromStock => "DRAW FROM STOCK",
            Self::Fire { .. } => "FIRE",
            Self::End => "END",
        }
    }
}

/// What an accepted [`Action`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// State changed and messages went out.
    Applied,
    /// Valid but nothing happened (non-special stash, attack with no
    /// target).
    Ignored,
    /// The room closed and every member was disconnected.
    Closed,
}

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is a reply channel: the caller
/// sends a command and waits for the response on it.
pub(crate) enum RoomCommand {
    /// Seat a player.
    Join {
        player: NewPlayer,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Remove a player. Replies with the number of players left.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    /// Apply a game action from a seated player.
    Play {
        sender: PlayerId,
        action: Action,
        reply: oneshot::Sender<Result<ActionOutcome, RoomError>>,
    },

    /// Request a metadata snapshot.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Shut down the room.
    Shutdown,
}

/// A snapshot of room metadata (not the game itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub token: RoomToken,
    pub state: RoomState,
    pub player_count: usize,
    pub max_players: usize,
    /// Cards left in the draw pile.
    pub deck_size: usize,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Sends a join request to the room.
    pub async fn join(&self, player: NewPlayer, sender: PlayerSender) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Join {
            player,
            sender,
            reply,
        })
        .await?
    }

    /// Removes a player, returning how many remain.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        self.request(|reply| RoomCommand::Leave { player_id, reply })
            .await?
    }

    /// Applies a game action and waits for the outcome.
    pub async fn play(&self, sender: PlayerId, action: Action) -> Result<ActionOutcome, RoomError> {
        self.request(|reply| RoomCommand::Play {
            sender,
            action,
            reply,
        })
        .await?
    }

    /// Requests the current room info.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Sends a command built around a fresh reply channel and awaits the
    /// reply. A closed mailbox or a dropped reply means the actor is gone.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    game: Game,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown, until the
    /// room empties, or until the game is ended.
    async fn run(mut self) {
        let room_id = self.game.id();
        tracing::info!(%room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player,
                    sender,
                    reply,
                } => {
                    let player_id = player.id;
                    let result = self.game.join(player);
                    if result.is_ok() {
                        self.senders.insert(player_id, sender);
                    }
                    self.flush();
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.game.leave(player_id);
                    self.senders.remove(&player_id);
                    self.flush();
                    let remaining = self.game.players().len();
                    let _ = reply.send(result.map(|()| remaining));
                    if remaining == 0 {
                        tracing::info!(%room_id, "room empty");
                        break;
                    }
                }
                RoomCommand::Play {
                    sender,
                    action,
                    reply,
                } => {
                    let result = self.apply(sender, action);
                    self.flush();
                    let closing = matches!(result, Ok(ActionOutcome::Closed));
                    if closing {
                        self.disconnect_all();
                    }
                    let _ = reply.send(result);
                    if closing {
                        tracing::info!(%room_id, "room closed by creator");
                        break;
                    }
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(%room_id, "room shutting down");
                    self.disconnect_all();
                    break;
                }
            }
        }

        tracing::info!(%room_id, "room actor stopped");
    }

    fn apply(&mut self, sender: PlayerId, action: Action) -> Result<ActionOutcome, RoomError> {
        let name = action.name();
        let result = match action {
            Action::Start => self.game.deal(sender).map(|()| ActionOutcome::Applied),
            Action::ThrowCard { index, card } => self
                .game
                .throw_card(sender, index, &card)
                .map(|()| ActionOutcome::Applied),
            Action::DrawFromDeck => self
                .game
                .draw_from_deck(sender)
                .map(|()| ActionOutcome::Applied),
            Action::SaveInStock { index, card } => {
                self.game
                    .save_in_stock(sender, index, &card)
                    .map(|stash| match stash {
                        Stash::Stashed => ActionOutcome::Applied,
                        Stash::Ignored => ActionOutcome::Ignored,
                    })
            }
            Action::DrawFromStock => self
                .game
                .draw_from_stock(sender)
                .map(|()| ActionOutcome::Applied),
            Action::Fire { hand } => self.game.fire(sender, &hand).map(|report| match report {
                Some(_) => ActionOutcome::Applied,
                None => ActionOutcome::Ignored,
            }),
            Action::End => self.game.end(sender).map(|()| ActionOutcome::Closed),
        };

        if let Err(e) = &result {
            tracing::debug!(
                room_id = %self.game.id(),
                %sender,
                action = name,
                error = %e,
                "action rejected"
            );
        }
        result
    }

    /// Routes everything the game queued to the right members.
    fn flush(&mut self) {
        for (recipient, msg) in self.game.take_outbox() {
            match recipient {
                Recipient::All => {
                    for player in self.game.players() {
                        self.send_to(player.id, RoomOutbound::Message(msg.clone()));
                    }
                }
                Recipient::Player(pid) => {
                    self.send_to(pid, RoomOutbound::Message(msg));
                }
            }
        }
    }

    fn disconnect_all(&mut self) {
        for (_, sender) in self.senders.drain() {
            let _ = sender.send(RoomOutbound::Disconnect);
        }
    }

    /// Sends an outbound item to a single player. Silently drops it if
    /// the receiver is gone (player disconnected).
    fn send_to(&self, player_id: PlayerId, msg: RoomOutbound) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.game.id(),
            token: self.game.token().clone(),
            state: self.game.state(),
            player_count: self.game.players().len(),
            max_players: self.game.config().max_players,
            deck_size: self.game.deck().len(),
        }
    }
}

/// Spawns a room actor with `creator` already seated and returns a
/// handle to it.
///
/// `config.channel_size` controls backpressure: if the mailbox fills up,
/// senders wait (bounded channel).
pub(crate) fn spawn_room(
    room_id: RoomId,
    token: RoomToken,
    config: RoomConfig,
    catalog: Arc<AssetCatalog>,
    creator: NewPlayer,
    creator_sender: PlayerSender,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let creator_id = creator.id;
    let game = Game::new(room_id, token, config, catalog, creator);

    let mut senders = HashMap::new();
    senders.insert(creator_id, creator_sender);
    let actor = RoomActor {
        game,
        senders,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
