//! Room registry: creates rooms, resolves tokens, and tracks which player
//! is in which room.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cardfire_cards::AssetCatalog;
use cardfire_protocol::{PlayerId, RoomId, RoomToken};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::room::spawn_room;
use crate::{
    Action, ActionOutcome, NewPlayer, PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo,
};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
struct Index {
    /// Active rooms, keyed by session token.
    rooms: HashMap<RoomToken, RoomHandle>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time.
    player_rooms: HashMap<PlayerId, RoomToken>,
}

impl Index {
    fn room_of(&self, player_id: PlayerId) -> Result<(RoomToken, RoomHandle), RoomError> {
        let token = self
            .player_rooms
            .get(&player_id)
            .ok_or(RoomError::NotInRoom(player_id))?;
        let handle = self
            .rooms
            .get(token)
            .ok_or_else(|| RoomError::RoomNotFound(token.clone()))?;
        Ok((token.clone(), handle.clone()))
    }

    fn ensure_free(&self, player_id: PlayerId) -> Result<(), RoomError> {
        match self.player_rooms.get(&player_id) {
            Some(token) => Err(RoomError::AlreadyInRoom(player_id, token.clone())),
            None => Ok(()),
        }
    }

    /// Records `player_id` as seated in `token`, unless the room has
    /// been dropped in the meantime.
    fn record_seat(&mut self, player_id: PlayerId, token: &RoomToken) -> bool {
        if !self.rooms.contains_key(token) {
            return false;
        }
        self.player_rooms.insert(player_id, token.clone());
        true
    }

    fn remove_room(&mut self, token: &RoomToken) -> Option<RoomHandle> {
        self.player_rooms.retain(|_, t| t != token);
        self.rooms.remove(token)
    }
}

/// Owns every live room.
///
/// This is the entry point for room operations from the connection
/// handlers. The index lock is only held for map lookups and updates; it
/// is always released before a room actor is awaited, so a slow room
/// never stalls commands for another.
pub struct RoomRegistry {
    index: Mutex<Index>,
    catalog: Arc<AssetCatalog>,
    config: RoomConfig,
}

impl RoomRegistry {
    pub fn new(catalog: Arc<AssetCatalog>, config: RoomConfig) -> Self {
        Self {
            index: Mutex::new(Index::default()),
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Opens a room with `creator` seated and returns its session token.
    pub async fn create_room(
        &self,
        creator: NewPlayer,
        sender: PlayerSender,
    ) -> Result<RoomToken, RoomError> {
        let mut index = self.index.lock().await;
        index.ensure_free(creator.id)?;

        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let token = RoomToken::new(Uuid::new_v4().to_string());
        let creator_id = creator.id;
        let handle = spawn_room(
            room_id,
            token.clone(),
            self.config.clone(),
            Arc::clone(&self.catalog),
            creator,
            sender,
        );
        index.rooms.insert(token.clone(), handle);
        index.player_rooms.insert(creator_id, token.clone());

        tracing::info!(%room_id, %token, creator = %creator_id, "room created");
        Ok(token)
    }

    /// Seats a player in the room addressed by `token`.
    pub async fn join_room(
        &self,
        token: &RoomToken,
        player: NewPlayer,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let player_id = player.id;
        let handle = {
            let index = self.index.lock().await;
            index.ensure_free(player_id)?;
            index
                .rooms
                .get(token)
                .cloned()
                .ok_or_else(|| RoomError::RoomNotFound(token.clone()))?
        };

        // An actor that already stopped (room emptied) is as good as gone.
        handle
            .join(player, sender)
            .await
            .map_err(|e| match e {
                RoomError::Unavailable(_) => RoomError::RoomNotFound(token.clone()),
                other => other,
            })?;

        // The room may have started and ended while the lock was free.
        if !self.index.lock().await.record_seat(player_id, token) {
            tracing::debug!(%player_id, %token, "room closed during join");
        }
        Ok(())
    }

    /// Removes a player from their room. The room is dropped once empty.
    pub async fn leave_room(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (token, handle) = {
            let mut index = self.index.lock().await;
            let found = index.room_of(player_id)?;
            index.player_rooms.remove(&player_id);
            found
        };

        let remaining = match handle.leave(player_id).await {
            Ok(remaining) => remaining,
            Err(RoomError::Unavailable(_)) => 0,
            Err(e) => return Err(e),
        };
        if remaining == 0 {
            self.drop_room(&token).await;
        }
        Ok(())
    }

    /// Applies a game action in the sender's room.
    pub async fn play(
        &self,
        player_id: PlayerId,
        action: Action,
    ) -> Result<ActionOutcome, RoomError> {
        let (token, handle) = self.index.lock().await.room_of(player_id)?;
        let outcome = handle.play(player_id, action).await?;
        if outcome == ActionOutcome::Closed {
            self.drop_room(&token).await;
        }
        Ok(outcome)
    }

    /// Returns info about the room addressed by `token`.
    pub async fn room_info(&self, token: &RoomToken) -> Result<RoomInfo, RoomError> {
        let handle = self
            .index
            .lock()
            .await
            .rooms
            .get(token)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(token.clone()))?;
        handle.get_info().await
    }

    /// The token of the room a player is currently in, if any.
    pub async fn player_room(&self, player_id: PlayerId) -> Option<RoomToken> {
        self.index.lock().await.player_rooms.get(&player_id).cloned()
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.index.lock().await.rooms.len()
    }

    /// Shuts every room down, disconnecting all players.
    pub async fn shutdown(&self) {
        let handles: Vec<RoomHandle> = {
            let mut index = self.index.lock().await;
            index.player_rooms.clear();
            index.rooms.drain().map(|(_, handle)| handle).collect()
        };
        for handle in handles {
            let _ = handle.shutdown().await;
        }
    }

    async fn drop_room(&self, token: &RoomToken) {
        let removed = self.index.lock().await.remove_room(token);
        if let Some(handle) = removed {
            // The actor usually stopped on its own already.
            let _ = handle.shutdown().await;
            tracing::info!(room_id = %handle.room_id(), %token, "room destroyed");
        }
    }
}
