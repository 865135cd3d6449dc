//! Room lifecycle and game rules for Cardfire.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! [`Game`]: players, piles, turn cursor, and random source. Commands for
//! one room are serialized by its mailbox; rooms run in parallel.
//!
//! # Key types
//!
//! - [`Game`]: the synchronous rules engine of one room
//! - [`RoomRegistry`]: creates rooms, resolves tokens, routes players
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomState`]: lifecycle state machine
//! - [`RoomConfig`]: player limit, starting points, die size

mod config;
mod error;
pub mod fire;
mod game;
mod player;
mod registry;
mod room;
mod turn;

pub use config::{RoomConfig, RoomState};
pub use error::RoomError;
pub use fire::{AttackReport, DamageRoll, SuitTally};
pub use game::{Game, Outbox, Stash};
pub use player::{NewPlayer, Player};
pub use registry::RoomRegistry;
pub use room::{Action, ActionOutcome, PlayerSender, RoomHandle, RoomInfo, RoomOutbound};
pub use turn::TurnCursor;
