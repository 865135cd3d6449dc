//! # Cardfire
//!
//! WebSocket session server for a turn-based multiplayer card game.
//!
//! Players open a room with `NEW`, share its token so friends can `JOIN`,
//! and once the creator sends `START` they take turns discarding,
//! stashing special cards, drawing, and firing four-card attacks at each
//! other until one player is left standing or the creator sends `END`.
//!
//! Every room is an actor task from [`cardfire_room`]; this crate owns the
//! network side: accepting connections, decoding commands, routing them
//! to the room registry, and writing replies back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cardfire::prelude::*;
//!
//! # async fn run() -> Result<(), CardfireError> {
//! let catalog = Arc::new(AssetCatalog::load_dir("./cards").await?);
//! let server = CardfireServer::builder()
//!     .bind("127.0.0.1:8080")
//!     .room_config(RoomConfig { starting_points: 30, ..RoomConfig::default() })
//!     .build(catalog)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::CardfireError;
pub use server::{CardfireServer, CardfireServerBuilder};

pub mod prelude {
    //! The types needed to configure and run a server.

    pub use crate::{CardfireError, CardfireServer, CardfireServerBuilder};
    pub use cardfire_cards::AssetCatalog;
    pub use cardfire_protocol::{Command, ErrorCode, JsonCodec, PlayerId, RoomToken, ServerMessage};
    pub use cardfire_room::RoomConfig;
}
