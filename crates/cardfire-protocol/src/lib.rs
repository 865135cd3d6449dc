//! Wire protocol for Cardfire.
//!
//! - **Types** ([`Command`], [`ServerMessage`], [`RoomToken`], ...):
//!   the JSON objects exchanged with the browser client.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those objects are
//!   converted to and from frames.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about rooms or cards; it only knows
//! how messages look.
//!
//! ```text
//! Transport (frames) → Protocol (Command) → Room (game rules)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Command, ErrorBody, ErrorCode, PlayerId, PlayerSummary, Recipient, RoomId,
    RoomToken, ServerMessage,
};
