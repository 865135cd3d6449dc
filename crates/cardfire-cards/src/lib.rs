//! Cards for Cardfire.
//!
//! - [`CardId`] and the pure suit mapping ([`Suit`], [`SuitMark`])
//! - [`Pile`]: deck, used pile and stock pile
//! - [`Hand`]: a player's four-card hand
//! - [`AssetCatalog`]: the pre-loaded card images
//!
//! Nothing in here knows about players, turns or rooms.

mod card;
mod catalog;
mod error;
mod hand;
mod pile;

pub use card::{CardId, SPECIAL_PREFIXES, SpecialKind, Suit, SuitMark};
pub use catalog::AssetCatalog;
pub use error::{CardError, CatalogError};
pub use hand::{HAND_CAPACITY, Hand};
pub use pile::Pile;
