//! Error types for the room layer.

use cardfire_protocol::{ErrorCode, PlayerId, RoomId, RoomToken};

/// Errors that can occur during room operations.
///
/// Every variant is a rejection of one command: the room state is left
/// untouched and only the sender is told.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No live room has this token.
    #[error("room {0} not found")]
    RoomNotFound(RoomToken),

    /// The room is full, no more player slots available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// Joining or starting after the game started.
    #[error("the game has already started")]
    AlreadyStarted,

    /// A game command before the creator started the game.
    #[error("the game has not started yet")]
    NotStarted,

    /// Only the creator may start or end the game.
    #[error("only the room creator can do that")]
    NotCreator,

    #[error("it is not your turn")]
    NotYourTurn,

    /// Discarding and stashing need a full hand.
    #[error("you need 4 cards in hand to play one")]
    HandNotFull,

    /// Drawing with a full hand, from an empty pile, or while eliminated.
    #[error("you cannot draw right now")]
    DrawNotAllowed,

    /// The attack hand does not hold exactly four weapon cards the
    /// attacker actually has.
    #[error("an attack needs exactly four weapon cards from your hand")]
    InvalidAttackHand,

    /// The claimed card is not the one at the given hand index.
    #[error("card {0} is not at that position in your hand")]
    InvalidCard(String),

    /// The sender has been eliminated and can no longer act.
    #[error("you have been eliminated")]
    Eliminated,

    /// The game is over; nothing but QUIT is accepted.
    #[error("the game is over")]
    GameEnded,

    /// The deck can't cover the opening deal.
    #[error("not enough cards to deal: need {needed}, deck has {available}")]
    NotEnoughCards { needed: usize, available: usize },

    /// The player is not in any room.
    #[error("player {0} is not in a room")]
    NotInRoom(PlayerId),

    /// The player already belongs to a room.
    #[error("player {0} is already in room {1}")]
    AlreadyInRoom(PlayerId, RoomToken),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

impl RoomError {
    /// The wire code reported to the client.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RoomNotFound(_) => ErrorCode::RoomNotFound,
            Self::RoomFull(_) => ErrorCode::RoomFull,
            Self::AlreadyStarted => ErrorCode::AlreadyStarted,
            Self::NotStarted => ErrorCode::NotStarted,
            Self::NotCreator => ErrorCode::NotCreator,
            Self::NotYourTurn => ErrorCode::NotYourTurn,
            Self::HandNotFull => ErrorCode::HandNotFull,
            Self::DrawNotAllowed => ErrorCode::DrawNotAllowed,
            Self::InvalidAttackHand => ErrorCode::InvalidAttackHand,
            Self::InvalidCard(_) => ErrorCode::InvalidCard,
            Self::Eliminated => ErrorCode::Eliminated,
            Self::GameEnded => ErrorCode::GameEnded,
            Self::NotEnoughCards { .. } => ErrorCode::NotEnoughCards,
            Self::NotInRoom(_) => ErrorCode::NotInRoom,
            Self::AlreadyInRoom(..) => ErrorCode::AlreadyInRoom,
            Self::Unavailable(_) => ErrorCode::Unavailable,
        }
    }
}
