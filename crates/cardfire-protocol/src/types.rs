//! Core protocol types for Cardfire's wire format.
//!
//! Everything in this module travels on the wire: [`Command`] is what a
//! client sends, [`ServerMessage`] is what the server answers or
//! broadcasts. Field names follow the JSON the browser client already
//! speaks (`cmd`, `cardIndex`, `cardsName`, ...), which is why several
//! fields carry explicit `#[serde(rename)]` attributes.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identifier for a player.
///
/// Turn order is tracked against these ids, never against positions in a
/// roster, so a player leaving cannot hand the turn to the wrong seat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Sequential identifier of a room, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// The session token players use to find a room.
///
/// Tokens are compared case-insensitively: every constructor (including
/// deserialization) trims and upper-cases the raw string, so two tokens
/// that differ only in case are equal and hash the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomToken(String);

impl RoomToken {
    /// Normalizes `raw` into a token.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_uppercase())
    }

    /// Returns the normalized token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomToken {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<RoomToken> for String {
    fn from(token: RoomToken) -> Self {
        token.0
    }
}

impl fmt::Display for RoomToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server message.
///
/// Room logic produces `(Recipient, ServerMessage)` pairs; the room actor
/// resolves them against its own member list, so `All` never leaks
/// outside the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every player in the room.
    All,

    /// One specific player.
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Command: client → server
// ---------------------------------------------------------------------------

/// A command sent by a client.
///
/// `#[serde(tag = "cmd")]` gives the internally tagged shape the client
/// uses: `{ "cmd": "THROW A CARD", "cardIndex": 2, "card": "7_fiori.png" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Command {
    /// Create a room; the sender becomes its creator.
    #[serde(rename = "NEW")]
    New {
        player: String,
        #[serde(default)]
        avatar: String,
    },

    /// Join the room addressed by `token`.
    #[serde(rename = "JOIN")]
    Join {
        player: String,
        token: RoomToken,
        #[serde(default)]
        avatar: String,
    },

    /// Leave the current room.
    #[serde(rename = "QUIT")]
    Quit,

    /// Deal the opening hands (creator only).
    #[serde(rename = "START")]
    Start,

    /// Discard the card at `card_index` onto the used pile.
    #[serde(rename = "THROW A CARD")]
    ThrowCard {
        #[serde(rename = "cardIndex")]
        card_index: usize,
        card: String,
    },

    /// Draw the top card of the deck.
    #[serde(rename = "DRAW FROM DECK")]
    DrawFromDeck,

    /// Put a special card from the hand onto the stock pile.
    #[serde(rename = "SAVE IN STOCK")]
    SaveInStock {
        #[serde(rename = "cardIndex")]
        card_index: usize,
        card: String,
    },

    /// Draw the top card of the stock pile.
    #[serde(rename = "DRAW FROM STOCK")]
    DrawFromStock,

    /// Attack a random opponent with the four weapon cards in `hand`.
    #[serde(rename = "FIRE")]
    Fire { hand: Vec<String> },

    /// Close the room for everyone (creator only, after START).
    #[serde(rename = "END")]
    End,
}

impl Command {
    /// The wire name of the command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::New { .. } => "NEW",
            Self::Join { .. } => "JOIN",
            Self::Quit => "QUIT",
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

// ---------------------------------------------------------------------------
// ServerMessage: server → client
// ---------------------------------------------------------------------------

/// Public view of a player.
///
/// `points` is only present in attack broadcasts; roster updates omit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i32>,
}

/// Machine-readable error codes sent back to the acting client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    RoomNotFound,
    RoomFull,
    AlreadyStarted,
    NotStarted,
    NotCreator,
    NotYourTurn,
    HandNotFull,
    DrawNotAllowed,
    InvalidAttackHand,
    InvalidCard,
    Eliminated,
    GameEnded,
    NotEnoughCards,
    NotInRoom,
    AlreadyInRoom,
    MalformedCommand,
    Unavailable,
}

/// Body of an error reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

/// A message sent by the server.
///
/// Untagged: each variant is recognised by its field names, matching the
/// plain objects the client expects (`{ "token": ... }`,
/// `{ "cards": [...], "cardsName": [...] }`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    /// Reply to NEW.
    SessionCreated { token: RoomToken },

    /// Current room roster, in turn order.
    Roster { players: Vec<PlayerSummary> },

    /// Updated public state of a single player after an attack.
    PlayerUpdate { players: PlayerSummary },

    /// A player's private hand: base64 payloads and their identifiers,
    /// index-aligned.
    Hand {
        cards: Vec<String>,
        #[serde(rename = "cardsName")]
        cards_name: Vec<String>,
    },

    /// A rejected command.
    Error { error: ErrorBody },
}

impl ServerMessage {
    /// Builds an error reply.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
