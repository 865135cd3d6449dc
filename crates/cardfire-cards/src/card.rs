//! Card identifiers and the suit mapping used by the attack roll.
//!
//! A [`CardId`] is the file name of a card in the asset catalog, e.g.
//! `asso_cuori.png` or `jolly_nero.png`. The first `_`-separated segment
//! is the rank; a later segment names either one suit or one of the two
//! colour groups. Parsing lives here and nowhere else: the rest of the
//! workspace only sees [`Suit`] slices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefixes of the special cards that can be stashed in the stock pile
/// and used as weapons.
pub const SPECIAL_PREFIXES: [(&str, SpecialKind); 5] = [
    ("re_", SpecialKind::King),
    ("asso", SpecialKind::Ace),
    ("4", SpecialKind::Four),
    ("7", SpecialKind::Seven),
    ("jolly", SpecialKind::Joker),
];

/// One of the four suit buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Spades,
    Clubs,
    Diamonds,
}

impl Suit {
    /// All suits, in bucket order.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Spades, Suit::Clubs, Suit::Diamonds];

    /// Position of this suit's bucket in a `[_; 4]` tally.
    pub fn index(self) -> usize {
        match self {
            Self::Hearts => 0,
            Self::Spades => 1,
            Self::Clubs => 2,
            Self::Diamonds => 3,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hearts => "hearts",
            Self::Spades => "spades",
            Self::Clubs => "clubs",
            Self::Diamonds => "diamonds",
        };
        f.write_str(name)
    }
}

/// What the suit segment of a card names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuitMark {
    /// Exactly one suit.
    Single(Suit),
    /// The warm colour group: hearts and diamonds.
    Warm,
    /// The cool colour group: spades and clubs.
    Cool,
}

impl SuitMark {
    /// Parses one identifier segment. Accepts the Italian names used by
    /// the card art as well as English ones, in any case.
    pub fn from_token(token: &str) -> Option<Self> {
        let mark = match token.to_ascii_lowercase().as_str() {
            "cuori" | "hearts" => Self::Single(Suit::Hearts),
            "picche" | "spades" => Self::Single(Suit::Spades),
            "fiori" | "clubs" => Self::Single(Suit::Clubs),
            "quadri" | "diamonds" => Self::Single(Suit::Diamonds),
            "rosso" | "warm" => Self::Warm,
            "nero" | "cool" => Self::Cool,
            _ => return None,
        };
        Some(mark)
    }

    /// The buckets this mark contributes to (one or two).
    pub fn suits(self) -> &'static [Suit] {
        match self {
            Self::Single(Suit::Hearts) => &[Suit::Hearts],
            Self::Single(Suit::Spades) => &[Suit::Spades],
            Self::Single(Suit::Clubs) => &[Suit::Clubs],
            Self::Single(Suit::Diamonds) => &[Suit::Diamonds],
            Self::Warm => &[Suit::Hearts, Suit::Diamonds],
            Self::Cool => &[Suit::Spades, Suit::Clubs],
        }
    }
}

/// The special ranks recognised by [`SPECIAL_PREFIXES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    King,
    Ace,
    Four,
    Seven,
    Joker,
}

/// Opaque identifier of a card, as found in the asset catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier without its file extension.
    fn stem(&self) -> &str {
        match self.0.rsplit_once('.') {
            Some((stem, _)) => stem,
            None => &self.0,
        }
    }

    /// Which special rank this card is, if any.
    pub fn special_kind(&self) -> Option<SpecialKind> {
        SPECIAL_PREFIXES
            .iter()
            .find(|(prefix, _)| self.0.starts_with(*prefix))
            .map(|(_, kind)| *kind)
    }

    /// `true` for the cards that may go to the stock pile and be fired.
    pub fn is_special(&self) -> bool {
        self.special_kind().is_some()
    }

    /// The first segment after the rank that names a suit or group.
    pub fn suit_mark(&self) -> Option<SuitMark> {
        self.stem().split('_').skip(1).find_map(SuitMark::from_token)
    }

    /// The suit buckets this card counts towards. Empty when the
    /// identifier names no suit.
    pub fn suits(&self) -> &'static [Suit] {
        match self.suit_mark() {
            Some(mark) => mark.suits(),
            None => &[],
        }
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for CardId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
