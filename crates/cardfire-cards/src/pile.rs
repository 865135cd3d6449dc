//! Ordered card piles.
//!
//! The draw deck, the used pile and the stock pile are all [`Pile`]s.
//! The top of a pile is the last element, so drawing is `Vec::pop` and
//! every removal is by position. Looking a card up by value and removing
//! "the first equal card" would silently merge the two copies of each
//! catalog entry.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{AssetCatalog, CardId};

/// An ordered stack of cards; the top is the last element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pile {
    cards: Vec<CardId>,
}

impl Pile {
    /// Creates an empty pile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the full deck: two copies of every catalog entry, in
    /// catalog order (unshuffled).
    pub fn doubled(catalog: &AssetCatalog) -> Self {
        let ids = catalog.ids();
        let mut cards = Vec::with_capacity(ids.len() * 2);
        cards.extend_from_slice(ids);
        cards.extend_from_slice(ids);
        Self { cards }
    }

    /// Uniform Fisher–Yates shuffle of the whole pile.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Removes and returns the top card.
    pub fn draw(&mut self) -> Option<CardId> {
        self.cards.pop()
    }

    /// Puts a card on top of the pile.
    pub fn put(&mut self, card: CardId) {
        self.cards.push(card);
    }

    /// Returns the top card without removing it.
    pub fn top(&self) -> Option<&CardId> {
        self.cards.last()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The cards from bottom to top.
    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }
}

impl From<Vec<CardId>> for Pile {
    fn from(cards: Vec<CardId>) -> Self {
        Self { cards }
    }
}

impl Extend<CardId> for Pile {
    fn extend<I: IntoIterator<Item = CardId>>(&mut self, iter: I) {
        self.cards.extend(iter);
    }
}
