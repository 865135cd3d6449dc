//! A player's hand.

use crate::{CardError, CardId, Pile};

/// Maximum number of cards a hand can hold.
pub const HAND_CAPACITY: usize = 4;

/// An ordered, bounded collection of cards (`0 ≤ len ≤ 4`).
///
/// Order matters: clients address cards by index, and the index of a
/// card must not move unless a card before it is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<CardId>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cards.len() >= HAND_CAPACITY
    }

    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    pub fn get(&self, index: usize) -> Option<&CardId> {
        self.cards.get(index)
    }

    /// Adds a card at the end of the hand.
    ///
    /// # Errors
    /// [`CardError::HandFull`] when the hand already holds
    /// [`HAND_CAPACITY`] cards; the card is handed back inside the error.
    pub fn push(&mut self, card: CardId) -> Result<(), CardError> {
        if self.is_full() {
            return Err(CardError::HandFull(card));
        }
        self.cards.push(card);
        Ok(())
    }

    /// Draws up to `count` cards from the top of `pile`, stopping early
    /// when the hand fills up or the pile runs out. Returns how many cards
    /// were drawn.
    pub fn fill_from(&mut self, pile: &mut Pile, count: usize) -> usize {
        let mut drawn = 0;
        while drawn < count && !self.is_full() {
            let Some(card) = pile.draw() else { break };
            self.cards.push(card);
            drawn += 1;
        }
        drawn
    }

    /// Removes the card at `index`, shifting later cards down.
    pub fn remove(&mut self, index: usize) -> Option<CardId> {
        (index < self.cards.len()).then(|| self.cards.remove(index))
    }

    /// Empties the hand, returning every card it held.
    pub fn take_all(&mut self) -> Vec<CardId> {
        std::mem::take(&mut self.cards)
    }

    /// Returns `true` if every card in `wanted` can be matched to a
    /// distinct card of this hand. Duplicates in `wanted` need as many
    /// copies in the hand.
    pub fn contains_all(&self, wanted: &[CardId]) -> bool {
        let mut used = [false; HAND_CAPACITY];
        wanted.iter().all(|card| {
            let slot = self
                .cards
                .iter()
                .enumerate()
                .position(|(i, held)| !used[i] && held == card);
            match slot {
                Some(i) => {
                    used[i] = true;
                    true
                }
                None => false,
            }
        })
    }
}
