//! Attack resolution.
//!
//! An attack takes the four weapon cards a player fires, tallies their
//! suits, and rolls damage against one randomly chosen opponent. A
//! critical hit (one suit bucket reaching four) doubles the roll.

use cardfire_cards::{CardId, Suit};
use cardfire_protocol::PlayerId;
use rand::Rng;

/// Number of weapon cards an attack must fire.
pub const WEAPON_COUNT: usize = 4;

/// The weapon cards among `claimed`, in order.
pub fn weapon_cards(claimed: &[CardId]) -> Vec<CardId> {
    claimed.iter().filter(|card| card.is_special()).cloned().collect()
}

/// Per-suit counts of a set of cards. Colour-group cards count towards
/// both of their suits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuitTally([usize; 4]);

impl SuitTally {
    pub fn of(cards: &[CardId]) -> Self {
        let mut buckets = [0; 4];
        for card in cards {
            for suit in card.suits() {
                buckets[suit.index()] += 1;
            }
        }
        Self(buckets)
    }

    pub fn count(&self, suit: Suit) -> usize {
        self.0[suit.index()]
    }

    /// Any bucket at [`WEAPON_COUNT`] or more.
    pub fn is_critical(&self) -> bool {
        self.0.iter().any(|n| *n >= WEAPON_COUNT)
    }
}

/// One damage roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRoll {
    /// The face that came up, in `1..=sides`.
    pub roll: u32,
    pub critical: bool,
}

impl DamageRoll {
    /// Rolls a `sides`-faced die. A zero-sided die is treated as a d1.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R, sides: u32, critical: bool) -> Self {
        let roll = rng.random_range(1..=sides.max(1));
        Self { roll, critical }
    }

    /// Points removed from the target.
    pub fn damage(&self) -> i32 {
        let roll = i32::try_from(self.roll).unwrap_or(i32::MAX / 2);
        if self.critical { roll * 2 } else { roll }
    }
}

/// Picks a target uniformly among `candidates`.
pub fn pick_target<R: Rng + ?Sized, T: Copy>(rng: &mut R, candidates: &[T]) -> Option<T> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}

/// What a resolved attack did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    pub attacker: PlayerId,
    pub target: PlayerId,
    pub roll: DamageRoll,
    /// Target's points after the hit.
    pub points_after: i32,
    /// `true` if this hit eliminated the target.
    pub eliminated: bool,
}
