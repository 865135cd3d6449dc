//! Players seated in a room.

use cardfire_cards::{CardId, Hand};
use cardfire_protocol::{PlayerId, PlayerSummary};

/// Identity of a player asking to sit down in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub id: PlayerId,
    pub name: String,
    pub avatar: String,
}

impl NewPlayer {
    pub fn new(id: PlayerId, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

/// A seated player.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub avatar: String,
    pub hand: Hand,
    /// May drop to zero or below; that is what eliminates a player.
    pub points: i32,
    /// `false` once eliminated.
    pub can_act: bool,
}

impl Player {
    pub fn new(joining: NewPlayer, points: i32) -> Self {
        Self {
            id: joining.id,
            name: joining.name,
            avatar: joining.avatar,
            hand: Hand::new(),
            points,
            can_act: true,
        }
    }

    /// Roster entry, without points.
    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            name: self.name.clone(),
            avatar: self.avatar.clone(),
            points: None,
        }
    }

    /// Public state broadcast after an attack.
    pub fn scored_summary(&self) -> PlayerSummary {
        PlayerSummary {
            points: Some(self.points),
            ..self.summary()
        }
    }

    /// Subtracts `damage` from the player's points. If that takes a
    /// player who could still act to zero or below, they are eliminated
    /// and their hand is emptied; the cards are returned.
    pub fn take_hit(&mut self, damage: i32) -> Option<Vec<CardId>> {
        self.points = self.points.saturating_sub(damage);
        if self.points > 0 || !self.can_act {
            return None;
        }
        self.can_act = false;
        Some(self.hand.take_all())
    }
}
