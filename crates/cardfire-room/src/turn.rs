//! Turn rotation.
//!
//! The cursor is a seat index into the room's player list. Rooms pass an
//! `alive` predicate so eliminated seats are skipped without the cursor
//! knowing anything about players.

/// Index of the seat whose turn it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnCursor(usize);

impl TurnCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw seat index. May be out of range until [`normalize`] runs.
    ///
    /// [`normalize`]: Self::normalize
    pub fn index(self) -> usize {
        self.0
    }

    /// Wraps the cursor back to seat 0 if it points past the end.
    pub fn normalize(&mut self, seats: usize) {
        if self.0 >= seats {
            self.0 = 0;
        }
    }

    /// The current seat, or `None` when there are no seats.
    pub fn current(&mut self, seats: usize) -> Option<usize> {
        self.normalize(seats);
        (seats > 0).then_some(self.0)
    }

    /// Returns `true` if `seat` holds the turn.
    pub fn is_turn(&mut self, seat: usize, seats: usize) -> bool {
        self.current(seats) == Some(seat)
    }

    /// Passes the turn to the next seat for which `alive` holds. With no
    /// living seat the cursor simply moves one step.
    pub fn advance(&mut self, seats: usize, alive: impl Fn(usize) -> bool) {
        if seats == 0 {
            self.0 = 0;
            return;
        }
        self.normalize(seats);
        let start = (self.0 + 1) % seats;
        self.0 = seek(start, seats, &alive).unwrap_or(start);
    }

    /// Keeps the turn on the same player after `removed` was taken out of
    /// the seat list. `seats` is the new length.
    ///
    /// If the removed seat held the turn, it passes to whoever slid into
    /// that seat (or seat 0 past the end), skipping eliminated seats.
    pub fn on_removed(&mut self, removed: usize, seats: usize, alive: impl Fn(usize) -> bool) {
        let held_turn = removed == self.0;
        if removed < self.0 {
            self.0 -= 1;
        }
        self.normalize(seats);
        if held_turn && seats > 0 {
            if let Some(next) = seek(self.0, seats, &alive) {
                self.0 = next;
            }
        }
    }
}

/// First seat at or after `start` (wrapping) for which `alive` holds.
fn seek(start: usize, seats: usize, alive: &impl Fn(usize) -> bool) -> Option<usize> {
    (0..seats).map(|step| (start + step) % seats).find(|seat| alive(*seat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_alive(_: usize) -> bool {
        true
    }

    #[test]
    fn test_advance_wraps_round_the_table() {
        let mut turn = TurnCursor::new();
        turn.advance(3, all_alive);
        turn.advance(3, all_alive);
        assert_eq!(turn.index(), 2);
        turn.advance(3, all_alive);
        assert_eq!(turn.index(), 0);
    }

    #[test]
    fn test_advance_skips_eliminated_seats() {
        let dead = [false, true, true, false];
        let mut turn = TurnCursor::new();
        turn.advance(4, |seat| !dead[seat]);
        assert_eq!(turn.index(), 3);
        turn.advance(4, |seat| !dead[seat]);
        assert_eq!(turn.index(), 0);
    }

    #[test]
    fn test_advance_with_nobody_alive_steps_once() {
        let mut turn = TurnCursor::new();
        turn.advance(3, |_| false);
        assert_eq!(turn.index(), 1);
    }

    #[test]
    fn test_on_removed_before_cursor_keeps_same_player() {
        // Seats [A, B, C], turn on C (2). A leaves: C is now seat 1.
        let mut turn = TurnCursor(2);
        turn.on_removed(0, 2, all_alive);
        assert_eq!(turn.index(), 1);
    }

    #[test]
    fn test_on_removed_after_cursor_is_unchanged() {
        let mut turn = TurnCursor(1);
        turn.on_removed(2, 2, all_alive);
        assert_eq!(turn.index(), 1);
    }

    #[test]
    fn test_on_removed_current_last_seat_wraps_to_zero() {
        let mut turn = TurnCursor(2);
        turn.on_removed(2, 2, all_alive);
        assert_eq!(turn.index(), 0);
    }

    #[test]
    fn test_on_removed_current_skips_eliminated_successor() {
        // Seats after removal: [X, dead, Y]; the turn holder was at 1.
        let dead = [false, true, false];
        let mut turn = TurnCursor(1);
        turn.on_removed(1, 3, |seat| !dead[seat]);
        assert_eq!(turn.index(), 2);
    }

    #[test]
    fn test_current_on_empty_table_is_none() {
        let mut turn = TurnCursor(4);
        assert_eq!(turn.current(0), None);
        assert!(!turn.is_turn(0, 0));
        assert_eq!(turn.current(2), Some(0));
    }
}
