//! The game played inside one room.
//!
//! [`Game`] is plain synchronous state: every operation validates first,
//! then mutates, then queues the messages it produced in an outbox. It
//! never touches a socket or a channel; the room actor drains the outbox
//! after each command and routes the messages to the room's members.
//! That keeps every rule testable without a runtime.

use std::sync::Arc;

use cardfire_cards::{AssetCatalog, CardId, HAND_CAPACITY, Pile};
use cardfire_protocol::{PlayerId, Recipient, RoomId, RoomToken, ServerMessage};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::fire::{self, AttackReport, DamageRoll, SuitTally, WEAPON_COUNT};
use crate::{NewPlayer, Player, RoomConfig, RoomError, RoomState, TurnCursor};

/// Messages queued by a [`Game`] operation, with who should get them.
pub type Outbox = Vec<(Recipient, ServerMessage)>;

/// Result of a stash request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stash {
    /// The card moved to the stock pile and the turn advanced.
    Stashed,
    /// The card is not special; nothing happened.
    Ignored,
}

/// Full state of one room's game.
pub struct Game {
    id: RoomId,
    token: RoomToken,
    config: RoomConfig,
    state: RoomState,
    /// Join order is turn order. Seat 0 is the creator.
    players: Vec<Player>,
    deck: Pile,
    used: Pile,
    stock: Pile,
    turn: TurnCursor,
    catalog: Arc<AssetCatalog>,
    rng: StdRng,
    outbox: Outbox,
}

impl Game {
    /// Opens a room with `creator` in seat 0. The doubled deck is built
    /// and shuffled right away.
    pub fn new(
        id: RoomId,
        token: RoomToken,
        config: RoomConfig,
        catalog: Arc<AssetCatalog>,
        creator: NewPlayer,
    ) -> Self {
        Self::with_rng(id, token, config, catalog, creator, StdRng::from_os_rng())
    }

    /// Like [`Game::new`] with a caller-supplied random source.
    pub fn with_rng(
        id: RoomId,
        token: RoomToken,
        config: RoomConfig,
        catalog: Arc<AssetCatalog>,
        creator: NewPlayer,
        mut rng: StdRng,
    ) -> Self {
        let mut deck = Pile::doubled(&catalog);
        deck.shuffle(&mut rng);
        let creator = Player::new(creator, config.starting_points);
        Self {
            id,
            token,
            config,
            state: RoomState::Lobby,
            players: vec![creator],
            deck,
            used: Pile::new(),
            stock: Pile::new(),
            turn: TurnCursor::new(),
            catalog,
            rng,
            outbox: Vec::new(),
        }
    }

    // -- accessors ---------------------------------------------------------

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn token(&self) -> &RoomToken {
        &self.token
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Seated players in turn order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn deck(&self) -> &Pile {
        &self.deck
    }

    pub fn used(&self) -> &Pile {
        &self.used
    }

    pub fn stock(&self) -> &Pile {
        &self.stock
    }

    /// Seat index holding the turn.
    pub fn turn_index(&self) -> usize {
        self.turn.index()
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.players.get(self.turn.index()).map(|p| p.id)
    }

    /// Every card the room holds: piles plus hands. Always twice the
    /// catalog size.
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self.used.len()
            + self.stock.len()
            + self.players.iter().map(|p| p.hand.len()).sum::<usize>()
    }

    /// Drains the messages produced since the last call.
    pub fn take_outbox(&mut self) -> Outbox {
        std::mem::take(&mut self.outbox)
    }

    // -- membership --------------------------------------------------------

    /// Seats a new player at the end of the turn order and broadcasts the
    /// roster.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`] if the id is already seated
    /// - [`RoomError::AlreadyStarted`] once the game started
    /// - [`RoomError::RoomFull`] at `max_players`
    pub fn join(&mut self, joining: NewPlayer) -> Result<(), RoomError> {
        if self.seat(joining.id).is_some() {
            return Err(RoomError::AlreadyInRoom(joining.id, self.token.clone()));
        }
        if !self.state.is_joinable() {
            return Err(RoomError::AlreadyStarted);
        }
        if self.players.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.id));
        }

        tracing::info!(
            room_id = %self.id,
            player_id = %joining.id,
            name = %joining.name,
            players = self.players.len() + 1,
            "player joined"
        );
        self.players
            .push(Player::new(joining, self.config.starting_points));
        self.broadcast_roster();
        Ok(())
    }

    /// Removes a player. Their cards go to the used pile, the turn stays
    /// with whoever held it, and the remaining players get the roster.
    pub fn leave(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let seat = self.member(player_id)?;
        let mut player = self.players.remove(seat);
        self.used.extend(player.hand.take_all());

        let players = &self.players;
        self.turn
            .on_removed(seat, players.len(), |s| players[s].can_act);

        tracing::info!(
            room_id = %self.id,
            %player_id,
            players = self.players.len(),
            "player left"
        );

        if !self.players.is_empty() {
            self.broadcast_roster();
        }
        if self.state.is_active() && self.living() <= 1 {
            self.finish("last player standing");
        }
        Ok(())
    }

    // -- lifecycle ---------------------------------------------------------

    /// Deals four cards to every player, in join order, then reshuffles
    /// the rest of the deck. Each player is sent their hand.
    pub fn deal(&mut self, sender: PlayerId) -> Result<(), RoomError> {
        self.ensure_creator(sender)?;
        if !self.state.can_transition_to(RoomState::InProgress) {
            return Err(RoomError::AlreadyStarted);
        }
        let needed = self.players.len() * HAND_CAPACITY;
        if self.deck.len() < needed {
            return Err(RoomError::NotEnoughCards {
                needed,
                available: self.deck.len(),
            });
        }

        for player in &mut self.players {
            player.hand.fill_from(&mut self.deck, HAND_CAPACITY);
        }
        self.deck.shuffle(&mut self.rng);
        self.state = RoomState::InProgress;
        self.turn = TurnCursor::new();

        tracing::info!(
            room_id = %self.id,
            players = self.players.len(),
            deck = self.deck.len(),
            "game started"
        );
        for seat in 0..self.players.len() {
            self.send_hand(seat);
        }
        Ok(())
    }

    /// Ends the game. Only the creator may, and only after the start.
    /// The actor closes every member connection afterwards.
    pub fn end(&mut self, sender: PlayerId) -> Result<(), RoomError> {
        self.ensure_creator(sender)?;
        if !self.state.is_started() {
            return Err(RoomError::NotStarted);
        }
        self.finish("ended by creator");
        Ok(())
    }

    // -- hand actions ------------------------------------------------------

    /// Discards the card at `index` onto the used pile and passes the turn.
    pub fn throw_card(
        &mut self,
        sender: PlayerId,
        index: usize,
        claimed: &str,
    ) -> Result<(), RoomError> {
        let seat = self.acting_seat(sender)?;
        self.check_claim(seat, index, claimed)?;

        if let Some(card) = self.players[seat].hand.remove(index) {
            tracing::debug!(room_id = %self.id, player_id = %sender, %card, "card discarded");
            self.used.put(card);
        }
        self.advance_turn();
        self.send_hand(seat);
        Ok(())
    }

    /// Moves a special card from the hand to the stock pile and passes
    /// the turn. A valid request for a non-special card does nothing.
    pub fn save_in_stock(
        &mut self,
        sender: PlayerId,
        index: usize,
        claimed: &str,
    ) -> Result<Stash, RoomError> {
        let seat = self.acting_seat(sender)?;
        if !self.check_claim(seat, index, claimed)?.is_special() {
            tracing::debug!(
                room_id = %self.id,
                player_id = %sender,
                card = claimed,
                "not special, stash ignored"
            );
            return Ok(Stash::Ignored);
        }

        if let Some(card) = self.players[seat].hand.remove(index) {
            tracing::debug!(room_id = %self.id, player_id = %sender, %card, "card stashed");
            self.stock.put(card);
        }
        self.advance_turn();
        self.send_hand(seat);
        Ok(Stash::Stashed)
    }

    /// Draws the top card of the deck. Not gated by turn order.
    pub fn draw_from_deck(&mut self, sender: PlayerId) -> Result<(), RoomError> {
        let seat = self.member(sender)?;
        self.ensure_active()?;
        let player = &mut self.players[seat];
        if !player.can_act || player.hand.fill_from(&mut self.deck, 1) == 0 {
            return Err(RoomError::DrawNotAllowed);
        }
        self.send_hand(seat);
        Ok(())
    }

    /// Draws the top card of the stock pile. Not gated by turn order.
    pub fn draw_from_stock(&mut self, sender: PlayerId) -> Result<(), RoomError> {
        let seat = self.member(sender)?;
        self.ensure_active()?;
        let player = &mut self.players[seat];
        if !player.can_act || player.hand.fill_from(&mut self.stock, 1) == 0 {
            return Err(RoomError::DrawNotAllowed);
        }
        self.send_hand(seat);
        Ok(())
    }

    /// Attacks a random living opponent with the four weapon cards among
    /// `claimed`. Returns `None` when nobody can be targeted.
    ///
    /// The weapon cards stay in the attacker's hand.
    pub fn fire(
        &mut self,
        sender: PlayerId,
        claimed: &[String],
    ) -> Result<Option<AttackReport>, RoomError> {
        let seat = self.acting_seat(sender)?;
        let claimed: Vec<CardId> = claimed.iter().map(|c| CardId::new(c.as_str())).collect();
        let weapons = fire::weapon_cards(&claimed);
        if weapons.len() != WEAPON_COUNT || !self.players[seat].hand.contains_all(&weapons) {
            return Err(RoomError::InvalidAttackHand);
        }
        let critical = SuitTally::of(&weapons).is_critical();

        let candidates: Vec<usize> = self
            .players
            .iter()
            .enumerate()
            .filter(|(s, p)| *s != seat && p.can_act)
            .map(|(s, _)| s)
            .collect();
        let Some(target_seat) = fire::pick_target(&mut self.rng, &candidates) else {
            tracing::debug!(room_id = %self.id, player_id = %sender, "no one to attack");
            return Ok(None);
        };

        let roll = DamageRoll::roll(&mut self.rng, self.config.die_sides, critical);
        let target = &mut self.players[target_seat];
        let dropped = target.take_hit(roll.damage());
        let update = target.scored_summary();
        let report = AttackReport {
            attacker: sender,
            target: target.id,
            roll,
            points_after: target.points,
            eliminated: dropped.is_some(),
        };

        tracing::debug!(
            room_id = %self.id,
            attacker = %sender,
            target = %report.target,
            damage = roll.damage(),
            critical,
            points = report.points_after,
            "attack resolved"
        );
        self.outbox.push((
            Recipient::All,
            ServerMessage::PlayerUpdate {
                players: update.clone(),
            },
        ));

        if let Some(cards) = dropped {
            tracing::info!(room_id = %self.id, player_id = %report.target, "player eliminated");
            self.used.extend(cards);
            self.outbox
                .push((Recipient::All, ServerMessage::PlayerUpdate { players: update }));
            self.send_hand(target_seat);
        }

        self.advance_turn();
        if report.eliminated && self.living() <= 1 {
            self.finish("last player standing");
        }
        Ok(Some(report))
    }

    // -- helpers -----------------------------------------------------------

    fn seat(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    fn member(&self, id: PlayerId) -> Result<usize, RoomError> {
        self.seat(id).ok_or(RoomError::NotInRoom(id))
    }

    fn ensure_creator(&self, id: PlayerId) -> Result<(), RoomError> {
        match self.member(id)? {
            0 => Ok(()),
            _ => Err(RoomError::NotCreator),
        }
    }

    fn ensure_active(&self) -> Result<(), RoomError> {
        match self.state {
            RoomState::Lobby => Err(RoomError::NotStarted),
            RoomState::InProgress => Ok(()),
            RoomState::Ended => Err(RoomError::GameEnded),
        }
    }

    /// Seat of `id` if they may take a turn-gated action now.
    fn acting_seat(&mut self, id: PlayerId) -> Result<usize, RoomError> {
        let seat = self.member(id)?;
        self.ensure_active()?;
        if !self.players[seat].can_act {
            return Err(RoomError::Eliminated);
        }
        if !self.turn.is_turn(seat, self.players.len()) {
            return Err(RoomError::NotYourTurn);
        }
        Ok(seat)
    }

    /// Checks that the hand is full and that `claimed` is the card
    /// actually held at `index`.
    fn check_claim(&self, seat: usize, index: usize, claimed: &str) -> Result<&CardId, RoomError> {
        let hand = &self.players[seat].hand;
        if !hand.is_full() {
            return Err(RoomError::HandNotFull);
        }
        match hand.get(index) {
            Some(card) if card.as_str() == claimed => Ok(card),
            _ => Err(RoomError::InvalidCard(claimed.to_owned())),
        }
    }

    fn living(&self) -> usize {
        self.players.iter().filter(|p| p.can_act).count()
    }

    fn advance_turn(&mut self) {
        let players = &self.players;
        self.turn.advance(players.len(), |s| players[s].can_act);
    }

    /// Moves to `Ended`. A game that already ended stays as it is.
    fn finish(&mut self, reason: &str) {
        if self.state.can_transition_to(RoomState::Ended) {
            self.state = RoomState::Ended;
            tracing::info!(room_id = %self.id, reason, "game ended");
        }
    }

    fn broadcast_roster(&mut self) {
        let players = self.players.iter().map(Player::summary).collect();
        self.outbox
            .push((Recipient::All, ServerMessage::Roster { players }));
    }

    /// Queues the private hand message for the player in `seat`.
    fn send_hand(&mut self, seat: usize) {
        let player = &self.players[seat];
        let mut cards = Vec::with_capacity(player.hand.len());
        let mut cards_name = Vec::with_capacity(player.hand.len());
        for card in player.hand.cards() {
            let payload = self.catalog.payload(card).unwrap_or_else(|| {
                tracing::warn!(%card, "card missing from catalog");
                ""
            });
            cards.push(payload.to_owned());
            cards_name.push(card.to_string());
        }
        let recipient = Recipient::Player(player.id);
        self.outbox
            .push((recipient, ServerMessage::Hand { cards, cards_name }));
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    const CARDS: [&str; 13] = [
        "asso_cuori.png",
        "re_cuori.png",
        "4_cuori.png",
        "7_cuori.png",
        "jolly_rosso.png",
        "jolly_nero.png",
        "5_picche.png",
        "6_fiori.png",
        "8_quadri.png",
        "9_cuori.png",
        "10_picche.png",
        "fante_fiori.png",
        "regina_quadri.png",
    ];

    fn catalog() -> Arc<AssetCatalog> {
        Arc::new(AssetCatalog::from_payloads(CARDS.iter().map(|n| (*n, n.as_bytes()))).unwrap())
    }

    fn pid(n: u64) -> PlayerId {
        PlayerId(n)
    }

    fn seated(id: u64) -> NewPlayer {
        NewPlayer::new(pid(id), format!("player{id}"), "avatar.png")
    }

    fn game_with(players: u64, seed: u64) -> Game {
        let mut game = Game::with_rng(
            RoomId(1),
            RoomToken::new("tok"),
            RoomConfig::default(),
            catalog(),
            seated(1),
            StdRng::seed_from_u64(seed),
        );
        for id in 2..=players {
            game.join(seated(id)).unwrap();
        }
        game.take_outbox();
        game
    }

    fn started(players: u64, seed: u64) -> Game {
        let mut game = game_with(players, seed);
        game.deal(pid(1)).unwrap();
        game.take_outbox();
        game
    }

    /// Swaps the hand of `seat` for `names`, taking the cards from the
    /// deck (or, failing that, from another hand in exchange for a deck
    /// card) so the card count is unchanged.
    fn rig_hand(game: &mut Game, seat: usize, names: &[&str]) {
        let old = game.players[seat].hand.take_all();
        let mut deck: Vec<CardId> = game.deck.cards().to_vec();
        deck.extend(old);
        for name in names {
            let card = match deck.iter().position(|c| c.as_str() == *name) {
                Some(pos) => deck.remove(pos),
                None => {
                    let other = (0..game.players.len())
                        .find(|s| {
                            *s != seat
                                && game.players[*s].hand.cards().iter().any(|c| c.as_str() == *name)
                        })
                        .expect("card held somewhere");
                    let mut cards = game.players[other].hand.take_all();
                    let pos = cards.iter().position(|c| c.as_str() == *name).unwrap();
                    let card = std::mem::replace(&mut cards[pos], deck.pop().unwrap());
                    for c in cards {
                        game.players[other].hand.push(c).unwrap();
                    }
                    card
                }
            };
            game.players[seat].hand.push(card).unwrap();
        }
        game.deck = Pile::from(deck);
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    const HEARTS_CRIT: [&str; 4] = ["asso_cuori.png", "re_cuori.png", "4_cuori.png", "7_cuori.png"];

    // -- membership ---------------------------------------------------------

    #[test]
    fn test_join_preserves_order_and_broadcasts_roster() {
        let mut game = game_with(1, 0);
        game.join(seated(2)).unwrap();

        let ids: Vec<PlayerId> = game.players().iter().map(|p| p.id).collect();
        assert_eq!(ids, [pid(1), pid(2)]);

        let outbox = game.take_outbox();
        assert_eq!(outbox.len(), 1);
        match &outbox[0] {
            (Recipient::All, ServerMessage::Roster { players }) => {
                assert_eq!(players.len(), 2);
                assert_eq!(players[1].name, "player2");
                assert_eq!(players[1].points, None);
            }
            other => panic!("expected roster, got {other:?}"),
        }
    }

    #[test]
    fn test_join_full_room_returns_room_full() {
        let mut game = game_with(6, 0);
        assert_eq!(game.join(seated(7)), Err(RoomError::RoomFull(RoomId(1))));
        assert_eq!(game.players().len(), 6);
    }

    #[test]
    fn test_join_after_start_returns_already_started() {
        let mut game = started(2, 0);
        assert_eq!(game.join(seated(3)), Err(RoomError::AlreadyStarted));
    }

    #[test]
    fn test_join_twice_returns_already_in_room() {
        let mut game = game_with(2, 0);
        assert!(matches!(
            game.join(seated(2)),
            Err(RoomError::AlreadyInRoom(id, _)) if id == pid(2)
        ));
    }

    #[test]
    fn test_leave_before_cursor_keeps_current_player() {
        let mut game = started(3, 1);
        let hand = |g: &Game, seat: usize| g.players[seat].hand.cards()[0].to_string();
        let first = hand(&game, 0);
        game.throw_card(pid(1), 0, &first).unwrap();
        game.draw_from_deck(pid(1)).unwrap();
        let second = hand(&game, 1);
        game.throw_card(pid(2), 0, &second).unwrap();
        assert_eq!(game.current_player(), Some(pid(3)));

        game.leave(pid(1)).unwrap();
        assert_eq!(game.current_player(), Some(pid(3)));
        assert_eq!(game.turn_index(), 1);
    }

    #[test]
    fn test_leave_returns_hand_to_used_pile() {
        let mut game = started(3, 2);
        game.leave(pid(2)).unwrap();
        assert_eq!(game.used().len(), HAND_CAPACITY);
        assert_eq!(game.card_count(), 26);

        let outbox = game.take_outbox();
        assert!(matches!(
            &outbox[..],
            [(Recipient::All, ServerMessage::Roster { players })] if players.len() == 2
        ));
    }

    #[test]
    fn test_leave_mid_game_with_one_left_ends_game() {
        let mut game = started(2, 0);
        game.leave(pid(2)).unwrap();
        assert_eq!(game.state(), RoomState::Ended);
    }

    #[test]
    fn test_leave_unknown_player_returns_not_in_room() {
        let mut game = game_with(1, 0);
        assert_eq!(game.leave(pid(9)), Err(RoomError::NotInRoom(pid(9))));
    }

    // -- deal ---------------------------------------------------------------

    #[test]
    fn test_deal_gives_four_cards_each_and_rest_to_deck() {
        for n in 1..=6 {
            let mut game = game_with(n, n);
            game.deal(pid(1)).unwrap();
            assert_eq!(game.state(), RoomState::InProgress);
            assert_eq!(game.deck().len(), 26 - 4 * n as usize);
            assert!(game.players().iter().all(|p| p.hand.len() == 4));
            assert_eq!(game.card_count(), 26);

            let hands: Vec<_> = game.take_outbox();
            assert_eq!(hands.len(), n as usize);
            for ((recipient, msg), player) in hands.iter().zip(game.players()) {
                assert_eq!(*recipient, Recipient::Player(player.id));
                let ServerMessage::Hand { cards, cards_name } = msg else {
                    panic!("expected hand, got {msg:?}");
                };
                assert_eq!(cards.len(), 4);
                let names: Vec<String> =
                    player.hand.cards().iter().map(|c| c.to_string()).collect();
                assert_eq!(*cards_name, names);
                let first = CardId::from(cards_name[0].as_str());
                assert_eq!(Some(cards[0].as_str()), game.catalog.payload(&first));
            }
        }
    }

    #[test]
    fn test_deal_by_non_creator_returns_not_creator() {
        let mut game = game_with(2, 0);
        assert_eq!(game.deal(pid(2)), Err(RoomError::NotCreator));
        assert_eq!(game.state(), RoomState::Lobby);
    }

    #[test]
    fn test_deal_twice_returns_already_started() {
        let mut game = started(2, 0);
        assert_eq!(game.deal(pid(1)), Err(RoomError::AlreadyStarted));
    }

    #[test]
    fn test_deal_short_deck_returns_not_enough_cards() {
        let tiny = Arc::new(AssetCatalog::from_payloads([("asso_cuori.png", b"a")]).unwrap());
        let config = RoomConfig::default();
        let mut game = Game::new(RoomId(2), RoomToken::new("t"), config, tiny, seated(1));
        assert_eq!(
            game.deal(pid(1)),
            Err(RoomError::NotEnoughCards {
                needed: 4,
                available: 2
            })
        );
        assert_eq!(game.state(), RoomState::Lobby);
        assert_eq!(game.deck().len(), 2);
        assert!(game.take_outbox().is_empty());
    }

    // -- discard / stash ----------------------------------------------------

    #[test]
    fn test_throw_card_out_of_turn_is_rejected_and_changes_nothing() {
        let mut game = started(3, 4);
        let card = game.players[1].hand.cards()[0].to_string();
        let before = game.players[1].hand.clone();

        assert_eq!(game.throw_card(pid(2), 0, &card), Err(RoomError::NotYourTurn));
        assert_eq!(game.turn_index(), 0);
        assert_eq!(game.players[1].hand, before);
        assert!(game.used().is_empty());
        assert!(game.take_outbox().is_empty());
    }

    #[test]
    fn test_throw_card_moves_card_to_used_and_passes_turn() {
        let mut game = started(2, 5);
        let card = game.players[0].hand.cards()[2].clone();

        game.throw_card(pid(1), 2, card.as_str()).unwrap();
        assert_eq!(game.used().top(), Some(&card));
        assert_eq!(game.players[0].hand.len(), 3);
        assert_eq!(game.current_player(), Some(pid(2)));

        let outbox = game.take_outbox();
        assert!(matches!(
            &outbox[..],
            [(Recipient::Player(p), ServerMessage::Hand { cards, .. })]
                if *p == pid(1) && cards.len() == 3
        ));
    }

    #[test]
    fn test_throw_card_with_short_hand_returns_hand_not_full() {
        let mut game = started(2, 6);
        let first = game.players[0].hand.cards()[0].to_string();
        game.throw_card(pid(1), 0, &first).unwrap();
        let second = game.players[1].hand.cards()[0].to_string();
        game.throw_card(pid(2), 0, &second).unwrap();

        let again = game.players[0].hand.cards()[0].to_string();
        assert_eq!(game.throw_card(pid(1), 0, &again), Err(RoomError::HandNotFull));
    }

    #[test]
    fn test_throw_card_claim_mismatch_returns_invalid_card() {
        let mut game = started(2, 7);
        rig_hand(&mut game, 0, &["5_picche.png", "6_fiori.png", "8_quadri.png", "9_cuori.png"]);

        assert_eq!(
            game.throw_card(pid(1), 0, "6_fiori.png"),
            Err(RoomError::InvalidCard("6_fiori.png".into()))
        );
        assert_eq!(
            game.throw_card(pid(1), 9, "5_picche.png"),
            Err(RoomError::InvalidCard("5_picche.png".into()))
        );
        assert_eq!(game.players[0].hand.len(), 4);
        assert_eq!(game.turn_index(), 0);
    }

    #[test]
    fn test_save_in_stock_non_special_is_a_silent_no_op() {
        let mut game = started(2, 8);
        rig_hand(&mut game, 0, &["5_picche.png", "6_fiori.png", "8_quadri.png", "asso_cuori.png"]);

        assert_eq!(game.save_in_stock(pid(1), 0, "5_picche.png"), Ok(Stash::Ignored));
        assert!(game.stock().is_empty());
        assert_eq!(game.players[0].hand.len(), 4);
        assert_eq!(game.turn_index(), 0);
        assert!(game.take_outbox().is_empty());
    }

    #[test]
    fn test_save_in_stock_special_moves_to_stock_and_passes_turn() {
        let mut game = started(2, 9);
        rig_hand(&mut game, 0, &["5_picche.png", "6_fiori.png", "8_quadri.png", "asso_cuori.png"]);

        assert_eq!(game.save_in_stock(pid(1), 3, "asso_cuori.png"), Ok(Stash::Stashed));
        assert_eq!(game.stock().top(), Some(&CardId::from("asso_cuori.png")));
        assert_eq!(game.current_player(), Some(pid(2)));
        assert_eq!(game.card_count(), 26);
    }

    #[test]
    fn test_save_in_stock_out_of_turn_returns_not_your_turn() {
        let mut game = started(2, 21);
        rig_hand(&mut game, 1, &["asso_cuori.png", "6_fiori.png", "8_quadri.png", "9_cuori.png"]);
        let before = game.players[1].hand.clone();

        assert_eq!(
            game.save_in_stock(pid(2), 0, "asso_cuori.png"),
            Err(RoomError::NotYourTurn)
        );
        assert_eq!(game.players[1].hand, before);
        assert!(game.stock().is_empty());
        assert_eq!(game.turn_index(), 0);
        assert!(game.take_outbox().is_empty());
    }

    // -- draws --------------------------------------------------------------

    #[test]
    fn test_draw_before_start_returns_not_started() {
        let mut game = game_with(2, 0);
        assert_eq!(game.draw_from_deck(pid(1)), Err(RoomError::NotStarted));
    }

    #[test]
    fn test_draw_with_full_hand_returns_draw_not_allowed() {
        let mut game = started(2, 10);
        assert_eq!(game.draw_from_deck(pid(2)), Err(RoomError::DrawNotAllowed));
        assert_eq!(game.deck().len(), 18);
    }

    #[test]
    fn test_draw_from_deck_ignores_turn_order() {
        let mut game = started(2, 11);
        let card = game.players[0].hand.cards()[0].to_string();
        game.throw_card(pid(1), 0, &card).unwrap();
        game.take_outbox();
        let top = game.deck().top().cloned();

        // Player 2 holds the turn, player 1 still draws.
        game.draw_from_deck(pid(1)).unwrap();
        assert_eq!(game.players[0].hand.cards().last(), top.as_ref());
        assert_eq!(game.current_player(), Some(pid(2)));
        assert_eq!(game.take_outbox().len(), 1);
    }

    #[test]
    fn test_draw_from_stock_empty_then_after_stash() {
        let mut game = started(2, 12);
        rig_hand(&mut game, 0, &["re_cuori.png", "6_fiori.png", "8_quadri.png", "9_cuori.png"]);
        game.save_in_stock(pid(1), 0, "re_cuori.png").unwrap();

        // Player 2 has a full hand; player 1 can take the king back.
        assert_eq!(game.draw_from_stock(pid(2)), Err(RoomError::DrawNotAllowed));
        game.draw_from_stock(pid(1)).unwrap();
        assert!(game.stock().is_empty());
        assert_eq!(game.draw_from_stock(pid(1)), Err(RoomError::DrawNotAllowed));
    }

    // -- fire ---------------------------------------------------------------

    #[test]
    fn test_fire_with_three_weapons_returns_invalid_attack_hand() {
        let mut game = started(2, 13);
        rig_hand(&mut game, 0, &["asso_cuori.png", "re_cuori.png", "4_cuori.png", "9_cuori.png"]);
        let claimed = strings(&["asso_cuori.png", "re_cuori.png", "4_cuori.png", "9_cuori.png"]);

        assert_eq!(game.fire(pid(1), &claimed), Err(RoomError::InvalidAttackHand));
        assert_eq!(game.turn_index(), 0);
        assert!(game.take_outbox().is_empty());
    }

    #[test]
    fn test_fire_with_cards_not_held_returns_invalid_attack_hand() {
        let mut game = started(2, 14);
        rig_hand(&mut game, 0, &["asso_cuori.png", "re_cuori.png", "4_cuori.png", "9_cuori.png"]);
        let claimed = strings(&HEARTS_CRIT);

        assert_eq!(game.fire(pid(1), &claimed), Err(RoomError::InvalidAttackHand));
        assert_eq!(game.players[1].points, 20);
    }

    #[test]
    fn test_fire_out_of_turn_returns_not_your_turn() {
        let mut game = started(2, 15);
        rig_hand(&mut game, 1, &HEARTS_CRIT);
        assert_eq!(game.fire(pid(2), &strings(&HEARTS_CRIT)), Err(RoomError::NotYourTurn));
    }

    #[test]
    fn test_fire_hits_opponent_and_keeps_weapons() {
        let mut game = started(2, 16);
        rig_hand(&mut game, 0, &["asso_cuori.png", "re_cuori.png", "4_cuori.png", "7_cuori.png"]);
        let before = game.players[0].hand.clone();

        let report = game.fire(pid(1), &strings(&HEARTS_CRIT)).unwrap().unwrap();
        assert_eq!(report.target, pid(2));
        assert!(report.roll.critical);
        assert_eq!(game.players[1].points, 20 - report.roll.damage());
        assert_eq!(game.players[0].hand, before);
        assert_eq!(game.current_player(), Some(pid(2)));

        let outbox = game.take_outbox();
        assert!(matches!(
            &outbox[..],
            [(Recipient::All, ServerMessage::PlayerUpdate { players })]
                if players.points == Some(report.points_after) && players.name == "player2"
        ));
    }

    #[test]
    fn test_fire_ignores_non_weapon_cards_in_claim() {
        let mut game = started(2, 17);
        rig_hand(&mut game, 0, &["asso_cuori.png", "re_cuori.png", "4_cuori.png", "7_cuori.png"]);
        let mut claimed = strings(&HEARTS_CRIT);
        claimed.push("fante_fiori.png".into());

        assert!(game.fire(pid(1), &claimed).unwrap().is_some());
    }

    #[test]
    fn test_fire_damage_range_critical_and_plain() {
        // hearts, hearts, hearts, warm: the hearts bucket reaches four.
        let warm = ["asso_cuori.png", "re_cuori.png", "4_cuori.png", "jolly_rosso.png"];
        let plain = ["asso_cuori.png", "re_cuori.png", "4_cuori.png", "jolly_nero.png"];

        for seed in 0..64 {
            for weapons in [HEARTS_CRIT, warm] {
                let mut game = started(2, seed);
                rig_hand(&mut game, 0, &weapons);
                let report = game.fire(pid(1), &strings(&weapons)).unwrap().unwrap();
                let damage = 20 - game.players[1].points;
                assert!(report.roll.critical);
                assert!((2..=12).contains(&damage) && damage % 2 == 0, "crit damage {damage}");
            }

            let mut game = started(2, seed);
            rig_hand(&mut game, 0, &plain);
            let report = game.fire(pid(1), &strings(&plain)).unwrap().unwrap();
            assert!(!report.roll.critical);
            assert!((1..=6).contains(&(20 - game.players[1].points)));
        }
    }

    #[test]
    fn test_fire_eliminates_target_and_ends_two_player_game() {
        let mut game = started(2, 18);
        rig_hand(&mut game, 0, &HEARTS_CRIT);
        game.players[1].points = 1;

        let report = game.fire(pid(1), &strings(&HEARTS_CRIT)).unwrap().unwrap();
        assert!(report.eliminated);
        let target = &game.players[1];
        assert!(!target.can_act);
        assert!(target.hand.is_empty());
        assert!(target.points <= 0);
        assert_eq!(game.used().len(), 4);
        assert_eq!(game.card_count(), 26);
        assert_eq!(game.state(), RoomState::Ended);

        let outbox = game.take_outbox();
        assert_eq!(outbox.len(), 3);
        assert!(matches!(outbox[0], (Recipient::All, ServerMessage::PlayerUpdate { .. })));
        assert!(matches!(outbox[1], (Recipient::All, ServerMessage::PlayerUpdate { .. })));
        assert!(matches!(
            &outbox[2],
            (Recipient::Player(p), ServerMessage::Hand { cards, .. })
                if *p == pid(2) && cards.is_empty()
        ));

        assert_eq!(game.draw_from_deck(pid(1)), Err(RoomError::GameEnded));
        assert_eq!(game.end(pid(1)), Ok(()));
    }

    #[test]
    fn test_eliminated_player_is_skipped_and_cannot_act() {
        let mut game = started(3, 19);
        rig_hand(&mut game, 0, &HEARTS_CRIT);
        game.players[1].points = 1;
        game.players[2].points = 1;

        let report = game.fire(pid(1), &strings(&HEARTS_CRIT)).unwrap().unwrap();
        assert!(report.eliminated);
        assert_eq!(game.state(), RoomState::InProgress);

        // Seat order is [1, 2, 3]; the turn skips whoever was eliminated.
        let expected = if report.target == pid(2) { pid(3) } else { pid(2) };
        assert_eq!(game.current_player(), Some(expected));

        assert_eq!(game.draw_from_deck(report.target), Err(RoomError::DrawNotAllowed));
        for _ in 0..6 {
            game.advance_turn();
            assert_ne!(game.current_player(), Some(report.target));
        }
    }

    #[test]
    fn test_fire_without_opponents_is_a_no_op() {
        let mut game = started(1, 20);
        rig_hand(&mut game, 0, &HEARTS_CRIT);
        assert_eq!(game.fire(pid(1), &strings(&HEARTS_CRIT)), Ok(None));
        assert_eq!(game.turn_index(), 0);
        assert!(game.take_outbox().is_empty());
    }

    // -- end ----------------------------------------------------------------

    #[test]
    fn test_end_rules() {
        let mut game = game_with(2, 0);
        assert_eq!(game.end(pid(1)), Err(RoomError::NotStarted));
        game.deal(pid(1)).unwrap();
        assert_eq!(game.end(pid(2)), Err(RoomError::NotCreator));
        assert_eq!(game.end(pid(1)), Ok(()));
        assert_eq!(game.state(), RoomState::Ended);

        // Ended is final: no restart, and a second END leaves it as is.
        assert_eq!(game.deal(pid(1)), Err(RoomError::AlreadyStarted));
        assert_eq!(game.end(pid(1)), Ok(()));
        assert_eq!(game.state(), RoomState::Ended);
    }

    // -- invariants under random play ---------------------------------------

    #[test]
    fn test_random_play_keeps_cards_turn_and_hand_invariants() {
        for seed in 0..16 {
            let mut game = started(4, seed);
            let mut rng = StdRng::seed_from_u64(seed + 1000);
            for _ in 0..400 {
                let actor = pid(rng.random_range(1..=4));
                let index = rng.random_range(0..4);
                let card = game
                    .player(actor)
                    .and_then(|p| p.hand.get(index))
                    .map(|c| c.to_string())
                    .unwrap_or_default();
                let hand: Vec<String> = game
                    .player(actor)
                    .map(|p| p.hand.cards().iter().map(|c| c.to_string()).collect())
                    .unwrap_or_default();
                let _ = match rng.random_range(0..25) {
                    0..=4 => game.throw_card(actor, index, &card),
                    5..=9 => game.save_in_stock(actor, index, &card).map(|_| ()),
                    10..=13 => game.draw_from_deck(actor),
                    14..=17 => game.draw_from_stock(actor),
                    18..=23 => game.fire(actor, &hand).map(|_| ()),
                    _ => game.leave(actor),
                };
                game.take_outbox();

                assert_eq!(game.card_count(), 26);
                assert!(game.players().iter().all(|p| p.hand.len() <= HAND_CAPACITY));
                if !game.players().is_empty() {
                    assert!(game.turn_index() < game.players().len());
                }
            }
        }
    }
}
