//! Core game state machine.
//!
//! This module contains the main `GameState` struct and all turn logic:
//! the setup snake draft, dice and production, building, bank trades,
//! longest road, victory points, and the win condition.
//!
//! Commands never fail loudly. A command that breaks a rule leaves the state
//! untouched and returns no events; `validate` reports why.

use crate::actions::{GameAction, GameEvent};
use crate::board::{
    Board, EdgeId, PlayerId, Resource, TileId, VertexId, MIN_LONGEST_ROAD, ROBBER_ROLL,
};
use crate::player::{costs, Player, ResourceHand};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Seats at the table
pub const PLAYER_COUNT: usize = 4;

/// Default seat names, seat 0 first
pub const SEAT_NAMES: [&str; PLAYER_COUNT] = ["You", "Red AI", "Green AI", "Gold AI"];

/// Victory points needed to win unless configured otherwise
pub const DEFAULT_VICTORY_POINTS: u32 = 10;

/// A hand larger than this loses half of it on a seven
pub const DISCARD_THRESHOLD: u32 = 7;

/// Cards given to the bank per card received
pub const BANK_TRADE_RATE: u32 = 4;

/// Game setup options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for board generation, dice, discards, and the robber. Entropy when absent.
    pub seed: Option<u64>,
    /// The seat driven by a person; bots drive every other seat
    pub human_seat: Option<PlayerId>,
    pub victory_points_to_win: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            human_seat: Some(0),
            victory_points_to_win: DEFAULT_VICTORY_POINTS,
        }
    }
}

impl GameConfig {
    /// Default rules with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// No human seat; bots drive everyone
    pub fn all_ai(mut self) -> Self {
        self.human_seat = None;
        self
    }
}

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Initial placement phase
    Setup {
        /// Which round of setup (1 or 2)
        round: u8,
        /// What we're currently placing
        placing: SetupPlacing,
    },

    /// Before rolling dice at start of turn
    Roll,

    /// After rolling: build, trade, or end the turn
    Build,

    /// Game is over
    Finished { winner: PlayerId },
}

/// What we're placing during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupPlacing {
    Settlement,
    Road,
}

/// Why a command would be refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Rejection {
    #[error("Game is over")]
    GameOver,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    PhaseViolation,

    #[error("Invalid placement location")]
    IllegalPlacement,

    #[error("Cannot afford this")]
    InsufficientResources,

    #[error("No pieces remaining")]
    NoPiecesRemaining,

    #[error("Invalid trade")]
    InvalidTrade,

    #[error("Dice values must be between 1 and 6")]
    InvalidDice,
}

/// The complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// The game board
    pub board: Board,
    /// All players, indexed by seat
    pub players: Vec<Player>,
    /// Seat whose turn it is
    pub current_player: PlayerId,
    /// Current game phase
    pub phase: GamePhase,
    /// Turn number (0 during setup, 1 for the first rolled turn)
    pub turn_number: u32,
    /// Last dice roll this turn
    pub dice_roll: Option<(u8, u8)>,
    pub config: GameConfig,
    /// Setup phase tracking: which settlement was just placed
    setup_settlement: Option<VertexId>,
    /// Round-2 settlement per seat, for the starting bonus
    second_settlements: Vec<Option<VertexId>>,
    #[serde(skip, default = "StdRng::from_entropy")]
    rng: StdRng,
}

impl GameState {
    /// Create a new four-player game
    pub fn new(config: GameConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let board = Board::standard_with_rng(&mut rng);

        let players = SEAT_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as PlayerId, name.to_string()))
            .collect();

        info!(seed = ?config.seed, human_seat = ?config.human_seat, "new game created");

        Self {
            board,
            players,
            current_player: 0,
            phase: GamePhase::Setup {
                round: 1,
                placing: SetupPlacing::Settlement,
            },
            turn_number: 0,
            dice_roll: None,
            config,
            setup_settlement: None,
            second_settlements: vec![None; PLAYER_COUNT],
            rng,
        }
    }

    /// Create a game with default settings and an entropy-seeded board
    pub fn new_standard() -> Self {
        Self::new(GameConfig::default())
    }

    /// Create a reproducible game
    pub fn with_seed(seed: u64) -> Self {
        Self::new(GameConfig::seeded(seed))
    }

    // ==================== Derived State ====================

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// Victory points for a player (0 for unknown seats)
    pub fn victory_points(&self, player: PlayerId) -> u32 {
        self.get_player(player)
            .map(Player::victory_points)
            .unwrap_or(0)
    }

    /// Resource hand of a player
    pub fn resources(&self, player: PlayerId) -> Option<&ResourceHand> {
        self.get_player(player).map(|p| &p.resources)
    }

    pub fn longest_road_holder(&self) -> Option<PlayerId> {
        self.players.iter().find(|p| p.has_longest_road).map(|p| p.id)
    }

    pub fn largest_army_holder(&self) -> Option<PlayerId> {
        self.players.iter().find(|p| p.has_largest_army).map(|p| p.id)
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Finished { .. })
    }

    /// Get the winner if the game is finished
    pub fn winner(&self) -> Option<PlayerId> {
        if let GamePhase::Finished { winner } = self.phase {
            Some(winner)
        } else {
            None
        }
    }

    /// Whether a person, rather than a bot, sits in this seat
    pub fn is_human(&self, player: PlayerId) -> bool {
        self.config.human_seat == Some(player)
    }

    /// The settlement a setup road must touch
    pub fn setup_anchor(&self) -> Option<VertexId> {
        self.setup_settlement
    }

    // ==================== Legality Queries ====================

    fn is_decision_point(&self, player: PlayerId) -> bool {
        !self.is_finished() && player == self.current_player
    }

    /// Vertices where `player` may place a settlement right now
    pub fn legal_settlement_sites(&self, player: PlayerId) -> Vec<VertexId> {
        if !self.is_decision_point(player) {
            return Vec::new();
        }
        match self.phase {
            GamePhase::Setup {
                placing: SetupPlacing::Settlement,
                ..
            } => self.board.valid_settlement_spots(player, true),
            GamePhase::Build => self.board.valid_settlement_spots(player, false),
            _ => Vec::new(),
        }
    }

    /// Edges where `player` may place a road right now, optionally only those touching `from`.
    ///
    /// During setup the road must touch the settlement just placed, so any
    /// other `from` yields nothing.
    pub fn legal_road_sites(&self, player: PlayerId, from: Option<VertexId>) -> Vec<EdgeId> {
        if !self.is_decision_point(player) {
            return Vec::new();
        }
        match self.phase {
            GamePhase::Setup {
                placing: SetupPlacing::Road,
                ..
            } => match (self.setup_settlement, from) {
                (Some(anchor), None) => self.board.valid_road_spots_from(anchor),
                (Some(anchor), Some(v)) if v == anchor => self.board.valid_road_spots_from(anchor),
                _ => Vec::new(),
            },
            GamePhase::Build => {
                let spots = self.board.valid_road_spots(player);
                match from {
                    Some(v) => spots
                        .into_iter()
                        .filter(|&e| self.board.edge(e).is_some_and(|edge| edge.touches(v)))
                        .collect(),
                    None => spots,
                }
            }
            _ => Vec::new(),
        }
    }

    /// Settlements `player` may upgrade right now
    pub fn legal_city_sites(&self, player: PlayerId) -> Vec<VertexId> {
        if !self.is_decision_point(player) || self.phase != GamePhase::Build {
            return Vec::new();
        }
        self.board.valid_city_spots(player)
    }

    /// Check whether `player` may perform `action` now. Never mutates.
    pub fn validate(&self, player: PlayerId, action: &GameAction) -> Result<(), Rejection> {
        if self.is_finished() {
            return Err(Rejection::GameOver);
        }
        if player != self.current_player {
            return Err(Rejection::NotYourTurn);
        }
        let seat = self.get_player(player).ok_or(Rejection::NotYourTurn)?;

        match (*action, self.phase) {
            (
                GameAction::PlaceSettlement(vertex),
                GamePhase::Setup {
                    placing: SetupPlacing::Settlement,
                    ..
                },
            ) => {
                if !self.board.valid_settlement_spots(player, true).contains(&vertex) {
                    return Err(Rejection::IllegalPlacement);
                }
            }
            (
                GameAction::PlaceRoad(edge),
                GamePhase::Setup {
                    placing: SetupPlacing::Road,
                    ..
                },
            ) => {
                if !self.legal_road_sites(player, None).contains(&edge) {
                    return Err(Rejection::IllegalPlacement);
                }
            }
            (GameAction::PlaceSettlement(vertex), GamePhase::Build) => {
                if !self.board.valid_settlement_spots(player, false).contains(&vertex) {
                    return Err(Rejection::IllegalPlacement);
                }
                if !seat.has_settlement_piece() {
                    return Err(Rejection::NoPiecesRemaining);
                }
                if !seat.can_afford_settlement() {
                    return Err(Rejection::InsufficientResources);
                }
            }
            (GameAction::PlaceRoad(edge), GamePhase::Build) => {
                if !self.board.valid_road_spots(player).contains(&edge) {
                    return Err(Rejection::IllegalPlacement);
                }
                if !seat.has_road_piece() {
                    return Err(Rejection::NoPiecesRemaining);
                }
                if !seat.can_afford_road() {
                    return Err(Rejection::InsufficientResources);
                }
            }
            (GameAction::PlaceCity(vertex), GamePhase::Build) => {
                if !self.board.valid_city_spots(player).contains(&vertex) {
                    return Err(Rejection::IllegalPlacement);
                }
                if !seat.has_city_piece() {
                    return Err(Rejection::NoPiecesRemaining);
                }
                if !seat.can_afford_city() {
                    return Err(Rejection::InsufficientResources);
                }
            }
            (GameAction::RollDice, GamePhase::Roll) => {}
            (GameAction::BankTrade { give, want }, GamePhase::Build) => {
                if give == want || seat.resources.get(give) < BANK_TRADE_RATE {
                    return Err(Rejection::InvalidTrade);
                }
            }
            (GameAction::EndTurn, GamePhase::Build) => {}
            _ => return Err(Rejection::PhaseViolation),
        }

        Ok(())
    }

    /// Get all currently valid actions for a player
    pub fn valid_actions(&self, player: PlayerId) -> Vec<GameAction> {
        if !self.is_decision_point(player) {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        match self.phase {
            GamePhase::Setup { .. } | GamePhase::Build => {
                candidates.extend(
                    self.legal_settlement_sites(player)
                        .into_iter()
                        .map(GameAction::PlaceSettlement),
                );
                candidates.extend(
                    self.legal_road_sites(player, None)
                        .into_iter()
                        .map(GameAction::PlaceRoad),
                );
                candidates.extend(
                    self.legal_city_sites(player)
                        .into_iter()
                        .map(GameAction::PlaceCity),
                );
                if self.phase == GamePhase::Build {
                    for give in Resource::ALL {
                        for want in Resource::ALL {
                            candidates.push(GameAction::BankTrade { give, want });
                        }
                    }
                    candidates.push(GameAction::EndTurn);
                }
            }
            GamePhase::Roll => candidates.push(GameAction::RollDice),
            GamePhase::Finished { .. } => {}
        }

        candidates
            .into_iter()
            .filter(|action| self.validate(player, action).is_ok())
            .collect()
    }

    // ==================== Commands ====================

    /// Apply an action for a player. Returns the events it produced, or none if it was refused.
    pub fn apply_action(&mut self, player: PlayerId, action: GameAction) -> Vec<GameEvent> {
        if let Err(rejection) = self.validate(player, &action) {
            debug!(player, ?action, %rejection, "command rejected");
            return Vec::new();
        }

        match action {
            GameAction::PlaceSettlement(vertex) => self.build_settlement(player, vertex),
            GameAction::PlaceRoad(edge) => self.build_road(player, edge),
            GameAction::PlaceCity(vertex) => self.build_city(player, vertex),
            GameAction::RollDice => {
                let d1 = self.rng.gen_range(1..=6);
                let d2 = self.rng.gen_range(1..=6);
                self.execute_roll(d1, d2)
            }
            GameAction::BankTrade { give, want } => self.execute_bank_trade(player, give, want),
            GameAction::EndTurn => self.execute_end_turn(),
        }
    }

    pub fn place_settlement(&mut self, vertex: VertexId, player: PlayerId) -> Vec<GameEvent> {
        self.apply_action(player, GameAction::PlaceSettlement(vertex))
    }

    pub fn place_road(&mut self, edge: EdgeId, player: PlayerId) -> Vec<GameEvent> {
        self.apply_action(player, GameAction::PlaceRoad(edge))
    }

    pub fn place_city(&mut self, vertex: VertexId, player: PlayerId) -> Vec<GameEvent> {
        self.apply_action(player, GameAction::PlaceCity(vertex))
    }

    /// Roll two dice for the current player and resolve production
    pub fn roll_dice(&mut self) -> Vec<GameEvent> {
        self.apply_action(self.current_player, GameAction::RollDice)
    }

    /// Resolve a roll with fixed dice for the current player
    pub fn resolve_roll(&mut self, d1: u8, d2: u8) -> Vec<GameEvent> {
        let check = self
            .validate(self.current_player, &GameAction::RollDice)
            .and_then(|()| {
                if (1..=6).contains(&d1) && (1..=6).contains(&d2) {
                    Ok(())
                } else {
                    Err(Rejection::InvalidDice)
                }
            });
        if let Err(rejection) = check {
            debug!(player = self.current_player, d1, d2, %rejection, "roll rejected");
            return Vec::new();
        }
        self.execute_roll(d1, d2)
    }

    pub fn bank_trade(
        &mut self,
        player: PlayerId,
        give: Resource,
        want: Resource,
    ) -> Vec<GameEvent> {
        self.apply_action(player, GameAction::BankTrade { give, want })
    }

    /// End the current player's turn
    pub fn end_turn(&mut self) -> Vec<GameEvent> {
        self.apply_action(self.current_player, GameAction::EndTurn)
    }

    // ==================== Command Execution ====================
    //
    // Everything below assumes `validate` has already accepted the action.

    fn build_settlement(&mut self, player: PlayerId, vertex: VertexId) -> Vec<GameEvent> {
        let seat = player as usize;
        if let GamePhase::Setup { round, .. } = self.phase {
            self.setup_settlement = Some(vertex);
            if round == 2 {
                self.second_settlements[seat] = Some(vertex);
            }
            self.phase = GamePhase::Setup {
                round,
                placing: SetupPlacing::Road,
            };
        } else if !self.players[seat].resources.try_subtract(&costs::settlement()) {
            return Vec::new();
        }

        self.board.place_settlement(vertex, player);
        self.players[seat].settlements += 1;
        debug!(player, vertex, "settlement built");

        let mut events = vec![GameEvent::SettlementBuilt {
            player,
            location: vertex,
        }];
        self.settle_scores(&mut events);
        events
    }

    fn build_road(&mut self, player: PlayerId, edge: EdgeId) -> Vec<GameEvent> {
        let seat = player as usize;
        let in_setup = matches!(self.phase, GamePhase::Setup { .. });
        if !in_setup && !self.players[seat].resources.try_subtract(&costs::road()) {
            return Vec::new();
        }

        self.board.place_road(edge, player);
        self.players[seat].roads += 1;
        debug!(player, edge, "road built");

        let mut events = vec![GameEvent::RoadBuilt {
            player,
            location: edge,
        }];
        self.settle_scores(&mut events);

        if in_setup && !self.is_finished() {
            self.setup_settlement = None;
            self.advance_setup(&mut events);
        }
        events
    }

    fn build_city(&mut self, player: PlayerId, vertex: VertexId) -> Vec<GameEvent> {
        let seat = player as usize;
        if !self.players[seat].resources.try_subtract(&costs::city()) {
            return Vec::new();
        }

        self.board.upgrade_to_city(vertex, player);
        self.players[seat].settlements -= 1;
        self.players[seat].cities += 1;
        debug!(player, vertex, "city built");

        let mut events = vec![GameEvent::CityBuilt {
            player,
            location: vertex,
        }];
        self.settle_scores(&mut events);
        events
    }

    fn execute_roll(&mut self, d1: u8, d2: u8) -> Vec<GameEvent> {
        let player = self.current_player;
        let total = d1 + d2;
        self.dice_roll = Some((d1, d2));
        debug!(player, d1, d2, total, "dice rolled");

        let mut events = vec![GameEvent::DiceRolled {
            player,
            roll: (d1, d2),
            total,
        }];
        if total == ROBBER_ROLL {
            self.resolve_robber(&mut events);
        } else {
            self.distribute(total, &mut events);
        }

        self.phase = GamePhase::Build;
        events
    }

    /// Every large hand loses half, then the robber moves to a random other tile
    fn resolve_robber(&mut self, events: &mut Vec<GameEvent>) {
        for player in &mut self.players {
            let held = player.resources.total();
            if held <= DISCARD_THRESHOLD {
                continue;
            }

            let mut cards = ResourceHand::new();
            for _ in 0..held / 2 {
                if let Some(resource) = player.resources.discard_random(&mut self.rng) {
                    cards.add(resource, 1);
                }
            }
            debug!(player = player.id, count = cards.total(), "cards discarded");
            events.push(GameEvent::CardsDiscarded {
                player: player.id,
                cards,
            });
        }

        let from = self.board.robber_tile();
        let others: Vec<TileId> = self
            .board
            .tiles()
            .iter()
            .map(|t| t.id)
            .filter(|&id| id != from)
            .collect();
        if let Some(&to) = others.choose(&mut self.rng) {
            self.board.move_robber(to);
            debug!(from, to, "robber moved");
            events.push(GameEvent::RobberMoved { from, to });
        }
    }

    fn distribute(&mut self, total: u8, events: &mut Vec<GameEvent>) {
        let mut distributions = Vec::new();
        for (player, hand) in self.board.resources_for_roll(total) {
            for (resource, amount) in hand.iter() {
                distributions.push((player, resource, amount));
            }
            if let Some(seat) = self.players.get_mut(player as usize) {
                seat.resources.add_hand(&hand);
            }
        }

        if !distributions.is_empty() {
            events.push(GameEvent::ResourcesDistributed { distributions });
        }
    }

    fn execute_bank_trade(
        &mut self,
        player: PlayerId,
        give: Resource,
        want: Resource,
    ) -> Vec<GameEvent> {
        let hand = &mut self.players[player as usize].resources;
        if !hand.try_subtract(&ResourceHand::single(give, BANK_TRADE_RATE)) {
            return Vec::new();
        }
        hand.add(want, 1);
        debug!(player, ?give, ?want, "bank trade");

        vec![GameEvent::BankTradeCompleted {
            player,
            gave: give,
            gave_count: BANK_TRADE_RATE,
            received: want,
        }]
    }

    fn execute_end_turn(&mut self) -> Vec<GameEvent> {
        let player = self.current_player;
        let next_player = ((player as usize + 1) % self.players.len()) as PlayerId;

        self.current_player = next_player;
        self.turn_number += 1;
        self.dice_roll = None;
        self.phase = GamePhase::Roll;

        vec![GameEvent::TurnEnded {
            player,
            next_player,
        }]
    }

    // ==================== Helper Methods ====================

    /// Snake draft: round 1 runs 0..3, round 2 runs 3..0
    fn advance_setup(&mut self, events: &mut Vec<GameEvent>) {
        let GamePhase::Setup { round, .. } = self.phase else {
            return;
        };
        let last_seat = (self.players.len() - 1) as PlayerId;

        let next_round = match round {
            1 if self.current_player < last_seat => {
                self.current_player += 1;
                1
            }
            1 => 2,
            _ if self.current_player > 0 => {
                self.current_player -= 1;
                2
            }
            _ => {
                self.finish_setup(events);
                return;
            }
        };

        self.phase = GamePhase::Setup {
            round: next_round,
            placing: SetupPlacing::Settlement,
        };
    }

    /// Hand out round-2 starting resources and start the first turn
    fn finish_setup(&mut self, events: &mut Vec<GameEvent>) {
        let mut starting_resources = Vec::with_capacity(self.players.len());
        for (seat, vertex) in self.second_settlements.iter().enumerate() {
            let Some(vertex) = *vertex else {
                continue;
            };
            let hand = self.board.adjacent_resources(vertex);
            if let Some(player) = self.players.get_mut(seat) {
                player.resources.add_hand(&hand);
                starting_resources.push((player.id, hand));
            }
        }

        self.current_player = 0;
        self.turn_number = 1;
        self.phase = GamePhase::Roll;
        info!("setup complete");
        events.push(GameEvent::SetupCompleted { starting_resources });
    }

    /// After any build: longest road, victory points, then the win check
    fn settle_scores(&mut self, events: &mut Vec<GameEvent>) {
        events.extend(self.refresh_longest_road());
        for player in &mut self.players {
            player.recompute_victory_points();
        }
        events.extend(self.check_win_condition());
    }

    /// Reassign the Longest Road bonus.
    ///
    /// The strict leader at or above the minimum takes it. A tie at the top
    /// keeps the current holder if they are part of it, otherwise nobody holds it.
    fn refresh_longest_road(&mut self) -> Vec<GameEvent> {
        let lengths: Vec<u32> = self
            .players
            .iter()
            .map(|p| self.board.longest_road(p.id))
            .collect();
        let longest = lengths.iter().copied().max().unwrap_or(0);
        let current_holder = self.longest_road_holder();

        let new_holder = if longest < MIN_LONGEST_ROAD {
            None
        } else {
            let leaders: Vec<PlayerId> = self
                .players
                .iter()
                .zip(&lengths)
                .filter(|(_, length)| **length == longest)
                .map(|(p, _)| p.id)
                .collect();
            match leaders.as_slice() {
                [only] => Some(*only),
                tied if current_holder.is_some_and(|h| tied.contains(&h)) => current_holder,
                _ => None,
            }
        };

        if new_holder == current_holder {
            return Vec::new();
        }

        for player in &mut self.players {
            player.has_longest_road = Some(player.id) == new_holder;
        }
        info!(
            previous = ?current_holder,
            current = ?new_holder,
            length = longest,
            "longest road changed"
        );

        vec![GameEvent::LongestRoadChanged {
            previous: current_holder,
            current: new_holder,
            length: longest,
        }]
    }

    /// Any seat at the threshold wins, the acting seat first
    fn check_win_condition(&mut self) -> Vec<GameEvent> {
        let count = self.players.len();
        let winner = (0..count)
            .map(|offset| &self.players[(self.current_player as usize + offset) % count])
            .find(|p| p.victory_points() >= self.config.victory_points_to_win)
            .map(|p| (p.id, p.victory_points()));

        match winner {
            Some((player, victory_points)) => {
                self.phase = GamePhase::Finished { winner: player };
                info!(player, victory_points, turn = self.turn_number, "game won");
                vec![GameEvent::GameWon {
                    player,
                    victory_points,
                }]
            }
            None => Vec::new(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new_standard()
    }
}
