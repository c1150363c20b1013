//! AI players.
//!
//! A `Bot` scores every legal candidate for the decision in front of it and
//! takes the best one. Scores combine the roll-probability weight of the
//! tiles a spot touches, how many resource kinds it covers, and a small random
//! jitter so bots on the same board don't all play alike.
//!
//! On its own turn a bot makes at most one bank trade, then builds a city, a
//! settlement, and up to two roads as far as its hand allows, then ends the turn.

use crate::actions::{GameAction, GameEvent};
use crate::board::{EdgeId, PlayerId, Resource, VertexBuilding, VertexId};
use crate::game::{GamePhase, GameState, SetupPlacing, BANK_TRADE_RATE};
use crate::player::{costs, ResourceHand};
use rand::prelude::*;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Most roads a bot builds in one turn
const ROADS_PER_TURN: u32 = 2;

/// Upper bound on actions in one `play` call
const MAX_DECISIONS: usize = 64;

/// Upper bound (exclusive) of the random jitter added to every score
const JITTER: f64 = 2.0;

/// A bot player that can decide on actions
#[derive(Debug, Clone)]
pub struct Bot {
    pub player_id: PlayerId,
    rng: StdRng,
    /// Turn the counters below belong to
    turn_seen: Option<u32>,
    traded_this_turn: bool,
    roads_this_turn: u32,
}

impl Bot {
    pub fn new(player_id: PlayerId) -> Self {
        Self::with_rng(player_id, StdRng::from_entropy())
    }

    pub fn with_seed(player_id: PlayerId, seed: u64) -> Self {
        Self::with_rng(player_id, StdRng::seed_from_u64(seed))
    }

    fn with_rng(player_id: PlayerId, rng: StdRng) -> Self {
        Self {
            player_id,
            rng,
            turn_seen: None,
            traded_this_turn: false,
            roads_this_turn: 0,
        }
    }

    /// Decide and commit: act until control leaves this seat or the game ends.
    pub fn play(&mut self, game: &mut GameState) -> Vec<GameEvent> {
        let mut events = Vec::new();

        for _ in 0..MAX_DECISIONS {
            if game.is_finished() || game.current_player != self.player_id {
                break;
            }
            let Some(action) = self.choose_action(game) else {
                break;
            };
            let produced = game.apply_action(self.player_id, action);
            if produced.is_empty() {
                warn!(player = self.player_id, ?action, "bot action was rejected");
                break;
            }
            events.extend(produced);
        }

        events
    }

    /// Choose the next action at the current decision point
    pub fn choose_action(&mut self, game: &GameState) -> Option<GameAction> {
        let me = self.player_id;
        if game.is_finished() || game.current_player != me {
            return None;
        }

        if self.turn_seen != Some(game.turn_number) {
            self.turn_seen = Some(game.turn_number);
            self.traded_this_turn = false;
            self.roads_this_turn = 0;
        }

        let action = match game.phase {
            GamePhase::Setup {
                placing: SetupPlacing::Settlement,
                ..
            } => self
                .best_settlement(game, &game.legal_settlement_sites(me), 3.0)
                .map(GameAction::PlaceSettlement),
            GamePhase::Setup {
                placing: SetupPlacing::Road,
                ..
            } => self
                .best_road(game, &game.legal_road_sites(me, None))
                .map(GameAction::PlaceRoad),
            GamePhase::Roll => Some(GameAction::RollDice),
            GamePhase::Build => Some(self.choose_build(game)),
            GamePhase::Finished { .. } => None,
        };

        debug!(player = me, ?action, "bot decided");
        action
    }

    /// Main-phase priority: trade, city, settlement, road, end turn
    fn choose_build(&mut self, game: &GameState) -> GameAction {
        let me = self.player_id;

        if !self.traded_this_turn {
            if let Some(trade) = self.plan_trade(game) {
                if game.validate(me, &trade).is_ok() {
                    self.traded_this_turn = true;
                    return trade;
                }
            }
        }

        let cities = self.affordable(game, game.legal_city_sites(me), GameAction::PlaceCity);
        if let Some(vertex) = pick_best(&cities, |&v| game.board.vertex_pips(v) as f64) {
            return GameAction::PlaceCity(vertex);
        }

        let settlements =
            self.affordable(game, game.legal_settlement_sites(me), GameAction::PlaceSettlement);
        if let Some(vertex) = self.best_settlement(game, &settlements, 2.0) {
            return GameAction::PlaceSettlement(vertex);
        }

        if self.roads_this_turn < ROADS_PER_TURN {
            let roads =
                self.affordable(game, game.legal_road_sites(me, None), GameAction::PlaceRoad);
            if let Some(edge) = self.best_road(game, &roads) {
                self.roads_this_turn += 1;
                return GameAction::PlaceRoad(edge);
            }
        }

        GameAction::EndTurn
    }

    /// Keep only the sites the game would accept right now
    fn affordable<T: Copy>(
        &self,
        game: &GameState,
        sites: Vec<T>,
        action: impl Fn(T) -> GameAction,
    ) -> Vec<T> {
        sites
            .into_iter()
            .filter(|&site| game.validate(self.player_id, &action(site)).is_ok())
            .collect()
    }

    /// Pick a 4:1 bank trade toward the most valuable purchase within reach.
    ///
    /// Purchases are weighed city, settlement, road. The first one that is
    /// short of something decides the trade: ask for the resource with the
    /// smallest shortfall, and give one held in surplus of that purchase's own
    /// needs, or failing that any other resource held four times over.
    pub fn plan_trade(&self, game: &GameState) -> Option<GameAction> {
        let me = self.player_id;
        let player = game.get_player(me)?;
        let hand = &player.resources;

        let purchases = [
            (costs::city(), player.has_city_piece() && !game.legal_city_sites(me).is_empty()),
            (
                costs::settlement(),
                player.has_settlement_piece() && !game.legal_settlement_sites(me).is_empty(),
            ),
            (costs::road(), player.has_road_piece() && !game.legal_road_sites(me, None).is_empty()),
        ];
        let (cost, missing) = purchases
            .iter()
            .filter(|(_, possible)| *possible)
            .map(|(cost, _)| (cost, hand.shortfall(cost)))
            .find(|(_, missing)| !missing.is_empty())?;

        // Nothing to trade for if a more valuable purchase is already affordable
        let affordable_first = purchases
            .iter()
            .filter(|(_, possible)| *possible)
            .take_while(|(c, _)| c != cost)
            .any(|(c, _)| hand.can_afford(c));
        if affordable_first {
            return None;
        }

        let want = missing.iter().min_by_key(|&(_, amount)| amount)?.0;
        let give = surplus(hand, cost, want).or_else(|| {
            Resource::ALL
                .into_iter()
                .find(|&r| r != want && hand.get(r) >= BANK_TRADE_RATE)
        })?;

        Some(GameAction::BankTrade { give, want })
    }

    // ==================== Scoring ====================

    /// Best settlement site: pips, plus `kind_weight` per distinct resource, plus jitter
    fn best_settlement(
        &mut self,
        game: &GameState,
        sites: &[VertexId],
        kind_weight: f64,
    ) -> Option<VertexId> {
        let scored: Vec<(VertexId, f64)> = sites
            .iter()
            .map(|&v| {
                let kinds: HashSet<Resource> =
                    game.board.tiles_at_vertex(v).filter_map(|t| t.resource()).collect();
                let score = game.board.vertex_pips(v) as f64
                    + kinds.len() as f64 * kind_weight
                    + self.jitter();
                (v, score)
            })
            .collect();
        pick_best(&scored, |&(_, score)| score).map(|(v, _)| v)
    }

    /// Best road: jitter plus half the pips of each open building spot it reaches
    fn best_road(&mut self, game: &GameState, edges: &[EdgeId]) -> Option<EdgeId> {
        let scored: Vec<(EdgeId, f64)> = edges
            .iter()
            .filter_map(|&e| game.board.edge(e))
            .map(|edge| {
                let reach: f64 = edge
                    .endpoints
                    .iter()
                    .filter(|&&v| {
                        game.board.building_at(v) == VertexBuilding::Empty
                            && game.board.satisfies_distance_rule(v)
                    })
                    .map(|&v| 0.5 * game.board.vertex_pips(v) as f64)
                    .sum();
                (edge.id, reach + self.jitter())
            })
            .collect();
        pick_best(&scored, |&(_, score)| score).map(|(e, _)| e)
    }

    fn jitter(&mut self) -> f64 {
        self.rng.gen::<f64>() * JITTER
    }
}

/// A resource other than `want` held at the bank rate on top of what `cost` needs
fn surplus(hand: &ResourceHand, cost: &ResourceHand, want: Resource) -> Option<Resource> {
    Resource::ALL
        .into_iter()
        .find(|&r| r != want && hand.get(r) >= BANK_TRADE_RATE + cost.get(r))
}

/// Highest-scoring item; the earliest wins ties
fn pick_best<T: Copy>(items: &[T], score: impl Fn(&T) -> f64) -> Option<T> {
    let mut best: Option<(T, f64)> = None;
    for item in items {
        let value = score(item);
        if best.map_or(true, |(_, top)| value > top) {
            best = Some((*item, value));
        }
    }
    best.map(|(item, _)| item)
}
