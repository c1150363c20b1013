//! Plays one all-AI game to completion.

use anyhow::{bail, Result};
use serde::Serialize;
use settlers_core::{Bot, GameConfig, GameState, PlayerId};
use tracing::{debug, info};

/// Outcome of a single simulated game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    pub seed: u64,
    pub winner: Option<PlayerId>,
    /// Seat turns played, counting from the first roll
    pub turns: u32,
    pub victory_points: Vec<u32>,
    pub longest_road_holder: Option<PlayerId>,
}

impl GameRecord {
    pub fn finished(&self) -> bool {
        self.winner.is_some()
    }
}

/// Play a seeded game with a bot in every seat, stopping after `max_turns` seat turns
pub fn play_game(seed: u64, max_turns: u32) -> Result<GameRecord> {
    let mut game = GameState::new(GameConfig::seeded(seed).all_ai());
    let mut bots: Vec<Bot> = game
        .players
        .iter()
        .map(|p| Bot::with_seed(p.id, seed.wrapping_mul(31).wrapping_add(p.id as u64)))
        .collect();

    while !game.is_finished() && game.turn_number <= max_turns {
        let seat = game.current_player;
        let Some(bot) = bots.get_mut(seat as usize) else {
            bail!("no bot for seat {seat}");
        };
        let events = bot.play(&mut game);
        if events.is_empty() {
            bail!("seat {seat} made no progress on turn {} of game {seed}", game.turn_number);
        }
        debug!(seed, seat, events = events.len(), "seat played");
    }

    let record = GameRecord {
        seed,
        winner: game.winner(),
        turns: game.turn_number,
        victory_points: game.players.iter().map(|p| p.victory_points()).collect(),
        longest_road_holder: game.longest_road_holder(),
    };
    info!(seed, winner = ?record.winner, turns = record.turns, "game finished");
    Ok(record)
}
