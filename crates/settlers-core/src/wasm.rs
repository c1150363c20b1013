//! WebAssembly bindings for the settlers engine.
//!
//! This module exposes the engine to a JavaScript presentation layer through
//! wasm-bindgen. Structured values cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::actions::GameAction;
use crate::board::Resource;
use crate::bot::Bot;
use crate::game::{GameConfig, GameState};

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_json<T: serde::Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}

fn parse_resource(name: &str) -> Result<Resource, JsValue> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|e| JsValue::from_str(&format!("Unknown resource {name}: {e}")))
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
    bots: Vec<Bot>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game. `config_json` may be empty for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmGame, JsValue> {
        let config: GameConfig = if config_json.trim().is_empty() {
            GameConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?
        };

        let state = GameState::new(config);
        let bots = state
            .players
            .iter()
            .map(|p| match state.config.seed {
                Some(seed) => Bot::with_seed(p.id, seed.wrapping_add(p.id as u64 + 1)),
                None => Bot::new(p.id),
            })
            .collect();

        Ok(WasmGame { state, bots })
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        to_json(&self.state, "{}")
    }

    /// Board snapshot for drawing and hit-testing
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> String {
        to_json(&self.state.board.to_snapshot(), "{}")
    }

    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> u8 {
        self.state.current_player
    }

    #[wasm_bindgen(js_name = getPhase)]
    pub fn get_phase(&self) -> String {
        to_json(&self.state.phase, "null")
    }

    #[wasm_bindgen(js_name = getDiceRoll)]
    pub fn get_dice_roll(&self) -> Option<Vec<u8>> {
        self.state.dice_roll.map(|(a, b)| vec![a, b])
    }

    // ==================== Legality Queries ====================

    #[wasm_bindgen(js_name = legalSettlementSites)]
    pub fn legal_settlement_sites(&self, player: u8) -> Vec<usize> {
        self.state.legal_settlement_sites(player)
    }

    #[wasm_bindgen(js_name = legalRoadSites)]
    pub fn legal_road_sites(&self, player: u8, from: Option<usize>) -> Vec<usize> {
        self.state.legal_road_sites(player, from)
    }

    #[wasm_bindgen(js_name = legalCitySites)]
    pub fn legal_city_sites(&self, player: u8) -> Vec<usize> {
        self.state.legal_city_sites(player)
    }

    #[wasm_bindgen(js_name = getValidActions)]
    pub fn get_valid_actions(&self, player: u8) -> String {
        to_json(&self.state.valid_actions(player), "[]")
    }

    // ==================== Commands ====================
    //
    // Each returns the produced events as JSON; "[]" means the command was refused.

    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, player: u8, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {e}")))?;
        Ok(to_json(&self.state.apply_action(player, action), "[]"))
    }

    #[wasm_bindgen(js_name = placeSettlement)]
    pub fn place_settlement(&mut self, vertex: usize, player: u8) -> String {
        to_json(&self.state.place_settlement(vertex, player), "[]")
    }

    #[wasm_bindgen(js_name = placeRoad)]
    pub fn place_road(&mut self, edge: usize, player: u8) -> String {
        to_json(&self.state.place_road(edge, player), "[]")
    }

    #[wasm_bindgen(js_name = placeCity)]
    pub fn place_city(&mut self, vertex: usize, player: u8) -> String {
        to_json(&self.state.place_city(vertex, player), "[]")
    }

    #[wasm_bindgen(js_name = rollDice)]
    pub fn roll_dice(&mut self) -> String {
        to_json(&self.state.roll_dice(), "[]")
    }

    #[wasm_bindgen(js_name = bankTrade)]
    pub fn bank_trade(&mut self, player: u8, give: &str, want: &str) -> Result<String, JsValue> {
        let give = parse_resource(give)?;
        let want = parse_resource(want)?;
        Ok(to_json(&self.state.bank_trade(player, give, want), "[]"))
    }

    #[wasm_bindgen(js_name = endTurn)]
    pub fn end_turn(&mut self) -> String {
        to_json(&self.state.end_turn(), "[]")
    }

    /// Let the bot in `player`'s seat take its whole turn
    #[wasm_bindgen(js_name = runBot)]
    pub fn run_bot(&mut self, player: u8) -> String {
        if self.state.is_human(player) {
            return "[]".to_string();
        }
        match self.bots.get_mut(player as usize) {
            Some(bot) => to_json(&bot.play(&mut self.state), "[]"),
            None => "[]".to_string(),
        }
    }

    // ==================== Derived State ====================

    #[wasm_bindgen(js_name = getVictoryPoints)]
    pub fn get_victory_points(&self, player: u8) -> u32 {
        self.state.victory_points(player)
    }

    #[wasm_bindgen(js_name = getResources)]
    pub fn get_resources(&self, player: u8) -> String {
        to_json(&self.state.resources(player), "null")
    }

    #[wasm_bindgen(js_name = getPlayer)]
    pub fn get_player(&self, player: u8) -> String {
        to_json(&self.state.get_player(player), "null")
    }

    #[wasm_bindgen(js_name = longestRoadHolder)]
    pub fn longest_road_holder(&self) -> Option<u8> {
        self.state.longest_road_holder()
    }

    #[wasm_bindgen(js_name = largestArmyHolder)]
    pub fn largest_army_holder(&self) -> Option<u8> {
        self.state.largest_army_holder()
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<u8> {
        self.state.winner()
    }
}
