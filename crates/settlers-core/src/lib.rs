//! settlers-core - rules engine for a four-seat Catan-style territory game
//!
//! This crate provides the core game logic, including:
//! - Hex geometry for the 3/4/5/4/3 board
//! - Board generation and the shared-corner vertex/edge graph
//! - Placement rules, dice production, and the robber
//! - Longest road calculation
//! - Game state machine with full rule enforcement
//! - Heuristic AI players
//!
//! # Architecture
//!
//! The engine is platform-agnostic and does no drawing. It can be compiled to:
//! - Native Rust, as used by the `settlers-sim` simulator
//! - WebAssembly for a browser presentation layer (feature `wasm`)
//!
//! # Modules
//!
//! - [`hex`]: Row layout, hex centres, and quantized corner keys
//! - [`board`]: Tiles, vertices, edges, and board-level rules
//! - [`player`]: Player state and resources
//! - [`actions`]: Commands and the events they produce
//! - [`game`]: Game state machine
//! - [`bot`]: AI decision engine

pub mod actions;
pub mod board;
pub mod bot;
pub mod game;
pub mod hex;
pub mod player;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use board::{
    Board, BoardSnapshot, Edge, EdgeBuilding, EdgeId, PlayerId, Resource, Terrain, Tile, TileId,
    Vertex, VertexBuilding, VertexId,
};
pub use bot::Bot;
pub use game::{GameConfig, GamePhase, GameState, Rejection, SetupPlacing};
pub use hex::{HexPosition, PointKey};
pub use player::{costs, Player, ResourceHand};
