//! Game actions that players can take.
//!
//! This module defines the command vocabulary accepted by `GameState::apply_action`
//! and the events that result from those commands.

use crate::board::{EdgeId, PlayerId, Resource, TileId, VertexId};
use crate::player::ResourceHand;
use serde::{Deserialize, Serialize};

/// All possible actions a player can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    // ==================== Placement ====================
    /// Place a settlement (free during setup)
    PlaceSettlement(VertexId),
    /// Place a road (free during setup, where it must touch the settlement just placed)
    PlaceRoad(EdgeId),
    /// Upgrade one of your settlements to a city
    PlaceCity(VertexId),

    // ==================== Turn Actions ====================
    /// Roll the dice (must be done at start of turn)
    RollDice,
    /// Trade four of one resource to the bank for one of another
    BankTrade { give: Resource, want: Resource },
    /// End your turn
    EndTurn,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        roll: (u8, u8),
        total: u8,
    },

    /// Resources were distributed after a dice roll
    ResourcesDistributed {
        distributions: Vec<(PlayerId, Resource, u32)>,
    },

    /// A player lost half their hand to a seven
    CardsDiscarded {
        player: PlayerId,
        cards: ResourceHand,
    },

    /// The robber was moved
    RobberMoved { from: TileId, to: TileId },

    /// A settlement was built
    SettlementBuilt { player: PlayerId, location: VertexId },

    /// A settlement was upgraded to a city
    CityBuilt { player: PlayerId, location: VertexId },

    /// A road was built
    RoadBuilt { player: PlayerId, location: EdgeId },

    /// Bank trade completed
    BankTradeCompleted {
        player: PlayerId,
        gave: Resource,
        gave_count: u32,
        received: Resource,
    },

    /// Longest road changed hands
    LongestRoadChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        length: u32,
    },

    /// Setup finished and each player received their starting resources
    SetupCompleted { starting_resources: Vec<(PlayerId, ResourceHand)> },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// A player won the game
    GameWon {
        player: PlayerId,
        victory_points: u32,
    },
}
