//! Player state and resource management.
//!
//! This module contains:
//! - ResourceHand for managing resource counts
//! - Building costs
//! - Player struct with piece counters, bonus flags, and victory points

use crate::board::{PlayerId, Resource};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Settlements a player may have on the board at once
pub const MAX_SETTLEMENTS: u32 = 5;

/// Cities a player may have on the board
pub const MAX_CITIES: u32 = 4;

/// Roads a player may build
pub const MAX_ROADS: u32 = 15;

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub lumber: u32,
    pub ore: u32,
    pub grain: u32,
    pub wool: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(brick: u32, lumber: u32, ore: u32, grain: u32, wool: u32) -> Self {
        Self {
            brick,
            lumber,
            ore,
            grain,
            wool,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.brick + self.lumber + self.ore + self.grain + self.wool
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Lumber => self.lumber,
            Resource::Ore => self.ore,
            Resource::Grain => self.grain,
            Resource::Wool => self.wool,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        match resource {
            Resource::Brick => self.brick = count,
            Resource::Lumber => self.lumber = count,
            Resource::Ore => self.ore = count,
            Resource::Grain => self.grain = count,
            Resource::Wool => self.wool = count,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        self.set(resource, self.get(resource) + amount);
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for (resource, amount) in other.iter() {
            self.add(resource, amount);
        }
    }

    /// Non-zero entries in `Resource::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL
            .into_iter()
            .map(|r| (r, self.get(r)))
            .filter(|(_, amount)| *amount > 0)
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.into_iter().all(|r| self.get(r) >= cost.get(r))
    }

    /// Subtract a cost. Returns false and leaves the hand untouched if it is insufficient.
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (resource, amount) in cost.iter() {
            self.set(resource, self.get(resource) - amount);
        }
        true
    }

    /// What is still missing to pay `cost`
    pub fn shortfall(&self, cost: &ResourceHand) -> ResourceHand {
        let mut missing = ResourceHand::new();
        for (resource, amount) in cost.iter() {
            missing.set(resource, amount.saturating_sub(self.get(resource)));
        }
        missing
    }

    /// Throw away one card of a uniformly chosen held kind
    pub fn discard_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Resource> {
        let held: Vec<Resource> = self.iter().map(|(r, _)| r).collect();
        let resource = *held.choose(rng)?;
        self.set(resource, self.get(resource) - 1);
        Some(resource)
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 brick, 1 lumber
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 brick, 1 lumber, 1 grain, 1 wool
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 1, 1)
    }

    /// Cost to upgrade to city: 3 ore, 2 grain
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 3, 2, 0)
    }
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Seat (0-3)
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Current resources
    pub resources: ResourceHand,
    /// Settlements currently on the board
    pub settlements: u32,
    /// Cities on the board
    pub cities: u32,
    /// Roads on the board
    pub roads: u32,
    /// Whether this player holds the Longest Road bonus
    pub has_longest_road: bool,
    /// Whether this player holds the Largest Army bonus
    pub has_largest_army: bool,
    victory_points: u32,
}

impl Player {
    /// Create a new player
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            resources: ResourceHand::new(),
            settlements: 0,
            cities: 0,
            roads: 0,
            has_longest_road: false,
            has_largest_army: false,
            victory_points: 0,
        }
    }

    /// Victory points as of the last recomputation
    pub fn victory_points(&self) -> u32 {
        self.victory_points
    }

    /// Recompute victory points from buildings and bonus flags
    pub fn recompute_victory_points(&mut self) -> u32 {
        let mut vp = self.settlements + self.cities * 2;
        if self.has_longest_road {
            vp += 2;
        }
        if self.has_largest_army {
            vp += 2;
        }
        self.victory_points = vp;
        vp
    }

    pub fn has_road_piece(&self) -> bool {
        self.roads < MAX_ROADS
    }

    pub fn has_settlement_piece(&self) -> bool {
        self.settlements < MAX_SETTLEMENTS
    }

    pub fn has_city_piece(&self) -> bool {
        self.cities < MAX_CITIES
    }

    /// Can this player afford a road?
    pub fn can_afford_road(&self) -> bool {
        self.resources.can_afford(&costs::road()) && self.has_road_piece()
    }

    /// Can this player afford a settlement?
    pub fn can_afford_settlement(&self) -> bool {
        self.resources.can_afford(&costs::settlement()) && self.has_settlement_piece()
    }

    /// Can this player afford a city upgrade?
    pub fn can_afford_city(&self) -> bool {
        self.resources.can_afford(&costs::city()) && self.has_city_piece()
    }
}
