//! Game board: tiles, the shared-corner graph, and board-level rules.
//!
//! This module contains:
//! - Resource and terrain types
//! - Board generation (terrain and number shuffles, robber start)
//! - The graph builder that merges coincident corners into vertices and
//!   shared sides into edges
//! - Placement queries (distance and connectivity rules)
//! - Resource production for a roll
//! - Longest road calculation
//! - A read-only snapshot for the presentation layer
//!
//! Tiles, vertices, and edges live in three flat arenas and refer to each
//! other only through `TileId`, `VertexId`, and `EdgeId` indices.

use crate::hex::{tile_count, HexPosition, PointKey};
use crate::player::ResourceHand;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Player identifier (0-3 for a 4-player game)
pub type PlayerId = u8;

/// Index into `Board::tiles`
pub type TileId = usize;

/// Index into `Board::vertices`
pub type VertexId = usize;

/// Index into `Board::edges`
pub type EdgeId = usize;

/// Dice total that triggers the robber instead of production
pub const ROBBER_ROLL: u8 = 7;

/// Shortest road chain that can hold the Longest Road bonus
pub const MIN_LONGEST_ROAD: u32 = 5;

/// Number tokens placed on the 18 producing tiles
pub const NUMBER_TOKENS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// The five resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Lumber,
        Resource::Ore,
        Resource::Grain,
        Resource::Wool,
    ];
}

/// Terrain of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Forest,
    Hills,
    Mountains,
    Fields,
    Pasture,
    /// Produces nothing and starts with the robber
    Desert,
}

impl Terrain {
    /// How many tiles of each terrain a standard board has
    pub const STANDARD_COUNTS: [(Terrain, usize); 6] = [
        (Terrain::Forest, 4),
        (Terrain::Hills, 3),
        (Terrain::Mountains, 3),
        (Terrain::Fields, 4),
        (Terrain::Pasture, 4),
        (Terrain::Desert, 1),
    ];

    /// Resource this terrain produces
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Terrain::Forest => Some(Resource::Lumber),
            Terrain::Hills => Some(Resource::Brick),
            Terrain::Mountains => Some(Resource::Ore),
            Terrain::Fields => Some(Resource::Grain),
            Terrain::Pasture => Some(Resource::Wool),
            Terrain::Desert => None,
        }
    }
}

/// Roll-probability proxy: number of dice combinations out of 36 that produce `number`
pub fn pips(number: u8) -> u32 {
    6u32.saturating_sub((7 - number as i32).unsigned_abs())
}

/// A hex tile on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub position: HexPosition,
    /// Pixel centre
    pub center: (f64, f64),
    pub terrain: Terrain,
    /// Production number (None for the desert)
    pub number: Option<u8>,
    pub has_robber: bool,
    /// Corner vertices, clockwise from the upper-right corner
    pub vertices: [VertexId; 6],
    /// Side `i` joins `vertices[i]` and `vertices[(i + 1) % 6]`
    pub edges: [EdgeId; 6],
}

impl Tile {
    /// Resource produced by this tile
    pub fn resource(&self) -> Option<Resource> {
        self.terrain.resource()
    }

    /// Probability weight of this tile's number, 0 for the desert
    pub fn pips(&self) -> u32 {
        self.number.map(pips).unwrap_or(0)
    }
}

/// Building on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VertexBuilding {
    #[default]
    Empty,
    Settlement(PlayerId),
    City(PlayerId),
}

impl VertexBuilding {
    /// Owner of the building, if any
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            VertexBuilding::Empty => None,
            VertexBuilding::Settlement(p) | VertexBuilding::City(p) => Some(*p),
        }
    }

    /// Resource units produced per matching roll
    pub fn resource_multiplier(&self) -> u32 {
        match self {
            VertexBuilding::Empty => 0,
            VertexBuilding::Settlement(_) => 1,
            VertexBuilding::City(_) => 2,
        }
    }

    fn is_foreign_to(&self, player: PlayerId) -> bool {
        matches!(self.owner(), Some(owner) if owner != player)
    }
}

/// Road on an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeBuilding {
    #[default]
    Empty,
    Road(PlayerId),
}

impl EdgeBuilding {
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            EdgeBuilding::Empty => None,
            EdgeBuilding::Road(p) => Some(*p),
        }
    }
}

/// A shared corner of up to three tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    /// Pixel position, used for hit-testing
    pub position: (f64, f64),
    pub building: VertexBuilding,
    pub tiles: Vec<TileId>,
    pub neighbors: Vec<VertexId>,
    pub edges: Vec<EdgeId>,
}

/// A shared side between two vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub endpoints: [VertexId; 2],
    pub road: EdgeBuilding,
}

impl Edge {
    /// The endpoint that is not `vertex`
    pub fn other_endpoint(&self, vertex: VertexId) -> VertexId {
        if self.endpoints[0] == vertex {
            self.endpoints[1]
        } else {
            self.endpoints[0]
        }
    }

    pub fn touches(&self, vertex: VertexId) -> bool {
        self.endpoints.contains(&vertex)
    }
}

/// The complete board: tile, vertex, and edge arenas plus the robber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    tiles: Vec<Tile>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    robber: TileId,
}

impl Board {
    /// Create a standard randomized board
    pub fn standard() -> Self {
        Self::standard_with_rng(&mut rand::thread_rng())
    }

    /// Create a standard board, shuffling terrains and numbers with `rng`
    pub fn standard_with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut terrains: Vec<Terrain> = Terrain::STANDARD_COUNTS
            .iter()
            .flat_map(|&(terrain, count)| std::iter::repeat(terrain).take(count))
            .collect();
        terrains.shuffle(rng);

        let mut numbers = NUMBER_TOKENS.to_vec();
        numbers.shuffle(rng);

        // Zip positionally; the desert is skipped when handing out numbers
        let mut tokens = numbers.into_iter();
        let layout: Vec<(Terrain, Option<u8>)> = terrains
            .into_iter()
            .map(|terrain| match terrain {
                Terrain::Desert => (terrain, None),
                _ => (terrain, tokens.next()),
            })
            .collect();

        Self::build(&layout)
    }

    /// Build a board from an explicit terrain/number list in row-major tile order.
    ///
    /// Returns `None` unless the list has exactly one entry per layout position.
    /// The robber starts on the first desert, or on tile 0 if there is none.
    pub fn from_layout(layout: &[(Terrain, Option<u8>)]) -> Option<Self> {
        if layout.len() != tile_count() {
            tracing::debug!(len = layout.len(), "layout rejected");
            return None;
        }
        Some(Self::build(layout))
    }

    /// Build the tile, vertex, and edge arenas for a full-length layout
    fn build(layout: &[(Terrain, Option<u8>)]) -> Self {
        let positions = HexPosition::all();
        let robber = layout
            .iter()
            .position(|(terrain, _)| *terrain == Terrain::Desert)
            .unwrap_or(0);

        let mut board = Board {
            tiles: Vec::with_capacity(layout.len()),
            vertices: Vec::new(),
            edges: Vec::new(),
            robber,
        };

        let mut vertex_index: HashMap<PointKey, VertexId> = HashMap::new();
        let mut edge_index: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();

        for (id, (position, &(terrain, number))) in positions.iter().zip(layout).enumerate() {
            let corners = position.corners();
            let vertices: [VertexId; 6] = std::array::from_fn(|i| {
                board.intern_vertex(&mut vertex_index, corners[i], id)
            });
            let edges: [EdgeId; 6] = std::array::from_fn(|i| {
                board.intern_edge(&mut edge_index, vertices[i], vertices[(i + 1) % 6])
            });

            board.tiles.push(Tile {
                id,
                position: *position,
                center: position.center(),
                terrain,
                number,
                has_robber: id == robber,
                vertices,
                edges,
            });
        }

        tracing::debug!(
            tiles = board.tiles.len(),
            vertices = board.vertices.len(),
            edges = board.edges.len(),
            "board graph built"
        );
        board
    }

    /// Look up or insert the vertex at `point`, and record `tile` on it
    fn intern_vertex(
        &mut self,
        index: &mut HashMap<PointKey, VertexId>,
        point: (f64, f64),
        tile: TileId,
    ) -> VertexId {
        let next_id = self.vertices.len();
        let id = *index.entry(PointKey::quantize(point)).or_insert(next_id);
        if id == next_id {
            self.vertices.push(Vertex {
                id,
                position: point,
                building: VertexBuilding::Empty,
                tiles: Vec::with_capacity(3),
                neighbors: Vec::with_capacity(3),
                edges: Vec::with_capacity(3),
            });
        }
        push_unique(&mut self.vertices[id].tiles, tile);
        id
    }

    /// Look up or insert the edge joining `a` and `b`, wiring up adjacency on first sight
    fn intern_edge(
        &mut self,
        index: &mut HashMap<(VertexId, VertexId), EdgeId>,
        a: VertexId,
        b: VertexId,
    ) -> EdgeId {
        let key = (a.min(b), a.max(b));
        if let Some(&id) = index.get(&key) {
            return id;
        }

        let id = self.edges.len();
        self.edges.push(Edge {
            id,
            endpoints: [a, b],
            road: EdgeBuilding::Empty,
        });
        index.insert(key, id);

        push_unique(&mut self.vertices[a].edges, id);
        push_unique(&mut self.vertices[b].edges, id);
        push_unique(&mut self.vertices[a].neighbors, b);
        push_unique(&mut self.vertices[b].neighbors, a);
        id
    }

    // ==================== Query Methods ====================

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Tile currently holding the robber
    pub fn robber_tile(&self) -> TileId {
        self.robber
    }

    /// Building at a vertex (Empty for unknown ids)
    pub fn building_at(&self, vertex: VertexId) -> VertexBuilding {
        self.vertices
            .get(vertex)
            .map(|v| v.building)
            .unwrap_or_default()
    }

    /// Road on an edge (Empty for unknown ids)
    pub fn road_at(&self, edge: EdgeId) -> EdgeBuilding {
        self.edges.get(edge).map(|e| e.road).unwrap_or_default()
    }

    /// The edge joining two vertices, if they are neighbours
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.vertices
            .get(a)?
            .edges
            .iter()
            .copied()
            .find(|&e| self.edges[e].touches(b))
    }

    /// Tiles touching a vertex
    pub fn tiles_at_vertex(&self, vertex: VertexId) -> impl Iterator<Item = &Tile> + '_ {
        self.vertices
            .get(vertex)
            .into_iter()
            .flat_map(move |v| v.tiles.iter().map(move |&t| &self.tiles[t]))
    }

    /// Sum of pips over the tiles touching a vertex
    pub fn vertex_pips(&self, vertex: VertexId) -> u32 {
        self.tiles_at_vertex(vertex).map(Tile::pips).sum()
    }

    /// One unit per producing tile touching a vertex
    pub fn adjacent_resources(&self, vertex: VertexId) -> ResourceHand {
        let mut hand = ResourceHand::new();
        for resource in self.tiles_at_vertex(vertex).filter_map(Tile::resource) {
            hand.add(resource, 1);
        }
        hand
    }

    // ==================== Validation Methods ====================

    /// The vertex and all of its neighbours are free of buildings
    pub fn satisfies_distance_rule(&self, vertex: VertexId) -> bool {
        match self.vertices.get(vertex) {
            Some(v) => {
                v.building == VertexBuilding::Empty
                    && v
                        .neighbors
                        .iter()
                        .all(|&n| self.vertices[n].building == VertexBuilding::Empty)
            }
            None => false,
        }
    }

    /// Vertices where `player` may build a settlement.
    ///
    /// During setup any spot meeting the distance rule qualifies; afterwards
    /// the spot must also touch one of the player's roads.
    pub fn valid_settlement_spots(&self, player: PlayerId, is_setup: bool) -> Vec<VertexId> {
        self.vertices
            .iter()
            .filter(|v| self.satisfies_distance_rule(v.id))
            .filter(|v| is_setup || self.touches_own_road(v.id, player, None))
            .map(|v| v.id)
            .collect()
    }

    fn touches_own_road(&self, vertex: VertexId, player: PlayerId, except: Option<EdgeId>) -> bool {
        self.vertices[vertex]
            .edges
            .iter()
            .filter(|&&e| Some(e) != except)
            .any(|&e| self.edges[e].road == EdgeBuilding::Road(player))
    }

    /// Empty edges connected to `player`'s network.
    ///
    /// An endpoint connects through the player's own building, or through one
    /// of their roads unless an opponent has built on that endpoint.
    pub fn valid_road_spots(&self, player: PlayerId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|e| e.road == EdgeBuilding::Empty)
            .filter(|e| {
                e.endpoints.iter().any(|&v| {
                    let building = self.vertices[v].building;
                    building.owner() == Some(player)
                        || (!building.is_foreign_to(player)
                            && self.touches_own_road(v, player, Some(e.id)))
                })
            })
            .map(|e| e.id)
            .collect()
    }

    /// Empty edges incident to one vertex
    pub fn valid_road_spots_from(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.vertices
            .get(vertex)
            .map(|v| {
                v.edges
                    .iter()
                    .copied()
                    .filter(|&e| self.edges[e].road == EdgeBuilding::Empty)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Vertices holding one of `player`'s settlements
    pub fn valid_city_spots(&self, player: PlayerId) -> Vec<VertexId> {
        self.vertices
            .iter()
            .filter(|v| v.building == VertexBuilding::Settlement(player))
            .map(|v| v.id)
            .collect()
    }

    // ==================== Mutation Methods ====================
    //
    // These apply a placement unconditionally; rules are checked by the caller.

    /// Place a settlement
    pub fn place_settlement(&mut self, vertex: VertexId, player: PlayerId) {
        if let Some(v) = self.vertices.get_mut(vertex) {
            debug_assert_eq!(v.building, VertexBuilding::Empty);
            v.building = VertexBuilding::Settlement(player);
        }
    }

    /// Upgrade a settlement to a city
    pub fn upgrade_to_city(&mut self, vertex: VertexId, player: PlayerId) {
        if let Some(v) = self.vertices.get_mut(vertex) {
            debug_assert_eq!(v.building, VertexBuilding::Settlement(player));
            v.building = VertexBuilding::City(player);
        }
    }

    /// Place a road
    pub fn place_road(&mut self, edge: EdgeId, player: PlayerId) {
        if let Some(e) = self.edges.get_mut(edge) {
            debug_assert_eq!(e.road, EdgeBuilding::Empty);
            e.road = EdgeBuilding::Road(player);
        }
    }

    /// Move the robber, keeping the per-tile flags in sync
    pub fn move_robber(&mut self, tile: TileId) {
        if tile >= self.tiles.len() {
            return;
        }
        self.tiles[self.robber].has_robber = false;
        self.tiles[tile].has_robber = true;
        self.robber = tile;
    }

    // ==================== Resource Distribution ====================

    /// Resources each player earns from a dice total.
    ///
    /// Tiles under the robber produce nothing. A seven produces nothing here.
    pub fn resources_for_roll(&self, roll: u8) -> BTreeMap<PlayerId, ResourceHand> {
        let mut result: BTreeMap<PlayerId, ResourceHand> = BTreeMap::new();
        if roll == ROBBER_ROLL {
            return result;
        }

        for tile in &self.tiles {
            if tile.number != Some(roll) || tile.has_robber {
                continue;
            }
            let Some(resource) = tile.resource() else {
                continue;
            };
            for &v in &tile.vertices {
                let building = self.vertices[v].building;
                if let Some(owner) = building.owner() {
                    result
                        .entry(owner)
                        .or_default()
                        .add(resource, building.resource_multiplier());
                }
            }
        }

        result
    }

    // ==================== Longest Road Calculation ====================

    /// Length of `player`'s longest unbroken road chain.
    ///
    /// A chain may not reuse an edge and may not continue through a vertex
    /// with an opponent's building, though it may end there.
    pub fn longest_road(&self, player: PlayerId) -> u32 {
        let owned = |e: EdgeId| self.edges[e].road == EdgeBuilding::Road(player);
        let mut best = 0;
        let mut stack: Vec<RoadTrail> = Vec::new();

        for start in self.edges.iter().filter(|e| owned(e.id)) {
            for end in start.endpoints {
                stack.push(RoadTrail {
                    end,
                    edges: vec![start.id],
                });
            }

            while let Some(trail) = stack.pop() {
                best = best.max(trail.edges.len());
                if self.vertices[trail.end].building.is_foreign_to(player) {
                    continue;
                }
                for &next in &self.vertices[trail.end].edges {
                    if !owned(next) || trail.edges.contains(&next) {
                        continue;
                    }
                    let mut edges = trail.edges.clone();
                    edges.push(next);
                    stack.push(RoadTrail {
                        end: self.edges[next].other_endpoint(trail.end),
                        edges,
                    });
                }
            }
        }

        best as u32
    }

    /// Read-only view for drawing and hit-testing
    pub fn to_snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            tiles: self
                .tiles
                .iter()
                .map(|t| TileView {
                    id: t.id,
                    terrain: t.terrain,
                    number: t.number,
                    has_robber: t.has_robber,
                    center: t.center,
                    vertices: t.vertices,
                })
                .collect(),
            vertices: self
                .vertices
                .iter()
                .map(|v| VertexView {
                    id: v.id,
                    position: v.position,
                    building: v.building,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| EdgeView {
                    id: e.id,
                    endpoints: e.endpoints,
                    road: e.road.owner(),
                })
                .collect(),
            robber: self.robber,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

/// A partial road path during the longest-road search
struct RoadTrail {
    end: VertexId,
    edges: Vec<EdgeId>,
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

/// Serializable board view for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub tiles: Vec<TileView>,
    pub vertices: Vec<VertexView>,
    pub edges: Vec<EdgeView>,
    pub robber: TileId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileView {
    pub id: TileId,
    pub terrain: Terrain,
    pub number: Option<u8>,
    pub has_robber: bool,
    pub center: (f64, f64),
    pub vertices: [VertexId; 6],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexView {
    pub id: VertexId,
    pub position: (f64, f64),
    pub building: VertexBuilding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeView {
    pub id: EdgeId,
    pub endpoints: [VertexId; 2],
    pub road: Option<PlayerId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn seeded_board(seed: u64) -> Board {
        Board::standard_with_rng(&mut StdRng::seed_from_u64(seed))
    }

    /// A simple path of `len` edges starting at `start`, as a vertex list
    fn simple_path(board: &Board, start: VertexId, len: usize) -> Vec<VertexId> {
        fn extend(board: &Board, path: &mut Vec<VertexId>, len: usize) -> bool {
            if path.len() == len + 1 {
                return true;
            }
            let last = *path.last().unwrap();
            for &n in &board.vertex(last).unwrap().neighbors {
                if path.contains(&n) {
                    continue;
                }
                path.push(n);
                if extend(board, path, len) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = vec![start];
        assert!(extend(board, &mut path, len));
        path
    }

    fn build_road_path(board: &mut Board, path: &[VertexId], player: PlayerId) {
        for pair in path.windows(2) {
            let edge = board.edge_between(pair[0], pair[1]).unwrap();
            board.place_road(edge, player);
        }
    }

    #[test]
    fn test_standard_board_has_19_tiles_and_one_desert() {
        let board = seeded_board(1);
        assert_eq!(board.tiles().len(), 19);

        let deserts: Vec<_> = board
            .tiles()
            .iter()
            .filter(|t| t.terrain == Terrain::Desert)
            .collect();
        assert_eq!(deserts.len(), 1);
        assert_eq!(deserts[0].number, None);
        assert!(deserts[0].has_robber);
        assert_eq!(board.robber_tile(), deserts[0].id);
    }

    #[test]
    fn test_standard_board_has_correct_terrain_counts() {
        let board = seeded_board(2);
        for (terrain, count) in Terrain::STANDARD_COUNTS {
            let found = board.tiles().iter().filter(|t| t.terrain == terrain).count();
            assert_eq!(found, count, "wrong count for {terrain:?}");
        }
    }

    #[test]
    fn test_standard_board_has_correct_number_distribution() {
        for seed in 0..20 {
            let board = seeded_board(seed);
            let mut numbers: Vec<u8> = board.tiles().iter().filter_map(|t| t.number).collect();
            numbers.sort_unstable();
            assert_eq!(numbers, NUMBER_TOKENS.to_vec());

            for special in [6, 8] {
                let tiles: Vec<_> = board
                    .tiles()
                    .iter()
                    .filter(|t| t.number == Some(special))
                    .collect();
                assert_eq!(tiles.len(), 2);
                assert!(tiles.iter().all(|t| t.terrain != Terrain::Desert));
            }
            assert!(board.tiles().iter().all(|t| t.number != Some(ROBBER_ROLL)));
        }
    }

    #[test]
    fn test_board_randomization_produces_different_boards() {
        let layouts: HashSet<Vec<(Terrain, Option<u8>)>> = (0..10)
            .map(|seed| {
                seeded_board(seed)
                    .tiles()
                    .iter()
                    .map(|t| (t.terrain, t.number))
                    .collect()
            })
            .collect();
        assert!(layouts.len() > 1);
    }

    #[test]
    fn test_graph_has_54_vertices_and_72_edges() {
        let board = seeded_board(3);
        assert_eq!(board.vertices().len(), 54);
        assert_eq!(board.edges().len(), 72);
    }

    #[test]
    fn test_no_duplicate_vertices() {
        let board = seeded_board(4);
        let keys: HashSet<PointKey> = board
            .vertices()
            .iter()
            .map(|v| PointKey::quantize(v.position))
            .collect();
        assert_eq!(keys.len(), board.vertices().len());

        // Every geometric corner of every tile resolves to the vertex at that point
        for tile in board.tiles() {
            for (i, corner) in tile.position.corners().into_iter().enumerate() {
                let vertex = board.vertex(tile.vertices[i]).unwrap();
                assert_eq!(PointKey::quantize(vertex.position), PointKey::quantize(corner));
                assert!(vertex.tiles.contains(&tile.id));
            }
        }
    }

    #[test]
    fn test_graph_closure_and_symmetry() {
        let board = seeded_board(5);
        for edge in board.edges() {
            let [a, b] = edge.endpoints;
            assert_ne!(a, b);
            assert!(board.vertex(a).unwrap().edges.contains(&edge.id));
            assert!(board.vertex(b).unwrap().edges.contains(&edge.id));
            assert!(board.vertex(a).unwrap().neighbors.contains(&b));
            assert!(board.vertex(b).unwrap().neighbors.contains(&a));
        }
        for vertex in board.vertices() {
            assert!((2..=3).contains(&vertex.neighbors.len()));
            assert_eq!(vertex.neighbors.len(), vertex.edges.len());
            assert!((1..=3).contains(&vertex.tiles.len()));
        }
        for tile in board.tiles() {
            for i in 0..6 {
                let edge = board.edge(tile.edges[i]).unwrap();
                assert!(edge.touches(tile.vertices[i]));
                assert!(edge.touches(tile.vertices[(i + 1) % 6]));
            }
        }
    }

    #[test]
    fn test_distance_rule() {
        let mut board = seeded_board(6);
        let vertex = 10;
        board.place_settlement(vertex, 0);

        assert!(!board.satisfies_distance_rule(vertex));
        for &n in &board.vertex(vertex).unwrap().neighbors.clone() {
            assert!(!board.satisfies_distance_rule(n));
        }
        let spots = board.valid_settlement_spots(1, true);
        assert!(!spots.contains(&vertex));
        assert!(board
            .vertex(vertex)
            .unwrap()
            .neighbors
            .iter()
            .all(|n| !spots.contains(n)));
    }

    #[test]
    fn test_main_phase_settlement_needs_own_road() {
        let mut board = seeded_board(7);
        let path = simple_path(&board, 0, 2);
        board.place_settlement(path[0], 0);
        build_road_path(&mut board, &path, 0);

        let spots = board.valid_settlement_spots(0, false);
        assert_eq!(spots, vec![path[2]]);
        assert!(board.valid_settlement_spots(1, false).is_empty());
    }

    #[test]
    fn test_road_connectivity() {
        let mut board = seeded_board(8);
        let vertex = 20;
        board.place_settlement(vertex, 0);

        let spots = board.valid_road_spots(0);
        let incident = &board.vertex(vertex).unwrap().edges;
        assert_eq!(spots.len(), incident.len());
        assert!(spots.iter().all(|e| incident.contains(e)));

        assert!(board.valid_road_spots(1).is_empty());
    }

    #[test]
    fn test_road_does_not_pass_through_opponent_building() {
        let mut board = seeded_board(9);
        let path = simple_path(&board, 0, 2);
        let first = board.edge_between(path[0], path[1]).unwrap();
        board.place_settlement(path[0], 0);
        board.place_road(first, 0);

        // Opponent builds on the far end of player 0's road
        board.place_settlement(path[1], 1);
        let spots = board.valid_road_spots(0);
        for &e in &board.vertex(path[1]).unwrap().edges {
            if e != first {
                assert!(!spots.contains(&e));
            }
        }
    }

    #[test]
    fn test_valid_road_spots_from_vertex() {
        let mut board = seeded_board(10);
        let vertex = 30;
        let incident = board.vertex(vertex).unwrap().edges.clone();
        assert_eq!(board.valid_road_spots_from(vertex), incident);

        board.place_road(incident[0], 2);
        assert_eq!(board.valid_road_spots_from(vertex), incident[1..].to_vec());
    }

    #[test]
    fn test_city_spots_are_own_settlements() {
        let mut board = seeded_board(11);
        board.place_settlement(0, 0);
        board.place_settlement(40, 1);
        assert_eq!(board.valid_city_spots(0), vec![0]);

        board.upgrade_to_city(0, 0);
        assert!(board.valid_city_spots(0).is_empty());
        assert_eq!(board.building_at(0), VertexBuilding::City(0));
    }

    fn productive_tile(board: &Board) -> Tile {
        board
            .tiles()
            .iter()
            .find(|t| t.number.is_some() && !t.has_robber)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_resource_distribution() {
        let mut board = seeded_board(12);
        let tile = productive_tile(&board);
        let resource = tile.resource().unwrap();
        board.place_settlement(tile.vertices[0], 0);

        let result = board.resources_for_roll(tile.number.unwrap());
        assert!(result[&0].get(resource) >= 1);
    }

    #[test]
    fn test_production_matches_buildings_on_rolled_tiles() {
        let mut board = seeded_board(13);
        board.place_settlement(0, 0);
        board.place_settlement(16, 1);
        board.upgrade_to_city(16, 1);
        board.place_settlement(33, 2);

        for roll in (2..=12).filter(|&r| r != ROBBER_ROLL) {
            let mut expected: BTreeMap<PlayerId, ResourceHand> = BTreeMap::new();
            for tile in board.tiles() {
                if tile.number != Some(roll) || tile.has_robber {
                    continue;
                }
                for &v in &tile.vertices {
                    let building = board.building_at(v);
                    if let (Some(owner), Some(resource)) = (building.owner(), tile.resource()) {
                        expected
                            .entry(owner)
                            .or_default()
                            .add(resource, building.resource_multiplier());
                    }
                }
            }
            assert_eq!(board.resources_for_roll(roll), expected);
        }
    }

    #[test]
    fn test_city_gives_double_resources() {
        let mut board = seeded_board(14);
        let tile = productive_tile(&board);
        let resource = tile.resource().unwrap();
        let vertex = tile.vertices[0];
        board.place_settlement(vertex, 0);
        let single = board.resources_for_roll(tile.number.unwrap())[&0].get(resource);

        board.upgrade_to_city(vertex, 0);
        let double = board.resources_for_roll(tile.number.unwrap())[&0].get(resource);
        assert_eq!(double, single * 2);
    }

    #[test]
    fn test_robber_blocks_production() {
        let mut board = seeded_board(15);
        let tile = productive_tile(&board);
        board.place_settlement(tile.vertices[0], 0);
        board.move_robber(tile.id);

        assert!(board.tile(tile.id).unwrap().has_robber);
        assert_eq!(board.tiles().iter().filter(|t| t.has_robber).count(), 1);

        let result = board.resources_for_roll(tile.number.unwrap());
        let blocked = result
            .get(&0)
            .map(|hand| hand.get(tile.resource().unwrap()))
            .unwrap_or(0);
        let other_sources = board
            .tiles_at_vertex(tile.vertices[0])
            .filter(|t| {
                t.id != tile.id && t.number == tile.number && t.resource() == tile.resource()
            })
            .count() as u32;
        assert_eq!(blocked, other_sources);
    }

    #[test]
    fn test_seven_produces_nothing() {
        let mut board = seeded_board(16);
        board.place_settlement(0, 0);
        assert!(board.resources_for_roll(ROBBER_ROLL).is_empty());
    }

    #[test]
    fn test_adjacent_resources_one_per_tile() {
        let board = seeded_board(17);
        let vertex = board.tiles()[9].vertices[0];
        let hand = board.adjacent_resources(vertex);
        let producing = board
            .tiles_at_vertex(vertex)
            .filter(|t| t.resource().is_some())
            .count() as u32;
        assert_eq!(hand.total(), producing);
    }

    #[test]
    fn test_pips() {
        assert_eq!(pips(2), 1);
        assert_eq!(pips(6), 5);
        assert_eq!(pips(8), 5);
        assert_eq!(pips(12), 1);
        assert_eq!(pips(7), 6);
    }

    #[test]
    fn test_longest_road_single_road() {
        let mut board = seeded_board(18);
        assert_eq!(board.longest_road(0), 0);
        board.place_road(0, 0);
        assert_eq!(board.longest_road(0), 1);
    }

    #[test]
    fn test_longest_road_chain() {
        let mut board = seeded_board(19);
        let path = simple_path(&board, 0, 5);
        build_road_path(&mut board, &path, 0);
        assert_eq!(board.longest_road(0), 5);
        assert_eq!(board.longest_road(1), 0);
    }

    #[test]
    fn test_longest_road_broken_by_opponent_settlement() {
        let mut board = seeded_board(20);
        let path = simple_path(&board, 0, 5);
        build_road_path(&mut board, &path, 0);

        board.place_settlement(path[2], 1);
        assert_eq!(board.longest_road(0), 3);
    }

    #[test]
    fn test_longest_road_not_broken_by_own_settlement() {
        let mut board = seeded_board(21);
        let path = simple_path(&board, 0, 5);
        build_road_path(&mut board, &path, 0);

        board.place_settlement(path[2], 0);
        assert_eq!(board.longest_road(0), 5);
    }

    #[test]
    fn test_longest_road_around_a_hex() {
        let mut board = seeded_board(22);
        let tile = board.tile(9).unwrap().clone();
        for &e in &tile.edges {
            board.place_road(e, 3);
        }
        assert_eq!(board.longest_road(3), 6);
    }

    #[test]
    fn test_snapshot_mirrors_board() {
        let mut board = seeded_board(23);
        board.place_settlement(5, 2);
        board.place_road(board.vertex(5).unwrap().edges[0], 2);

        let snapshot = board.to_snapshot();
        assert_eq!(snapshot.tiles.len(), 19);
        assert_eq!(snapshot.vertices.len(), 54);
        assert_eq!(snapshot.edges.len(), 72);
        assert_eq!(snapshot.robber, board.robber_tile());
        assert_eq!(snapshot.vertices[5].building, VertexBuilding::Settlement(2));
        assert_eq!(
            snapshot.edges[board.vertex(5).unwrap().edges[0]].road,
            Some(2)
        );

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: BoardSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_from_layout_places_robber_on_desert() {
        let mut layout = vec![(Terrain::Fields, Some(5)); 19];
        layout[4] = (Terrain::Desert, None);
        let board = Board::from_layout(&layout).unwrap();
        assert_eq!(board.robber_tile(), 4);
        assert!(board.tile(4).unwrap().has_robber);
        assert_eq!(board.vertices().len(), 54);
    }

    #[test]
    fn test_from_layout_rejects_wrong_length() {
        let mut long = vec![(Terrain::Fields, Some(5)); 20];
        long[19] = (Terrain::Desert, None);
        assert!(Board::from_layout(&long).is_none());

        let short = vec![(Terrain::Hills, Some(6)); 18];
        assert!(Board::from_layout(&short).is_none());

        assert!(Board::from_layout(&[]).is_none());
    }
}
