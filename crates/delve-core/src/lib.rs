//! Seeded procedural dungeon generation.
//!
//! Generation runs in two phases over one seeded RNG stream:
//!
//! 1. a node-replacement grammar grows an abstract mission graph (keys,
//!    locks, secrets, a boss) from a single start node;
//! 2. the spatial embedder places a room for each group of graph nodes,
//!    pairing doorways flush against shared walls, spawning gates and
//!    distributing keys with the difficulty balancer.
//!
//! The same seed always yields the same dungeon. The resulting [`Dungeon`]
//! answers runtime queries: locating the room under a point, testing
//! whether a doorway is currently passable, unlocking gates, and routing
//! between rooms.

pub mod balance;
pub mod catalog;
pub mod errors;
pub mod geom;
pub mod grammar;
pub mod layout;
pub mod path;

pub use balance::DifficultyBalancer;
pub use catalog::Catalog;
pub use errors::{GenerateError, GrammarError, PlacementFailure};
pub use geom::{Rect, Vec2};
pub use grammar::{default_rules, NodeArena, NodeId, NodeKind, RuleSet};
pub use layout::{
    Connection, Doorway, DoorwayRef, Gate, GateKind, GateState, GenerateConfig, Layout, OneWay,
    Room, RoomId, SpatialEmbedder,
};
pub use path::{ObstructionLevel, RoomPath};

use delve_rng::DungeonRng;
use serde::{Deserialize, Serialize};

/// A fully generated dungeon: the mission graph, the placed rooms, and the
/// seed that produced both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dungeon {
    pub arena: NodeArena,
    pub layout: Layout,
    seed: u64,
}

impl Dungeon {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The entrance room
    pub fn root(&self) -> RoomId {
        self.layout.root()
    }

    /// The room whose bounds contain the point, if any
    pub fn room_at(&self, point: Vec2) -> Option<RoomId> {
        self.layout.room_at(point)
    }

    /// Whether travel out of the owning room through this doorway is
    /// currently possible
    pub fn is_doorway_open(&self, at: DoorwayRef) -> bool {
        self.layout.is_doorway_open(at)
    }

    /// Unlock the gate guarding a doorway. Returns false if the doorway is
    /// not gated.
    pub fn unlock_gate(&mut self, at: DoorwayRef) -> bool {
        self.layout.unlock_gate(at)
    }

    /// Mark one of a gate's keys as satisfied (or not)
    pub fn set_key_in_place(&mut self, at: DoorwayRef, key: usize, in_place: bool) -> bool {
        self.layout.set_key_in_place(at, key, in_place)
    }

    /// Shortest route between two rooms at the given obstruction level
    pub fn find_path(
        &self,
        start: RoomId,
        end: RoomId,
        level: ObstructionLevel,
    ) -> Option<RoomPath> {
        path::find_path(&self.layout, start, end, level)
    }
}

/// Generate a dungeon from the built-in rules and catalog
pub fn generate(seed: u64, config: &GenerateConfig) -> Result<Dungeon, GenerateError> {
    generate_with(
        seed,
        NodeKind::Zone,
        &default_rules(),
        &Catalog::default(),
        config,
    )
}

/// Generate a dungeon with custom rules and content
pub fn generate_with(
    seed: u64,
    root: NodeKind,
    rules: &RuleSet,
    catalog: &Catalog,
    config: &GenerateConfig,
) -> Result<Dungeon, GenerateError> {
    let mut rng = DungeonRng::new(seed);
    let mut arena = NodeArena::new(root);
    grammar::generate(&mut arena, rules, &mut rng)?;
    let layout = SpatialEmbedder::new(catalog, config).embed(&mut arena, &mut rng)?;
    Ok(Dungeon {
        arena,
        layout,
        seed,
    })
}
