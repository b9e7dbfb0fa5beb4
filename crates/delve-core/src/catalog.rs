//! Template catalog: the concrete room shapes, gates and keys the embedder
//! draws from. The built-in catalog is deliberately small; callers with
//! their own content hand a custom [`Catalog`] to the generator.

use serde::{Deserialize, Serialize};

use crate::geom::{Direction, Vec2};
use crate::grammar::NodeKind;

/// What a room template is allowed to stand in for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomRole {
    Entrance,
    Generic,
    Vertical,
    Horizontal,
    Boss,
    Secret,
    Bonus,
}

impl RoomRole {
    /// The role a grammar node asks for when it needs a room of its own
    pub fn for_kind(kind: NodeKind) -> RoomRole {
        match kind {
            NodeKind::Entrance => RoomRole::Entrance,
            NodeKind::RoomVertical => RoomRole::Vertical,
            NodeKind::RoomHorizontal => RoomRole::Horizontal,
            NodeKind::Boss => RoomRole::Boss,
            NodeKind::Secret => RoomRole::Secret,
            NodeKind::Bonus => RoomRole::Bonus,
            _ => RoomRole::Generic,
        }
    }
}

/// A doorway position on a room template, relative to the room's center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorwaySpec {
    pub position: Vec2,
    pub size: Vec2,
    pub direction: Direction,
}

/// A placeable room shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub name: String,
    pub role: RoomRole,
    pub size: Vec2,
    pub doorways: Vec<DoorwaySpec>,
    pub weight: f32,
}

impl RoomTemplate {
    /// Doorway indices facing the given direction
    pub fn doorways_facing(&self, dir: Direction) -> impl Iterator<Item = usize> + '_ {
        self.doorways
            .iter()
            .enumerate()
            .filter(move |(_, d)| d.direction == dir)
            .map(|(i, _)| i)
    }
}

/// A lock that can guard a doorway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateTemplate {
    pub name: String,
    /// Upper bound on how many keys this gate can accept
    pub key_count_max: u32,
    /// Inclusive range for combination length, before difficulty scaling
    pub combination_digits_min: u32,
    pub combination_digits_max: u32,
    /// Symbol alphabet the combination is written in
    pub symbols: String,
    pub weight: f32,
}

/// A key item that can open a gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyTemplate {
    pub name: String,
    /// How hard this key is to reach or use, on the same scale as the
    /// balancer's desired difficulty
    pub difficulty: f32,
    pub weight: f32,
}

/// The full content table the generator draws from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub rooms: Vec<RoomTemplate>,
    pub gates: Vec<GateTemplate>,
    pub keys: Vec<KeyTemplate>,
}

impl Catalog {
    /// Room templates usable for the given role, in catalog order
    pub fn rooms_for(&self, role: RoomRole) -> Vec<&RoomTemplate> {
        let exact: Vec<&RoomTemplate> =
            self.rooms.iter().filter(|t| t.role == role).collect();
        if exact.is_empty() && role != RoomRole::Generic {
            // roles without dedicated shapes fall back to generic rooms
            self.rooms
                .iter()
                .filter(|t| t.role == RoomRole::Generic)
                .collect()
        } else {
            exact
        }
    }

    pub fn room_weights(templates: &[&RoomTemplate]) -> Vec<f32> {
        templates.iter().map(|t| t.weight).collect()
    }
}

fn door(x: f32, y: f32, direction: Direction) -> DoorwaySpec {
    let size = if direction.is_vertical() {
        Vec2::new(2.0, 1.0)
    } else {
        Vec2::new(1.0, 2.0)
    };
    DoorwaySpec {
        position: Vec2::new(x, y),
        size,
        direction,
    }
}

/// A rectangular room with one doorway centered on each wall
fn boxy(name: &str, role: RoomRole, w: f32, h: f32, weight: f32) -> RoomTemplate {
    RoomTemplate {
        name: name.to_owned(),
        role,
        size: Vec2::new(w, h),
        doorways: vec![
            door(0.0, h * 0.5, Direction::Up),
            door(0.0, -h * 0.5, Direction::Down),
            door(-w * 0.5, 0.0, Direction::Left),
            door(w * 0.5, 0.0, Direction::Right),
        ],
        weight,
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let mut rooms = vec![
            boxy("entry-hall", RoomRole::Entrance, 12.0, 8.0, 1.0),
            boxy("square-chamber", RoomRole::Generic, 10.0, 10.0, 1.0),
            boxy("wide-hall", RoomRole::Generic, 16.0, 8.0, 1.0),
            boxy("long-corridor", RoomRole::Horizontal, 20.0, 6.0, 1.0),
            boxy("shaft", RoomRole::Vertical, 6.0, 18.0, 1.0),
            boxy("boss-arena", RoomRole::Boss, 20.0, 16.0, 1.0),
            boxy("hidden-nook", RoomRole::Secret, 6.0, 6.0, 1.0),
            boxy("treasure-vault", RoomRole::Bonus, 8.0, 8.0, 1.0),
        ];
        // the small cell only connects sideways, which exercises the
        // doorway-direction matching in the embedder
        rooms.push(RoomTemplate {
            name: "side-cell".to_owned(),
            role: RoomRole::Generic,
            size: Vec2::new(8.0, 6.0),
            doorways: vec![
                door(-4.0, 0.0, Direction::Left),
                door(4.0, 0.0, Direction::Right),
            ],
            weight: 0.5,
        });

        let gates = vec![
            GateTemplate {
                name: "keyed-door".to_owned(),
                key_count_max: 3,
                combination_digits_min: 0,
                combination_digits_max: 0,
                symbols: String::new(),
                weight: 1.0,
            },
            GateTemplate {
                name: "combination-door".to_owned(),
                key_count_max: 1,
                combination_digits_min: 1,
                combination_digits_max: 4,
                symbols: "0123456789".to_owned(),
                weight: 1.0,
            },
        ];

        let keys = vec![
            KeyTemplate {
                name: "iron-key".to_owned(),
                difficulty: 1.0,
                weight: 1.0,
            },
            KeyTemplate {
                name: "guarded-key".to_owned(),
                difficulty: 2.0,
                weight: 1.0,
            },
            KeyTemplate {
                name: "puzzle-key".to_owned(),
                difficulty: 3.0,
                weight: 0.5,
            },
        ];

        Catalog { rooms, gates, keys }
    }
}
