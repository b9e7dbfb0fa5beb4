//! Placed rooms, doorways and gates.
//!
//! Rooms live in a flat arena indexed by [`RoomId`]; a doorway names its
//! counterpart on the neighbouring room with a [`DoorwayRef`], and linking
//! is always symmetric: if `a.reverse == b` then `b.reverse == a`.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::balance::{GatePlan, KeyPlan};
use crate::geom::{Rect, Vec2, Direction};
use crate::grammar::{NodeArena, NodeId};

/// Index of a room in the layout arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct RoomId(pub u32);

impl RoomId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One side of a doorway pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorwayRef {
    pub room: RoomId,
    pub doorway: usize,
}

/// How a doorway's far side relates to its room in the layout tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connection {
    /// Unconnected wall doorway
    #[default]
    None,
    /// The far room placed this room
    Parent(RoomId),
    /// This room placed the far room
    Child(RoomId),
    /// Cutback to a room generated earlier (shallower in the tree)
    SiblingShallower(RoomId),
    /// Cutback arriving from a deeper room
    SiblingDeeper(RoomId),
}

impl Connection {
    pub fn target(self) -> Option<RoomId> {
        match self {
            Connection::None => None,
            Connection::Parent(r)
            | Connection::Child(r)
            | Connection::SiblingShallower(r)
            | Connection::SiblingDeeper(r) => Some(r),
        }
    }
}

/// One-way traversal block on a doorway, affecting travel OUT of the
/// owning room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub enum OneWay {
    #[default]
    None,
    /// Passable once broken open from the far side
    Destructible,
    /// A drop with no way back up
    NoLadder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum GateKind {
    /// Requires keys and/or a combination
    Lock,
    /// Hidden passage, opened by discovery
    Secret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum GateState {
    Locked,
    Unlocked,
}

/// A key placed in a specific room for a specific gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRef {
    pub room: RoomId,
    pub plan: KeyPlan,
    /// Whether the key is currently satisfied (collected or slotted)
    #[serde(default)]
    pub in_place: bool,
}

/// A lock or secret guarding one doorway. The gate is owned by the parent
/// side of the pairing; the reverse side reaches it through its
/// [`DoorwayRef`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub kind: GateKind,
    /// Index into the catalog's gate table; secrets have no template
    pub template: Option<usize>,
    pub plan: GatePlan,
    pub keys: Vec<KeyRef>,
    pub state: GateState,
}

/// A doorway on a placed room, in world coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doorway {
    pub position: Vec2,
    pub size: Vec2,
    pub direction: Direction,
    pub connection: Connection,
    pub reverse: Option<DoorwayRef>,
    pub gate: Option<Gate>,
    pub one_way: OneWay,
}

impl Doorway {
    pub fn is_connected(&self) -> bool {
        self.connection.target().is_some()
    }
}

/// A placed room: world bounds, its doorways, and the grammar nodes it
/// realizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub bounds: Rect,
    /// Index into the catalog's room table
    pub template: usize,
    pub doorways: Vec<Doorway>,
    pub nodes: Vec<NodeId>,
}

impl Room {
    /// Depth of the room's deepest grammar node
    pub fn max_depth(&self, arena: &NodeArena) -> usize {
        self.nodes.iter().map(|&n| arena.depth(n)).max().unwrap_or(0)
    }

    /// Depth of the room's shallowest grammar node
    pub fn min_depth(&self, arena: &NodeArena) -> usize {
        self.nodes.iter().map(|&n| arena.depth(n)).min().unwrap_or(0)
    }

    pub fn open_doorway_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.doorways
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_connected())
            .map(|(i, _)| i)
    }
}

/// The placed dungeon: a flat room arena rooted at the entrance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    rooms: Vec<Room>,
    root: RoomId,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> RoomId {
        self.root
    }

    pub fn set_root(&mut self, root: RoomId) {
        self.root = root;
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn push(&mut self, room: Room) -> RoomId {
        self.rooms.push(room);
        RoomId(self.rooms.len() as u32 - 1)
    }

    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id.index()]
    }

    pub fn room_mut(&mut self, id: RoomId) -> &mut Room {
        &mut self.rooms[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = RoomId> {
        (0..self.rooms.len() as u32).map(RoomId)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn doorway(&self, at: DoorwayRef) -> &Doorway {
        &self.room(at.room).doorways[at.doorway]
    }

    pub fn doorway_mut(&mut self, at: DoorwayRef) -> &mut Doorway {
        &mut self.room_mut(at.room).doorways[at.doorway]
    }

    /// The room whose bounds contain the point, if any
    pub fn room_at(&self, point: Vec2) -> Option<RoomId> {
        self.ids().find(|&id| self.room(id).bounds.contains(point))
    }

    /// Pair two doorways symmetrically. The invariant
    /// `doorway(a).reverse == Some(b)` and vice versa holds afterwards.
    pub fn link(
        &mut self,
        a: DoorwayRef,
        b: DoorwayRef,
        a_connection: Connection,
        b_connection: Connection,
    ) {
        debug_assert!(self.doorway(a).reverse.is_none());
        debug_assert!(self.doorway(b).reverse.is_none());
        {
            let d = self.doorway_mut(a);
            d.connection = a_connection;
            d.reverse = Some(b);
        }
        {
            let d = self.doorway_mut(b);
            d.connection = b_connection;
            d.reverse = Some(a);
        }
    }

    /// The gate guarding a doorway, whichever side owns it
    pub fn gate_at(&self, at: DoorwayRef) -> Option<&Gate> {
        if let Some(g) = self.doorway(at).gate.as_ref() {
            return Some(g);
        }
        self.doorway(at)
            .reverse
            .and_then(|rev| self.doorway(rev).gate.as_ref())
    }

    /// The side of the pairing that owns the gate, if either does
    fn gate_owner(&self, at: DoorwayRef) -> Option<DoorwayRef> {
        if self.doorway(at).gate.is_some() {
            return Some(at);
        }
        self.doorway(at)
            .reverse
            .filter(|&rev| self.doorway(rev).gate.is_some())
    }

    /// Unlock the gate guarding a doorway, on whichever side owns it.
    /// Returns false if there is no gate.
    pub fn unlock_gate(&mut self, at: DoorwayRef) -> bool {
        match self.gate_owner(at) {
            Some(side) => {
                if let Some(g) = self.doorway_mut(side).gate.as_mut() {
                    g.state = GateState::Unlocked;
                }
                true
            }
            None => false,
        }
    }

    /// Mark one of a gate's keys as satisfied (or not), on whichever side
    /// owns the gate. Returns false if there is no gate or no such key.
    pub fn set_key_in_place(&mut self, at: DoorwayRef, key: usize, in_place: bool) -> bool {
        let Some(side) = self.gate_owner(at) else {
            return false;
        };
        match self
            .doorway_mut(side)
            .gate
            .as_mut()
            .and_then(|g| g.keys.get_mut(key))
        {
            Some(k) => {
                k.in_place = in_place;
                true
            }
            None => false,
        }
    }

    /// Whether travel OUT of the owning room through this doorway is
    /// currently possible: connected, no locked gate on either side, and
    /// no one-way block in this direction.
    pub fn is_doorway_open(&self, at: DoorwayRef) -> bool {
        let d = self.doorway(at);
        if !d.is_connected() || d.one_way != OneWay::None {
            return false;
        }
        self.gate_at(at).is_none_or(|g| g.state == GateState::Unlocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_room(x: f32, y: f32) -> Room {
        let bounds = Rect::from_center_size(Vec2::new(x, y), Vec2::new(10.0, 10.0));
        let c = bounds.center();
        Room {
            bounds,
            template: 0,
            doorways: vec![
                Doorway {
                    position: Vec2::new(c.x + 5.0, c.y),
                    size: Vec2::new(1.0, 2.0),
                    direction: Direction::Right,
                    connection: Connection::None,
                    reverse: None,
                    gate: None,
                    one_way: OneWay::None,
                },
                Doorway {
                    position: Vec2::new(c.x - 5.0, c.y),
                    size: Vec2::new(1.0, 2.0),
                    direction: Direction::Left,
                    connection: Connection::None,
                    reverse: None,
                    gate: None,
                    one_way: OneWay::None,
                },
            ],
            nodes: Vec::new(),
        }
    }

    fn linked_pair() -> (Layout, DoorwayRef, DoorwayRef) {
        let mut layout = Layout::new();
        let a = layout.push(bare_room(0.0, 0.0));
        let b = layout.push(bare_room(10.0, 0.0));
        let da = DoorwayRef { room: a, doorway: 0 };
        let db = DoorwayRef { room: b, doorway: 1 };
        layout.link(da, db, Connection::Child(b), Connection::Parent(a));
        (layout, da, db)
    }

    #[test]
    fn test_link_is_symmetric() {
        let (layout, da, db) = linked_pair();
        assert_eq!(layout.doorway(da).reverse, Some(db));
        assert_eq!(layout.doorway(db).reverse, Some(da));
        // reverse of reverse is the doorway itself
        let back = layout.doorway(layout.doorway(da).reverse.unwrap()).reverse;
        assert_eq!(back, Some(da));
    }

    #[test]
    fn test_room_at_finds_containing_room() {
        let (layout, _, _) = linked_pair();
        assert_eq!(layout.room_at(Vec2::new(1.0, 1.0)), Some(RoomId(0)));
        assert_eq!(layout.room_at(Vec2::new(12.0, 0.0)), Some(RoomId(1)));
        assert_eq!(layout.room_at(Vec2::new(100.0, 100.0)), None);
    }

    #[test]
    fn test_locked_gate_closes_both_sides() {
        let (mut layout, da, db) = linked_pair();
        layout.doorway_mut(da).gate = Some(Gate {
            kind: GateKind::Lock,
            template: None,
            plan: GatePlan {
                key_count: 0,
                combination: String::new(),
                keys: Vec::new(),
                difficulty_per_item: 1.0,
            },
            keys: Vec::new(),
            state: GateState::Locked,
        });
        assert!(!layout.is_doorway_open(da));
        assert!(!layout.is_doorway_open(db), "gate must close the reverse side too");

        assert!(layout.unlock_gate(db), "unlock through the non-owning side");
        assert!(layout.is_doorway_open(da));
        assert!(layout.is_doorway_open(db));
    }

    #[test]
    fn test_one_way_blocks_only_the_owning_side() {
        let (mut layout, da, db) = linked_pair();
        layout.doorway_mut(da).one_way = OneWay::NoLadder;
        assert!(!layout.is_doorway_open(da));
        assert!(layout.is_doorway_open(db));
    }

    #[test]
    fn test_room_depth_spans_its_nodes() {
        use crate::grammar::NodeKind;
        let mut arena = NodeArena::new(NodeKind::Entrance);
        let mid = arena.alloc(NodeKind::Key);
        let deep = arena.alloc(NodeKind::Lock);
        arena.add_child(arena.root(), mid);
        arena.add_child(mid, deep);

        let mut room = bare_room(0.0, 0.0);
        room.nodes = vec![mid, deep];
        assert_eq!(room.min_depth(&arena), arena.depth(mid));
        assert_eq!(room.max_depth(&arena), arena.depth(deep));
        assert_eq!(bare_room(0.0, 0.0).min_depth(&arena), 0);
    }

    #[test]
    fn test_key_in_place_reaches_the_owning_side() {
        let (mut layout, da, db) = linked_pair();
        layout.doorway_mut(da).gate = Some(Gate {
            kind: GateKind::Lock,
            template: Some(0),
            plan: GatePlan {
                key_count: 1,
                combination: String::new(),
                keys: Vec::new(),
                difficulty_per_item: 1.0,
            },
            keys: vec![KeyRef {
                room: RoomId(0),
                plan: KeyPlan {
                    template: 0,
                    digit_start: 0,
                    digit_len: 0,
                },
                in_place: false,
            }],
            state: GateState::Locked,
        });

        assert!(layout.set_key_in_place(db, 0, true), "through the non-owning side");
        let gate = layout.gate_at(da).unwrap();
        assert!(gate.keys[0].in_place);

        assert!(!layout.set_key_in_place(da, 1, true), "no such key");
    }

    #[test]
    fn test_unconnected_doorway_is_closed() {
        let mut layout = Layout::new();
        let a = layout.push(bare_room(0.0, 0.0));
        let da = DoorwayRef { room: a, doorway: 0 };
        assert!(!layout.is_doorway_open(da));
        assert!(!layout.unlock_gate(da));
    }
}
