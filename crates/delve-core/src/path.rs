//! Room-graph pathfinding.
//!
//! A* over placed rooms, with doorway midpoints as the frontier and a
//! Manhattan heuristic toward the goal room's center. The obstruction
//! level controls which doorways a step may use, from raw connectivity
//! down to only doorways a player could physically pass right now.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::geom::Vec2;
use crate::layout::{Connection, DoorwayRef, Layout, OneWay, RoomId};

/// How much of the dungeon's gating a path must respect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstructionLevel {
    /// Raw connectivity: any linked doorway may be crossed
    None,
    /// Follow the grammar's direction of travel: descend freely, ascend
    /// only through ungated doorways, honor one-way blocks
    Directional,
    /// Only doorways that are physically open right now
    Full,
}

/// A found route between two rooms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPath {
    /// Rooms visited, start and end inclusive
    pub rooms: Vec<RoomId>,
    /// Start center, each crossed doorway's midpoint, end center
    pub waypoints: Vec<Vec2>,
    /// Summed Manhattan length of the waypoint chain
    pub distance: f32,
}

struct Frontier {
    priority: f32,
    distance: f32,
    room: RoomId,
    at: Vec2,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on priority
        other.priority.total_cmp(&self.priority)
    }
}
impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Whether a step may exit through this doorway under the given level
fn passable(
    layout: &Layout,
    at: DoorwayRef,
    level: ObstructionLevel,
) -> bool {
    let d = layout.doorway(at);
    if !d.is_connected() {
        return false;
    }
    match level {
        ObstructionLevel::None => true,
        ObstructionLevel::Directional => {
            // a destructible block still yields to travel back toward
            // shallower rooms; a missing ladder never does
            let sibling_shallower = matches!(d.connection, Connection::SiblingShallower(_));
            match d.one_way {
                OneWay::NoLadder => return false,
                OneWay::Destructible if !sibling_shallower => return false,
                _ => {}
            }
            match d.connection {
                Connection::Child(_) | Connection::SiblingShallower(_)
                | Connection::SiblingDeeper(_) => true,
                // ascending is only free when the boundary carries no gate
                Connection::Parent(_) => layout.gate_at(at).is_none(),
                Connection::None => false,
            }
        }
        ObstructionLevel::Full => layout.is_doorway_open(at),
    }
}

/// Shortest route from `start` to `end`, or `None` when every route is
/// blocked at the requested obstruction level.
pub fn find_path(
    layout: &Layout,
    start: RoomId,
    end: RoomId,
    level: ObstructionLevel,
) -> Option<RoomPath> {
    let goal = layout.room(end).bounds.center();

    let mut heap = BinaryHeap::new();
    let mut best: HashMap<RoomId, f32> = HashMap::new();
    // room -> (previous room, doorway midpoint crossed to get here)
    let mut came_from: HashMap<RoomId, (RoomId, Vec2)> = HashMap::new();

    let start_at = layout.room(start).bounds.center();
    best.insert(start, 0.0);
    heap.push(Frontier {
        priority: start_at.manhattan(goal),
        distance: 0.0,
        room: start,
        at: start_at,
    });

    while let Some(node) = heap.pop() {
        if node.room == end {
            return Some(reconstruct(layout, &came_from, start, end, node.distance));
        }
        if best.get(&node.room).is_some_and(|&d| node.distance > d) {
            continue;
        }

        let room = layout.room(node.room);
        for (i, d) in room.doorways.iter().enumerate() {
            let at = DoorwayRef {
                room: node.room,
                doorway: i,
            };
            if !passable(layout, at, level) {
                continue;
            }
            let (next, entry) = match (d.connection.target(), d.reverse) {
                (Some(next), Some(rev)) => (next, layout.doorway(rev).position),
                _ => continue,
            };
            let distance = node.distance + node.at.manhattan(d.position);
            if best.get(&next).is_none_or(|&prev| distance < prev) {
                best.insert(next, distance);
                came_from.insert(next, (node.room, d.position));
                heap.push(Frontier {
                    priority: distance + entry.manhattan(goal),
                    distance,
                    room: next,
                    at: entry,
                });
            }
        }
    }
    None
}

fn reconstruct(
    layout: &Layout,
    came_from: &HashMap<RoomId, (RoomId, Vec2)>,
    start: RoomId,
    end: RoomId,
    distance: f32,
) -> RoomPath {
    let mut rooms = vec![end];
    let mut doors = Vec::new();
    let mut cursor = end;
    while cursor != start {
        let (prev, midpoint) = came_from[&cursor];
        doors.push(midpoint);
        rooms.push(prev);
        cursor = prev;
    }
    rooms.reverse();
    doors.reverse();

    let mut waypoints = Vec::with_capacity(doors.len() + 2);
    waypoints.push(layout.room(start).bounds.center());
    waypoints.extend(doors);
    waypoints.push(layout.room(end).bounds.center());

    RoomPath {
        rooms,
        waypoints,
        distance,
    }
}
