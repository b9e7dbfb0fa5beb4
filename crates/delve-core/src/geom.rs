//! World-space geometry for room placement.
//!
//! Rooms are axis-aligned rectangles in continuous 2D space. Placement
//! validation and pathfinding both work in these units; the Manhattan metric
//! is used throughout since the room layout is grid-aligned and diagonal
//! traversal never occurs.

use serde::{Deserialize, Serialize};

/// Tolerance for floating-point comparisons of world coordinates.
pub const EPSILON: f32 = 1e-3;

/// Shared wall thickness between adjacent rooms. Two room rectangles may
/// touch along a wall without counting as overlapping.
pub const WALL_THICKNESS: f32 = 1.0;

/// A 2D world-space point/vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another point
    pub fn manhattan(self, other: Vec2) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn approx_eq(self, other: Vec2) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }
}

impl core::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::ops::Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// An axis-aligned rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Build a rectangle from its center point and full size
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn width(&self) -> f32 {
        (self.max.x - self.min.x).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.max.y - self.min.y).max(0.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    /// Translate by an offset
    pub fn offset(&self, by: Vec2) -> Rect {
        Rect::new(self.min + by, self.max + by)
    }

    /// Grow (positive) or shrink (negative) every side by `amount`
    pub fn expand(&self, amount: f32) -> Rect {
        Rect::new(
            Vec2::new(self.min.x - amount, self.min.y - amount),
            Vec2::new(self.max.x + amount, self.max.y + amount),
        )
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x - EPSILON
            && point.x <= self.max.x + EPSILON
            && point.y >= self.min.y - EPSILON
            && point.y <= self.max.y + EPSILON
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    /// Strict interior intersection test. Rectangles that merely share an
    /// edge (adjacent rooms sharing a wall) do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x - EPSILON
            && self.max.x > other.min.x + EPSILON
            && self.min.y < other.max.y - EPSILON
            && self.max.y > other.min.y + EPSILON
    }

    /// Overlap test that forgives shared wall thickness: true only when the
    /// interiors penetrate deeper than one wall on both axes.
    pub fn overlaps_beyond_walls(&self, other: &Rect) -> bool {
        let a = self.expand(-WALL_THICKNESS * 0.5);
        let b = other.expand(-WALL_THICKNESS * 0.5);
        a.intersects(&b)
    }

    /// Closest point on (or in) this rectangle to `point`
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }
}

/// Cardinal direction of a doorway opening, pointing out of its room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, 1.0),
            Direction::Down => Vec2::new(0.0, -1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Direction of a doorway given its size aspect and position relative to
    /// the room center: wide openings face up/down, tall openings face
    /// left/right, the sign coming from which side of the room they sit on.
    pub fn of_doorway(room_center: Vec2, doorway_center: Vec2, doorway_size: Vec2) -> Direction {
        let to_doorway = doorway_center - room_center;
        if doorway_size.x > doorway_size.y {
            if to_doorway.y >= 0.0 {
                Direction::Up
            } else {
                Direction::Down
            }
        } else if to_doorway.x >= 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(Vec2::new(1.0, 2.0), Vec2::new(5.0, 8.0));
        assert_eq!(r.width(), 4.0);
        assert_eq!(r.height(), 6.0);
        assert!(r.center().approx_eq(Vec2::new(3.0, 5.0)));
    }

    #[test]
    fn test_rect_intersects() {
        let r1 = Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let r2 = Rect::new(Vec2::new(5.0, 5.0), Vec2::new(15.0, 15.0));
        let r3 = Rect::new(Vec2::new(20.0, 20.0), Vec2::new(30.0, 30.0));

        assert!(r1.intersects(&r2));
        assert!(r2.intersects(&r1));
        assert!(!r1.intersects(&r3));
    }

    #[test]
    fn test_shared_edge_is_not_intersection() {
        let r1 = Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let r2 = Rect::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        assert!(!r1.intersects(&r2));
        assert!(!r1.overlaps_beyond_walls(&r2));
    }

    #[test]
    fn test_wall_thickness_forgiveness() {
        // half-wall penetration on one axis is still "shared wall"
        let r1 = Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let r2 = Rect::new(Vec2::new(9.5, 0.0), Vec2::new(20.0, 10.0));
        assert!(r1.intersects(&r2));
        assert!(!r1.overlaps_beyond_walls(&r2));

        let r3 = Rect::new(Vec2::new(7.0, 0.0), Vec2::new(20.0, 10.0));
        assert!(r1.overlaps_beyond_walls(&r3));
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(Vec2::new(1.0, 2.0).manhattan(Vec2::new(4.0, -2.0)), 7.0);
    }

    #[test]
    fn test_doorway_direction() {
        let room = Vec2::new(0.0, 0.0);
        // wide doorway above center faces up
        assert_eq!(
            Direction::of_doorway(room, Vec2::new(0.0, 5.0), Vec2::new(2.0, 0.5)),
            Direction::Up
        );
        // tall doorway left of center faces left
        assert_eq!(
            Direction::of_doorway(room, Vec2::new(-5.0, 0.0), Vec2::new(0.5, 2.0)),
            Direction::Left
        );
    }

    #[test]
    fn test_closest_point() {
        let r = Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert!(r
            .closest_point(Vec2::new(15.0, 5.0))
            .approx_eq(Vec2::new(10.0, 5.0)));
        assert!(r
            .closest_point(Vec2::new(3.0, 4.0))
            .approx_eq(Vec2::new(3.0, 4.0)));
    }
}
