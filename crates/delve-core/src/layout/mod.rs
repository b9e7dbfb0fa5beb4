//! Placed geometry: rooms, doorways, gates, and the embedder that turns
//! the grammar graph into them.

pub mod embedder;
pub mod room;

pub use embedder::{GenerateConfig, LayoutOverlap, OverlapQuery, SpatialEmbedder};
pub use room::{
    Connection, Doorway, DoorwayRef, Gate, GateKind, GateState, KeyRef, Layout, OneWay, Room,
    RoomId,
};
