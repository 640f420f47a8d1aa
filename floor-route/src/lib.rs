//! Shortest walkable routes between rooms of a multi-floor building.
//!
//! Rooms go into a [`RoomRegistry`], adjacency records are turned into a
//! [`RoomGraph`] by the [`GraphBuilder`] under a [`WeightPolicy`], the
//! [`PathFinder`] runs Dijkstra over it and the [`GeometryProjector`] lifts
//! the result into 3D for rendering. [`RoutePlanner`] ties them together.

pub mod error;
pub mod geometry;
pub mod graph_builder;
pub mod path_finder;
pub mod planner;
pub mod room;
pub mod weight_policy;

pub use error::{Result, RouteError};
pub use geometry::{
    CorridorFootprint, FloorLevel, GeometryProjector, Point3, ProjectedRoom, ProjectionConfig,
    Segment,
};
pub use graph_builder::{build_graph, GraphBuilder, Passage, RoomGraph};
pub use path_finder::{shortest_path, PathFinder, Route};
pub use planner::{RouteScene, RoutePlanner, RouterConfig};
pub use room::{AdjacencyRecord, Point, Room, RoomCategory, RoomId, RoomRegistry};
pub use weight_policy::{StairwellPenalty, WeightPolicy};
