//! 3D projection of rooms and routes for rendering.
//!
//! Rooms keep their planar `(x, y)` position; the vertical coordinate is
//! `z = (floor + floor_shift) * vertical_scale`. With the defaults
//! (`vertical_scale = 20`, `floor_shift = -1`) a room on floor 2 sits at
//! `z = 20` and the ground floor sits below the rendering plane at `z = -20`.

use crate::error::Result;
use crate::graph_builder::RoomGraph;
use crate::room::{Room, RoomCategory, RoomId, RoomRegistry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    #[serde(default = "default_vertical_scale")]
    pub vertical_scale: f64,
    /// Added to the floor index before scaling.
    #[serde(default = "default_floor_shift")]
    pub floor_shift: i32,
    /// Padding around corridor footprints.
    #[serde(default = "default_footprint_margin")]
    pub footprint_margin: f64,
}

fn default_vertical_scale() -> f64 {
    20.0
}

fn default_floor_shift() -> i32 {
    -1
}

fn default_footprint_margin() -> f64 {
    1.0
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            vertical_scale: default_vertical_scale(),
            floor_shift: default_floor_shift(),
            footprint_margin: default_footprint_margin(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRoom {
    pub room_id: RoomId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ProjectedRoom {
    pub fn point(&self) -> Point3 {
        Point3 {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: ProjectedRoom,
    pub to: ProjectedRoom,
    pub crosses_floors: bool,
}

/// Padded bounding rectangle of the rooms along one corridor, on one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorFootprint {
    pub corridor: String,
    pub floor: u32,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorLevel {
    pub floor: u32,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryProjector {
    config: ProjectionConfig,
}

impl GeometryProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn floor_z(&self, floor: u32) -> f64 {
        (floor as f64 + self.config.floor_shift as f64) * self.config.vertical_scale
    }

    pub fn project_room(&self, room: &Room) -> ProjectedRoom {
        ProjectedRoom {
            room_id: room.id.clone(),
            x: room.position.x,
            y: room.position.y,
            z: self.floor_z(room.floor),
        }
    }

    /// Project every room of `path`, in path order.
    pub fn project(&self, registry: &RoomRegistry, path: &[RoomId]) -> Result<Vec<ProjectedRoom>> {
        path.iter()
            .map(|id| registry.get(id).map(|room| self.project_room(room)))
            .collect()
    }

    /// Project the whole registry, in registry order.
    pub fn project_all(&self, registry: &RoomRegistry) -> IndexMap<RoomId, Point3> {
        registry
            .all_rooms()
            .map(|room| (room.id.clone(), self.project_room(room).point()))
            .collect()
    }

    /// Line segments between consecutive rooms of `path`.
    pub fn path_segments(&self, registry: &RoomRegistry, path: &[RoomId]) -> Result<Vec<Segment>> {
        let rooms = path
            .iter()
            .map(|id| registry.get(id))
            .collect::<Result<Vec<_>>>()?;

        Ok(rooms
            .windows(2)
            .map(|pair| self.segment(pair[0], pair[1]))
            .collect())
    }

    /// Every passage with both ends at or below `max_floor`, as faint
    /// background for the route.
    pub fn corridor_segments(&self, graph: &RoomGraph, max_floor: Option<u32>) -> Vec<Segment> {
        graph
            .passages()
            .filter(|(a, b, _)| within(a.floor, max_floor) && within(b.floor, max_floor))
            .map(|(a, b, _)| self.segment(a, b))
            .collect()
    }

    /// Footprints of ordinary rooms grouped by floor and corridor.
    pub fn corridor_footprints(
        &self,
        registry: &RoomRegistry,
        max_floor: Option<u32>,
    ) -> Vec<CorridorFootprint> {
        let mut groups: BTreeMap<(u32, &str), [f64; 4]> = BTreeMap::new();

        for room in registry.all_rooms() {
            if room.category != RoomCategory::Room || !within(room.floor, max_floor) {
                continue;
            }
            let Some(corridor) = room.corridor.as_deref() else {
                continue;
            };
            let (x, y) = (room.position.x, room.position.y);
            groups
                .entry((room.floor, corridor))
                .and_modify(|bbox| {
                    bbox[0] = bbox[0].min(x);
                    bbox[1] = bbox[1].min(y);
                    bbox[2] = bbox[2].max(x);
                    bbox[3] = bbox[3].max(y);
                })
                .or_insert([x, y, x, y]);
        }

        let margin = self.config.footprint_margin;
        groups
            .into_iter()
            .map(|((floor, corridor), [min_x, min_y, max_x, max_y])| CorridorFootprint {
                corridor: corridor.to_string(),
                floor,
                min_x: min_x - margin,
                min_y: min_y - margin,
                max_x: max_x + margin,
                max_y: max_y + margin,
                z: self.floor_z(floor),
            })
            .collect()
    }

    /// Distinct floors present in the registry up to `max_floor`, ascending.
    pub fn floor_levels(&self, registry: &RoomRegistry, max_floor: Option<u32>) -> Vec<FloorLevel> {
        let mut floors: Vec<u32> = registry
            .all_rooms()
            .map(|room| room.floor)
            .filter(|&floor| within(floor, max_floor))
            .collect();
        floors.sort_unstable();
        floors.dedup();

        floors
            .into_iter()
            .map(|floor| FloorLevel {
                floor,
                z: self.floor_z(floor),
            })
            .collect()
    }

    fn segment(&self, a: &Room, b: &Room) -> Segment {
        Segment {
            from: self.project_room(a),
            to: self.project_room(b),
            crosses_floors: a.floor != b.floor,
        }
    }
}

fn within(floor: u32, max_floor: Option<u32>) -> bool {
    max_floor.map_or(true, |max| floor <= max)
}
