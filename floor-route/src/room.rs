use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};

pub type RoomId = String;

/// Planar position of a room on its floor plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomCategory {
    /// Ordinary numbered room.
    Room,
    /// Vertical connector between floors.
    Stairwell,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub floor: u32,
    pub position: Point,
    pub category: RoomCategory,
    /// Corridor grouping, only used for rendering context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corridor: Option<String>,
}

impl Room {
    pub fn new(id: impl Into<RoomId>, floor: u32, position: Point, category: RoomCategory) -> Self {
        Self {
            id: id.into(),
            floor,
            position,
            category,
            corridor: None,
        }
    }

    pub fn with_corridor(mut self, corridor: impl Into<String>) -> Self {
        self.corridor = Some(corridor.into());
        self
    }

    pub fn is_stairwell(&self) -> bool {
        self.category == RoomCategory::Stairwell
    }
}

/// Raw, possibly one-directional connections declared for a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyRecord {
    pub source: RoomId,
    #[serde(default)]
    pub targets: Vec<RoomId>,
}

impl AdjacencyRecord {
    pub fn new<I, S>(source: impl Into<RoomId>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RoomId>,
    {
        Self {
            source: source.into(),
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }
}

/// Immutable, insertion-ordered set of rooms keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: IndexMap<RoomId, Room>,
}

impl RoomRegistry {
    /// Build a registry, rejecting repeated identifiers.
    pub fn from_rooms<I>(rooms: I) -> Result<Self>
    where
        I: IntoIterator<Item = Room>,
    {
        let mut map = IndexMap::new();
        for room in rooms {
            if map.contains_key(&room.id) {
                return Err(RouteError::DuplicateRoom(room.id));
            }
            map.insert(room.id.clone(), room);
        }
        Ok(Self { rooms: map })
    }

    pub fn get(&self, id: &str) -> Result<&Room> {
        self.rooms
            .get(id)
            .ok_or_else(|| RouteError::UnknownRoom(id.to_string()))
    }

    /// Rooms in input order.
    pub fn all_rooms(&self) -> impl Iterator<Item = &Room> + '_ {
        self.rooms.values()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.rooms.get_index_of(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rooms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn max_floor(&self) -> Option<u32> {
        self.rooms.values().map(|room| room.floor).max()
    }
}
