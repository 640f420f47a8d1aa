use csv::{ReaderBuilder, Trim};
use floor_route::{
    AdjacencyRecord, Point, Room, RoomCategory, RoomId, RoutePlanner, RouteError, RouterConfig,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable pointing at the rooms CSV
pub const DATASET_ENV: &str = "ROUTE_DATASET";
const DEFAULT_DATASET_FILE: &str = "stanze.csv";

/// Represents a row in the rooms CSV file.
///
/// A room may appear on several rows, typically one per outgoing link.
#[derive(Debug, Deserialize)]
struct RoomRow {
    room: String,
    #[serde(default)]
    link: Option<String>,
    x: f64,
    y: f64,
    piano: u32,
    #[serde(default)]
    corridoio: Option<String>,
}

/// Error types for the dataset loader
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),
    #[error("Room {room} declared on floor {first} and again on floor {second}")]
    InconsistentRoom { room: RoomId, first: u32, second: u32 },
    #[error("Invalid dataset: {0}")]
    Route(#[from] RouteError),
}

/// Rooms and raw adjacency, in file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rooms: Vec<Room>,
    pub adjacency: Vec<AdjacencyRecord>,
}

/// Room entry for selection lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomLabel {
    pub id: RoomId,
    pub label: String,
    pub floor: u32,
    pub category: RoomCategory,
}

/// Resolve the dataset location from `ROUTE_DATASET`, falling back to
/// `stanze.csv` in the working directory.
pub fn find_dataset_path() -> Result<PathBuf, LoaderError> {
    let path = std::env::var(DATASET_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATASET_FILE));

    if !path.is_file() {
        return Err(LoaderError::DatasetNotFound(format!(
            "rooms CSV not found at: {}",
            path.display()
        )));
    }

    Ok(path)
}

/// Decide the category of a room from its identifier.
///
/// Only called while parsing; everything downstream reads `Room::category`.
pub fn classify(id: &str) -> RoomCategory {
    if id.starts_with("scala") {
        RoomCategory::Stairwell
    } else if id.starts_with(|c: char| c.is_ascii_digit()) {
        RoomCategory::Room
    } else {
        RoomCategory::Other
    }
}

/// Human-readable room name: `scala_a1` becomes `scala_A piano 1`,
/// `101` becomes `stanza 101`.
pub fn display_label(room: &Room) -> String {
    match room.category {
        RoomCategory::Stairwell => {
            let chars: Vec<char> = room.id.chars().collect();
            if chars.len() > 6 {
                let prefix: String = chars[..6].iter().collect();
                let core: String = chars[6].to_uppercase().collect();
                format!("{}{} piano {}", prefix, core, room.floor)
            } else {
                format!("{} piano {}", room.id, room.floor)
            }
        }
        RoomCategory::Room => format!("stanza {}", room.id),
        RoomCategory::Other => room.id.clone(),
    }
}

fn split_links(cell: Option<&str>) -> impl Iterator<Item = String> + '_ {
    cell.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

impl Dataset {
    pub fn from_path(path: &Path) -> Result<Self, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::DatasetNotFound(format!(
                "rooms CSV not found at: {}",
                path.display()
            )));
        }

        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file)?;
        info!(
            "Loaded {} rooms from {}",
            dataset.rooms.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoaderError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut merged: IndexMap<RoomId, (Room, Vec<RoomId>)> = IndexMap::new();

        for result in reader.deserialize() {
            let row: RoomRow = result?;
            let links = split_links(row.link.as_deref());

            match merged.get_mut(&row.room) {
                Some((room, targets)) => {
                    if room.floor != row.piano {
                        return Err(LoaderError::InconsistentRoom {
                            room: row.room,
                            first: room.floor,
                            second: row.piano,
                        });
                    }
                    if room.position != Point::new(row.x, row.y) {
                        warn!("Room {} repeated with a different position, keeping the first", row.room);
                    }
                    targets.extend(links);
                }
                None => {
                    let mut room = Room::new(
                        row.room.clone(),
                        row.piano,
                        Point::new(row.x, row.y),
                        classify(&row.room),
                    );
                    room.corridor = row.corridoio.filter(|c| !c.is_empty());
                    let targets = links.collect();
                    merged.insert(row.room, (room, targets));
                }
            }
        }

        let mut dataset = Dataset::default();
        for (id, (room, targets)) in merged {
            dataset.rooms.push(room);
            dataset.adjacency.push(AdjacencyRecord { source: id, targets });
        }
        Ok(dataset)
    }

    /// Labels for every room, in file order.
    pub fn labels(&self) -> Vec<RoomLabel> {
        self.rooms
            .iter()
            .map(|room| RoomLabel {
                id: room.id.clone(),
                label: display_label(room),
                floor: room.floor,
                category: room.category,
            })
            .collect()
    }

    pub fn into_planner(self, config: &RouterConfig) -> Result<RoutePlanner, LoaderError> {
        Ok(RoutePlanner::new(self.rooms, &self.adjacency, config)?)
    }
}
