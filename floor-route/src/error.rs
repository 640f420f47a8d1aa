use thiserror::Error;

use crate::room::RoomId;

pub type Result<T> = std::result::Result<T, RouteError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("unknown room: {0}")]
    UnknownRoom(RoomId),

    #[error("malformed adjacency: {source_room} links to unknown room {target}")]
    MalformedAdjacency { source_room: RoomId, target: RoomId },

    #[error("no path found from {source_room} to {target}")]
    NoPathFound { source_room: RoomId, target: RoomId },

    #[error("duplicate room identifier: {0}")]
    DuplicateRoom(RoomId),

    #[error("invalid weight {weight} for passage {source_room} - {target}")]
    InvalidWeight {
        source_room: RoomId,
        target: RoomId,
        weight: f64,
    },

    #[error("search settled more than {limit} rooms without reaching {target}")]
    SearchLimitExceeded { target: RoomId, limit: usize },
}

impl RouteError {
    /// Stable machine-readable code, used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownRoom(_) => "UNKNOWN_ROOM",
            Self::MalformedAdjacency { .. } => "MALFORMED_ADJACENCY",
            Self::NoPathFound { .. } => "NO_PATH_FOUND",
            Self::DuplicateRoom(_) => "DUPLICATE_ROOM",
            Self::InvalidWeight { .. } => "INVALID_WEIGHT",
            Self::SearchLimitExceeded { .. } => "SEARCH_LIMIT_EXCEEDED",
        }
    }
}
