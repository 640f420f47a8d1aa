use serde::{Deserialize, Serialize};

use crate::room::Room;

/// Assigns the traversal cost of a passage between two rooms.
///
/// The graph builder is generic over this trait, so routing cost can be
/// changed without touching graph construction. Any
/// `Fn(&Room, &Room) -> f64` closure is a policy as well.
pub trait WeightPolicy {
    fn weight(&self, a: &Room, b: &Room) -> f64;
}

impl<F> WeightPolicy for F
where
    F: Fn(&Room, &Room) -> f64,
{
    fn weight(&self, a: &Room, b: &Room) -> f64 {
        self(a, b)
    }
}

/// Flat cost for every passage, except stairwell-to-stairwell flights that
/// change floor, which cost `floor_change_penalty`.
///
/// A stairwell linked to an ordinary room on another floor is not penalised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StairwellPenalty {
    #[serde(default = "default_base_weight")]
    pub base_weight: f64,
    #[serde(default = "default_floor_change_penalty")]
    pub floor_change_penalty: f64,
}

fn default_base_weight() -> f64 {
    1.0
}

fn default_floor_change_penalty() -> f64 {
    20.0
}

impl Default for StairwellPenalty {
    fn default() -> Self {
        Self {
            base_weight: default_base_weight(),
            floor_change_penalty: default_floor_change_penalty(),
        }
    }
}

impl StairwellPenalty {
    pub fn new(base_weight: f64, floor_change_penalty: f64) -> Self {
        Self {
            base_weight,
            floor_change_penalty,
        }
    }
}

/// True when a passage is a stair flight between two different floors.
pub fn crosses_floors(a: &Room, b: &Room) -> bool {
    a.is_stairwell() && b.is_stairwell() && a.floor != b.floor
}

impl WeightPolicy for StairwellPenalty {
    fn weight(&self, a: &Room, b: &Room) -> f64 {
        if crosses_floors(a, b) {
            self.floor_change_penalty
        } else {
            self.base_weight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::{Point, RoomCategory};

    fn room(id: &str, floor: u32, category: RoomCategory) -> Room {
        Room::new(id, floor, Point::new(0.0, 0.0), category)
    }

    #[test]
    fn test_same_floor_rooms() {
        let policy = StairwellPenalty::default();
        let a = room("101", 1, RoomCategory::Room);
        let b = room("102", 1, RoomCategory::Room);
        assert_eq!(policy.weight(&a, &b), 1.0);
    }

    #[test]
    fn test_stairwells_across_floors() {
        let policy = StairwellPenalty::default();
        let lower = room("scala_a0", 0, RoomCategory::Stairwell);
        let upper = room("scala_a1", 1, RoomCategory::Stairwell);
        assert_eq!(policy.weight(&lower, &upper), 20.0);
        assert_eq!(policy.weight(&upper, &lower), 20.0);
    }

    #[test]
    fn test_stairwells_same_floor() {
        let policy = StairwellPenalty::default();
        let a = room("scala_a1", 1, RoomCategory::Stairwell);
        let b = room("scala_b1", 1, RoomCategory::Stairwell);
        assert_eq!(policy.weight(&a, &b), 1.0);
    }

    #[test]
    fn test_stairwell_to_room_on_other_floor_not_penalised() {
        let policy = StairwellPenalty::default();
        let stair = room("scala_a0", 0, RoomCategory::Stairwell);
        let office = room("101", 1, RoomCategory::Room);
        assert_eq!(policy.weight(&stair, &office), 1.0);
        assert!(!crosses_floors(&stair, &office));
    }

    #[test]
    fn test_custom_penalty_and_closure() {
        let lower = room("scala_a0", 0, RoomCategory::Stairwell);
        let upper = room("scala_a1", 1, RoomCategory::Stairwell);

        let policy = StairwellPenalty::new(2.0, 5.0);
        assert_eq!(policy.weight(&lower, &upper), 5.0);

        let by_floor_gap = |a: &Room, b: &Room| 1.0 + a.floor.abs_diff(b.floor) as f64;
        assert_eq!(by_floor_gap.weight(&lower, &upper), 2.0);
    }

    #[test]
    fn test_deserialize_defaults() {
        let policy: StairwellPenalty = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, StairwellPenalty::default());
    }
}
