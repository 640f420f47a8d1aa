use crate::error::Result;
use crate::geometry::{
    CorridorFootprint, FloorLevel, GeometryProjector, Point3, ProjectedRoom, ProjectionConfig,
    Segment,
};
use crate::graph_builder::{GraphBuilder, RoomGraph};
use crate::path_finder::{PathFinder, Route};
use crate::room::{AdjacencyRecord, Room, RoomId, RoomRegistry};
use crate::weight_policy::StairwellPenalty;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Routing and projection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub weights: StairwellPenalty,
    #[serde(default)]
    pub projection: ProjectionConfig,
    /// Cap on rooms settled per search; unlimited when absent.
    #[serde(default)]
    pub max_settled: Option<usize>,
}

/// Everything a renderer needs to draw one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteScene {
    pub route: Route,
    pub points: Vec<ProjectedRoom>,
    pub segments: Vec<Segment>,
    /// Highest floor of the two endpoints; context below is clipped to it.
    pub visible_max_floor: u32,
    pub context_segments: Vec<Segment>,
    pub footprints: Vec<CorridorFootprint>,
    pub floors: Vec<FloorLevel>,
}

/// Query facade over an immutable registry and graph.
///
/// Built once per dataset load; every query borrows it read-only, so one
/// planner can be shared between threads.
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    registry: RoomRegistry,
    graph: RoomGraph,
    projector: GeometryProjector,
    max_settled: Option<usize>,
}

impl RoutePlanner {
    pub fn new(rooms: Vec<Room>, adjacency: &[AdjacencyRecord], config: &RouterConfig) -> Result<Self> {
        let registry = RoomRegistry::from_rooms(rooms)?;
        let graph = GraphBuilder::new(&registry)
            .with_policy(config.weights)
            .build(adjacency)?;

        info!(
            "Route planner ready: {} rooms, {} passages",
            registry.len(),
            graph.edge_count()
        );

        Ok(Self {
            registry,
            graph,
            projector: GeometryProjector::new(config.projection),
            max_settled: config.max_settled,
        })
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn projector(&self) -> &GeometryProjector {
        &self.projector
    }

    pub fn find_route(&self, source: &str, target: &str) -> Result<Route> {
        let finder = PathFinder::new(&self.graph);
        match self.max_settled {
            Some(limit) => finder.with_max_settled(limit).shortest_path(source, target),
            None => finder.shortest_path(source, target),
        }
    }

    pub fn geometry_for(&self, path: &[RoomId]) -> Result<Vec<ProjectedRoom>> {
        self.projector.project(&self.registry, path)
    }

    pub fn all_room_geometry(&self) -> IndexMap<RoomId, Point3> {
        self.projector.project_all(&self.registry)
    }

    /// Route plus projected context, clipped to the endpoints' highest floor.
    pub fn scene(&self, source: &str, target: &str) -> Result<RouteScene> {
        let route = self.find_route(source, target)?;
        let visible_max_floor = self
            .registry
            .get(source)?
            .floor
            .max(self.registry.get(target)?.floor);
        let ceiling = Some(visible_max_floor);

        Ok(RouteScene {
            points: self.geometry_for(&route.path)?,
            segments: self.projector.path_segments(&self.registry, &route.path)?,
            visible_max_floor,
            context_segments: self.projector.corridor_segments(&self.graph, ceiling),
            footprints: self.projector.corridor_footprints(&self.registry, ceiling),
            floors: self.projector.floor_levels(&self.registry, ceiling),
            route,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouteError;
    use crate::room::{Point, RoomCategory};

    fn planner(config: &RouterConfig) -> RoutePlanner {
        let rooms = vec![
            Room::new("101", 1, Point::new(1.0, 1.0), RoomCategory::Room).with_corridor("c1"),
            Room::new("scala_a1", 1, Point::new(3.0, 1.0), RoomCategory::Stairwell),
            Room::new("scala_a2", 2, Point::new(3.0, 1.0), RoomCategory::Stairwell),
            Room::new("201", 2, Point::new(5.0, 1.0), RoomCategory::Room).with_corridor("c2"),
            Room::new("scala_a3", 3, Point::new(3.0, 1.0), RoomCategory::Stairwell),
        ];
        let adjacency = vec![
            AdjacencyRecord::new("101", ["scala_a1"]),
            AdjacencyRecord::new("scala_a2", ["scala_a1", "201", "scala_a3"]),
        ];
        RoutePlanner::new(rooms, &adjacency, config).unwrap()
    }

    #[test]
    fn test_find_route_and_geometry() {
        let planner = planner(&RouterConfig::default());

        let route = planner.find_route("101", "201").unwrap();
        assert_eq!(route.path, vec!["101", "scala_a1", "scala_a2", "201"]);
        assert_eq!(route.total_weight, 22.0);

        let points = planner.geometry_for(&route.path).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].z, 0.0);
        assert_eq!(points[3].z, 20.0);

        assert_eq!(planner.all_room_geometry().len(), 5);
    }

    #[test]
    fn test_scene_is_clipped_to_endpoint_floor() {
        let planner = planner(&RouterConfig::default());
        let scene = planner.scene("101", "201").unwrap();

        assert_eq!(scene.visible_max_floor, 2);
        assert_eq!(scene.segments.len(), 3);
        // scala_a2 - scala_a3 reaches floor 3 and is dropped
        assert_eq!(scene.context_segments.len(), 3);
        assert_eq!(scene.floors.len(), 2);
        assert_eq!(scene.footprints.len(), 2);
    }

    #[test]
    fn test_configured_penalty_and_limit() {
        let config = RouterConfig {
            weights: StairwellPenalty::new(1.0, 5.0),
            max_settled: Some(1),
            ..RouterConfig::default()
        };
        let planner = planner(&config);

        let err = planner.find_route("101", "201").unwrap_err();
        assert!(matches!(err, RouteError::SearchLimitExceeded { .. }));

        let relaxed = RoutePlanner {
            max_settled: None,
            ..planner
        };
        assert_eq!(relaxed.find_route("101", "201").unwrap().total_weight, 7.0);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: RouterConfig =
            serde_json::from_str(r#"{"projection": {"vertical_scale": 10.0}}"#).unwrap();
        assert_eq!(config.projection.vertical_scale, 10.0);
        assert_eq!(config.projection.floor_shift, -1);
        assert_eq!(config.weights.floor_change_penalty, 20.0);
        assert_eq!(config.max_settled, None);
    }
}
