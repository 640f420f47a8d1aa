use crate::error::{Result, RouteError};
use crate::room::{AdjacencyRecord, Room, RoomId, RoomRegistry};
use crate::weight_policy::{crosses_floors, StairwellPenalty, WeightPolicy};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

// Undirected: a passage declared from one side is walkable from both
pub type FloorGraph = UnGraph<Room, Passage>;

/// Edge payload: traversal cost and whether the passage is a stair flight
/// between floors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Passage {
    pub weight: f64,
    pub crosses_floors: bool,
}

/// Immutable room connectivity graph.
///
/// Besides the petgraph storage it keeps, per node, the list of incident
/// edges in the order the builder inserted them. Path finding walks this
/// list instead of petgraph's own adjacency iteration, which yields the
/// most recently added edge first.
#[derive(Debug, Clone)]
pub struct RoomGraph {
    graph: FloorGraph,
    index: HashMap<RoomId, NodeIndex>,
    adjacency: Vec<Vec<EdgeIndex>>,
}

impl RoomGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn node_index(&self, id: &str) -> Result<NodeIndex> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| RouteError::UnknownRoom(id.to_string()))
    }

    pub(crate) fn room_at(&self, node: NodeIndex) -> &Room {
        &self.graph[node]
    }

    pub fn room(&self, id: &str) -> Result<&Room> {
        Ok(self.room_at(self.node_index(id)?))
    }

    /// Passage between two rooms, in either direction.
    pub fn passage(&self, a: &str, b: &str) -> Option<&Passage> {
        let a = *self.index.get(a)?;
        let b = *self.index.get(b)?;
        self.graph.find_edge(a, b).map(|edge| &self.graph[edge])
    }

    /// Neighbours of `node` with edge weights, in edge insertion order.
    pub(crate) fn neighbor_edges(
        &self,
        node: NodeIndex,
    ) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.adjacency[node.index()].iter().filter_map(move |&edge| {
            let (a, b) = self.graph.edge_endpoints(edge)?;
            let other = if a == node { b } else { a };
            Some((other, self.graph[edge].weight))
        })
    }

    /// Neighbouring rooms of `id`, in edge insertion order.
    pub fn neighbors(&self, id: &str) -> Result<Vec<(&Room, &Passage)>> {
        let node = self.node_index(id)?;
        Ok(self.adjacency[node.index()]
            .iter()
            .filter_map(|&edge| {
                let (a, b) = self.graph.edge_endpoints(edge)?;
                let other = if a == node { b } else { a };
                Some((&self.graph[other], &self.graph[edge]))
            })
            .collect())
    }

    /// All passages in insertion order, endpoints as first declared.
    pub fn passages(&self) -> impl Iterator<Item = (&Room, &Room, &Passage)> + '_ {
        self.graph
            .edge_indices()
            .filter_map(move |edge| {
                let (a, b) = self.graph.edge_endpoints(edge)?;
                Some((&self.graph[a], &self.graph[b], &self.graph[edge]))
            })
    }
}

/// Builds a [`RoomGraph`] from a registry and raw adjacency records.
pub struct GraphBuilder<'r, P = StairwellPenalty> {
    registry: &'r RoomRegistry,
    policy: P,
}

impl<'r> GraphBuilder<'r> {
    pub fn new(registry: &'r RoomRegistry) -> Self {
        Self {
            registry,
            policy: StairwellPenalty::default(),
        }
    }
}

impl<'r, P: WeightPolicy> GraphBuilder<'r, P> {
    pub fn with_policy<Q: WeightPolicy>(self, policy: Q) -> GraphBuilder<'r, Q> {
        GraphBuilder {
            registry: self.registry,
            policy,
        }
    }

    /// Build the graph.
    ///
    /// Every registry room becomes a node, isolated ones included. Each
    /// declared link becomes one edge per unordered pair; the first
    /// declaration fixes the endpoint order and the weight.
    ///
    /// # Errors
    /// * `MalformedAdjacency` - a record mentions a room missing from the registry
    /// * `InvalidWeight` - the policy returned a non-positive or non-finite weight
    pub fn build(&self, records: &[AdjacencyRecord]) -> Result<RoomGraph> {
        let mut graph = FloorGraph::with_capacity(self.registry.len(), records.len());
        let mut index = HashMap::with_capacity(self.registry.len());

        for room in self.registry.all_rooms() {
            let node = graph.add_node(room.clone());
            index.insert(room.id.clone(), node);
        }

        let mut adjacency = vec![Vec::new(); graph.node_count()];

        for record in records {
            if record.targets.is_empty() {
                continue;
            }

            let source_node = *index.get(&record.source).ok_or_else(|| {
                RouteError::MalformedAdjacency {
                    source_room: record.source.clone(),
                    target: record.source.clone(),
                }
            })?;

            for target in &record.targets {
                let target_node =
                    *index
                        .get(target)
                        .ok_or_else(|| RouteError::MalformedAdjacency {
                            source_room: record.source.clone(),
                            target: target.clone(),
                        })?;

                if source_node == target_node {
                    debug!("Skipping self link on {}", record.source);
                    continue;
                }

                if graph.find_edge(source_node, target_node).is_some() {
                    continue;
                }

                let (a, b) = (&graph[source_node], &graph[target_node]);
                let weight = self.policy.weight(a, b);
                if !(weight.is_finite() && weight > 0.0) {
                    return Err(RouteError::InvalidWeight {
                        source_room: a.id.clone(),
                        target: b.id.clone(),
                        weight,
                    });
                }

                let passage = Passage {
                    weight,
                    crosses_floors: crosses_floors(a, b),
                };
                let edge = graph.add_edge(source_node, target_node, passage);
                adjacency[source_node.index()].push(edge);
                adjacency[target_node.index()].push(edge);
            }
        }

        info!(
            "Built room graph with {} rooms and {} passages",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(RoomGraph {
            graph,
            index,
            adjacency,
        })
    }
}

/// Build a graph with the default stairwell penalty policy.
pub fn build_graph(registry: &RoomRegistry, records: &[AdjacencyRecord]) -> Result<RoomGraph> {
    GraphBuilder::new(registry).build(records)
}
