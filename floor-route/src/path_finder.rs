use crate::error::{Result, RouteError};
use crate::graph_builder::RoomGraph;
use crate::room::RoomId;
use ordered_float::OrderedFloat;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::debug;

/// Shortest route between two rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub path: Vec<RoomId>,
    pub total_weight: f64,
}

/// Dijkstra search over a [`RoomGraph`].
///
/// Ties are resolved deterministically: the frontier pops the lowest
/// distance first and, among equals, the entry pushed first. Neighbours are
/// pushed in edge insertion order and a predecessor is only replaced by a
/// strictly cheaper one, so equal-cost routes follow link declaration order
/// rather than room order.
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'g> {
    graph: &'g RoomGraph,
    max_settled: Option<usize>,
}

impl<'g> PathFinder<'g> {
    pub fn new(graph: &'g RoomGraph) -> Self {
        Self {
            graph,
            max_settled: None,
        }
    }

    /// Give up after settling this many rooms.
    pub fn with_max_settled(mut self, limit: usize) -> Self {
        self.max_settled = Some(limit);
        self
    }

    pub fn shortest_path(&self, source: &str, target: &str) -> Result<Route> {
        let start = self.graph.node_index(source)?;
        let goal = self.graph.node_index(target)?;

        if start == goal {
            return Ok(Route {
                path: vec![source.to_string()],
                total_weight: 0.0,
            });
        }

        let n = self.graph.node_count();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<NodeIndex>> = vec![None; n];
        let mut settled = vec![false; n];
        let mut settled_count = 0usize;
        let mut frontier = BinaryHeap::new();
        let mut push_seq = 0u64;

        dist[start.index()] = 0.0;
        frontier.push(Reverse((OrderedFloat(0.0), push_seq, start.index())));

        while let Some(Reverse((OrderedFloat(d), _, idx))) = frontier.pop() {
            if settled[idx] {
                continue;
            }
            settled[idx] = true;
            settled_count += 1;

            if idx == goal.index() {
                break;
            }

            if let Some(limit) = self.max_settled {
                if settled_count >= limit {
                    return Err(RouteError::SearchLimitExceeded {
                        target: target.to_string(),
                        limit,
                    });
                }
            }

            for (next, weight) in self.graph.neighbor_edges(NodeIndex::new(idx)) {
                let j = next.index();
                if settled[j] {
                    continue;
                }
                let candidate = d + weight;
                if candidate < dist[j] {
                    dist[j] = candidate;
                    prev[j] = Some(NodeIndex::new(idx));
                    push_seq += 1;
                    frontier.push(Reverse((OrderedFloat(candidate), push_seq, j)));
                }
            }
        }

        if !settled[goal.index()] {
            return Err(RouteError::NoPathFound {
                source_room: source.to_string(),
                target: target.to_string(),
            });
        }

        let mut path = Vec::new();
        let mut cursor = Some(goal);
        while let Some(node) = cursor {
            path.push(self.graph.room_at(node).id.clone());
            cursor = prev[node.index()];
        }
        path.reverse();

        debug!(
            "Route {} -> {}: {} rooms, weight {}",
            source,
            target,
            path.len(),
            dist[goal.index()]
        );

        Ok(Route {
            path,
            total_weight: dist[goal.index()],
        })
    }
}

/// Shortest route with no search limit.
pub fn shortest_path(graph: &RoomGraph, source: &str, target: &str) -> Result<Route> {
    PathFinder::new(graph).shortest_path(source, target)
}
