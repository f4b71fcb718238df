//! Routing trait and the default occupancy-aware A* implementation.
//!
//! # Pluggability
//!
//! `rg-motion` and `rg-sim` call routing via the [`Router`] trait, so an
//! application can swap in another search without touching the tick loop.
//!
//! # Cost units
//!
//! Costs are integer seconds (`u64`).  A segment held by another train costs
//! its base cost plus the router's `occupied_penalty`; the penalty steers the
//! search around blocks without making them unreachable, so a route only
//! fails outright when the endpoints are disconnected.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use rg_core::{EdgeId, NodeId, TrainId};

use crate::network::TrackNetwork;
use crate::{NetworkError, NetworkResult};

// ── Occupancy view ────────────────────────────────────────────────────────────

/// Read-only view of which train holds which segment.
pub trait EdgeOccupancy {
    fn occupant(&self, edge: EdgeId) -> Option<&TrainId>;

    /// `true` when `edge` is held by a train other than `requester`.
    /// With no requester every held edge counts.
    fn held_by_other(&self, edge: EdgeId, requester: Option<&TrainId>) -> bool {
        match (self.occupant(edge), requester) {
            (None, _)              => false,
            (Some(_), None)        => true,
            (Some(holder), Some(r)) => holder != r,
        }
    }
}

impl EdgeOccupancy for BTreeMap<EdgeId, TrainId> {
    fn occupant(&self, edge: EdgeId) -> Option<&TrainId> {
        self.get(&edge)
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Nodes from source to destination inclusive.
    pub nodes: Vec<NodeId>,
    /// Segments to traverse in order; `edges.len() == nodes.len() - 1`.
    pub edges: Vec<EdgeId>,
    /// Total cost including any occupancy penalties.
    pub total_cost: u64,
    /// Segments on the route that were held by another train when planned.
    pub blocked_edges: Vec<EdgeId>,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// `true` if no segment on the route was occupied at planning time.
    pub fn is_clear(&self) -> bool {
        self.blocked_edges.is_empty()
    }

    /// Physical route length in metres.
    pub fn length_m(&self, network: &TrackNetwork) -> f64 {
        self.edges.iter().map(|&e| network.edge_length(e)).sum()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: the simulation state that owns the
/// router is shared between the tick thread and request threads.
pub trait Router: Send + Sync {
    /// Compute a route from `from` to `to`, penalising segments held by any
    /// train other than `requester`.
    ///
    /// `from == to` yields a trivial route.  Returns
    /// [`NetworkError::NoRoute`] only when the graph is disconnected between
    /// the endpoints.
    fn route(
        &self,
        network:   &TrackNetwork,
        from:      NodeId,
        to:        NodeId,
        occupancy: &dyn EdgeOccupancy,
        requester: Option<&TrainId>,
    ) -> NetworkResult<Route>;
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// A* over the CSR track graph with a straight-line heuristic.
///
/// The frontier is ordered by `(f = g + h, NodeId)`, so ties resolve to the
/// lowest estimated total and then the lowest node id: identical inputs give
/// identical routes.
#[derive(Debug, Clone, Copy)]
pub struct AStarRouter {
    /// Cost added for a segment held by another train.
    pub occupied_penalty: u64,
}

impl AStarRouter {
    pub fn new(occupied_penalty: u64) -> Self {
        Self { occupied_penalty }
    }
}

impl Default for AStarRouter {
    fn default() -> Self {
        Self::new(1_000_000_000)
    }
}

impl Router for AStarRouter {
    fn route(
        &self,
        network:   &TrackNetwork,
        from:      NodeId,
        to:        NodeId,
        occupancy: &dyn EdgeOccupancy,
        requester: Option<&TrainId>,
    ) -> NetworkResult<Route> {
        astar(network, from, to, occupancy, requester, self.occupied_penalty)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

fn astar(
    network:   &TrackNetwork,
    from:      NodeId,
    to:        NodeId,
    occupancy: &dyn EdgeOccupancy,
    requester: Option<&TrainId>,
    penalty:   u64,
) -> NetworkResult<Route> {
    network.check_node(from)?;
    network.check_node(to)?;

    if from == to {
        return Ok(Route { nodes: vec![from], edges: vec![], total_cost: 0, blocked_edges: vec![] });
    }

    let n = network.node_count();
    // g[v] = best known cost to reach v.
    let mut g         = vec![u64::MAX; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    let mut closed    = vec![false; n];

    g[from.index()] = 0;

    // Min-heap on (f, node) via Reverse.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((network.heuristic(from, to), from)));

    while let Some(Reverse((_, node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(network, &prev_edge, from, to, g[to.index()], occupancy, requester));
        }
        // The heuristic is consistent, so a node's first pop is final.
        if closed[node.index()] {
            continue;
        }
        closed[node.index()] = true;

        let base = g[node.index()];
        for (edge, neighbour) in network.neighbours(node) {
            if closed[neighbour.index()] {
                continue;
            }
            let mut w = network.edge_cost_secs[edge.index()] as u64;
            if occupancy.held_by_other(edge, requester) {
                w = w.saturating_add(penalty);
            }
            let cost = base.saturating_add(w);
            if cost < g[neighbour.index()] {
                g[neighbour.index()] = cost;
                prev_edge[neighbour.index()] = edge;
                let f = cost.saturating_add(network.heuristic(neighbour, to));
                heap.push(Reverse((f, neighbour)));
            }
        }
    }

    Err(NetworkError::NoRoute { from, to })
}

fn reconstruct(
    network:   &TrackNetwork,
    prev_edge: &[EdgeId],
    from:      NodeId,
    to:        NodeId,
    total:     u64,
    occupancy: &dyn EdgeOccupancy,
    requester: Option<&TrainId>,
) -> Route {
    let mut nodes = vec![to];
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        edges.push(e);
        cur = network.other_end(e, cur);
        nodes.push(cur);
    }
    nodes.reverse();
    edges.reverse();
    let blocked_edges = edges
        .iter()
        .copied()
        .filter(|&e| occupancy.held_by_other(e, requester))
        .collect();
    Route { nodes, edges, total_cost: total, blocked_edges }
}
