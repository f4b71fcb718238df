//! Track network representation and builder.
//!
//! # Data layout
//!
//! Track segments are undirected: a segment is one block, whichever way a
//! train runs over it.  Adjacency is stored in **Compressed Sparse Row**
//! format over *half-edges* — each segment appears once in the adjacency of
//! each endpoint.  Given a `NodeId n`, its incident segments occupy:
//!
//! ```text
//! adj_edge[ node_adj_start[n] .. node_adj_start[n+1] ]
//! adj_node[ node_adj_start[n] .. node_adj_start[n+1] ]   // far endpoint
//! ```
//!
//! Per-segment arrays (`edge_a`, `edge_b`, `edge_length_m`,
//! `edge_cost_secs`) are indexed by `EdgeId` in insertion order.
//!
//! The network is immutable once built.  Occupancy lives elsewhere
//! (`rg_motion::OccupancyTable`) so the graph can be shared read-only.

use std::collections::HashMap;

use rg_core::{EdgeId, NodeId, Point};

use crate::{NetworkError, NetworkResult};

/// Role of a node on the line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NodeKind {
    Station,
    Junction,
    Signal,
    Terminus,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Station  => "station",
            NodeKind::Junction => "junction",
            NodeKind::Signal   => "signal",
            NodeKind::Terminus => "terminus",
        }
    }
}

// ── TrackNetwork ──────────────────────────────────────────────────────────────

/// Undirected track graph in CSR format.
///
/// All per-node and per-edge arrays are `pub` for indexed access on hot
/// paths.  Construct through [`TrackNetworkBuilder`].
pub struct TrackNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    pub node_name: Vec<String>,
    pub node_kind: Vec<NodeKind>,
    /// Layout coordinate of each node; feeds the routing heuristic only.
    pub node_pos: Vec<Point>,

    // ── CSR adjacency (half-edges) ────────────────────────────────────────
    /// Row pointer, length `node_count + 1`.
    pub node_adj_start: Vec<u32>,
    /// Incident segment of each half-edge.
    pub adj_edge: Vec<EdgeId>,
    /// Far endpoint of each half-edge.
    pub adj_node: Vec<NodeId>,

    // ── Segment data (indexed by EdgeId) ──────────────────────────────────
    pub edge_a: Vec<NodeId>,
    pub edge_b: Vec<NodeId>,
    /// Physical length in metres.
    pub edge_length_m: Vec<f64>,
    /// Base traversal cost in seconds; the router's edge weight.
    pub edge_cost_secs: Vec<u32>,

    name_index: HashMap<String, NodeId>,

    /// Cost units per map unit of straight-line distance.  The largest factor
    /// for which `scale × distance` never exceeds a real path's cost.
    heuristic_scale: f64,
}

impl TrackNetwork {
    /// A network with no nodes or edges.  Every routing request against it
    /// fails with [`NetworkError::NodeNotFound`].
    pub fn empty() -> Self {
        TrackNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    #[inline]
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        edge.index() < self.edge_count()
    }

    /// `Ok(node)` if the node exists, else [`NetworkError::NodeNotFound`].
    pub fn check_node(&self, node: NodeId) -> NetworkResult<NodeId> {
        if self.contains_node(node) {
            Ok(node)
        } else {
            Err(NetworkError::NodeNotFound(node))
        }
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    /// Like [`node_by_name`](Self::node_by_name) but with an error for
    /// callers that propagate with `?`.
    pub fn node_named(&self, name: &str) -> NetworkResult<NodeId> {
        self.node_by_name(name)
            .ok_or_else(|| NetworkError::UnknownNodeName(name.to_owned()))
    }

    pub fn name(&self, node: NodeId) -> &str {
        &self.node_name[node.index()]
    }

    #[inline]
    pub fn edge_length(&self, edge: EdgeId) -> f64 {
        self.edge_length_m[edge.index()]
    }

    /// Endpoint of `edge` opposite to `node`.
    #[inline]
    pub fn other_end(&self, edge: EdgeId, node: NodeId) -> NodeId {
        let a = self.edge_a[edge.index()];
        if a == node { self.edge_b[edge.index()] } else { a }
    }

    /// `true` if `edge` exists and runs between `a` and `b`, either way.
    pub fn joins(&self, edge: EdgeId, a: NodeId, b: NodeId) -> bool {
        if !self.contains_edge(edge) {
            return false;
        }
        let (ea, eb) = (self.edge_a[edge.index()], self.edge_b[edge.index()]);
        (ea == a && eb == b) || (ea == b && eb == a)
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over `(segment, neighbour)` pairs incident to `node`.
    ///
    /// A contiguous index range — no heap allocation.
    #[inline]
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        let start = self.node_adj_start[node.index()] as usize;
        let end   = self.node_adj_start[node.index() + 1] as usize;
        (start..end).map(|i| (self.adj_edge[i], self.adj_node[i]))
    }

    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        let start = self.node_adj_start[node.index()] as usize;
        let end   = self.node_adj_start[node.index() + 1] as usize;
        end - start
    }

    /// The segment joining `a` and `b`.  With parallel tracks the cheapest
    /// one wins, then the lowest `EdgeId`.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        if !self.contains_node(a) || !self.contains_node(b) {
            return None;
        }
        self.neighbours(a)
            .filter(|&(_, n)| n == b)
            .map(|(e, _)| e)
            .min_by_key(|&e| (self.edge_cost_secs[e.index()], e))
    }

    /// Admissible A* heuristic: a lower bound on the cost from `from` to
    /// `to`, in the same units as `edge_cost_secs`.
    #[inline]
    pub fn heuristic(&self, from: NodeId, to: NodeId) -> u64 {
        let d = self.node_pos[from.index()].distance(self.node_pos[to.index()]);
        (d * self.heuristic_scale).floor() as u64
    }
}

// ── TrackNetworkBuilder ───────────────────────────────────────────────────────

/// Construct a [`TrackNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use rg_core::Point;
/// use rg_network::{NodeKind, TrackNetworkBuilder};
///
/// let mut b = TrackNetworkBuilder::new();
/// let a = b.add_node("Ballari Junction", NodeKind::Station, Point::new(0.0, 0.0)).unwrap();
/// let c = b.add_node("Signal_BLR_1", NodeKind::Signal, Point::new(10.0, 0.0)).unwrap();
/// b.add_track(a, c, 10_000.0, 480).unwrap(); // 10 km, 8 min
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 1);
/// ```
#[derive(Default)]
pub struct TrackNetworkBuilder {
    names:     Vec<String>,
    kinds:     Vec<NodeKind>,
    positions: Vec<Point>,
    tracks:    Vec<RawTrack>,
    index:     HashMap<String, NodeId>,
}

struct RawTrack {
    a:         NodeId,
    b:         NodeId,
    length_m:  f64,
    cost_secs: u32,
}

impl TrackNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its `NodeId` (sequential from 0).  Names must be
    /// unique.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        pos:  Point,
    ) -> NetworkResult<NodeId> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(NetworkError::DuplicateNodeName(name));
        }
        let id = NodeId(self.names.len() as u32);
        self.index.insert(name.clone(), id);
        self.names.push(name);
        self.kinds.push(kind);
        self.positions.push(pos);
        Ok(id)
    }

    /// Add an undirected track segment between `a` and `b`.
    ///
    /// - `length_m`: physical length in metres, finite and > 0.
    /// - `cost_secs`: base traversal cost used as the routing weight.
    pub fn add_track(
        &mut self,
        a:         NodeId,
        b:         NodeId,
        length_m:  f64,
        cost_secs: u32,
    ) -> NetworkResult<EdgeId> {
        for n in [a, b] {
            if n.index() >= self.names.len() {
                return Err(NetworkError::NodeNotFound(n));
            }
        }
        if a == b {
            return Err(NetworkError::SelfLoop(a));
        }
        if !(length_m.is_finite() && length_m > 0.0) {
            return Err(NetworkError::InvalidLength { a, b, length_m });
        }
        let id = EdgeId(self.tracks.len() as u32);
        self.tracks.push(RawTrack { a, b, length_m, cost_secs });
        Ok(id)
    }

    pub fn node_count(&self) -> usize { self.names.len() }
    pub fn edge_count(&self) -> usize { self.tracks.len() }

    /// Consume the builder and produce a [`TrackNetwork`].
    ///
    /// O(E log E) for the half-edge sort.
    pub fn build(self) -> TrackNetwork {
        let node_count = self.names.len();

        // Two half-edges per segment, sorted by source node then segment id
        // so neighbour iteration order is deterministic.
        let mut half: Vec<(NodeId, EdgeId, NodeId)> = Vec::with_capacity(self.tracks.len() * 2);
        for (i, t) in self.tracks.iter().enumerate() {
            let e = EdgeId(i as u32);
            half.push((t.a, e, t.b));
            half.push((t.b, e, t.a));
        }
        half.sort_unstable_by_key(|&(from, e, _)| (from, e));

        let mut node_adj_start = vec![0u32; node_count + 1];
        for &(from, _, _) in &half {
            node_adj_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_adj_start[i] += node_adj_start[i - 1];
        }
        debug_assert_eq!(node_adj_start[node_count] as usize, half.len());

        let adj_edge: Vec<EdgeId> = half.iter().map(|h| h.1).collect();
        let adj_node: Vec<NodeId> = half.iter().map(|h| h.2).collect();

        let heuristic_scale = admissible_scale(&self.positions, &self.tracks);

        TrackNetwork {
            node_name: self.names,
            node_kind: self.kinds,
            node_pos: self.positions,
            node_adj_start,
            adj_edge,
            adj_node,
            edge_a:         self.tracks.iter().map(|t| t.a).collect(),
            edge_b:         self.tracks.iter().map(|t| t.b).collect(),
            edge_length_m:  self.tracks.iter().map(|t| t.length_m).collect(),
            edge_cost_secs: self.tracks.iter().map(|t| t.cost_secs).collect(),
            name_index: self.index,
            heuristic_scale,
        }
    }
}

/// Smallest `cost / straight-line length` over all segments.
///
/// Every segment then costs at least `scale × its chord`, and by the triangle
/// inequality every path costs at least `scale × the straight line` between
/// its endpoints, so the heuristic never overestimates.  Segments whose
/// endpoints share a coordinate impose no bound.  The tiny shrink absorbs
/// floating-point rounding.
fn admissible_scale(positions: &[Point], tracks: &[RawTrack]) -> f64 {
    tracks
        .iter()
        .filter_map(|t| {
            let chord = positions[t.a.index()].distance(positions[t.b.index()]);
            (chord > 0.0).then(|| t.cost_secs as f64 / chord)
        })
        .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |m| m.min(r))))
        .map_or(0.0, |s| s * (1.0 - 1e-9))
}
