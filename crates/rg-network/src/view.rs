//! Owned export of the static network for callers outside the engine.

use rg_core::{EdgeId, NodeId, Point};

use crate::network::{NodeKind, TrackNetwork};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeView {
    pub id:   NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub pos:  Point,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeView {
    pub id:        EdgeId,
    pub a:         NodeId,
    pub b:         NodeId,
    pub length_m:  f64,
    pub cost_secs: u32,
}

/// Nodes and edges of a [`TrackNetwork`], in id order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl NetworkView {
    pub fn of(network: &TrackNetwork) -> Self {
        let nodes = (0..network.node_count())
            .map(|i| NodeView {
                id:   NodeId(i as u32),
                name: network.node_name[i].clone(),
                kind: network.node_kind[i],
                pos:  network.node_pos[i],
            })
            .collect();
        let edges = (0..network.edge_count())
            .map(|i| EdgeView {
                id:        EdgeId(i as u32),
                a:         network.edge_a[i],
                b:         network.edge_b[i],
                length_m:  network.edge_length_m[i],
                cost_secs: network.edge_cost_secs[i],
            })
            .collect();
        Self { nodes, edges }
    }
}
