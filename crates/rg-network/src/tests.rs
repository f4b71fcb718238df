//! Unit tests for rg-network.
//!
//! All tests use hand-built networks.

#[cfg(test)]
mod helpers {
    use rg_core::{NodeId, Point};
    use crate::{NodeKind, TrackNetwork, TrackNetworkBuilder};

    /// Diamond with a slow detour:
    ///
    /// ```text
    ///        1
    ///      /   \
    ///    0       3 ── 4
    ///      \   /
    ///        2
    /// ```
    ///
    /// 0-1-3 costs 10+10 s, 0-2-3 costs 15+15 s, 3-4 costs 5 s.
    /// Coordinates are in kilometres.
    pub fn diamond() -> (TrackNetwork, [NodeId; 5]) {
        let mut b = TrackNetworkBuilder::new();
        let n0 = b.add_node("A", NodeKind::Station,  Point::new(0.0, 0.0)).unwrap();
        let n1 = b.add_node("B", NodeKind::Junction, Point::new(1.0, 1.0)).unwrap();
        let n2 = b.add_node("C", NodeKind::Junction, Point::new(1.0, -1.0)).unwrap();
        let n3 = b.add_node("D", NodeKind::Station,  Point::new(2.0, 0.0)).unwrap();
        let n4 = b.add_node("E", NodeKind::Terminus, Point::new(3.0, 0.0)).unwrap();
        b.add_track(n0, n1, 1_500.0, 10).unwrap(); // EdgeId(0)
        b.add_track(n1, n3, 1_500.0, 10).unwrap(); // EdgeId(1)
        b.add_track(n0, n2, 1_500.0, 15).unwrap(); // EdgeId(2)
        b.add_track(n2, n3, 1_500.0, 15).unwrap(); // EdgeId(3)
        b.add_track(n3, n4, 1_000.0, 5).unwrap();  // EdgeId(4)
        (b.build(), [n0, n1, n2, n3, n4])
    }
}

// ── Builder & network structure ────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use rg_core::{EdgeId, NodeId, Point};
    use crate::{NetworkError, NodeKind, TrackNetworkBuilder};

    #[test]
    fn empty_build() {
        let net = TrackNetworkBuilder::new().build();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
    }

    #[test]
    fn one_edge_per_segment_two_half_edges() {
        let (net, [n0, n1, n2, n3, n4]) = super::helpers::diamond();
        assert_eq!(net.edge_count(), 5);
        assert_eq!(net.adj_edge.len(), 10);
        assert_eq!(net.degree(n0), 2);
        assert_eq!(net.degree(n1), 2);
        assert_eq!(net.degree(n2), 2);
        assert_eq!(net.degree(n3), 3);
        assert_eq!(net.degree(n4), 1);
    }

    #[test]
    fn neighbours_are_symmetric() {
        let (net, [n0, n1, ..]) = super::helpers::diamond();
        assert!(net.neighbours(n0).any(|(e, n)| n == n1 && e == EdgeId(0)));
        assert!(net.neighbours(n1).any(|(e, n)| n == n0 && e == EdgeId(0)));
        assert_eq!(net.other_end(EdgeId(0), n0), n1);
        assert_eq!(net.other_end(EdgeId(0), n1), n0);
    }

    #[test]
    fn edge_between_either_direction() {
        let (net, [n0, n1, _, n3, _]) = super::helpers::diamond();
        assert_eq!(net.edge_between(n0, n1), Some(EdgeId(0)));
        assert_eq!(net.edge_between(n1, n0), Some(EdgeId(0)));
        assert_eq!(net.edge_between(n0, n3), None);
        assert_eq!(net.edge_between(n0, NodeId(99)), None);
    }

    #[test]
    fn parallel_tracks_pick_cheapest() {
        let mut b = TrackNetworkBuilder::new();
        let a = b.add_node("a", NodeKind::Station, Point::new(0.0, 0.0)).unwrap();
        let c = b.add_node("c", NodeKind::Station, Point::new(1.0, 0.0)).unwrap();
        b.add_track(a, c, 1_000.0, 90).unwrap();
        let fast = b.add_track(a, c, 1_000.0, 60).unwrap();
        let net = b.build();
        assert_eq!(net.edge_between(a, c), Some(fast));
    }

    #[test]
    fn names_resolve() {
        let (net, [_, n1, ..]) = super::helpers::diamond();
        assert_eq!(net.node_by_name("B"), Some(n1));
        assert_eq!(net.name(n1), "B");
        assert!(matches!(net.node_named("Z"), Err(NetworkError::UnknownNodeName(_))));
    }

    #[test]
    fn rejects_bad_input() {
        let mut b = TrackNetworkBuilder::new();
        let a = b.add_node("a", NodeKind::Station, Point::new(0.0, 0.0)).unwrap();
        assert!(matches!(
            b.add_node("a", NodeKind::Signal, Point::new(1.0, 0.0)),
            Err(NetworkError::DuplicateNodeName(_))
        ));
        let c = b.add_node("c", NodeKind::Station, Point::new(1.0, 0.0)).unwrap();
        assert!(matches!(b.add_track(a, a, 10.0, 1), Err(NetworkError::SelfLoop(_))));
        assert!(matches!(b.add_track(a, c, 0.0, 1), Err(NetworkError::InvalidLength { .. })));
        assert!(matches!(b.add_track(a, c, f64::INFINITY, 1), Err(NetworkError::InvalidLength { .. })));
        assert!(matches!(b.add_track(a, NodeId(7), 10.0, 1), Err(NetworkError::NodeNotFound(_))));
        assert_eq!(b.edge_count(), 0);
    }
}

// ── Heuristic ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod heuristic {
    #[test]
    fn never_overestimates_direct_edges() {
        let (net, _) = super::helpers::diamond();
        for e in 0..net.edge_count() {
            let (a, b) = (net.edge_a[e], net.edge_b[e]);
            assert!(net.heuristic(a, b) <= net.edge_cost_secs[e] as u64);
        }
    }

    #[test]
    fn zero_at_goal() {
        let (net, [_, _, _, n3, _]) = super::helpers::diamond();
        assert_eq!(net.heuristic(n3, n3), 0);
    }

    #[test]
    fn below_true_path_cost() {
        let (net, [n0, _, _, _, n4]) = super::helpers::diamond();
        // Cheapest 0→4 is 10 + 10 + 5 = 25 s.
        assert!(net.heuristic(n0, n4) <= 25);
    }
}

// ── A* routing ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use std::collections::BTreeMap;

    use rg_core::{EdgeId, NodeId, Point, TrainId};
    use crate::{AStarRouter, NetworkError, NodeKind, Router, TrackNetworkBuilder};

    fn free() -> BTreeMap<EdgeId, TrainId> {
        BTreeMap::new()
    }

    #[test]
    fn trivial_same_node() {
        let (net, [n0, ..]) = super::helpers::diamond();
        let r = AStarRouter::default().route(&net, n0, n0, &free(), None).unwrap();
        assert!(r.is_trivial());
        assert_eq!(r.nodes, vec![n0]);
        assert_eq!(r.total_cost, 0);
    }

    #[test]
    fn shortest_path_on_free_network() {
        let (net, [n0, n1, _, n3, n4]) = super::helpers::diamond();
        let r = AStarRouter::default().route(&net, n0, n4, &free(), None).unwrap();
        assert_eq!(r.nodes, vec![n0, n1, n3, n4]);
        assert_eq!(r.edges, vec![EdgeId(0), EdgeId(1), EdgeId(4)]);
        assert_eq!(r.total_cost, 25);
        assert!(r.is_clear());
        assert!((r.length_m(&net) - 4_000.0).abs() < 1e-9);
    }

    #[test]
    fn occupied_edge_is_avoided() {
        let (net, [n0, _, n2, n3, n4]) = super::helpers::diamond();
        let mut occ = free();
        occ.insert(EdgeId(1), TrainId::from("Goods_1"));
        let me = TrainId::from("Express_1");
        let r = AStarRouter::default().route(&net, n0, n4, &occ, Some(&me)).unwrap();
        assert_eq!(r.nodes, vec![n0, n2, n3, n4]);
        assert_eq!(r.total_cost, 35);
        assert!(r.is_clear());
    }

    #[test]
    fn own_occupancy_is_not_penalised() {
        let (net, [n0, n1, _, n3, n4]) = super::helpers::diamond();
        let mut occ = free();
        occ.insert(EdgeId(0), TrainId::from("Express_1"));
        let me = TrainId::from("Express_1");
        let r = AStarRouter::default().route(&net, n0, n4, &occ, Some(&me)).unwrap();
        assert_eq!(r.nodes, vec![n0, n1, n3, n4]);
    }

    #[test]
    fn unavoidable_block_still_routes_with_penalty() {
        let (net, [n0, _, _, n3, n4]) = super::helpers::diamond();
        let mut occ = free();
        occ.insert(EdgeId(4), TrainId::from("Goods_1"));
        let router = AStarRouter::new(1_000);
        let r = router.route(&net, n0, n4, &occ, None).unwrap();
        assert_eq!(r.nodes.last(), Some(&n4));
        assert_eq!(r.blocked_edges, vec![EdgeId(4)]);
        assert_eq!(r.total_cost, 1_025);
        assert!(r.nodes.contains(&n3));
    }

    #[test]
    fn tie_breaks_on_lowest_node_id() {
        // Two equal-cost branches 0→1→3 and 0→2→3 with identical geometry.
        let mut b = TrackNetworkBuilder::new();
        let n0 = b.add_node("s", NodeKind::Station,  Point::new(0.0, 0.0)).unwrap();
        let n1 = b.add_node("u", NodeKind::Junction, Point::new(1.0, 1.0)).unwrap();
        let n2 = b.add_node("l", NodeKind::Junction, Point::new(1.0, -1.0)).unwrap();
        let n3 = b.add_node("t", NodeKind::Station,  Point::new(2.0, 0.0)).unwrap();
        b.add_track(n0, n2, 100.0, 10).unwrap();
        b.add_track(n2, n3, 100.0, 10).unwrap();
        b.add_track(n0, n1, 100.0, 10).unwrap();
        b.add_track(n1, n3, 100.0, 10).unwrap();
        let net = b.build();
        for _ in 0..5 {
            let r = AStarRouter::default().route(&net, n0, n3, &free(), None).unwrap();
            assert_eq!(r.nodes, vec![n0, n1, n3]);
        }
    }

    #[test]
    fn no_route_when_disconnected_regardless_of_occupancy() {
        let mut b = TrackNetworkBuilder::new();
        let a = b.add_node("a", NodeKind::Station, Point::new(0.0, 0.0)).unwrap();
        let c = b.add_node("c", NodeKind::Station, Point::new(1.0, 0.0)).unwrap();
        let d = b.add_node("d", NodeKind::Station, Point::new(2.0, 0.0)).unwrap();
        b.add_track(a, c, 100.0, 10).unwrap();
        let net = b.build();
        let result = AStarRouter::default().route(&net, a, d, &free(), None);
        assert!(matches!(result, Err(NetworkError::NoRoute { .. })));
    }

    #[test]
    fn unknown_node_errors() {
        let (net, [n0, ..]) = super::helpers::diamond();
        let result = AStarRouter::default().route(&net, n0, NodeId(42), &free(), None);
        assert!(matches!(result, Err(NetworkError::NodeNotFound(NodeId(42)))));
    }
}

// ── Export view ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod view {
    use crate::{NetworkView, NodeKind};

    #[test]
    fn view_mirrors_network() {
        let (net, _) = super::helpers::diamond();
        let v = NetworkView::of(&net);
        assert_eq!(v.nodes.len(), 5);
        assert_eq!(v.edges.len(), 5);
        assert_eq!(v.nodes[4].name, "E");
        assert_eq!(v.nodes[4].kind, NodeKind::Terminus);
        assert_eq!(v.edges[4].cost_secs, 5);
        assert_eq!(v, NetworkView::of(&net));
    }
}
