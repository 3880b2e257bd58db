//! Property test pitting the reverse-sweep connectivity check against an
//! independent forward breadth-first search.

use std::collections::VecDeque;

use glam::Vec2;
use path_defence_core::{NodeId, NodeKind};
use path_defence_world::PathGraph;
use proptest::prelude::*;

fn kind_of(tag: u8) -> NodeKind {
    match tag % 3 {
        0 => NodeKind::Source,
        1 => NodeKind::Waypoint,
        _ => NodeKind::Tower,
    }
}

/// Forward BFS oracle: does every source reach at least one tower?
fn every_source_reaches_a_tower(graph: &PathGraph) -> bool {
    let nodes = graph.nodes();
    for (start, node) in nodes.iter().enumerate() {
        if node.kind() != NodeKind::Source {
            continue;
        }
        let mut visited = vec![false; nodes.len()];
        visited[start] = true;
        let mut queue = VecDeque::from([start]);
        let mut reached_tower = false;
        while let Some(current) = queue.pop_front() {
            if nodes[current].kind() == NodeKind::Tower {
                reached_tower = true;
                break;
            }
            for next in nodes[current].forward() {
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    queue.push_back(next.index());
                }
            }
        }
        if !reached_tower {
            return false;
        }
    }
    true
}

proptest! {
    #[test]
    fn reverse_sweep_agrees_with_forward_search(
        tags in prop::collection::vec(0u8..3, 1..12),
        raw_edges in prop::collection::vec((0usize..32, 0usize..32), 0..48),
    ) {
        let count = tags.len();
        let points: Vec<(NodeKind, Vec2)> = tags
            .iter()
            .map(|&tag| (kind_of(tag), Vec2::ZERO))
            .collect();
        let edges: Vec<(NodeId, NodeId)> = raw_edges
            .into_iter()
            .map(|(from, to)| (from % count, to % count))
            .filter(|(from, to)| from != to)
            .map(|(from, to)| (NodeId::new(from as u32), NodeId::new(to as u32)))
            .collect();

        let graph = PathGraph::assemble(points, &edges).expect("assembly succeeds");
        prop_assert_eq!(graph.sources_connected(), every_source_reaches_a_tower(&graph));
    }
}
