//! Directed path-graph assembly, validation and index normalization.
//!
//! A map arrives here as parsed data: typed nodes with normalized positions
//! and labeled directed edges. Assembly builds the forward and reverse
//! adjacency, validation runs the ordered structural checks that make the
//! graph safe to simulate on, and [`PathGraph::hoist_sources`] reorders the
//! accepted graph so agents can draw a spawn point by a flat random index.

use glam::Vec2;
use path_defence_core::{NodeId, NodeKind};
use thiserror::Error;

/// Minimum scaled coordinate delta an edge must reach on at least one axis.
///
/// Edges shorter than this on both axes would produce degenerate movement
/// segments where the truncated step count collapses to zero.
pub const MINIMAL_GAP: f32 = 50.0;

/// Reasons a candidate map is rejected before it reaches the simulation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// The graph defines no source nodes.
    #[error("the graph defines no source nodes")]
    NoSources,
    /// The graph defines no tower nodes.
    #[error("the graph defines no tower nodes")]
    NoTowers,
    /// An edge references a node outside the graph.
    #[error("edge {from} -> {to} references a node outside the graph")]
    UnknownNode {
        /// Tail of the offending edge.
        from: NodeId,
        /// Head of the offending edge.
        to: NodeId,
    },
    /// An edge connects a node to itself.
    #[error("node {0} carries a self-loop")]
    SelfLoop(NodeId),
    /// Two connected nodes sit closer than the minimal gap on both axes.
    #[error("nodes {from} and {to} sit closer than the minimal gap")]
    NodesTooClose {
        /// Tail of the offending edge.
        from: NodeId,
        /// Head of the offending edge.
        to: NodeId,
    },
    /// A non-tower node has no forward edge, stranding agents.
    #[error("node {0} has no forward edge to follow")]
    DeadEnd(NodeId),
    /// A tower node has an outgoing edge; towers are sinks.
    #[error("tower {0} has an outgoing edge")]
    TowerWithExit(NodeId),
    /// A tower node has no incoming edge.
    #[error("tower {0} has no incoming edge")]
    TowerCutOff(NodeId),
    /// At least one source cannot reach any tower along forward edges.
    #[error("at least one source cannot reach any tower")]
    Disconnected,
}

/// A single node of the path graph with its adjacency.
#[derive(Clone, Debug, PartialEq)]
pub struct PathNode {
    kind: NodeKind,
    position: Vec2,
    forward: Vec<NodeId>,
    reverse: Vec<NodeId>,
}

impl PathNode {
    /// Role of the node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Position in normalized map coordinates.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Nodes reachable along a single forward edge, in declaration order.
    #[must_use]
    pub fn forward(&self) -> &[NodeId] {
        &self.forward
    }

    /// Nodes with an edge into this node, in declaration order.
    #[must_use]
    pub fn reverse(&self) -> &[NodeId] {
        &self.reverse
    }
}

/// Directed graph of typed nodes that agents traverse.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathGraph {
    nodes: Vec<PathNode>,
    source_count: usize,
    tower_count: usize,
}

impl PathGraph {
    /// Builds the adjacency from parsed nodes and labeled directed edges.
    ///
    /// Rejects self-loops and edges naming unknown nodes; duplicate node
    /// markings are the parser's concern and never reach this call.
    pub fn assemble(
        points: Vec<(NodeKind, Vec2)>,
        edges: &[(NodeId, NodeId)],
    ) -> Result<Self, GraphError> {
        let mut source_count = 0;
        let mut tower_count = 0;
        let mut nodes: Vec<PathNode> = points
            .into_iter()
            .map(|(kind, position)| {
                match kind {
                    NodeKind::Source => source_count += 1,
                    NodeKind::Tower => tower_count += 1,
                    NodeKind::Waypoint => {}
                }
                PathNode {
                    kind,
                    position,
                    forward: Vec::new(),
                    reverse: Vec::new(),
                }
            })
            .collect();

        for &(from, to) in edges {
            if from.index() >= nodes.len() || to.index() >= nodes.len() {
                return Err(GraphError::UnknownNode { from, to });
            }
            if from == to {
                return Err(GraphError::SelfLoop(from));
            }
            nodes[from.index()].forward.push(to);
            nodes[to.index()].reverse.push(from);
        }

        Ok(Self {
            nodes,
            source_count,
            tower_count,
        })
    }

    /// Nodes of the graph in index order.
    #[must_use]
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Number of source nodes in the graph.
    #[must_use]
    pub const fn source_count(&self) -> usize {
        self.source_count
    }

    /// Number of tower nodes in the graph.
    #[must_use]
    pub const fn tower_count(&self) -> usize {
        self.tower_count
    }

    /// Runs the ordered validation checks against the provided world size.
    ///
    /// Positions are normalized, so the minimum-separation check scales each
    /// coordinate delta by the world dimensions before comparing.
    pub fn validate(&self, dimensions: Vec2, minimal_gap: f32) -> Result<(), GraphError> {
        if self.source_count == 0 {
            return Err(GraphError::NoSources);
        }
        if self.tower_count == 0 {
            return Err(GraphError::NoTowers);
        }

        for (index, node) in self.nodes.iter().enumerate() {
            for &next in node.forward() {
                let other = &self.nodes[next.index()];
                let delta = (node.position - other.position) * dimensions;
                if delta.x.abs() < minimal_gap && delta.y.abs() < minimal_gap {
                    return Err(GraphError::NodesTooClose {
                        from: NodeId::new(index as u32),
                        to: next,
                    });
                }
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId::new(index as u32);
            if node.kind == NodeKind::Tower {
                if !node.forward.is_empty() {
                    return Err(GraphError::TowerWithExit(id));
                }
                if node.reverse.is_empty() {
                    return Err(GraphError::TowerCutOff(id));
                }
            } else if node.forward.is_empty() {
                return Err(GraphError::DeadEnd(id));
            }
        }

        if !self.sources_connected() {
            return Err(GraphError::Disconnected);
        }
        Ok(())
    }

    /// Reports whether every source can reach some tower along forward edges.
    ///
    /// Verified backwards: a depth-first sweep along reverse edges from every
    /// unvisited tower, succeeding as soon as the union of the sweeps has
    /// visited all sources. No routes are computed.
    #[must_use]
    pub fn sources_connected(&self) -> bool {
        let mut remaining = self.source_count;
        if remaining == 0 {
            return true;
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut stack = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.kind != NodeKind::Tower || visited[index] {
                continue;
            }
            visited[index] = true;
            stack.push(index);
            while let Some(current) = stack.pop() {
                for &prev in self.nodes[current].reverse() {
                    let prev_index = prev.index();
                    if visited[prev_index] {
                        continue;
                    }
                    visited[prev_index] = true;
                    if self.nodes[prev_index].kind == NodeKind::Source {
                        remaining -= 1;
                        if remaining == 0 {
                            return true;
                        }
                    }
                    stack.push(prev_index);
                }
            }
        }
        false
    }

    /// Reorders the nodes so sources occupy the index prefix, remapping all
    /// forward and reverse references consistently.
    ///
    /// The reorder is stable within each group, so spawn logic can draw a
    /// source by a flat random index in `[0, source_count)`.
    pub fn hoist_sources(&mut self) {
        let count = self.nodes.len();
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by_key(|&index| self.nodes[index].kind != NodeKind::Source);

        let mut remap = vec![0u32; count];
        for (new_index, &old_index) in order.iter().enumerate() {
            remap[old_index] = new_index as u32;
        }

        let mut reordered = Vec::with_capacity(count);
        for &old_index in &order {
            let mut node = self.nodes[old_index].clone();
            for next in &mut node.forward {
                *next = NodeId::new(remap[next.index()]);
            }
            for prev in &mut node.reverse {
                *prev = NodeId::new(remap[prev.index()]);
            }
            reordered.push(node);
        }
        self.nodes = reordered;
    }

    /// Validates the graph and normalizes its index layout in one step.
    pub fn into_validated(mut self, dimensions: Vec2, minimal_gap: f32) -> Result<Self, GraphError> {
        self.validate(dimensions, minimal_gap)?;
        self.hoist_sources();
        Ok(self)
    }
}
