#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative map state for Path Defence.
//!
//! The [`World`] owns a validated [`PathGraph`](crate::graph::PathGraph)
//! scaled into world coordinates and answers the topology and random-walk
//! queries agents need. All indexed lookups are defensive: node ids are
//! guaranteed valid by construction, but a bad id is reported as
//! [`WorldError::OutOfRange`] rather than allowed to reach a slice access.

pub mod graph;

use glam::Vec2;
use path_defence_core::{NodeId, NodeKind};
use thiserror::Error;

pub use graph::{GraphError, PathGraph, PathNode, MINIMAL_GAP};

/// Defensive failures raised by world lookups.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The node id does not name a node of this world.
    #[error("node {0} lies outside the world")]
    OutOfRange(NodeId),
    /// The world holds no source nodes to draw from.
    #[error("the world holds no source nodes")]
    NoSources,
    /// The node has no forward edge to continue along.
    #[error("node {0} has no forward edge to follow")]
    NoForwardEdge(NodeId),
}

#[derive(Clone, Debug)]
struct WorldNode {
    kind: NodeKind,
    position: Vec2,
    forward: Vec<NodeId>,
}

/// The finalized path graph in world coordinates.
#[derive(Clone, Debug)]
pub struct World {
    dimensions: Vec2,
    nodes: Vec<WorldNode>,
    source_count: usize,
}

impl World {
    /// Builds a world from a validated, source-hoisted graph, scaling the
    /// normalized node positions by the world dimensions once.
    #[must_use]
    pub fn from_graph(graph: PathGraph, dimensions: Vec2) -> Self {
        let source_count = graph.source_count();
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| WorldNode {
                kind: node.kind(),
                position: node.position() * dimensions,
                forward: node.forward().to_vec(),
            })
            .collect();
        Self {
            dimensions,
            nodes,
            source_count,
        }
    }

    fn node(&self, id: NodeId) -> Result<&WorldNode, WorldError> {
        self.nodes.get(id.index()).ok_or(WorldError::OutOfRange(id))
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use path_defence_core::{NodeId, NodeKind, NodeSnapshot, NodeView};
    use rand::Rng;

    use super::{World, WorldError};

    /// World width and height in world units.
    #[must_use]
    pub fn dimensions(world: &World) -> Vec2 {
        world.dimensions
    }

    /// Total number of nodes in the world.
    #[must_use]
    pub fn node_count(world: &World) -> usize {
        world.nodes.len()
    }

    /// Number of source nodes, which occupy the index prefix.
    #[must_use]
    pub fn source_count(world: &World) -> usize {
        world.source_count
    }

    /// Position of a node in world coordinates.
    pub fn position(world: &World, id: NodeId) -> Result<Vec2, WorldError> {
        Ok(world.node(id)?.position)
    }

    /// Role of a node.
    pub fn node_kind(world: &World, id: NodeId) -> Result<NodeKind, WorldError> {
        Ok(world.node(id)?.kind)
    }

    /// Draws a source node uniformly at random from the source prefix.
    pub fn random_source(world: &World, rng: &mut impl Rng) -> Result<NodeId, WorldError> {
        if world.source_count == 0 {
            return Err(WorldError::NoSources);
        }
        Ok(NodeId::new(rng.gen_range(0..world.source_count) as u32))
    }

    /// Draws a forward neighbour of the node uniformly at random.
    pub fn random_forward_neighbour(
        world: &World,
        id: NodeId,
        rng: &mut impl Rng,
    ) -> Result<NodeId, WorldError> {
        let forward = &world.node(id)?.forward;
        if forward.is_empty() {
            return Err(WorldError::NoForwardEdge(id));
        }
        Ok(forward[rng.gen_range(0..forward.len())])
    }

    /// Captures a read-only view of every node for map rendering.
    #[must_use]
    pub fn nodes(world: &World) -> NodeView {
        let snapshots = world
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| NodeSnapshot {
                id: NodeId::new(index as u32),
                kind: node.kind,
                position: node.position,
                forward: node.forward.clone(),
            })
            .collect();
        NodeView::from_snapshots(snapshots)
    }
}
