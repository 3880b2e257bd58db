//! Scenario assembly: the already-parsed data an adapter hands the core.
//!
//! A scenario bundles everything one match needs — map nodes and edges in
//! normalized coordinates, both stat catalogs, the wave queues and any
//! defences purchased before the first wave. It can be loaded from a JSON
//! file or synthesised from the built-in demo.

use std::fs;
use std::path::Path;

use anyhow::Context;
use glam::Vec2;
use path_defence_core::{
    AgentKind, AgentRecord, AttackEffect, Catalog, DefenceKind, DefenceRecord, Group, Level,
    NodeId, NodeKind, SpriteMeta, Wave,
};
use path_defence_engine::{Config, Engine};
use path_defence_world::{graph::MINIMAL_GAP, query as world_query, PathGraph, World};
use serde::Deserialize;

/// A complete match description.
#[derive(Debug, Deserialize)]
pub(crate) struct Scenario {
    /// Display name of the map.
    pub(crate) name: String,
    world: Dimensions,
    nodes: Vec<NodeSpec>,
    edges: Vec<(u32, u32)>,
    agent_kinds: Vec<AgentRecord>,
    defence_kinds: Vec<DefenceRecord>,
    waves: Vec<Vec<Group>>,
    #[serde(default)]
    placements: Vec<Placement>,
}

#[derive(Debug, Deserialize)]
struct Dimensions {
    width: f32,
    height: f32,
}

#[derive(Debug, Deserialize)]
struct NodeSpec {
    kind: NodeKind,
    x: f32,
    y: f32,
}

/// A defence purchased before the first wave starts.
#[derive(Debug, Deserialize)]
struct Placement {
    kind: u32,
    x: f32,
    y: f32,
}

/// Reads a scenario from a JSON file.
pub(crate) fn load(path: &Path) -> anyhow::Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing scenario {}", path.display()))
}

/// Built-in demo: two springs feeding a forked road toward one tower.
pub(crate) fn demo() -> Scenario {
    Scenario {
        name: "Twin Springs".to_string(),
        world: Dimensions {
            width: 1000.0,
            height: 740.0,
        },
        nodes: vec![
            NodeSpec {
                kind: NodeKind::Source,
                x: 0.05,
                y: 0.25,
            },
            NodeSpec {
                kind: NodeKind::Source,
                x: 0.05,
                y: 0.75,
            },
            NodeSpec {
                kind: NodeKind::Waypoint,
                x: 0.35,
                y: 0.50,
            },
            NodeSpec {
                kind: NodeKind::Waypoint,
                x: 0.65,
                y: 0.25,
            },
            NodeSpec {
                kind: NodeKind::Waypoint,
                x: 0.65,
                y: 0.75,
            },
            NodeSpec {
                kind: NodeKind::Tower,
                x: 0.95,
                y: 0.50,
            },
        ],
        edges: vec![(0, 2), (1, 2), (2, 3), (2, 4), (3, 5), (4, 5)],
        agent_kinds: vec![
            // Scarab: slow, sturdy, hits hard on arrival.
            AgentRecord {
                speed: 2.0,
                health: 8,
                force: 10,
                reward: 6,
                sprite: SpriteMeta {
                    dimensions: Vec2::new(32.0, 32.0),
                    scale: 1.0,
                },
            },
            // Hornet: fast and fragile.
            AgentRecord {
                speed: 4.0,
                health: 4,
                force: 6,
                reward: 9,
                sprite: SpriteMeta {
                    dimensions: Vec2::new(24.0, 24.0),
                    scale: 1.0,
                },
            },
        ],
        defence_kinds: vec![
            // Unishooter: one precise shot per window.
            DefenceRecord {
                radius: 150.0,
                period: 12,
                effect: AttackEffect::Damage { force: 2 },
                hits_per_period: 1,
                cost: 30,
                sprite: SpriteMeta {
                    dimensions: Vec2::new(48.0, 48.0),
                    scale: 1.0,
                },
            },
            // Multishooter: sprays weak hits across its lane.
            DefenceRecord {
                radius: 120.0,
                period: 15,
                effect: AttackEffect::Damage { force: 1 },
                hits_per_period: 4,
                cost: 45,
                sprite: SpriteMeta {
                    dimensions: Vec2::new(48.0, 48.0),
                    scale: 1.0,
                },
            },
            // Cannon: slow and devastating.
            DefenceRecord {
                radius: 100.0,
                period: 30,
                effect: AttackEffect::Damage { force: 10 },
                hits_per_period: 1,
                cost: 80,
                sprite: SpriteMeta {
                    dimensions: Vec2::new(56.0, 56.0),
                    scale: 1.0,
                },
            },
            // Freezer: no damage, pins agents in place.
            DefenceRecord {
                radius: 130.0,
                period: 20,
                effect: AttackEffect::Slow { force: 30 },
                hits_per_period: 2,
                cost: 50,
                sprite: SpriteMeta {
                    dimensions: Vec2::new(48.0, 48.0),
                    scale: 1.0,
                },
            },
        ],
        waves: vec![
            vec![Group::new(AgentKind::new(0), 6)],
            vec![
                Group::new(AgentKind::new(0), 5),
                Group::new(AgentKind::new(1), 4),
            ],
            vec![Group::new(AgentKind::new(1), 8)],
        ],
        placements: vec![
            Placement {
                kind: 0,
                x: 350.0,
                y: 370.0,
            },
            Placement {
                kind: 3,
                x: 650.0,
                y: 185.0,
            },
            Placement {
                kind: 0,
                x: 650.0,
                y: 555.0,
            },
        ],
    }
}

/// Validates the scenario's map and assembles a ready-to-run engine.
pub(crate) fn build_engine(scenario: Scenario, seed: u64) -> anyhow::Result<Engine> {
    let Scenario {
        name,
        world: size,
        nodes,
        edges,
        agent_kinds,
        defence_kinds,
        waves,
        placements,
    } = scenario;

    anyhow::ensure!(!waves.is_empty(), "scenario '{name}' defines no waves");

    let dimensions = Vec2::new(size.width, size.height);
    let points = nodes
        .into_iter()
        .map(|node| (node.kind, Vec2::new(node.x, node.y)))
        .collect();
    let edges: Vec<(NodeId, NodeId)> = edges
        .into_iter()
        .map(|(from, to)| (NodeId::new(from), NodeId::new(to)))
        .collect();

    let graph = PathGraph::assemble(points, &edges)
        .and_then(|graph| graph.into_validated(dimensions, MINIMAL_GAP))
        .with_context(|| format!("map '{name}' rejected"))?;
    let world = World::from_graph(graph, dimensions);
    tracing::info!(
        nodes = world_query::node_count(&world),
        sources = world_query::source_count(&world),
        "map validated"
    );

    let catalog = Catalog::new(agent_kinds, defence_kinds);
    let level = Level::from_waves(waves.into_iter().map(Wave::from_groups).collect());
    let mut engine = Engine::new(world, catalog, level, Config::default(), seed);

    for placement in &placements {
        engine
            .place_defence(
                DefenceKind::new(placement.kind),
                Vec2::new(placement.x, placement.y),
            )
            .with_context(|| format!("initial placement of defence kind {}", placement.kind))?;
    }
    Ok(engine)
}
