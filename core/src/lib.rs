#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence engine.
//!
//! This crate defines the vocabulary that connects adapters, the path-graph
//! world, and the match engine. Adapters hand the engine already-validated
//! in-memory structures — a stat [`Catalog`], a [`Level`] of spawn waves —
//! and read simulation state back exclusively through snapshot views. The
//! crate owns no behaviour beyond the queue consumption of levels and the
//! index lookups of the catalog.

use std::collections::VecDeque;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Roles a node can play within the path graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Entry node where agents spawn.
    Source,
    /// Intermediate node agents pass through.
    Waypoint,
    /// Terminal node; an arriving agent damages the base and despawns.
    Tower,
}

/// Index of a node within the path graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new node identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the identifier as a slice index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// Catalog index identifying a kind of agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentKind(u32);

impl AgentKind {
    /// Creates a new agent kind with the provided catalog index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric catalog index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the kind as a catalog slice index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Catalog index identifying a kind of defence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefenceKind(u32);

impl DefenceKind {
    /// Creates a new defence kind with the provided catalog index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric catalog index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the kind as a catalog slice index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Effect a defence applies to every agent it hits.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttackEffect {
    /// Subtracts a fixed force from the target's health.
    Damage {
        /// Health points removed per hit.
        force: i32,
    },
    /// Adds a fixed force to the target's freeze counter; targets that are
    /// already frozen are skipped within a single attack call.
    Slow {
        /// Freeze ticks added per hit.
        force: i32,
    },
}

/// Sprite placement data carried through for the rendering collaborator.
///
/// The simulation never interprets these values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteMeta {
    /// Native texture dimensions in pixels.
    pub dimensions: Vec2,
    /// Uniform scale applied when drawing.
    pub scale: f32,
}

impl Default for SpriteMeta {
    fn default() -> Self {
        Self {
            dimensions: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

/// Per-kind statistics for a mobile agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Distance travelled per movement tick, in world units.
    pub speed: f32,
    /// Health the agent spawns with.
    pub health: i32,
    /// Damage inflicted on the base when the agent reaches a tower.
    pub force: i32,
    /// Currency credited when the agent dies.
    pub reward: i32,
    /// Sprite metadata for the rendering collaborator.
    #[serde(default)]
    pub sprite: SpriteMeta,
}

/// Per-kind statistics for a stationary defence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefenceRecord {
    /// Firing radius in world units; the distance test is strictly less-than.
    pub radius: f32,
    /// Combat ticks between firing windows.
    pub period: u32,
    /// Effect applied to each agent hit.
    pub effect: AttackEffect,
    /// Maximum hits the defence may land per period.
    pub hits_per_period: u32,
    /// Purchase price in currency.
    pub cost: i32,
    /// Sprite metadata for the rendering collaborator.
    #[serde(default)]
    pub sprite: SpriteMeta,
}

/// Immutable stat catalog referenced by integer kind indices.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    agents: Vec<AgentRecord>,
    defences: Vec<DefenceRecord>,
}

impl Catalog {
    /// Creates a catalog from the provided record tables.
    #[must_use]
    pub fn new(agents: Vec<AgentRecord>, defences: Vec<DefenceRecord>) -> Self {
        Self { agents, defences }
    }

    /// Looks up the record for an agent kind, if the kind exists.
    #[must_use]
    pub fn agent(&self, kind: AgentKind) -> Option<&AgentRecord> {
        self.agents.get(kind.index())
    }

    /// Looks up the record for a defence kind, if the kind exists.
    #[must_use]
    pub fn defence(&self, kind: DefenceKind) -> Option<&DefenceRecord> {
        self.defences.get(kind.index())
    }

    /// Number of agent kinds in the catalog.
    #[must_use]
    pub fn agent_kind_count(&self) -> usize {
        self.agents.len()
    }

    /// Number of defence kinds in the catalog.
    #[must_use]
    pub fn defence_kind_count(&self) -> usize {
        self.defences.len()
    }
}

/// A batch of identical agents spawned back to back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Kind of agent the group spawns.
    pub kind: AgentKind,
    /// Remaining units in the group.
    pub count: u32,
}

impl Group {
    /// Creates a new spawn group.
    #[must_use]
    pub const fn new(kind: AgentKind, count: u32) -> Self {
        Self { kind, count }
    }
}

/// An ordered queue of spawn groups forming one wave.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Wave {
    groups: VecDeque<Group>,
}

impl Wave {
    /// Creates a wave from the provided groups, consumed front to back.
    #[must_use]
    pub fn from_groups(groups: Vec<Group>) -> Self {
        Self {
            groups: groups.into(),
        }
    }

    /// Reports whether every unit of the wave has been drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.count == 0)
    }

    /// Draws one unit from the front group, discarding exhausted groups.
    pub fn draw_unit(&mut self) -> Option<AgentKind> {
        loop {
            let group = self.groups.front_mut()?;
            if group.count == 0 {
                let _ = self.groups.pop_front();
                continue;
            }
            group.count -= 1;
            let kind = group.kind;
            if group.count == 0 {
                let _ = self.groups.pop_front();
            }
            return Some(kind);
        }
    }
}

/// One spawn unit drawn from the level queues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnDraw {
    /// Kind of agent to spawn.
    pub kind: AgentKind,
    /// True when this unit was the last of the current wave.
    pub wave_exhausted: bool,
}

/// An ordered queue of waves forming one level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Level {
    waves: VecDeque<Wave>,
}

impl Level {
    /// Creates a level from the provided waves, consumed front to back.
    #[must_use]
    pub fn from_waves(waves: Vec<Wave>) -> Self {
        Self {
            waves: waves.into(),
        }
    }

    /// Reports whether every wave of the level has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.iter().all(Wave::is_empty)
    }

    /// Number of waves still queued, including the one being drawn from.
    #[must_use]
    pub fn remaining_waves(&self) -> usize {
        self.waves.len()
    }

    /// Draws one spawn unit, discarding exhausted waves along the way.
    pub fn draw_unit(&mut self) -> Option<SpawnDraw> {
        loop {
            let wave = self.waves.front_mut()?;
            let Some(kind) = wave.draw_unit() else {
                let _ = self.waves.pop_front();
                continue;
            };
            let wave_exhausted = wave.is_empty();
            if wave_exhausted {
                let _ = self.waves.pop_front();
            }
            return Some(SpawnDraw {
                kind,
                wave_exhausted,
            });
        }
    }
}

/// Final state of a match once it ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The match was aborted by the player before a result was reached.
    Interrupted,
    /// Every wave was cleared with base health remaining.
    Victory,
    /// Base health reached zero.
    Failure,
}

/// Immutable representation of a single node used for map rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
    /// Identifier of the node within the world.
    pub id: NodeId,
    /// Role of the node.
    pub kind: NodeKind,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Nodes reachable along a single forward edge.
    pub forward: Vec<NodeId>,
}

/// Read-only view over every node of the world.
#[derive(Clone, Debug, Default)]
pub struct NodeView {
    snapshots: Vec<NodeSnapshot>,
}

impl NodeView {
    /// Creates a view from snapshots already in node-index order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<NodeSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured node snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &NodeSnapshot> {
        self.snapshots.iter()
    }

    /// Number of nodes captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single live agent used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Catalog kind of the agent.
    pub kind: AgentKind,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Remaining health.
    pub health: i32,
    /// Whether the agent is currently frozen in place.
    pub frozen: bool,
}

/// Read-only view over the live agents, in sequence order.
///
/// Sequence order is the partition order used for defence lanes, so the view
/// deliberately never re-sorts its snapshots.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a view from snapshots already in sequence order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<AgentSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured agent snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Number of agents captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single placed defence used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefenceSnapshot {
    /// Catalog kind of the defence.
    pub kind: DefenceKind,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Firing radius in world units.
    pub radius: f32,
}

/// Read-only view over the placed defences, in placement order.
#[derive(Clone, Debug, Default)]
pub struct DefenceView {
    snapshots: Vec<DefenceSnapshot>,
}

impl DefenceView {
    /// Creates a view from snapshots already in placement order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<DefenceSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured defence snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &DefenceSnapshot> {
        self.snapshots.iter()
    }

    /// Number of defences captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no defences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DefenceSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{AgentKind, AgentRecord, Catalog, Group, Level, SpriteMeta, Wave};

    fn record(reward: i32) -> AgentRecord {
        AgentRecord {
            speed: 1.0,
            health: 1,
            force: 1,
            reward,
            sprite: SpriteMeta::default(),
        }
    }

    #[test]
    fn catalog_lookup_misses_on_unknown_kind() {
        let catalog = Catalog::new(vec![record(5)], Vec::new());
        assert!(catalog.agent(AgentKind::new(0)).is_some());
        assert!(catalog.agent(AgentKind::new(1)).is_none());
    }

    #[test]
    fn wave_draws_groups_in_order() {
        let mut wave = Wave::from_groups(vec![
            Group::new(AgentKind::new(0), 2),
            Group::new(AgentKind::new(1), 1),
        ]);

        assert_eq!(wave.draw_unit(), Some(AgentKind::new(0)));
        assert_eq!(wave.draw_unit(), Some(AgentKind::new(0)));
        assert_eq!(wave.draw_unit(), Some(AgentKind::new(1)));
        assert_eq!(wave.draw_unit(), None);
    }

    #[test]
    fn level_reports_wave_boundaries() {
        let mut level = Level::from_waves(vec![
            Wave::from_groups(vec![Group::new(AgentKind::new(0), 2)]),
            Wave::from_groups(vec![Group::new(AgentKind::new(1), 1)]),
        ]);

        let first = level.draw_unit().expect("first unit");
        assert!(!first.wave_exhausted);
        let second = level.draw_unit().expect("second unit");
        assert!(second.wave_exhausted);
        assert!(!level.is_empty());

        let third = level.draw_unit().expect("third unit");
        assert_eq!(third.kind, AgentKind::new(1));
        assert!(third.wave_exhausted);
        assert!(level.is_empty());
        assert_eq!(level.draw_unit(), None);
    }

    #[test]
    fn empty_groups_are_skipped() {
        let mut wave = Wave::from_groups(vec![
            Group::new(AgentKind::new(0), 0),
            Group::new(AgentKind::new(1), 1),
        ]);

        assert_eq!(wave.draw_unit(), Some(AgentKind::new(1)));
        assert_eq!(wave.draw_unit(), None);
    }
}
