//! Mobile agents travelling the path graph one step at a time.

use glam::Vec2;
use path_defence_core::{AgentKind, AgentRecord, NodeId, NodeKind};
use path_defence_world::{query, World, WorldError};
use rand::Rng;

/// Outcome of advancing an agent by one movement tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// The agent is still somewhere on the graph.
    Travelling,
    /// The agent reached a tower and must leave the simulation.
    Arrived,
}

/// A mobile agent walking from a source toward a tower.
///
/// Movement is a per-tick state machine: a frozen agent only thaws, an agent
/// whose step count runs out snaps onto its target node and either arrives
/// or re-targets a random forward neighbour, and every other tick advances
/// the position by the precomputed step vector. The step count truncates the
/// fractional remainder of `distance / speed`; the snap on the final step is
/// the corrective, so mid-edge positions are approximate by design.
#[derive(Clone, Debug)]
pub struct Agent {
    kind: AgentKind,
    health: i32,
    speed: f32,
    position: Vec2,
    target: NodeId,
    step: Vec2,
    steps_left: u32,
    freeze_left: i32,
}

impl Agent {
    /// Spawns an agent at a random source with a random first target.
    pub fn spawn(
        kind: AgentKind,
        record: &AgentRecord,
        world: &World,
        rng: &mut impl Rng,
    ) -> Result<Self, WorldError> {
        let origin = query::random_source(world, rng)?;
        let target = query::random_forward_neighbour(world, origin, rng)?;
        let mut agent = Self {
            kind,
            health: record.health,
            speed: record.speed,
            position: query::position(world, origin)?,
            target,
            step: Vec2::ZERO,
            steps_left: 0,
            freeze_left: 0,
        };
        agent.aim_at(query::position(world, target)?);
        Ok(agent)
    }

    fn aim_at(&mut self, destination: Vec2) {
        let distance = self.position.distance(destination);
        self.step = (destination - self.position) / distance * self.speed;
        self.steps_left = (distance / self.speed) as u32;
    }

    /// Advances the agent by one movement tick.
    pub fn advance(&mut self, world: &World, rng: &mut impl Rng) -> Result<Progress, WorldError> {
        if self.freeze_left > 0 {
            self.freeze_left -= 1;
            return Ok(Progress::Travelling);
        }
        self.steps_left = self.steps_left.saturating_sub(1);
        if self.steps_left == 0 {
            self.position = query::position(world, self.target)?;
            if query::node_kind(world, self.target)? == NodeKind::Tower {
                return Ok(Progress::Arrived);
            }
            self.target = query::random_forward_neighbour(world, self.target, rng)?;
            let destination = query::position(world, self.target)?;
            self.aim_at(destination);
        } else {
            self.position += self.step;
        }
        Ok(Progress::Travelling)
    }

    /// Applies direct damage immediately.
    pub fn take_hit(&mut self, force: i32) {
        self.health -= force;
    }

    /// Extends the freeze counter; repeated slows stack linearly.
    pub fn freeze(&mut self, force: i32) {
        self.freeze_left += force;
    }

    /// Whether the agent is currently frozen in place.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.freeze_left > 0
    }

    /// Whether the agent still has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Catalog kind of the agent.
    #[must_use]
    pub const fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Current position in world coordinates.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }
}

#[cfg(test)]
pub(crate) fn agent_at(position: Vec2, health: i32) -> Agent {
    Agent {
        kind: AgentKind::new(0),
        health,
        speed: 1.0,
        position,
        target: NodeId::new(0),
        step: Vec2::ZERO,
        steps_left: u32::MAX,
        freeze_left: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::{Agent, Progress};
    use glam::Vec2;
    use path_defence_core::{AgentKind, AgentRecord, NodeKind, SpriteMeta};
    use path_defence_world::{graph::MINIMAL_GAP, query, PathGraph, World};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DIMENSIONS: Vec2 = Vec2::new(1000.0, 1000.0);

    fn line_world() -> World {
        let points = vec![
            (NodeKind::Source, Vec2::new(0.0, 0.5)),
            (NodeKind::Waypoint, Vec2::new(0.1, 0.5)),
            (NodeKind::Tower, Vec2::new(0.5, 0.5)),
        ];
        let edges = vec![
            (path_defence_core::NodeId::new(0), path_defence_core::NodeId::new(1)),
            (path_defence_core::NodeId::new(1), path_defence_core::NodeId::new(2)),
        ];
        let graph = PathGraph::assemble(points, &edges)
            .expect("assemble")
            .into_validated(DIMENSIONS, MINIMAL_GAP)
            .expect("validate");
        World::from_graph(graph, DIMENSIONS)
    }

    fn record(speed: f32, health: i32) -> AgentRecord {
        AgentRecord {
            speed,
            health,
            force: 1,
            reward: 1,
            sprite: SpriteMeta::default(),
        }
    }

    #[test]
    fn step_count_truncates_distance_over_speed() {
        // 100 world units at speed 10: snap onto the waypoint on tick ten.
        let world = line_world();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut agent = Agent::spawn(AgentKind::new(0), &record(10.0, 5), &world, &mut rng)
            .expect("spawn");
        assert_eq!(agent.steps_left, 10);

        let waypoint = query::position(&world, path_defence_core::NodeId::new(1))
            .expect("waypoint position");
        for _ in 0..9 {
            assert_eq!(
                agent.advance(&world, &mut rng).expect("advance"),
                Progress::Travelling
            );
            assert_ne!(agent.position(), waypoint);
        }
        assert_eq!(
            agent.advance(&world, &mut rng).expect("advance"),
            Progress::Travelling
        );
        assert_eq!(agent.position(), waypoint);
    }

    #[test]
    fn agent_arrives_at_the_tower() {
        let world = line_world();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut agent = Agent::spawn(AgentKind::new(0), &record(10.0, 5), &world, &mut rng)
            .expect("spawn");

        // 10 steps to the waypoint, then 40 more to the tower.
        let mut ticks = 0;
        loop {
            ticks += 1;
            if agent.advance(&world, &mut rng).expect("advance") == Progress::Arrived {
                break;
            }
            assert!(ticks < 100, "agent never arrived");
        }
        assert_eq!(ticks, 50);
        let tower = query::position(&world, path_defence_core::NodeId::new(2))
            .expect("tower position");
        assert_eq!(agent.position(), tower);
    }

    #[test]
    fn frozen_agent_thaws_without_moving() {
        let world = line_world();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut agent = Agent::spawn(AgentKind::new(0), &record(10.0, 5), &world, &mut rng)
            .expect("spawn");
        let start = agent.position();
        let steps_before = agent.steps_left;

        agent.freeze(3);
        assert!(agent.is_frozen());
        for _ in 0..3 {
            assert_eq!(
                agent.advance(&world, &mut rng).expect("advance"),
                Progress::Travelling
            );
            assert_eq!(agent.position(), start);
            assert_eq!(agent.steps_left, steps_before);
        }
        assert!(!agent.is_frozen());

        let _ = agent.advance(&world, &mut rng).expect("advance");
        assert_ne!(agent.position(), start);
    }

    #[test]
    fn repeated_slows_extend_the_freeze() {
        let world = line_world();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut agent = Agent::spawn(AgentKind::new(0), &record(10.0, 5), &world, &mut rng)
            .expect("spawn");

        agent.freeze(2);
        agent.freeze(2);
        let start = agent.position();
        for _ in 0..4 {
            let _ = agent.advance(&world, &mut rng).expect("advance");
            assert_eq!(agent.position(), start);
        }
        let _ = agent.advance(&world, &mut rng).expect("advance");
        assert_ne!(agent.position(), start);
    }

    #[test]
    fn cumulative_force_kills_exactly_at_health() {
        let world = line_world();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut agent = Agent::spawn(AgentKind::new(0), &record(10.0, 6), &world, &mut rng)
            .expect("spawn");

        agent.take_hit(4);
        assert!(agent.is_alive());
        agent.take_hit(2);
        assert!(!agent.is_alive());
    }
}
