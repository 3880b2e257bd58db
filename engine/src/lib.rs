#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match engine for Path Defence.
//!
//! The [`Engine`] owns every live agent and placed defence and advances the
//! match one tick at a time: a spawn step on the spawn cadence, a combat
//! step on the attack cadence, a movement step, and the wave-clear check.
//! The combat step is the concurrency-critical part: ready defences attack
//! disjoint lanes of the agent sequence in rotation rounds, each round a
//! parallel task group joined before the next begins. Range disjointness is
//! enforced structurally — the lanes are non-overlapping `&mut` slices — so
//! no lock guards the agent sequence.

mod agent;
mod defence;
mod lanes;

pub use agent::{Agent, Progress};
pub use defence::Defence;
pub use lanes::LaneTable;

use glam::Vec2;
use path_defence_core::{AgentKind, Catalog, DefenceKind, Level, Outcome};
use path_defence_world::{World, WorldError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Base health the player starts with.
pub const INITIAL_HEALTH: i32 = 200;
/// Currency the player starts with.
pub const INITIAL_MONEY: i32 = 120;
/// Ticks between spawns while a wave is running.
pub const SPAWN_PERIOD: u32 = 30;
/// Ticks between combat steps.
pub const ATTACK_PERIOD: u32 = 15;

/// Tunable match parameters.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Base health the player starts with.
    pub initial_health: i32,
    /// Currency the player starts with.
    pub initial_money: i32,
    /// Ticks between spawns while a wave is running.
    pub spawn_period: u32,
    /// Ticks between combat steps.
    pub attack_period: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_health: INITIAL_HEALTH,
            initial_money: INITIAL_MONEY,
            spawn_period: SPAWN_PERIOD,
            attack_period: ATTACK_PERIOD,
        }
    }
}

/// Unrecoverable internal-consistency faults raised during simulation.
///
/// These indicate an invariant breach — ids are valid by construction — and
/// abort the match rather than risk acting on corrupt state.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SimulationFault {
    /// A world lookup failed mid-simulation.
    #[error(transparent)]
    World(#[from] WorldError),
    /// An agent referenced a kind missing from the catalog.
    #[error("agent kind {0:?} is missing from the catalog")]
    UnknownAgentKind(AgentKind),
}

/// Reasons a defence purchase is refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    /// The requested kind is missing from the catalog.
    #[error("defence kind {0:?} is missing from the catalog")]
    UnknownKind(DefenceKind),
    /// The player cannot afford the defence.
    #[error("insufficient funds: the defence costs {cost}, only {available} available")]
    InsufficientFunds {
        /// Price of the requested defence.
        cost: i32,
        /// Currency currently available.
        available: i32,
    },
}

/// The single owner of all match state, advanced one tick per call.
#[derive(Debug)]
pub struct Engine {
    world: World,
    catalog: Catalog,
    level: Level,
    config: Config,
    agents: Vec<Agent>,
    lanes: LaneTable,
    defences: Vec<Defence>,
    money: i32,
    health: i32,
    spawning: bool,
    fighting: bool,
    spawn_counter: u32,
    attack_counter: u32,
    outcome: Option<Outcome>,
    rng: ChaCha8Rng,
}

impl Engine {
    /// Creates an engine for one match over the provided map and level.
    #[must_use]
    pub fn new(world: World, catalog: Catalog, level: Level, config: Config, seed: u64) -> Self {
        Self {
            world,
            catalog,
            level,
            agents: Vec::new(),
            lanes: LaneTable::new(),
            defences: Vec::new(),
            money: config.initial_money,
            health: config.initial_health,
            spawning: false,
            fighting: false,
            spawn_counter: 1,
            attack_counter: config.attack_period.max(1),
            outcome: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    /// Starts the next wave of the level.
    ///
    /// Returns false when a wave is already running, the match has ended, or
    /// no waves remain.
    pub fn begin_wave(&mut self) -> bool {
        if self.outcome.is_some() || self.fighting || self.level.is_empty() {
            return false;
        }
        self.spawning = true;
        self.fighting = true;
        self.spawn_counter = 1;
        tracing::info!(
            waves_left = self.level.remaining_waves(),
            "wave started"
        );
        true
    }

    /// Records a player-initiated abort. Only called between ticks, never
    /// from inside a combat round, so no partial state can be observed.
    pub fn interrupt(&mut self) {
        if self.outcome.is_none() {
            self.outcome = Some(Outcome::Interrupted);
            tracing::info!("match interrupted");
        }
    }

    /// Purchases and places a defence, opening its lane at the sequence end.
    pub fn place_defence(
        &mut self,
        kind: DefenceKind,
        position: Vec2,
    ) -> Result<(), PurchaseError> {
        let record = self
            .catalog
            .defence(kind)
            .ok_or(PurchaseError::UnknownKind(kind))?;
        if self.money < record.cost {
            return Err(PurchaseError::InsufficientFunds {
                cost: record.cost,
                available: self.money,
            });
        }
        self.money -= record.cost;
        let defence = Defence::place(kind, record, position, &mut self.rng);
        self.defences.push(defence);
        self.lanes.open_lane(self.agents.len());
        tracing::debug!(kind = kind.get(), cost = record.cost, "defence placed");
        Ok(())
    }

    /// Whether the player can currently afford the given defence kind.
    #[must_use]
    pub fn affordable(&self, kind: DefenceKind) -> bool {
        self.catalog
            .defence(kind)
            .map_or(false, |record| record.cost <= self.money)
    }

    /// Advances the match by one tick. A no-op once the match has ended.
    pub fn tick(&mut self) -> Result<(), SimulationFault> {
        if self.outcome.is_some() {
            return Ok(());
        }

        if self.spawning {
            self.spawn_counter -= 1;
            if self.spawn_counter == 0 {
                self.spawn_counter = self.config.spawn_period.max(1);
                self.spawn_step()?;
            }
        }

        self.attack_counter = self.attack_counter.saturating_sub(1);
        if self.attack_counter == 0 {
            self.attack_counter = self.config.attack_period.max(1);
            if !self.defences.is_empty() && !self.agents.is_empty() {
                self.combat_step()?;
            }
        }

        self.movement_step()?;
        self.wave_clear_check();
        Ok(())
    }

    /// Pops one unit from the level queues and inserts the spawned agent at
    /// the rotating lane slot, so fresh spawns spread across defence lanes.
    fn spawn_step(&mut self) -> Result<(), SimulationFault> {
        let Some(draw) = self.level.draw_unit() else {
            self.spawning = false;
            return Ok(());
        };
        if draw.wave_exhausted {
            self.spawning = false;
        }
        let record = self
            .catalog
            .agent(draw.kind)
            .ok_or(SimulationFault::UnknownAgentKind(draw.kind))?;
        let spawned = Agent::spawn(draw.kind, record, &self.world, &mut self.rng)?;
        tracing::debug!(kind = draw.kind.get(), "agent spawned");

        if self.defences.is_empty() {
            self.agents.push(spawned);
        } else {
            let slot = self.lanes.insert_slot();
            self.agents.insert(slot, spawned);
        }
        Ok(())
    }

    /// Runs the rotation rounds of the combat tick, then the quota reset and
    /// the dead-agent cleanup.
    ///
    /// In round `i` every ready defence `j` attacks lane `(j + i) % N`.
    /// Because that mapping is a bijection on the lane indices, the lanes of
    /// one round are pairwise disjoint and the round can fan out to parallel
    /// tasks; the end of the `rayon::scope` is the barrier before the next
    /// round. Rounds stop early once no defence is ready.
    fn combat_step(&mut self) -> Result<(), SimulationFault> {
        for defence in &mut self.defences {
            defence.advance_period();
        }

        let defence_count = self.defences.len();
        for round in 0..defence_count {
            let mut lanes: Vec<Option<&mut [Agent]>> = self
                .lanes
                .split(&mut self.agents)
                .into_iter()
                .map(Some)
                .collect();

            let mut assignments = Vec::new();
            for (index, defence) in self.defences.iter_mut().enumerate() {
                if !defence.ready() {
                    continue;
                }
                let lane_index = (index + round) % defence_count;
                let Some(lane) = lanes.get_mut(lane_index).and_then(Option::take) else {
                    continue;
                };
                assignments.push((defence, lane));
            }
            if assignments.is_empty() {
                break;
            }

            rayon::scope(|scope| {
                for (defence, lane) in assignments {
                    scope.spawn(move |_| defence.attack(lane));
                }
            });
        }

        // The quota reset may overlap the cleanup: the left side touches only
        // defences, the right only agents, lane bounds and the treasury.
        let defences = &mut self.defences;
        let agents = &mut self.agents;
        let lanes = &mut self.lanes;
        let catalog = &self.catalog;
        let (_, reward) = rayon::join(
            || {
                for defence in defences.iter_mut() {
                    defence.reset();
                }
            },
            || clear_dead(agents, lanes, catalog),
        );
        self.money += reward?;
        Ok(())
    }

    /// Advances every agent; arrivals damage the base and leave the field.
    fn movement_step(&mut self) -> Result<(), SimulationFault> {
        let mut index = 0;
        while index < self.agents.len() {
            match self.agents[index].advance(&self.world, &mut self.rng)? {
                Progress::Travelling => index += 1,
                Progress::Arrived => {
                    let kind = self.agents[index].kind();
                    let record = self
                        .catalog
                        .agent(kind)
                        .ok_or(SimulationFault::UnknownAgentKind(kind))?;
                    self.health -= record.force;
                    let _ = self.agents.remove(index);
                    self.lanes.note_removal(index);
                    tracing::debug!(kind = kind.get(), health = self.health, "agent arrived");
                    if self.health <= 0 && self.outcome.is_none() {
                        self.outcome = Some(Outcome::Failure);
                        tracing::info!("base destroyed");
                    }
                }
            }
        }
        Ok(())
    }

    /// Ends the wave once spawning stopped and the field is clear; ends the
    /// match in victory once no waves remain.
    fn wave_clear_check(&mut self) {
        if !self.fighting || self.spawning || !self.agents.is_empty() {
            return;
        }
        self.fighting = false;
        self.spawn_counter = 1;
        self.lanes.reset();
        if self.level.is_empty() {
            if self.outcome.is_none() {
                self.outcome = Some(Outcome::Victory);
                tracing::info!("final wave cleared");
            }
        } else {
            tracing::info!(
                waves_left = self.level.remaining_waves(),
                "wave cleared"
            );
        }
    }
}

/// Removes dead agents, maintaining lane bounds, and sums their rewards.
fn clear_dead(
    agents: &mut Vec<Agent>,
    lanes: &mut LaneTable,
    catalog: &Catalog,
) -> Result<i32, SimulationFault> {
    let mut reward = 0;
    let mut index = 0;
    while index < agents.len() {
        if agents[index].is_alive() {
            index += 1;
            continue;
        }
        let kind = agents[index].kind();
        let record = catalog
            .agent(kind)
            .ok_or(SimulationFault::UnknownAgentKind(kind))?;
        reward += record.reward;
        let _ = agents.remove(index);
        lanes.note_removal(index);
    }
    Ok(reward)
}

/// Query functions that provide read-only access to the match state.
pub mod query {
    use path_defence_core::{
        AgentSnapshot, AgentView, DefenceSnapshot, DefenceView, Outcome,
    };

    use super::Engine;

    /// Captures the live agents in sequence order.
    #[must_use]
    pub fn agent_view(engine: &Engine) -> AgentView {
        let snapshots = engine
            .agents
            .iter()
            .map(|agent| AgentSnapshot {
                kind: agent.kind(),
                position: agent.position(),
                health: agent.health(),
                frozen: agent.is_frozen(),
            })
            .collect();
        AgentView::from_snapshots(snapshots)
    }

    /// Captures the placed defences in placement order.
    #[must_use]
    pub fn defence_view(engine: &Engine) -> DefenceView {
        let snapshots = engine
            .defences
            .iter()
            .map(|defence| DefenceSnapshot {
                kind: defence.kind(),
                position: defence.position(),
                radius: defence.radius(),
            })
            .collect();
        DefenceView::from_snapshots(snapshots)
    }

    /// Currency currently available for purchases.
    #[must_use]
    pub fn money(engine: &Engine) -> i32 {
        engine.money
    }

    /// Remaining base health.
    #[must_use]
    pub fn base_health(engine: &Engine) -> i32 {
        engine.health
    }

    /// Final state of the match, once it has ended.
    #[must_use]
    pub fn outcome(engine: &Engine) -> Option<Outcome> {
        engine.outcome
    }

    /// Whether a wave is currently running.
    #[must_use]
    pub fn wave_active(engine: &Engine) -> bool {
        engine.fighting
    }
}
