//! Stationary defences and their periodic, quota-bounded attacks.

use glam::Vec2;
use path_defence_core::{AttackEffect, DefenceKind, DefenceRecord};
use rand::Rng;

use crate::agent::Agent;

/// A placed defence firing on agents inside its radius.
///
/// The period counter starts at a random offset so defences sharing a period
/// do not fire in lockstep. Within one firing window the defence may land at
/// most `hits_per_period` hits; the counter of hits already landed survives
/// across the rotation rounds of a combat tick and is cleared by [`reset`]
/// once the tick's attacks are done.
///
/// [`reset`]: Defence::reset
#[derive(Clone, Debug)]
pub struct Defence {
    kind: DefenceKind,
    radius: f32,
    period: u32,
    counter: u32,
    effect: AttackEffect,
    hits_per_period: u32,
    hits_done: u32,
    cost: i32,
    position: Vec2,
}

impl Defence {
    /// Places a defence of the given kind, randomizing its initial phase.
    pub fn place(
        kind: DefenceKind,
        record: &DefenceRecord,
        position: Vec2,
        rng: &mut impl Rng,
    ) -> Self {
        let period = record.period.max(1);
        Self {
            kind,
            radius: record.radius,
            period,
            counter: rng.gen_range(0..period),
            effect: record.effect,
            hits_per_period: record.hits_per_period,
            hits_done: 0,
            cost: record.cost,
            position,
        }
    }

    /// Advances the firing counter by one combat tick, wrapping at the period.
    pub fn advance_period(&mut self) {
        self.counter += 1;
        if self.counter >= self.period {
            self.counter = 0;
        }
    }

    /// Whether the defence may attack in the current combat tick.
    #[must_use]
    pub const fn ready(&self) -> bool {
        self.counter == 0 && self.hits_done < self.hits_per_period
    }

    /// Attacks every in-radius agent in the lane, in sequence order, until
    /// the lane or the per-period hit quota is exhausted.
    pub fn attack(&mut self, lane: &mut [Agent]) {
        for agent in lane {
            if self.hits_done == self.hits_per_period {
                break;
            }
            if self.position.distance(agent.position()) >= self.radius {
                continue;
            }
            match self.effect {
                AttackEffect::Damage { force } => {
                    agent.take_hit(force);
                    self.hits_done += 1;
                }
                AttackEffect::Slow { force } => {
                    if !agent.is_frozen() {
                        agent.freeze(force);
                        self.hits_done += 1;
                    }
                }
            }
        }
    }

    /// Clears the per-period hit counter after a combat tick completes.
    pub fn reset(&mut self) {
        self.hits_done = 0;
    }

    /// Catalog kind of the defence.
    #[must_use]
    pub const fn kind(&self) -> DefenceKind {
        self.kind
    }

    /// Position in world coordinates.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Firing radius in world units.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Purchase price paid for the defence.
    #[must_use]
    pub const fn cost(&self) -> i32 {
        self.cost
    }
}
