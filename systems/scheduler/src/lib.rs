#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Priority-driven spawn scheduler.
//!
//! The [`Scheduler`] exclusively owns a session's [`SpawnDefinition`]s. Each
//! tick it consults a [`WorldSnapshot`], passes the admission gate, fires the
//! definition with the lowest priority and advances that definition's
//! recurrence. Only one definition fires per tick and the set holds a few
//! dozen entries, so selection is a linear minimum scan.

mod definition;

pub use definition::{
    DefinitionBuilder, DefinitionError, DefinitionReport, PriorityRecurrence, SpawnBatch,
    SpawnDefinition, DEFAULT_DISTANCE_MAX, DEFAULT_DISTANCE_MIN, PRIORITY_EPSILON,
};

use glam::Vec3;
use rand::Rng;
use serde::Serialize;
use spawn_director_core::{Command, DirectorTuning, Statistic, WorldSnapshot};
use tracing::{debug, trace};

/// Failures that terminate the session.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    /// A schedule was built without any definition.
    #[error("spawn schedule contains no definitions")]
    EmptySchedule,
    /// A definition failed validation.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Maximum concurrent monster count the scheduler aims for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SpawnCeiling {
    /// Ceiling that never changes.
    Fixed(u32),
    /// Ceiling that rises with every defeated boss.
    Scaling {
        /// Ceiling before the first boss defeat.
        base: u32,
        /// Increase per defeated boss.
        per_boss: u32,
    },
}

impl SpawnCeiling {
    /// Selects the ceiling for a session from the tuning surface.
    #[must_use]
    pub fn for_session(cinematic: bool, tuning: &DirectorTuning) -> Self {
        if cinematic {
            Self::Fixed(tuning.cinematic_limit)
        } else {
            Self::Scaling {
                base: tuning.base_limit,
                per_boss: tuning.per_boss_increment,
            }
        }
    }

    /// Resolves the ceiling after `bosses_defeated` boss defeats.
    #[must_use]
    pub fn limit(self, bosses_defeated: u32) -> u32 {
        match self {
            Self::Fixed(limit) => limit,
            Self::Scaling { base, per_boss } => {
                base.saturating_add(per_boss.saturating_mul(bosses_defeated))
            }
        }
    }
}

/// Probability that a tick is allowed to fire.
///
/// Linear headroom `p = 1 - count / limit` is remapped through `curve_base^(p - 1)`,
/// which stays near one while the world is far under the ceiling and collapses
/// near it. Returns exactly zero once `count >= limit`.
#[must_use]
pub fn admission_probability(monster_count: u32, limit: u32, curve_base: f64) -> f64 {
    if limit == 0 {
        return 0.0;
    }
    let headroom = 1.0 - f64::from(monster_count) / f64::from(limit);
    if headroom <= 0.0 {
        return 0.0;
    }
    curve_base.powf(headroom - 1.0)
}

/// Result of a single firing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Firing {
    /// Index of the definition that fired.
    pub definition: usize,
    /// Monsters spawned by the firing.
    pub spawned: u32,
    /// Priority of the definition after the firing.
    pub priority: f64,
}

/// What a tick decided.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// No session is active.
    Idle,
    /// The session is paused.
    Paused,
    /// A boss is alive; ordinary spawning is suspended.
    BossPresent,
    /// The world is at or above the ceiling.
    AtCapacity {
        /// Ceiling in effect.
        limit: u32,
    },
    /// The admission draw failed.
    GateRejected {
        /// Admission probability the draw was compared against.
        probability: f64,
    },
    /// A definition fired.
    Fired(Firing),
}

/// Aggregate of an offline dry run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DryRunReport {
    /// Total simulated firings.
    pub firings: u64,
    /// Hypothetical boss defeats counted along the way.
    pub bosses_defeated: u32,
    /// Whether the run hit the firing bound before crossing the threshold.
    pub truncated: bool,
    /// Final state of every definition.
    pub definitions: Vec<DefinitionReport>,
}

/// Owns the active definition set and decides what fires each tick.
#[derive(Clone, Debug)]
pub struct Scheduler {
    definitions: Vec<SpawnDefinition>,
}

impl Scheduler {
    /// Creates a scheduler owning the provided definitions.
    pub fn new(definitions: Vec<SpawnDefinition>) -> Result<Self, SchedulerError> {
        if definitions.is_empty() {
            return Err(SchedulerError::EmptySchedule);
        }
        Ok(Self { definitions })
    }

    /// Number of definitions in the schedule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Reports whether the schedule is empty. Constructed schedules never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Index of the definition due next: the lowest priority, first index on ties.
    #[must_use]
    pub fn next_due(&self) -> usize {
        self.definitions
            .iter()
            .enumerate()
            .min_by(|(_, left), (_, right)| left.priority().total_cmp(&right.priority()))
            .map_or(0, |(index, _)| index)
    }

    /// Runs the per-tick decision: boss gate, ceiling, admission draw, then firing.
    pub fn tick<R>(
        &mut self,
        snapshot: &WorldSnapshot,
        limit: u32,
        curve_base: f64,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> TickOutcome
    where
        R: Rng + ?Sized,
    {
        if snapshot.paused {
            return TickOutcome::Paused;
        }
        if snapshot.boss_present {
            trace!("boss alive, spawning suspended");
            return TickOutcome::BossPresent;
        }

        let probability = admission_probability(snapshot.monster_count, limit, curve_base);
        if probability <= 0.0 {
            trace!(monsters = snapshot.monster_count, limit, "at capacity");
            return TickOutcome::AtCapacity { limit };
        }

        let sample: f64 = rng.gen();
        if sample >= probability {
            trace!(probability, sample, "admission gate rejected tick");
            return TickOutcome::GateRejected { probability };
        }

        TickOutcome::Fired(self.fire(snapshot.reference, rng, out))
    }

    /// Fires the definition due next, bypassing the admission gate.
    pub fn fire<R>(&mut self, reference: Vec3, rng: &mut R, out: &mut Vec<Command>) -> Firing
    where
        R: Rng + ?Sized,
    {
        let index = self.next_due();
        let definition = &mut self.definitions[index];
        let batch = definition.execute(reference, rng, out);
        definition.advance_priority();

        let spawned = u32::try_from(batch.len()).unwrap_or(u32::MAX);
        let priority = definition.priority();
        debug!(
            definition = definition.name(),
            spawned,
            priority,
            "definition fired"
        );
        out.push(Command::RecordStatistic {
            statistic: Statistic::SpawningPriority,
            value: priority,
        });
        out.push(Command::RecordStatistic {
            statistic: Statistic::MonstersSpawned,
            value: f64::from(spawned),
        });

        Firing {
            definition: index,
            spawned,
            priority,
        }
    }

    /// Advances priorities without spawning until the next due priority reaches `threshold`.
    ///
    /// Firings of definitions that include the boss egg count as hypothetical
    /// boss defeats. Stops early after `max_firings`.
    pub fn dry_run(&mut self, threshold: f64, max_firings: u64) -> DryRunReport {
        let mut firings = 0u64;
        let mut bosses_defeated = 0u32;
        let mut truncated = false;

        loop {
            let index = self.next_due();
            if self.definitions[index].priority() >= threshold {
                break;
            }
            if firings >= max_firings {
                truncated = true;
                break;
            }
            if self.definitions[index].dry_fire() {
                bosses_defeated = bosses_defeated.saturating_add(1);
            }
            firings += 1;
        }

        DryRunReport {
            firings,
            bosses_defeated,
            truncated,
            definitions: self.reports(),
        }
    }

    /// Diagnostic snapshot of every definition in schedule order.
    #[must_use]
    pub fn reports(&self) -> Vec<DefinitionReport> {
        self.definitions.iter().map(SpawnDefinition::report).collect()
    }
}
