//! Spawn definitions and their self-adjusting priority recurrence.

use std::num::NonZeroU32;

use glam::Vec3;
use rand::Rng;
use serde::Serialize;
use spawn_director_core::{
    Command, DistanceRange, KindMask, MonsterKind, Pose, RangeError, SpawnColor, SpawnCount,
};
use spawn_director_system_placement::{place, PlacementPolicy};

/// Smallest increment a firing may add to a definition's priority.
pub const PRIORITY_EPSILON: f64 = 1e-5;

/// Inner edge of the distance band used when a definition does not override it.
pub const DEFAULT_DISTANCE_MIN: f32 = 200.0;

/// Outer edge of the distance band used when a definition does not override it.
pub const DEFAULT_DISTANCE_MAX: f32 = 250.0;

/// Reasons a spawn definition fails validation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    /// No monster kind was enabled.
    #[error("definition `{name}` has an empty kind mask")]
    EmptyKindMask {
        /// Name of the rejected definition.
        name: String,
    },
    /// The count or distance range was malformed.
    #[error("definition `{name}`: {source}")]
    Range {
        /// Name of the rejected definition.
        name: String,
        /// Underlying range violation.
        source: RangeError,
    },
    /// A priority parameter was NaN or infinite.
    #[error("definition `{name}` has a non-finite `{parameter}`")]
    NonFinitePriority {
        /// Name of the rejected definition.
        name: String,
        /// Name of the offending parameter.
        parameter: &'static str,
    },
}

/// Priority state of a definition. The definition with the lowest `current` fires next.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PriorityRecurrence {
    /// Priority at which the definition is due.
    pub current: f64,
    /// Increment applied by the next firing.
    pub change: f64,
    /// Added to `change` after every firing.
    pub additive: f64,
    /// Multiplies `change` after every firing.
    pub multiplier: f64,
}

impl Default for PriorityRecurrence {
    fn default() -> Self {
        Self {
            current: 0.0,
            change: 0.0,
            additive: 0.0,
            multiplier: 1.0,
        }
    }
}

impl PriorityRecurrence {
    /// Applies one step of the recurrence. `current` always grows by at least [`PRIORITY_EPSILON`].
    pub fn advance(&mut self) {
        self.current += self.change.max(PRIORITY_EPSILON);
        self.change += self.additive;
        self.change *= self.multiplier;
    }

    fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("priority", self.current),
            ("change", self.change),
            ("additive", self.additive),
            ("multiplier", self.multiplier),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(parameter, _)| parameter)
    }
}

/// Accumulates the parameters of a [`SpawnDefinition`] before validation.
#[derive(Clone, Debug)]
pub struct DefinitionBuilder {
    name: String,
    kinds: KindMask,
    count: (u32, u32),
    distance: (f32, f32),
    placement: PlacementPolicy,
    priority: PriorityRecurrence,
}

impl DefinitionBuilder {
    /// Sets the inclusive range of monsters spawned per firing.
    #[must_use]
    pub fn count(mut self, min: u32, max: u32) -> Self {
        self.count = (min, max);
        self
    }

    /// Sets the distance band monsters are placed in.
    #[must_use]
    pub fn distance(mut self, min: f32, max: f32) -> Self {
        self.distance = (min, max);
        self
    }

    /// Sets the placement policy.
    #[must_use]
    pub fn placement(mut self, placement: PlacementPolicy) -> Self {
        self.placement = placement;
        self
    }

    /// Sets the initial priority.
    #[must_use]
    pub fn priority(mut self, current: f64) -> Self {
        self.priority.current = current;
        self
    }

    /// Sets the initial per-firing increment.
    #[must_use]
    pub fn change(mut self, change: f64) -> Self {
        self.priority.change = change;
        self
    }

    /// Sets the amount added to the increment after each firing.
    #[must_use]
    pub fn additive(mut self, additive: f64) -> Self {
        self.priority.additive = additive;
        self
    }

    /// Sets the factor applied to the increment after each firing.
    #[must_use]
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.priority.multiplier = multiplier;
        self
    }

    /// Validates the parameters and produces the definition.
    pub fn build(self) -> Result<SpawnDefinition, DefinitionError> {
        if self.kinds.is_empty() {
            return Err(DefinitionError::EmptyKindMask { name: self.name });
        }
        if let Some(parameter) = self.priority.first_non_finite() {
            return Err(DefinitionError::NonFinitePriority {
                name: self.name,
                parameter,
            });
        }
        let ranges = SpawnCount::new(self.count.0, self.count.1).and_then(|count| {
            DistanceRange::new(self.distance.0, self.distance.1).map(|distance| (count, distance))
        });
        let (count, distance) = match ranges {
            Ok(ranges) => ranges,
            Err(source) => {
                return Err(DefinitionError::Range {
                    name: self.name,
                    source,
                })
            }
        };

        Ok(SpawnDefinition {
            name: self.name,
            kinds: self.kinds,
            count,
            distance,
            placement: self.placement,
            priority: self.priority,
            firings: 0,
            spawned: 0,
        })
    }
}

/// Monsters produced by one execution of a definition.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnBatch {
    color: SpawnColor,
    spawns: Vec<(MonsterKind, Pose)>,
}

impl SpawnBatch {
    /// Color shared by every monster in the batch.
    #[must_use]
    pub fn color(&self) -> SpawnColor {
        self.color
    }

    /// Kind and pose of every monster, in spawn order.
    #[must_use]
    pub fn spawns(&self) -> &[(MonsterKind, Pose)] {
        &self.spawns
    }

    /// Number of monsters in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spawns.len()
    }

    /// Reports whether the batch is empty. Executions never produce empty batches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }
}

/// Diagnostic snapshot of a definition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DefinitionReport {
    /// Human-readable name.
    pub name: String,
    /// Kinds the definition spawns.
    pub kinds: KindMask,
    /// Number of priority advances so far.
    pub firings: u64,
    /// Monsters spawned so far.
    pub spawned: u64,
    /// Current priority.
    pub priority: f64,
    /// Increment the next firing will apply.
    pub change: f64,
}

/// Independently scheduled spawn rule: what to spawn, how many, where, and when next.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnDefinition {
    name: String,
    kinds: KindMask,
    count: SpawnCount,
    distance: DistanceRange,
    placement: PlacementPolicy,
    priority: PriorityRecurrence,
    firings: u64,
    spawned: u64,
}

impl SpawnDefinition {
    /// Starts building a definition spawning the provided kinds.
    ///
    /// Defaults: one monster, [`PlacementPolicy::Random`] between
    /// [`DEFAULT_DISTANCE_MIN`] and [`DEFAULT_DISTANCE_MAX`], priority `0`,
    /// change `0`, additive `0`, multiplier `1`.
    #[must_use]
    pub fn builder(name: impl Into<String>, kinds: KindMask) -> DefinitionBuilder {
        DefinitionBuilder {
            name: name.into(),
            kinds,
            count: (1, 1),
            distance: (DEFAULT_DISTANCE_MIN, DEFAULT_DISTANCE_MAX),
            placement: PlacementPolicy::Random,
            priority: PriorityRecurrence::default(),
        }
    }

    /// Human-readable name used in logs and reports.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kinds eligible for this definition. Never empty.
    #[must_use]
    pub fn kinds(&self) -> KindMask {
        self.kinds
    }

    /// Range of monsters spawned per firing.
    #[must_use]
    pub fn count(&self) -> SpawnCount {
        self.count
    }

    /// Distance band monsters are placed in.
    #[must_use]
    pub fn distance(&self) -> DistanceRange {
        self.distance
    }

    /// Placement policy.
    #[must_use]
    pub fn placement(&self) -> PlacementPolicy {
        self.placement
    }

    /// Current priority; lower fires sooner.
    #[must_use]
    pub fn priority(&self) -> f64 {
        self.priority.current
    }

    /// Full priority recurrence state.
    #[must_use]
    pub fn recurrence(&self) -> PriorityRecurrence {
        self.priority
    }

    /// Number of priority advances so far.
    #[must_use]
    pub fn firings(&self) -> u64 {
        self.firings
    }

    /// Monsters spawned so far.
    #[must_use]
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Spawns one batch around `reference`, emitting a [`Command::SpawnMonster`] per monster.
    ///
    /// Does not advance the priority; callers follow up with [`Self::advance_priority`].
    pub fn execute<R>(
        &mut self,
        reference: Vec3,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> SpawnBatch
    where
        R: Rng + ?Sized,
    {
        let drawn = rng.gen_range(self.count.min().get()..=self.count.max().get());
        let count = NonZeroU32::new(drawn).unwrap_or(self.count.min());
        self.spawned = self.spawned.saturating_add(u64::from(count.get()));

        let color = vivid_color(rng);
        let eligible: Vec<MonsterKind> = self.kinds.kinds().collect();
        let kinds: Vec<MonsterKind> = (0..count.get())
            .map(|_| eligible[rng.gen_range(0..eligible.len())])
            .collect();
        let placement = place(self.placement, reference, count, self.distance, rng);

        let spawns: Vec<(MonsterKind, Pose)> = kinds
            .into_iter()
            .zip(placement.into_poses())
            .collect();
        for &(kind, pose) in &spawns {
            out.push(Command::SpawnMonster { kind, pose, color });
        }

        SpawnBatch { color, spawns }
    }

    /// Advances the priority recurrence by one firing.
    pub fn advance_priority(&mut self) {
        self.priority.advance();
        self.firings = self.firings.saturating_add(1);
    }

    /// Advances the priority without spawning. Returns whether the firing stands for a boss cycle.
    pub fn dry_fire(&mut self) -> bool {
        self.advance_priority();
        self.kinds.contains(MonsterKind::BossEgg)
    }

    /// Captures the definition's diagnostic counters.
    #[must_use]
    pub fn report(&self) -> DefinitionReport {
        DefinitionReport {
            name: self.name.clone(),
            kinds: self.kinds,
            firings: self.firings,
            spawned: self.spawned,
            priority: self.priority.current,
            change: self.priority.change,
        }
    }
}

/// Random hue with saturation and value pulled toward the upper half of `[0, 1]`.
fn vivid_color<R>(rng: &mut R) -> SpawnColor
where
    R: Rng + ?Sized,
{
    let hue: f32 = rng.gen();
    let saturation = rng.gen::<f32>().sqrt() * 0.5 + 0.5;
    let value = rng.gen::<f32>().sqrt() * 0.5 + 0.5;
    SpawnColor::from_hsv(hue, saturation, value)
}
