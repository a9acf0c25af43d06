#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the spawn director workspace.
//!
//! This crate defines the message surface that connects the control loop, the
//! authoritative world, and the pure spawning systems. Systems read a
//! [`WorldSnapshot`] captured once per tick and respond exclusively with
//! [`Command`] batches. The world executes those commands via its `apply`
//! entry point and broadcasts [`Event`] values describing what changed.

use std::num::NonZeroU32;

use glam::Vec3;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Fixed rate of the simulation loop that drives the director.
pub const TICKS_PER_SECOND: u32 = 30;

/// Closed set of hostile actor kinds the director can spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Small circle that homes in on the player.
    Circle,
    /// Small triangle.
    SmallTriangle,
    /// Small cube.
    SmallCube,
    /// Large triangle.
    LargeTriangle,
    /// Large cube.
    LargeCube,
    /// Spinning pinwheel.
    PinWheel,
    /// Evasive diamond.
    Diamond,
    /// Multi-segment snake.
    Snake,
    /// Shielder that absorbs shots aimed at its neighbours.
    Shielder,
    /// Shocker that slows the player.
    Shocker,
    /// Fast rocket.
    Rocket,
    /// Spawner that releases further monsters on its own.
    Spawner,
    /// Wormhole that bends the space around it.
    Wormhole,
    /// Egg that hatches into a boss.
    BossEgg,
}

impl MonsterKind {
    /// Every kind in bit order.
    pub const ALL: [MonsterKind; 14] = [
        MonsterKind::Circle,
        MonsterKind::SmallTriangle,
        MonsterKind::SmallCube,
        MonsterKind::LargeTriangle,
        MonsterKind::LargeCube,
        MonsterKind::PinWheel,
        MonsterKind::Diamond,
        MonsterKind::Snake,
        MonsterKind::Shielder,
        MonsterKind::Shocker,
        MonsterKind::Rocket,
        MonsterKind::Spawner,
        MonsterKind::Wormhole,
        MonsterKind::BossEgg,
    ];

    /// Bit occupied by the kind inside a [`KindMask`].
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Reports whether the kind suspends ordinary spawning while alive.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(self, MonsterKind::BossEgg)
    }
}

/// Set of monster kinds eligible for a spawn definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KindMask(u32);

impl KindMask {
    /// Mask with no kinds enabled.
    pub const EMPTY: KindMask = KindMask(0);

    /// Builds a mask from the provided kinds.
    #[must_use]
    pub const fn from_kinds(kinds: &[MonsterKind]) -> Self {
        let mut bits = 0;
        let mut index = 0;
        while index < kinds.len() {
            bits |= kinds[index].bit();
            index += 1;
        }
        Self(bits)
    }

    /// Builds a mask containing a single kind.
    #[must_use]
    pub const fn single(kind: MonsterKind) -> Self {
        Self(kind.bit())
    }

    /// Returns a copy of the mask with the provided kind enabled.
    #[must_use]
    pub const fn with(self, kind: MonsterKind) -> Self {
        Self(self.0 | kind.bit())
    }

    /// Reports whether the provided kind is enabled.
    #[must_use]
    pub const fn contains(self, kind: MonsterKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Reports whether no kind is enabled.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of enabled kinds.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Raw bit representation of the mask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Iterates the enabled kinds in bit order.
    pub fn kinds(self) -> impl Iterator<Item = MonsterKind> {
        MonsterKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl From<MonsterKind> for KindMask {
    fn from(kind: MonsterKind) -> Self {
        Self::single(kind)
    }
}

/// Reasons a count or distance range fails validation.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum RangeError {
    /// The count range was empty or started at zero.
    #[error("spawn count range {min}..={max} must satisfy 1 <= min <= max")]
    InvalidCount {
        /// Requested lower bound.
        min: u32,
        /// Requested upper bound.
        max: u32,
    },
    /// The distance range was inverted, non-positive or not finite.
    #[error("distance range {min}..={max} must be finite, positive and ordered")]
    InvalidDistance {
        /// Requested lower bound.
        min: f32,
        /// Requested upper bound.
        max: f32,
    },
}

/// Inclusive range of monsters spawned by a single firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SpawnCount {
    min: NonZeroU32,
    max: NonZeroU32,
}

impl SpawnCount {
    /// Creates a count range, rejecting zero and inverted bounds.
    pub fn new(min: u32, max: u32) -> Result<Self, RangeError> {
        match (NonZeroU32::new(min), NonZeroU32::new(max)) {
            (Some(lower), Some(upper)) if lower <= upper => Ok(Self {
                min: lower,
                max: upper,
            }),
            _ => Err(RangeError::InvalidCount { min, max }),
        }
    }

    /// Creates a range that always yields the provided count.
    #[must_use]
    pub const fn exactly(count: NonZeroU32) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    /// Smallest count a firing may produce.
    #[must_use]
    pub const fn min(&self) -> NonZeroU32 {
        self.min
    }

    /// Largest count a firing may produce.
    #[must_use]
    pub const fn max(&self) -> NonZeroU32 {
        self.max
    }
}

/// Band of distances, measured from a placement centre, monsters appear at.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DistanceRange {
    min: f32,
    max: f32,
}

impl DistanceRange {
    /// Creates a distance band, rejecting inverted, non-positive or non-finite bounds.
    pub fn new(min: f32, max: f32) -> Result<Self, RangeError> {
        if min.is_finite() && max.is_finite() && min > 0.0 && min <= max {
            Ok(Self { min, max })
        } else {
            Err(RangeError::InvalidDistance { min, max })
        }
    }

    /// Inner edge of the band.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Outer edge of the band.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Distance halfway between the edges.
    #[must_use]
    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    /// Half of the band's width.
    #[must_use]
    pub fn half_span(&self) -> f32 {
        (self.max - self.min) * 0.5
    }
}

impl<'de> Deserialize<'de> for SpawnCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename = "SpawnCount")]
        struct Bounds {
            min: u32,
            max: u32,
        }

        let Bounds { min, max } = Bounds::deserialize(deserializer)?;
        Self::new(min, max).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for DistanceRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename = "DistanceRange")]
        struct Bounds {
            min: f32,
            max: f32,
        }

        let Bounds { min, max } = Bounds::deserialize(deserializer)?;
        Self::new(min, max).map_err(de::Error::custom)
    }
}

/// Location and orientation handed to the spawn primitive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World-space position of the new monster.
    pub position: Vec3,
    /// Unit vector the monster initially faces.
    pub facing: Vec3,
}

impl Pose {
    /// Creates a pose at `position` facing `target`, or `+Z` when both coincide.
    #[must_use]
    pub fn facing_toward(position: Vec3, target: Vec3) -> Self {
        let facing = (target - position).try_normalize().unwrap_or(Vec3::Z);
        Self { position, facing }
    }
}

/// Linear RGB color shared by every monster of a single firing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnColor {
    red: f32,
    green: f32,
    blue: f32,
}

impl SpawnColor {
    /// Creates a color from RGB components in `[0, 1]`.
    #[must_use]
    pub const fn from_rgb(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Converts hue, saturation and value in `[0, 1]` into RGB.
    #[must_use]
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let saturation = saturation.clamp(0.0, 1.0);
        let value = value.clamp(0.0, 1.0);
        let scaled = hue.rem_euclid(1.0) * 6.0;
        let sector = scaled.floor();
        let fraction = scaled - sector;
        let p = value * (1.0 - saturation);
        let q = value * (1.0 - saturation * fraction);
        let t = value * (1.0 - saturation * (1.0 - fraction));
        let (red, green, blue) = match sector as u32 % 6 {
            0 => (value, t, p),
            1 => (q, value, p),
            2 => (p, value, t),
            3 => (p, q, value),
            4 => (t, p, value),
            _ => (value, p, q),
        };
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> f32 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> f32 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> f32 {
        self.blue
    }
}

/// Unique identifier assigned to a monster by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Flavour of play session requested by session management.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionVariant {
    /// Competitive run; rolls the rare joke session at start.
    Normal,
    /// Non-competitive showcase loop behind the main menu.
    Cinematic,
    /// Forces the joke session without rolling for it.
    Joke,
}

/// Named diagnostic values the director reports to the statistics collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Statistic {
    /// Post-update priority of the most recently fired definition.
    SpawningPriority,
    /// Monsters created by the most recent firing.
    MonstersSpawned,
}

/// Announcements the director may raise for the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Announcement {
    /// The session rolled the joke map.
    JokeMap,
}

/// Read-only view of the world captured once before each decision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Monsters currently alive.
    pub monster_count: u32,
    /// Whether any boss-kind monster is alive.
    pub boss_present: bool,
    /// Bosses defeated so far in the session.
    pub bosses_defeated: u32,
    /// Point placements are measured from, normally the player position.
    pub reference: Vec3,
    /// Whether the session is paused.
    pub paused: bool,
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self {
            monster_count: 0,
            boss_present: false,
            bosses_defeated: 0,
            reference: Vec3::ZERO,
            paused: false,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests that the world create a monster.
    SpawnMonster {
        /// Kind of monster to create.
        kind: MonsterKind,
        /// Position and orientation of the new monster.
        pose: Pose,
        /// Color applied to the new monster.
        color: SpawnColor,
    },
    /// Records a diagnostic value. Best effort.
    RecordStatistic {
        /// Name of the statistic.
        statistic: Statistic,
        /// Value to record.
        value: f64,
    },
    /// Shows an announcement to the player. Best effort.
    RaiseAnnouncement {
        /// Announcement to show.
        announcement: Announcement,
        /// How long the announcement stays visible, in ticks.
        duration_ticks: u32,
    },
    /// Removes up to `count` of the oldest non-boss monsters.
    DespawnMonsters {
        /// Maximum number of monsters to remove.
        count: u32,
    },
    /// Kills every boss-kind monster currently alive.
    DefeatBosses,
    /// Moves the player, which is the reference point for placements.
    MovePlayer {
        /// New player position.
        position: Vec3,
    },
    /// Pauses or resumes the session.
    SetPaused {
        /// Whether the session should be paused.
        paused: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a monster was created.
    MonsterSpawned {
        /// Identifier assigned to the monster.
        monster: MonsterId,
        /// Kind of the monster.
        kind: MonsterKind,
        /// Position the monster appeared at.
        position: Vec3,
    },
    /// Confirms that monsters were removed without a boss defeat.
    MonstersDespawned {
        /// Number of monsters removed.
        count: u32,
    },
    /// Announces that a boss was defeated.
    BossDefeated {
        /// Total bosses defeated in the session, including this one.
        bosses_defeated: u32,
    },
    /// Confirms that a statistic was recorded.
    StatisticRecorded {
        /// Name of the statistic.
        statistic: Statistic,
        /// Recorded value.
        value: f64,
    },
    /// Confirms that an announcement was raised.
    AnnouncementRaised {
        /// Announcement that is now visible.
        announcement: Announcement,
        /// Visibility duration in ticks.
        duration_ticks: u32,
    },
    /// Announces that the player moved.
    PlayerMoved {
        /// New player position.
        position: Vec3,
    },
    /// Announces a pause state change.
    PauseChanged {
        /// Whether the session is now paused.
        paused: bool,
    },
}

/// Tunable constants governing the director's ceiling, admission gate and tooling.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectorTuning {
    /// Monster ceiling of a normal session before any boss is defeated.
    pub base_limit: u32,
    /// Ceiling increase per defeated boss.
    pub per_boss_increment: u32,
    /// Fixed ceiling of cinematic sessions.
    pub cinematic_limit: u32,
    /// Base of the admission remap `base^(p - 1)`; larger values suppress spawning harder near the ceiling.
    pub admission_curve_base: f64,
    /// One-in-N odds of rolling the joke session.
    pub joke_odds: u32,
    /// How long the joke announcement stays visible, in ticks.
    pub joke_announcement_ticks: u32,
    /// Priority at which the offline dry run stops.
    pub dry_run_threshold: f64,
    /// Upper bound on dry-run firings.
    pub dry_run_max_firings: u64,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            base_limit: 150,
            per_boss_increment: 20,
            cinematic_limit: 100,
            admission_curve_base: 100.0,
            joke_odds: 1_000,
            joke_announcement_ticks: 120 * TICKS_PER_SECOND,
            dry_run_threshold: 50_000.0,
            dry_run_max_firings: 1_000_000,
        }
    }
}
