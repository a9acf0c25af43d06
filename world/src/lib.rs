#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative reference world consumed by the spawn director.
//!
//! The world owns the monster population, the player position and the
//! side-channel sinks (statistics and announcements). It mutates only through
//! [`apply`] and exposes read-only state through [`query`].

use std::collections::BTreeMap;

use glam::Vec3;
use spawn_director_core::{
    Announcement, Command, Event, MonsterId, MonsterKind, Pose, SpawnColor, Statistic,
};

/// Monster living in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Monster {
    id: MonsterId,
    kind: MonsterKind,
    pose: Pose,
    color: SpawnColor,
}

impl Monster {
    /// Identifier assigned when the monster spawned.
    #[must_use]
    pub const fn id(&self) -> MonsterId {
        self.id
    }

    /// Kind of the monster.
    #[must_use]
    pub const fn kind(&self) -> MonsterKind {
        self.kind
    }

    /// Pose the monster spawned with.
    #[must_use]
    pub const fn pose(&self) -> Pose {
        self.pose
    }

    /// Color the monster spawned with.
    #[must_use]
    pub const fn color(&self) -> SpawnColor {
        self.color
    }
}

/// Announcement that was raised during the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaisedAnnouncement {
    /// Announcement shown to the player.
    pub announcement: Announcement,
    /// Visibility duration in ticks.
    pub duration_ticks: u32,
}

/// Represents the authoritative world state.
#[derive(Debug, Default)]
pub struct World {
    monsters: Vec<Monster>,
    next_monster: u32,
    spawned_total: u64,
    player: Vec3,
    paused: bool,
    bosses_defeated: u32,
    statistics: BTreeMap<Statistic, f64>,
    announcements: Vec<RaisedAnnouncement>,
}

impl World {
    /// Creates an empty world with the player at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn_monster(&mut self, kind: MonsterKind, pose: Pose, color: SpawnColor) -> MonsterId {
        let id = MonsterId::new(self.next_monster);
        self.next_monster = self.next_monster.wrapping_add(1);
        self.spawned_total = self.spawned_total.saturating_add(1);
        self.monsters.push(Monster {
            id,
            kind,
            pose,
            color,
        });
        id
    }

    fn despawn_oldest(&mut self, count: u32) -> u32 {
        let mut remaining = count;
        self.monsters.retain(|monster| {
            if remaining > 0 && !monster.kind.is_boss() {
                remaining -= 1;
                false
            } else {
                true
            }
        });
        count - remaining
    }

    fn remove_bosses(&mut self) -> u32 {
        let before = self.monsters.len();
        self.monsters.retain(|monster| !monster.kind.is_boss());
        u32::try_from(before - self.monsters.len()).unwrap_or(u32::MAX)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnMonster { kind, pose, color } => {
            let monster = world.spawn_monster(kind, pose, color);
            out_events.push(Event::MonsterSpawned {
                monster,
                kind,
                position: pose.position,
            });
        }
        Command::RecordStatistic { statistic, value } => {
            let _ = world.statistics.insert(statistic, value);
            out_events.push(Event::StatisticRecorded { statistic, value });
        }
        Command::RaiseAnnouncement {
            announcement,
            duration_ticks,
        } => {
            world.announcements.push(RaisedAnnouncement {
                announcement,
                duration_ticks,
            });
            out_events.push(Event::AnnouncementRaised {
                announcement,
                duration_ticks,
            });
        }
        Command::DespawnMonsters { count } => {
            let removed = world.despawn_oldest(count);
            if removed > 0 {
                out_events.push(Event::MonstersDespawned { count: removed });
            }
        }
        Command::DefeatBosses => {
            for _ in 0..world.remove_bosses() {
                world.bosses_defeated = world.bosses_defeated.saturating_add(1);
                out_events.push(Event::BossDefeated {
                    bosses_defeated: world.bosses_defeated,
                });
            }
        }
        Command::MovePlayer { position } => {
            world.player = position;
            out_events.push(Event::PlayerMoved { position });
        }
        Command::SetPaused { paused } => {
            if world.paused != paused {
                world.paused = paused;
                out_events.push(Event::PauseChanged { paused });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec3;
    use spawn_director_core::{Statistic, WorldSnapshot};

    use super::{Monster, RaisedAnnouncement, World};

    /// Captures the view the director reads once per tick.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        WorldSnapshot {
            monster_count: monster_count(world),
            boss_present: boss_present(world),
            bosses_defeated: world.bosses_defeated,
            reference: world.player,
            paused: world.paused,
        }
    }

    /// Monsters currently alive, oldest first.
    #[must_use]
    pub fn monsters(world: &World) -> &[Monster] {
        &world.monsters
    }

    /// Number of monsters currently alive.
    #[must_use]
    pub fn monster_count(world: &World) -> u32 {
        u32::try_from(world.monsters.len()).unwrap_or(u32::MAX)
    }

    /// Reports whether any boss-kind monster is alive.
    #[must_use]
    pub fn boss_present(world: &World) -> bool {
        world.monsters.iter().any(|monster| monster.kind.is_boss())
    }

    /// Bosses defeated so far.
    #[must_use]
    pub fn bosses_defeated(world: &World) -> u32 {
        world.bosses_defeated
    }

    /// Monsters spawned since the world was created.
    #[must_use]
    pub fn spawned_total(world: &World) -> u64 {
        world.spawned_total
    }

    /// Current player position.
    #[must_use]
    pub fn player_position(world: &World) -> Vec3 {
        world.player
    }

    /// Last recorded value of a statistic.
    #[must_use]
    pub fn statistic(world: &World, statistic: Statistic) -> Option<f64> {
        world.statistics.get(&statistic).copied()
    }

    /// Announcements raised so far, in order.
    #[must_use]
    pub fn announcements(world: &World) -> &[RaisedAnnouncement] {
        &world.announcements
    }
}
