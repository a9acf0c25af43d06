#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session lifecycle of the spawn director.
//!
//! The [`Director`] is the facade session management talks to. It assembles
//! the definition set when a session starts, forwards every tick to the
//! scheduler, replenishes the arena after boss defeats and tears the set down
//! when the session ends. Nothing carries over between sessions.

mod burst;
mod catalog;

pub use burst::initial_burst;
pub use catalog::{cinematic_catalog, joke_catalog, normal_catalog};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use spawn_director_core::{Announcement, Command, DirectorTuning, SessionVariant, WorldSnapshot};
use spawn_director_system_scheduler::{
    DefinitionReport, DryRunReport, Scheduler, SchedulerError, SpawnCeiling, TickOutcome,
};
use tracing::{debug, info};

/// Roll that turns a normal session into the joke session.
const JOKE_ROLL: u32 = 42;

const SESSION_STREAM_LABEL: &str = "session";
const DRY_RUN_STREAM_LABEL: &str = "dry-run";

/// Kind of session actually running after the start-up rolls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SessionKind {
    /// Full escalating catalog.
    Normal,
    /// Showcase loop with a fixed ceiling.
    Cinematic,
    /// Snakes-only novelty session.
    Joke,
}

#[derive(Debug)]
struct Session {
    kind: SessionKind,
    ceiling: SpawnCeiling,
    scheduler: Scheduler,
}

/// Owns the random stream and the active session of the spawn director.
#[derive(Debug)]
pub struct Director {
    tuning: DirectorTuning,
    global_seed: u64,
    sessions_started: u64,
    rng: ChaCha8Rng,
    session: Option<Session>,
}

impl Director {
    /// Creates an idle director. Every session derives its random stream from `global_seed`.
    #[must_use]
    pub fn new(tuning: DirectorTuning, global_seed: u64) -> Self {
        Self {
            tuning,
            global_seed,
            sessions_started: 0,
            rng: ChaCha8Rng::seed_from_u64(global_seed),
            session: None,
        }
    }

    /// Tuning the director was created with.
    #[must_use]
    pub fn tuning(&self) -> &DirectorTuning {
        &self.tuning
    }

    /// Kind of the active session, if any.
    #[must_use]
    pub fn session_kind(&self) -> Option<SessionKind> {
        self.session.as_ref().map(|session| session.kind)
    }

    /// Ceiling the active session targets for the provided world view.
    #[must_use]
    pub fn limit(&self, snapshot: &WorldSnapshot) -> Option<u32> {
        self.session
            .as_ref()
            .map(|session| session.ceiling.limit(snapshot.bosses_defeated))
    }

    /// Number of definitions in the active session.
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |session| session.scheduler.len())
    }

    /// Assembles the definition set for a new session.
    ///
    /// A session that is still running is ended first; its reports are logged
    /// but not returned, so call [`Director::on_session_end`] beforehand to
    /// collect them. Normal sessions may
    /// roll the joke session, which raises [`Announcement::JokeMap`]; normal
    /// sessions that stay normal open with the initial burst.
    pub fn on_session_start(
        &mut self,
        variant: SessionVariant,
        snapshot: &WorldSnapshot,
        out: &mut Vec<Command>,
    ) -> Result<SessionKind, SchedulerError> {
        if self.session.is_some() {
            let _ = self.on_session_end();
        }

        self.sessions_started = self.sessions_started.saturating_add(1);
        let session_seed = derive_session_seed(self.global_seed, self.sessions_started);
        self.rng = ChaCha8Rng::seed_from_u64(derive_labeled_seed(
            session_seed,
            SESSION_STREAM_LABEL,
        ));

        let kind = match variant {
            SessionVariant::Cinematic => SessionKind::Cinematic,
            SessionVariant::Joke => SessionKind::Joke,
            SessionVariant::Normal => {
                if self.rolls_joke() {
                    SessionKind::Joke
                } else {
                    SessionKind::Normal
                }
            }
        };

        let definitions = match kind {
            SessionKind::Normal => normal_catalog(&mut self.rng)?,
            SessionKind::Cinematic => cinematic_catalog()?,
            SessionKind::Joke => joke_catalog()?,
        };
        let scheduler = Scheduler::new(definitions)?;
        let ceiling = SpawnCeiling::for_session(kind == SessionKind::Cinematic, &self.tuning);
        let limit = ceiling.limit(snapshot.bosses_defeated);

        match kind {
            SessionKind::Joke => {
                info!("joke session: snakes only");
                out.push(Command::RaiseAnnouncement {
                    announcement: Announcement::JokeMap,
                    duration_ticks: self.tuning.joke_announcement_ticks,
                });
            }
            SessionKind::Normal => {
                let spawned = initial_burst(limit, snapshot.reference, &mut self.rng, out)?;
                debug!(spawned, limit, "initial burst");
            }
            SessionKind::Cinematic => {}
        }

        info!(
            session = self.sessions_started,
            ?kind,
            definitions = scheduler.len(),
            limit,
            "spawn session started"
        );
        self.session = Some(Session {
            kind,
            ceiling,
            scheduler,
        });
        Ok(kind)
    }

    /// Runs the per-tick decision. Returns [`TickOutcome::Idle`] while no session is active.
    pub fn on_tick(&mut self, snapshot: &WorldSnapshot, out: &mut Vec<Command>) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Idle;
        };
        let limit = session.ceiling.limit(snapshot.bosses_defeated);
        session.scheduler.tick(
            snapshot,
            limit,
            self.tuning.admission_curve_base,
            &mut self.rng,
            out,
        )
    }

    /// Replenishes the arena after a boss defeat. Only normal sessions replenish.
    ///
    /// `snapshot` must already count the defeated boss so the burst fills the
    /// raised ceiling. Returns the number of monsters spawned.
    pub fn on_boss_defeated(
        &mut self,
        snapshot: &WorldSnapshot,
        out: &mut Vec<Command>,
    ) -> Result<u32, SchedulerError> {
        self.replenish(snapshot, out, "boss defeated")
    }

    /// Replenishes the arena after it was cleared, unless a boss is still alive.
    pub fn on_area_cleared(
        &mut self,
        snapshot: &WorldSnapshot,
        out: &mut Vec<Command>,
    ) -> Result<u32, SchedulerError> {
        if snapshot.boss_present {
            return Ok(0);
        }
        self.replenish(snapshot, out, "area cleared")
    }

    /// Discards the definition set and reports every definition that fired.
    ///
    /// Calling it without an active session is a no-op returning no reports.
    pub fn on_session_end(&mut self) -> Vec<DefinitionReport> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        let reports: Vec<DefinitionReport> = session
            .scheduler
            .reports()
            .into_iter()
            .filter(|report| report.firings > 0)
            .collect();
        for report in &reports {
            info!(
                definition = %report.name,
                firings = report.firings,
                spawned = report.spawned,
                priority = report.priority,
                change = report.change,
                "spawn definition statistics"
            );
        }
        info!(session = self.sessions_started, kind = ?session.kind, "spawn session ended");
        reports
    }

    /// Runs the offline cadence evaluation for a fresh catalog of `variant`.
    ///
    /// The live session and its random stream are left untouched. Normal
    /// variants never roll the joke session here.
    pub fn dry_run_session(&self, variant: SessionVariant) -> Result<DryRunReport, SchedulerError> {
        let mut rng = ChaCha8Rng::seed_from_u64(derive_labeled_seed(
            self.global_seed,
            DRY_RUN_STREAM_LABEL,
        ));
        let definitions = match variant {
            SessionVariant::Normal => normal_catalog(&mut rng)?,
            SessionVariant::Cinematic => cinematic_catalog()?,
            SessionVariant::Joke => joke_catalog()?,
        };
        let mut scheduler = Scheduler::new(definitions)?;
        Ok(scheduler.dry_run(
            self.tuning.dry_run_threshold,
            self.tuning.dry_run_max_firings,
        ))
    }

    fn rolls_joke(&mut self) -> bool {
        let odds = self.tuning.joke_odds;
        odds > 0 && self.rng.gen_range(0..odds) == JOKE_ROLL % odds
    }

    fn replenish(
        &mut self,
        snapshot: &WorldSnapshot,
        out: &mut Vec<Command>,
        reason: &'static str,
    ) -> Result<u32, SchedulerError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(0);
        };
        if session.kind != SessionKind::Normal {
            return Ok(0);
        }
        let limit = session.ceiling.limit(snapshot.bosses_defeated);
        let spawned = initial_burst(limit, snapshot.reference, &mut self.rng, out)?;
        info!(reason, spawned, limit, "arena replenished");
        Ok(spawned)
    }
}

fn derive_session_seed(global_seed: u64, session: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(session.to_le_bytes());
    finalize_seed(hasher)
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spawn_director_core::MonsterKind;

    fn snapshot() -> WorldSnapshot {
        WorldSnapshot::default()
    }

    #[test]
    fn idle_director_ticks_without_effect() {
        let mut director = Director::new(DirectorTuning::default(), 1);
        let mut out = Vec::new();
        assert_eq!(director.on_tick(&snapshot(), &mut out), TickOutcome::Idle);
        assert!(out.is_empty());
        assert_eq!(director.session_kind(), None);
    }

    #[test]
    fn session_seeds_differ_per_session_and_seed() {
        assert_ne!(derive_session_seed(7, 1), derive_session_seed(7, 2));
        assert_ne!(derive_session_seed(7, 1), derive_session_seed(8, 1));
        assert_eq!(derive_session_seed(7, 1), derive_session_seed(7, 1));
    }

    #[test]
    fn joke_odds_of_one_always_roll_the_joke() {
        let tuning = DirectorTuning {
            joke_odds: 1,
            ..DirectorTuning::default()
        };
        let mut director = Director::new(tuning, 3);
        let mut out = Vec::new();
        let kind = director
            .on_session_start(SessionVariant::Normal, &snapshot(), &mut out)
            .expect("session");
        assert_eq!(kind, SessionKind::Joke);
        assert_eq!(director.definition_count(), 1);
    }

    #[test]
    fn zero_joke_odds_disable_the_roll() {
        let tuning = DirectorTuning {
            joke_odds: 0,
            ..DirectorTuning::default()
        };
        let mut director = Director::new(tuning, 3);
        let mut out = Vec::new();
        let kind = director
            .on_session_start(SessionVariant::Normal, &snapshot(), &mut out)
            .expect("session");
        assert_eq!(kind, SessionKind::Normal);
    }

    #[test]
    fn restarting_ends_the_previous_session() {
        let mut director = Director::new(DirectorTuning::default(), 4);
        let mut out = Vec::new();
        let _ = director
            .on_session_start(SessionVariant::Cinematic, &snapshot(), &mut out)
            .expect("session");
        let _ = director
            .on_session_start(SessionVariant::Joke, &snapshot(), &mut out)
            .expect("session");
        assert_eq!(director.session_kind(), Some(SessionKind::Joke));
        assert!(director.on_session_end().is_empty());
        assert_eq!(director.session_kind(), None);
    }

    #[test]
    fn area_cleared_waits_for_bosses() {
        let tuning = DirectorTuning {
            joke_odds: 0,
            ..DirectorTuning::default()
        };
        let mut director = Director::new(tuning, 9);
        let mut out = Vec::new();
        let _ = director
            .on_session_start(SessionVariant::Normal, &snapshot(), &mut out)
            .expect("session");
        out.clear();

        let boss = WorldSnapshot {
            boss_present: true,
            ..snapshot()
        };
        assert_eq!(director.on_area_cleared(&boss, &mut out), Ok(0));
        assert!(out.is_empty());

        let spawned = director
            .on_area_cleared(&snapshot(), &mut out)
            .expect("replenish");
        assert!(spawned > 150);
        assert!(out.iter().all(|command| matches!(
            command,
            Command::SpawnMonster {
                kind: MonsterKind::Circle,
                ..
            }
        )));
    }

    #[test]
    fn dry_run_leaves_the_live_session_alone() {
        let mut director = Director::new(DirectorTuning::default(), 12);
        let mut out = Vec::new();
        let _ = director
            .on_session_start(SessionVariant::Cinematic, &snapshot(), &mut out)
            .expect("session");

        let report = director
            .dry_run_session(SessionVariant::Normal)
            .expect("dry run");

        assert_eq!(report.definitions.len(), 23);
        assert!(!report.truncated);
        assert_eq!(director.session_kind(), Some(SessionKind::Cinematic));
        assert_eq!(director.definition_count(), 1);
    }
}
