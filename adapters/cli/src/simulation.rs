//! Headless session driven against the reference world.

use serde::Serialize;
use spawn_director_core::{Command, Event, SessionVariant, TICKS_PER_SECOND};
use spawn_director_system_scheduler::{DefinitionReport, SchedulerError, TickOutcome};
use spawn_director_system_session::{Director, SessionKind};
use spawn_director_world::{self as world, query, World};
use tracing::{debug, info};

/// Parameters of a headless run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SimulationConfig {
    /// Ticks to simulate.
    pub(crate) ticks: u64,
    /// Session variant requested at start.
    pub(crate) variant: SessionVariant,
    /// Monsters removed once per simulated second, standing in for player kills.
    pub(crate) attrition: u32,
    /// Ticks a boss survives before it is defeated.
    pub(crate) boss_lifetime: u64,
}

/// How many ticks ended in each outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct OutcomeCounts {
    pub(crate) fired: u64,
    pub(crate) gate_rejected: u64,
    pub(crate) at_capacity: u64,
    pub(crate) boss_present: u64,
    pub(crate) paused: u64,
    pub(crate) idle: u64,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: &TickOutcome) {
        let counter = match outcome {
            TickOutcome::Fired(_) => &mut self.fired,
            TickOutcome::GateRejected { .. } => &mut self.gate_rejected,
            TickOutcome::AtCapacity { .. } => &mut self.at_capacity,
            TickOutcome::BossPresent => &mut self.boss_present,
            TickOutcome::Paused => &mut self.paused,
            TickOutcome::Idle => &mut self.idle,
        };
        *counter += 1;
    }
}

/// Result of a headless run.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct SimulationSummary {
    pub(crate) kind: SessionKind,
    pub(crate) ticks: u64,
    pub(crate) outcomes: OutcomeCounts,
    pub(crate) peak_monsters: u32,
    pub(crate) final_monsters: u32,
    pub(crate) spawned_total: u64,
    pub(crate) bosses_defeated: u32,
    pub(crate) final_limit: u32,
    pub(crate) definitions: Vec<DefinitionReport>,
}

/// Runs one session for `config.ticks` ticks and tears it down.
pub(crate) fn run(
    director: &mut Director,
    config: &SimulationConfig,
) -> Result<SimulationSummary, SchedulerError> {
    let mut world = World::new();
    let mut commands = Vec::new();
    let mut events = Vec::new();

    let kind = director.on_session_start(
        config.variant,
        &query::snapshot(&world),
        &mut commands,
    )?;
    apply_all(&mut world, &mut commands, &mut events);

    let mut outcomes = OutcomeCounts::default();
    let mut peak_monsters = query::monster_count(&world);
    let mut boss_since: Option<u64> = None;
    let second = u64::from(TICKS_PER_SECOND);

    for tick in 0..config.ticks {
        if config.attrition > 0 && tick % second == second - 1 {
            commands.push(Command::DespawnMonsters {
                count: config.attrition,
            });
            apply_all(&mut world, &mut commands, &mut events);
        }

        if query::boss_present(&world) {
            let since = *boss_since.get_or_insert(tick);
            if tick.saturating_sub(since) >= config.boss_lifetime {
                commands.push(Command::DefeatBosses);
                apply_all(&mut world, &mut commands, &mut events);
                boss_since = None;
            }
        }
        for event in events.drain(..) {
            if let Event::BossDefeated { bosses_defeated } = event {
                debug!(tick, bosses_defeated, "boss defeated");
                let _ = director.on_boss_defeated(&query::snapshot(&world), &mut commands)?;
            }
        }
        apply_all(&mut world, &mut commands, &mut events);

        let outcome = director.on_tick(&query::snapshot(&world), &mut commands);
        outcomes.record(&outcome);
        apply_all(&mut world, &mut commands, &mut events);
        events.clear();

        peak_monsters = peak_monsters.max(query::monster_count(&world));
    }

    let snapshot = query::snapshot(&world);
    let final_limit = director.limit(&snapshot).unwrap_or(0);
    let definitions = director.on_session_end();
    let summary = SimulationSummary {
        kind,
        ticks: config.ticks,
        outcomes,
        peak_monsters,
        final_monsters: snapshot.monster_count,
        spawned_total: query::spawned_total(&world),
        bosses_defeated: snapshot.bosses_defeated,
        final_limit,
        definitions,
    };
    info!(
        ticks = summary.ticks,
        fired = summary.outcomes.fired,
        peak = summary.peak_monsters,
        bosses = summary.bosses_defeated,
        "simulation finished"
    );
    Ok(summary)
}

fn apply_all(world: &mut World, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
    for command in commands.drain(..) {
        world::apply(world, command, events);
    }
}
