//! Definition sets assembled at session start.

use rand::Rng;
use spawn_director_core::{KindMask, MonsterKind};
use spawn_director_system_placement::PlacementPolicy;
use spawn_director_system_scheduler::{DefinitionError, SpawnDefinition};

const SMALL_MONSTERS: KindMask = KindMask::from_kinds(&[
    MonsterKind::Circle,
    MonsterKind::SmallTriangle,
    MonsterKind::SmallCube,
]);

const LARGE_MONSTERS: KindMask =
    KindMask::from_kinds(&[MonsterKind::LargeTriangle, MonsterKind::LargeCube]);

const CINEMATIC_KINDS: KindMask = SMALL_MONSTERS
    .with(MonsterKind::LargeTriangle)
    .with(MonsterKind::LargeCube);

/// Multiplier shared by every individually spawned tier.
const INDIVIDUAL_MULTIPLIER: f64 = 1.02;

/// Single-monster definition whose first firing is drawn from a priority window.
struct Individual {
    name: &'static str,
    kinds: KindMask,
    priority: (f64, f64),
    change: f64,
    additive: f64,
}

const INDIVIDUALS: [Individual; 9] = [
    Individual {
        name: "individual small monsters",
        kinds: SMALL_MONSTERS,
        priority: (0.0, 0.0),
        change: 1.0,
        additive: 0.001,
    },
    Individual {
        name: "individual large monsters",
        kinds: LARGE_MONSTERS,
        priority: (50.0, 50.0),
        change: 1.0,
        additive: 0.001,
    },
    Individual {
        name: "individual pinwheels",
        kinds: KindMask::single(MonsterKind::PinWheel),
        priority: (200.0, 400.0),
        change: 27.0,
        additive: 0.01,
    },
    Individual {
        name: "individual diamonds",
        kinds: KindMask::single(MonsterKind::Diamond),
        priority: (300.0, 500.0),
        change: 42.0,
        additive: 0.1,
    },
    Individual {
        name: "individual snakes",
        kinds: KindMask::single(MonsterKind::Snake),
        priority: (1_000.0, 2_500.0),
        change: 133.0,
        additive: 1.0,
    },
    Individual {
        name: "individual shielders",
        kinds: KindMask::single(MonsterKind::Shielder),
        priority: (1_000.0, 2_500.0),
        change: 127.0,
        additive: 1.0,
    },
    Individual {
        name: "individual shockers",
        kinds: KindMask::single(MonsterKind::Shocker),
        priority: (2_500.0, 3_500.0),
        change: 143.0,
        additive: 1.0,
    },
    Individual {
        name: "individual rockets",
        kinds: KindMask::single(MonsterKind::Rocket),
        priority: (2_500.0, 3_500.0),
        change: 111.0,
        additive: 1.0,
    },
    Individual {
        name: "individual spawners",
        kinds: KindMask::single(MonsterKind::Spawner),
        priority: (2_500.0, 3_500.0),
        change: 122.0,
        additive: 1.0,
    },
];

/// Grouped spawn of a single kind.
struct Group {
    name: &'static str,
    kinds: KindMask,
    count: (u32, u32),
    priority: (f64, f64),
    additive: (f64, f64),
}

const GROUPS: [Group; 5] = [
    Group {
        name: "circle groups",
        kinds: KindMask::single(MonsterKind::Circle),
        count: (10, 20),
        priority: (400.0, 600.0),
        additive: (1.0, 10.0),
    },
    Group {
        name: "large triangle groups",
        kinds: KindMask::single(MonsterKind::LargeTriangle),
        count: (5, 15),
        priority: (1_000.0, 1_500.0),
        additive: (1.0, 10.0),
    },
    Group {
        name: "large cube groups",
        kinds: KindMask::single(MonsterKind::LargeCube),
        count: (5, 15),
        priority: (1_000.0, 1_500.0),
        additive: (1.0, 10.0),
    },
    Group {
        name: "pinwheel groups",
        kinds: KindMask::single(MonsterKind::PinWheel),
        count: (2, 4),
        priority: (2_000.0, 3_000.0),
        additive: (5.0, 15.0),
    },
    Group {
        name: "diamond groups",
        kinds: KindMask::single(MonsterKind::Diamond),
        count: (3, 7),
        priority: (2_000.0, 3_000.0),
        additive: (5.0, 15.0),
    },
];

/// Builds the escalating catalog of a normal session.
///
/// Four tiers: individually spawned kinds with a fast ramp, grouped spawns,
/// late formations whose first priority sits far above the early tiers, and
/// the boss egg with a geometric interval. Randomized windows give every
/// session a slightly different pacing.
pub fn normal_catalog<R>(rng: &mut R) -> Result<Vec<SpawnDefinition>, DefinitionError>
where
    R: Rng + ?Sized,
{
    let mut definitions = Vec::with_capacity(INDIVIDUALS.len() + GROUPS.len() + 9);

    for individual in &INDIVIDUALS {
        definitions.push(
            SpawnDefinition::builder(individual.name, individual.kinds)
                .priority(between(rng, individual.priority))
                .change(individual.change)
                .additive(individual.additive)
                .multiplier(INDIVIDUAL_MULTIPLIER)
                .build()?,
        );
    }

    for group in &GROUPS {
        definitions.push(
            SpawnDefinition::builder(group.name, group.kinds)
                .count(group.count.0, group.count.1)
                .placement(PlacementPolicy::Grouped)
                .priority(between(rng, group.priority))
                .change(between(rng, (200.0, 300.0)))
                .additive(between(rng, group.additive))
                .build()?,
        );
    }

    definitions.push(
        SpawnDefinition::builder("mixed group", LARGE_MONSTERS.with(MonsterKind::Diamond))
            .count(20, 25)
            .placement(PlacementPolicy::Grouped)
            .priority(between(rng, (4_000.0, 6_000.0)))
            .change(between(rng, (200.0, 300.0)))
            .additive(between(rng, (5.0, 15.0)))
            .build()?,
    );
    definitions.push(
        SpawnDefinition::builder(
            "mixed around",
            KindMask::from_kinds(&[
                MonsterKind::PinWheel,
                MonsterKind::Snake,
                MonsterKind::Shielder,
                MonsterKind::Shocker,
                MonsterKind::Rocket,
            ]),
        )
        .count(5, 10)
        .placement(PlacementPolicy::Around)
        .distance(160.0, 190.0)
        .priority(between(rng, (5_000.0, 7_000.0)))
        .change(between(rng, (200.0, 300.0)))
        .additive(between(rng, (5.0, 15.0)))
        .build()?,
    );
    definitions.push(
        SpawnDefinition::builder("rockets wall", KindMask::single(MonsterKind::Rocket))
            .count(10, 15)
            .placement(PlacementPolicy::Line)
            .priority(between(rng, (5_000.0, 7_000.0)))
            .change(between(rng, (800.0, 1_200.0)))
            .additive(between(rng, (20.0, 60.0)))
            .build()?,
    );
    definitions.push(
        SpawnDefinition::builder("shielders wall", KindMask::single(MonsterKind::Shielder))
            .count(10, 15)
            .placement(PlacementPolicy::Line)
            .priority(between(rng, (6_000.0, 8_000.0)))
            .change(between(rng, (800.0, 1_200.0)))
            .additive(between(rng, (20.0, 60.0)))
            .build()?,
    );
    definitions.push(
        SpawnDefinition::builder("rockets circle", KindMask::single(MonsterKind::Rocket))
            .count(30, 50)
            .placement(PlacementPolicy::Around)
            .priority(between(rng, (7_000.0, 9_000.0)))
            .change(between(rng, (800.0, 1_200.0)))
            .additive(between(rng, (20.0, 60.0)))
            .build()?,
    );
    definitions.push(
        SpawnDefinition::builder("saturated circles", SMALL_MONSTERS)
            .count(100, 200)
            .distance(120.0, 180.0)
            .priority(between(rng, (7_000.0, 9_000.0)))
            .change(between(rng, (1_000.0, 1_500.0)))
            .additive(between(rng, (25.0, 75.0)))
            .build()?,
    );
    definitions.push(
        SpawnDefinition::builder("wormholes", KindMask::single(MonsterKind::Wormhole))
            .count(1, 3)
            .placement(PlacementPolicy::Around)
            .distance(160.0, 190.0)
            .priority(between(rng, (5_000.0, 7_000.0)))
            .change(between(rng, (4_000.0, 6_000.0)))
            .additive(between(rng, (100.0, 300.0)))
            .build()?,
    );
    definitions.push(
        SpawnDefinition::builder("spawners", KindMask::single(MonsterKind::Spawner))
            .count(2, 4)
            .placement(PlacementPolicy::Around)
            .distance(160.0, 190.0)
            .priority(between(rng, (6_000.0, 8_000.0)))
            .change(between(rng, (1_000.0, 1_500.0)))
            .additive(between(rng, (25.0, 75.0)))
            .build()?,
    );

    definitions.push(
        SpawnDefinition::builder("bosses", KindMask::single(MonsterKind::BossEgg))
            .placement(PlacementPolicy::Around)
            .distance(300.0, 350.0)
            .priority(4_000.0)
            .change(10_000.0)
            .multiplier(1.5)
            .build()?,
    );

    Ok(definitions)
}

/// Builds the showcase catalog: low-tier kinds only, never escalating.
pub fn cinematic_catalog() -> Result<Vec<SpawnDefinition>, DefinitionError> {
    Ok(vec![
        SpawnDefinition::builder("cinematic", CINEMATIC_KINDS).build()?,
    ])
}

/// Builds the joke catalog: snakes and nothing else.
pub fn joke_catalog() -> Result<Vec<SpawnDefinition>, DefinitionError> {
    Ok(vec![SpawnDefinition::builder(
        "snakes only",
        KindMask::single(MonsterKind::Snake),
    )
    .build()?])
}

fn between<R>(rng: &mut R, (min, max): (f64, f64)) -> f64
where
    R: Rng + ?Sized,
{
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}
