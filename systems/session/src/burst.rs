//! One-shot population burst that fills the arena up to the ceiling.

use glam::Vec3;
use rand::Rng;
use spawn_director_core::{Command, KindMask, MonsterKind};
use spawn_director_system_placement::PlacementPolicy;
use spawn_director_system_scheduler::{DefinitionError, SpawnDefinition};

/// Monsters the broad placement may overshoot the ceiling by.
const BURST_OVERSHOOT: u32 = 10;

/// Spawns circles up to `limit` around `reference`, bypassing the admission gate.
///
/// The burst is a broad random ring sized to the ceiling plus a small cluster
/// close to the reference. Neither placement enters the schedule, so no
/// priority advances. Returns the number of monsters spawned.
pub fn initial_burst<R>(
    limit: u32,
    reference: Vec3,
    rng: &mut R,
    out: &mut Vec<Command>,
) -> Result<u32, DefinitionError>
where
    R: Rng + ?Sized,
{
    let circles = KindMask::single(MonsterKind::Circle);
    let broad = limit.max(1);
    let mut ring = SpawnDefinition::builder("initial 1", circles)
        .count(broad, broad.saturating_add(BURST_OVERSHOOT))
        .build()?;
    let mut cluster = SpawnDefinition::builder("initial 2", circles)
        .count(1, 3)
        .placement(PlacementPolicy::Grouped)
        .distance(80.0, 100.0)
        .build()?;

    let spawned = ring.execute(reference, rng, out).len();
    let spawned = spawned + cluster.execute(reference, rng, out).len();
    Ok(u32::try_from(spawned).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn burst_reaches_the_ceiling_with_circles_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut out = Vec::new();

        let spawned = initial_burst(150, Vec3::ZERO, &mut rng, &mut out).expect("burst");

        assert!((151..=163).contains(&spawned), "spawned {spawned}");
        assert_eq!(out.len(), spawned as usize);
        for command in &out {
            assert!(matches!(
                command,
                Command::SpawnMonster {
                    kind: MonsterKind::Circle,
                    ..
                }
            ));
        }
    }

    #[test]
    fn cluster_lands_close_to_the_reference() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut out = Vec::new();
        let reference = Vec3::new(40.0, 0.0, -25.0);

        let spawned = initial_burst(1, reference, &mut rng, &mut out).expect("burst");

        let near = out
            .iter()
            .filter(|command| match command {
                Command::SpawnMonster { pose, .. } => pose.position.distance(reference) < 120.0,
                _ => false,
            })
            .count();
        assert!((1..=3).contains(&near));
        assert_eq!(out.len(), spawned as usize);
    }

    #[test]
    fn zero_ceiling_still_spawns_both_placements() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut out = Vec::new();
        let spawned = initial_burst(0, Vec3::ZERO, &mut rng, &mut out).expect("burst");
        assert!(spawned >= 2);
    }
}
