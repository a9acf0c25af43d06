#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement policies that lay out simultaneous spawns around a reference point.
//!
//! Every policy is a closed variant of [`PlacementPolicy`] dispatched by
//! [`place`]. Policies never touch the world; given the same random stream they
//! always produce the same poses.

use std::{f32::consts::TAU, num::NonZeroU32};

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use spawn_director_core::{DistanceRange, Pose};

/// Lateral distance between neighbouring monsters of a [`PlacementPolicy::Line`] formation.
pub const LINE_SPACING: f32 = 10.0;

/// Fraction of the even angular spacing used as jitter by [`PlacementPolicy::Around`].
const AROUND_JITTER: f32 = 0.3;

/// Geometric layout applied to the monsters of a single firing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementPolicy {
    /// Independent angle and radius per monster.
    #[default]
    Random,
    /// Jittered ring at a single radius around the reference point.
    Around,
    /// Tight ring around a cluster centre placed inside the distance band.
    Grouped,
    /// Straight wall perpendicular to the direction of the reference point.
    Line,
}

/// Poses produced by a single placement together with the point they were laid out around.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    center: Vec3,
    poses: Vec<Pose>,
}

impl Placement {
    /// Point the layout is measured from: the reference for [`PlacementPolicy::Random`]
    /// and [`PlacementPolicy::Around`], the cluster centre for [`PlacementPolicy::Grouped`]
    /// and the anchor for [`PlacementPolicy::Line`].
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Poses in spawn order.
    #[must_use]
    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    /// Consumes the placement, returning its poses.
    #[must_use]
    pub fn into_poses(self) -> Vec<Pose> {
        self.poses
    }
}

/// Lays out `count` monsters according to `policy`.
///
/// Every pose faces the reference point.
pub fn place<R>(
    policy: PlacementPolicy,
    reference: Vec3,
    count: NonZeroU32,
    range: DistanceRange,
    rng: &mut R,
) -> Placement
where
    R: Rng + ?Sized,
{
    let count = count.get();
    let mut positions = Vec::with_capacity(count as usize);
    let center = match policy {
        PlacementPolicy::Random => {
            for _ in 0..count {
                let turns: f32 = rng.gen();
                let radius = sample_radius(range, rng);
                positions.push(around_position(turns, radius, reference));
            }
            reference
        }
        PlacementPolicy::Around => {
            let offset: f32 = rng.gen();
            let radius = sample_radius(range, rng);
            let slots = count as f32;
            for index in 0..count {
                let jitter = rng.gen::<f32>() * AROUND_JITTER;
                let turns = offset + (index as f32 + jitter) / slots;
                positions.push(around_position(turns, radius, reference));
            }
            reference
        }
        PlacementPolicy::Grouped => {
            let radius = range.half_span();
            let cluster = around_position(rng.gen(), range.midpoint(), reference);
            let slots = count as f32;
            for index in 0..count {
                positions.push(around_position(index as f32 / slots, radius, cluster));
            }
            cluster
        }
        PlacementPolicy::Line => {
            let radius = sample_radius(range, rng);
            let anchor = around_position(rng.gen(), radius, reference);
            let outward = (anchor - reference).try_normalize().unwrap_or(Vec3::X);
            let lateral = outward.cross(Vec3::Y) * LINE_SPACING;
            let middle = (count - 1) as f32 * 0.5;
            for index in 0..count {
                positions.push(anchor + lateral * (index as f32 - middle));
            }
            anchor
        }
    };

    let poses = positions
        .into_iter()
        .map(|position| Pose::facing_toward(position, reference))
        .collect();
    Placement { center, poses }
}

fn sample_radius<R>(range: DistanceRange, rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    rng.gen_range(range.min()..=range.max())
}

/// Point at `radius` from `center` on the horizontal plane, `turns` of a full circle around.
fn around_position(turns: f32, radius: f32, center: Vec3) -> Vec3 {
    let angle = turns * TAU;
    center + Vec3::new(angle.cos(), 0.0, angle.sin()) * radius
}
