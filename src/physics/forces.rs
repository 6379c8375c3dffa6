use std::f32::consts::TAU;

use rand::Rng;

use crate::geometry::{Vec2, VecExt, vec2};
use crate::graph::Bubble;

use super::SimulationParams;

/// Pairwise overlap repulsion, O(n^2) over unordered pairs.
pub(super) fn accumulate_repulsion(
    bubbles: &[Bubble],
    params: &SimulationParams,
    forces: &mut [Vec2],
) {
    for i in 0..bubbles.len() {
        for j in (i + 1)..bubbles.len() {
            let delta = bubbles[j].position - bubbles[i].position;
            let distance = delta.magnitude().max(params.min_distance);
            let min_allowed = (bubbles[i].radius + bubbles[j].radius) * params.min_distance_factor;
            if distance >= min_allowed {
                continue;
            }

            let overlap = min_allowed - distance;
            let strength = params.repulsion_strength * overlap / distance;
            let direction = delta.normalized_or_zero();

            forces[i] -= direction * strength;
            forces[j] += direction * strength;
        }
    }
}

/// Constant-magnitude push in a uniformly random direction.
pub(super) fn float_impulse(rng: &mut impl Rng, strength: f32) -> Vec2 {
    if strength <= 0.0 {
        return Vec2::ZERO;
    }

    let angle = rng.gen_range(0.0..TAU);
    vec2(angle.cos(), angle.sin()) * strength
}
