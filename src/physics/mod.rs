//! Overlap-resolving layout simulation.
//!
//! One tick pushes overlapping bubbles apart, adds a small random drift so
//! the canvas never freezes, then integrates damped and speed-limited
//! velocities. Cost is quadratic in the bubble count; there is no spatial
//! partitioning, which keeps it suited to small and moderate graphs.

mod forces;

use rand::Rng;

use crate::geometry::{Vec2, VecExt};
use crate::graph::Bubble;

use forces::{accumulate_repulsion, float_impulse};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
    pub repulsion_strength: f32,
    /// Bubbles repel while closer than `(r1 + r2) * min_distance_factor`.
    pub min_distance_factor: f32,
    /// Floor applied to centre distances before dividing by them.
    pub min_distance: f32,
    pub damping: f32,
    pub max_speed: f32,
    pub float_strength: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            repulsion_strength: 2000.0,
            min_distance_factor: 1.1,
            min_distance: 0.1,
            damping: 0.85,
            max_speed: 10.0,
            float_strength: 0.5,
        }
    }
}

impl SimulationParams {
    /// Same constants with the random drift switched off.
    pub fn without_float(self) -> Self {
        Self {
            float_strength: 0.0,
            ..self
        }
    }
}

/// Advances every bubble by one tick.
///
/// Returns `None` when the result is identical to the input so callers can
/// skip publishing an unchanged snapshot.
pub fn step(bubbles: &[Bubble], params: &SimulationParams, rng: &mut impl Rng) -> Option<Vec<Bubble>> {
    if bubbles.is_empty() {
        return None;
    }

    let mut forces = vec![Vec2::ZERO; bubbles.len()];
    accumulate_repulsion(bubbles, params, &mut forces);
    for force in &mut forces {
        *force += float_impulse(rng, params.float_strength);
    }

    let max_speed_sq = params.max_speed * params.max_speed;
    let next = bubbles
        .iter()
        .zip(&forces)
        .map(|(bubble, force)| {
            let mut velocity = (bubble.velocity + *force) * params.damping;
            if velocity.magnitude_squared() > max_speed_sq {
                velocity = velocity.normalized_or_zero() * params.max_speed;
            }
            if !velocity.is_finite() {
                velocity = Vec2::ZERO;
            }

            Bubble {
                position: bubble.position + velocity,
                velocity,
                ..bubble.clone()
            }
        })
        .collect::<Vec<_>>();

    if next.as_slice() == bubbles {
        None
    } else {
        Some(next)
    }
}
