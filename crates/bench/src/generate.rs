//! Random landmark and vehicle placement.

use index::{Landmark, Position};
use rand::Rng;

use crate::config::WorldConfig;

/// A uniformly random position inside the world square.
#[inline]
pub fn position(world: &WorldConfig, rng: &mut impl Rng) -> Position {
    let x = world.center_x + world.half_size * rng.random_range(-1.0..=1.0_f64);
    let y = world.center_y + world.half_size * rng.random_range(-1.0..=1.0_f64);
    Position::new(x, y)
}

/// `world.landmarks` random landmarks with ids counting up from zero.
pub fn landmarks(world: &WorldConfig, rng: &mut impl Rng) -> Vec<Landmark> {
    (0..world.landmarks)
        .map(|id| Landmark::new(id, position(world, rng)))
        .collect()
}
