//! Quadtree search timed against a brute-force scan, across resolutions.

use std::collections::HashSet;
use std::time::Instant;

use anyhow::Context;
use index::{Landmark, Position, QuadTree};
use rand::Rng;
use tracing::{info, warn};

use crate::config::Config;
use crate::generate;

/// Measurements for one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRecord {
    pub resolution: f64,
    /// Time spent in the tree search.
    pub search_ns: u128,
    /// Time spent in the brute-force scan.
    pub brute_ns: u128,
    /// Time spent inserting every landmark.
    pub insert_ns: u128,
    pub nodes: usize,
    pub max_depth: u32,
    /// Landmarks returned by the tree search.
    pub candidates: usize,
    /// Landmarks found by the brute-force scan.
    pub matches: usize,
    /// Brute-force matches the tree search did not return.
    pub missing: usize,
}

/// Linear scan for landmarks strictly closer than `radius`.
pub fn brute_force(landmarks: &[Landmark], query: Position, radius: f64) -> Vec<Landmark> {
    landmarks
        .iter()
        .filter(|lm| lm.distance(query) < radius)
        .copied()
        .collect()
}

/// Run every step of the configured sweep.
///
/// Each step draws a fresh vehicle position from `rng`.
pub fn run(
    config: &Config,
    landmarks: &[Landmark],
    rng: &mut impl Rng,
) -> anyhow::Result<Vec<SweepRecord>> {
    let mut records = Vec::with_capacity(config.sweep.steps as usize);
    for step in 0..config.sweep.steps {
        let vehicle = generate::position(&config.world, rng);
        records.push(run_step(config, step, landmarks, vehicle)?);
    }
    Ok(records)
}

fn run_step(
    config: &Config,
    step: u32,
    landmarks: &[Landmark],
    vehicle: Position,
) -> anyhow::Result<SweepRecord> {
    let resolution = config.sweep.resolution(step);
    let radius = config.search.radius;

    let start = Instant::now();
    let close_brute_force = brute_force(landmarks, vehicle, radius);
    let brute_ns = start.elapsed().as_nanos();

    let center = Position::new(config.world.center_x, config.world.center_y);
    let mut tree = QuadTree::new(center, config.world.half_size, resolution)
        .with_bounds_check(config.sweep.check_bounds);
    info!(bounds_check = tree.bounds_check(), "Resolution: {:e}", resolution);

    let start = Instant::now();
    for lm in landmarks {
        tree.insert(*lm).with_context(|| {
            format!("inserting landmark {} at resolution {:e}", lm.id, resolution)
        })?;
    }
    let insert_ns = start.elapsed().as_nanos();

    let start = Instant::now();
    let close_quadtree = tree.search(vehicle, radius);
    let search_ns = start.elapsed().as_nanos();

    let found: HashSet<u32> = close_quadtree.iter().map(|lm| lm.id).collect();
    let missing = close_brute_force
        .iter()
        .filter(|lm| !found.contains(&lm.id))
        .count();
    if missing > 0 {
        warn!(
            "Tree search missed {} of {} brute-force matches at ({}, {})",
            missing,
            close_brute_force.len(),
            vehicle.x,
            vehicle.y
        );
    }

    let stats = tree.stats();
    info!(
        nodes = stats.nodes,
        depth = stats.max_depth,
        candidates = close_quadtree.len(),
        matches = close_brute_force.len(),
        insert_ns,
        search_ns,
        brute_ns,
        "step {} done",
        step
    );

    Ok(SweepRecord {
        resolution,
        search_ns,
        brute_ns,
        insert_ns,
        nodes: stats.nodes,
        max_depth: stats.max_depth,
        candidates: close_quadtree.len(),
        matches: close_brute_force.len(),
        missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SearchConfig, SweepConfig, WorldConfig};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small_config() -> Config {
        Config {
            world: WorldConfig {
                center_x: 0.0,
                center_y: 0.0,
                half_size: 100.0,
                landmarks: 2000,
                seed: 1234,
            },
            search: SearchConfig { radius: 10.0 },
            sweep: SweepConfig {
                steps: 5,
                resolution_start: 0.5,
                resolution_growth: 2.0,
                check_bounds: true,
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_brute_force_is_strict() {
        let landmarks = [
            Landmark::at(1, 0.0, 0.0),
            Landmark::at(2, 1.0, 0.0),
            Landmark::at(3, 0.5, 0.5),
        ];
        let found = brute_force(&landmarks, Position::ZERO, 1.0);
        let ids: Vec<u32> = found.iter().map(|lm| lm.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_sweep_records_each_step() {
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(config.world.seed);
        let landmarks = generate::landmarks(&config.world, &mut rng);

        let records = run(&config, &landmarks, &mut rng).unwrap();

        assert_eq!(records.len(), 5);
        let resolutions: Vec<f64> = records.iter().map(|r| r.resolution).collect();
        assert_eq!(resolutions, vec![0.5, 1.0, 2.0, 4.0, 8.0]);
        for record in &records {
            assert_eq!(record.missing, 0);
            assert!(record.candidates >= record.matches);
            assert!(record.nodes > 1);
        }
        // Coarser resolutions stop subdividing sooner.
        assert!(records[0].max_depth > records[4].max_depth);
    }

    #[test]
    fn test_sweep_rejects_landmarks_outside_world() {
        let config = small_config();
        let landmarks = [Landmark::at(0, 500.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(1);

        let err = run(&config, &landmarks, &mut rng).unwrap_err();
        assert!(err.to_string().contains("inserting landmark 0"));
    }

    #[test]
    fn test_sweep_without_bounds_check_accepts_outliers() {
        let mut config = small_config();
        config.sweep.check_bounds = false;
        config.sweep.steps = 1;
        let landmarks = [Landmark::at(0, 500.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(1);

        let records = run(&config, &landmarks, &mut rng).unwrap();
        assert_eq!(records.len(), 1);
    }
}
