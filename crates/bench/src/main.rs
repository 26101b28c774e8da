//! Quadtree resolution sweep.

use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use landmark_bench::{Config, config, generate, output, sweep};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Landmark QuadTree bench v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_PATH));
    let config = Config::load(&path)?;
    config.validate()?;
    info!("Loaded configuration from {}", path.display());
    info!(
        "  World: center ({}, {}), half-size {}",
        config.world.center_x, config.world.center_y, config.world.half_size
    );
    info!("  Landmarks: {} (seed {})", config.world.landmarks, config.world.seed);
    info!("  Search radius: {}", config.search.radius);
    info!(
        "  Sweep: {} steps from {:e} x{}",
        config.sweep.steps, config.sweep.resolution_start, config.sweep.resolution_growth
    );
    info!("  Bounds check: {}", config.sweep.check_bounds);

    let mut rng = StdRng::seed_from_u64(config.world.seed);
    let landmarks = generate::landmarks(&config.world, &mut rng);
    info!("created {} landmarks", landmarks.len());

    let records = sweep::run(&config, &landmarks, &mut rng)?;
    output::write(&config.output, &records)?;
    info!("Wrote {} rows to {}", records.len(), config.output.directory.display());

    Ok(())
}
