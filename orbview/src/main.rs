//! Orbview demo binary.
//!
//! Runs the full layout pipeline against the headless mock simulation:
//! generates a hierarchical demo dataset, places it, registers forces,
//! then steps the simulation and the view monitor on a timer, logging
//! framing reports along the way.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use orbview::engine::ViewerEngine;
use orbview::mock::{self, MockSimulation};
use orbview_common::{EngineConfig, Viewport, init_tracing, load_config};

#[derive(Debug, Parser)]
#[command(name = "orbview", about = "Orbview layout engine demo")]
struct Args {
    /// Path to a JSON5 configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 800.0)]
    height: f32,

    /// Number of demo categories.
    #[arg(long, default_value_t = 4)]
    categories: usize,

    /// Subcategories per category.
    #[arg(long, default_value_t = 3)]
    subcategories: usize,

    /// Items per subcategory.
    #[arg(long, default_value_t = 2)]
    items: usize,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config: EngineConfig = match &args.config {
        Some(path) => load_config(path).map_err(|e| anyhow::anyhow!("{}", e))?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!("{}", e))?;
    tracing::info!("Starting Orbview demo");

    let viewport = Viewport::new(args.width, args.height);
    let mut port = MockSimulation::new(viewport, config.camera.fov_deg);

    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let data = mock::dataset(
        &mut rng,
        args.categories,
        args.subcategories,
        args.items,
    );
    tracing::info!(
        nodes = data.nodes.len(),
        links = data.links.len(),
        "generated demo dataset"
    );

    let mut engine = ViewerEngine::new(config);
    if let Some(report) = engine
        .load(&mut port, data)
        .map_err(|e| anyhow::anyhow!("{}", e))?
    {
        tracing::info!(report = %serde_json::to_string(&report)?, "initial framing");
    }

    // Occasionally jiggle the viewport so the resize debouncing shows up
    // in the logs.
    let resize_at = args.ticks / 2;

    let step = Duration::from_millis(33);
    let mut interval = tokio::time::interval(step);
    for tick in 0..args.ticks {
        interval.tick().await;

        if tick == resize_at {
            let shrunk = Viewport::new(
                viewport.width * (0.7 + 0.3 * rng.random::<f32>()),
                viewport.height,
            );
            port.set_viewport(shrunk);
            engine.handle_resize(shrunk, Instant::now());
            tracing::info!(width = shrunk.width, "viewport resized");
        }

        port.step(step);
        let outcome = engine.tick(Instant::now(), &mut port);
        if tick % 60 == 0 {
            tracing::info!(tick, alpha = port.alpha(), ?outcome, "demo tick");
        }
    }

    if let Some(check) = engine.monitor().check_view(&port, engine.framer()) {
        tracing::info!(check = %serde_json::to_string(&check)?, "final view check");
    }
    tracing::info!("Orbview demo complete");

    Ok(())
}
