//! # engine_app — scene demo
//!
//! Builds a chain of spinning arms, drives their behaviors through a
//! fixed-timestep tick loop, and logs where the tip of the chain ends up in
//! world space each tick.
//!
//! Set `RUST_LOG` to change verbosity, e.g. `RUST_LOG=engine_scene=debug`.

mod demo;
mod tick;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tick::{TickConfig, TickLoop};

#[derive(Parser)]
#[command(name = "engine_app", about = "Transform hierarchy demo")]
struct Args {
    /// Number of ticks to run (0 = run until interrupted)
    #[arg(short, long, default_value_t = 3)]
    ticks: u64,

    /// Target ticks per second
    #[arg(short = 'r', long, default_value_t = 60.0, value_parser = parse_tick_rate)]
    tick_rate: f64,

    /// Number of arms in the chain
    #[arg(short, long, default_value_t = 3)]
    depth: usize,
}

fn parse_tick_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("{e}"))?;
    tick::tick_duration(rate).map_err(|e| e.to_string())?;
    Ok(rate)
}

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("engine_app=info".parse()?)
                .add_directive("engine_scene=info".parse()?),
        )
        .init();

    let args = Args::parse();
    info!(ticks = args.ticks, tick_rate = args.tick_rate, depth = args.depth, "scene demo starting");

    let (scene, chain) = demo::build(args.depth)?;
    let tip = chain[chain.len() - 1];

    let config = TickConfig {
        tick_rate: args.tick_rate,
        max_ticks: args.ticks,
    };
    let mut tick_loop = TickLoop::new(config, scene);
    tick_loop.run(|scene, tick_id| {
        demo::apply_orbits(scene, &chain)?;
        let world = scene.world_transform(tip)?;
        info!(
            tick_id,
            tip = %world.translation(),
            rotation = %scene.world_rotation(tip)?,
            "tip placement"
        );
        Ok(())
    })?;

    info!("scene demo shut down");
    Ok(())
}
