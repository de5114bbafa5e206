//! Fixed-timestep tick loop.
//!
//! Each tick:
//!
//! 1. On the first tick, start every behavior.
//! 2. Update every behavior, each tree depth-first from its root.
//! 3. Hand the scene to the caller's `after_update` hook, which writes
//!    behavior results back into node transforms.
//! 4. Advance the tick counter.

use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use engine_scene::Scene;
use tracing::{debug, info, warn};

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// The tick loop state. Owns the scene it drives.
#[derive(Debug)]
pub struct TickLoop {
    /// Current tick counter.
    tick_id: u64,
    /// Tick configuration.
    config: TickConfig,
    /// The scene being simulated.
    scene: Scene,
    /// Whether behaviors have been started.
    started: bool,
}

impl TickLoop {
    /// Create a new tick loop over `scene`.
    #[must_use]
    pub fn new(config: TickConfig, scene: Scene) -> Self {
        Self {
            tick_id: 0,
            config,
            scene,
            started: false,
        }
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Returns a reference to the scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns the first behavior or hook failure; the tick counter is not
    /// advanced in that case.
    pub fn tick(&mut self, after_update: &mut impl FnMut(&mut Scene, u64) -> Result<()>) -> Result<()> {
        if !self.started {
            self.scene.start_all()?;
            self.started = true;
            info!(nodes = self.scene.len(), "behaviors started");
        }

        self.scene.update_all()?;
        after_update(&mut self.scene, self.tick_id + 1)?;
        self.tick_id += 1;

        debug!(tick_id = self.tick_id, nodes = self.scene.len(), "tick complete");
        Ok(())
    }

    /// Run the tick loop for the configured number of ticks, or indefinitely.
    ///
    /// # Errors
    ///
    /// Fails if the tick rate is not a positive finite number, and stops at
    /// the first failing tick.
    pub fn run(&mut self, mut after_update: impl FnMut(&mut Scene, u64) -> Result<()>) -> Result<()> {
        let tick_duration = tick_duration(self.config.tick_rate)?;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick(&mut after_update)?;

            if self.config.max_ticks > 0 && self.tick_id >= self.config.max_ticks {
                info!(ticks = self.tick_id, "tick loop complete");
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    }
}

/// Length of one tick at `tick_rate` ticks per second.
///
/// # Errors
///
/// Fails unless `tick_rate` is positive and finite and its period fits in a
/// [`Duration`].
pub fn tick_duration(tick_rate: f64) -> Result<Duration> {
    if !(tick_rate.is_finite() && tick_rate > 0.0) {
        bail!("tick rate must be a positive number, got {tick_rate}");
    }
    Ok(Duration::try_from_secs_f64(1.0 / tick_rate)?)
}
