//! The demo scene: a chain of arms, each spinning about its parent.

use anyhow::Result;
use engine_math::{Quat, Transform3D, Vec3};
use engine_scene::{Behavior, NodeId, Scene, SceneConfig, shared};
use tracing::info;

/// Spins its node about the local Y axis at a fixed rate.
#[derive(Debug)]
pub struct Orbit {
    /// Radians per tick.
    pub speed: f32,
    /// Accumulated angle in radians.
    pub angle: f32,
}

impl Behavior for Orbit {
    fn start(&mut self) -> Result<()> {
        self.angle = 0.0;
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        self.angle = (self.angle + self.speed) % std::f32::consts::TAU;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "orbit"
    }
}

/// Build a chain of `depth` arms under one root. Every arm sits one unit
/// along its parent's X axis and carries an [`Orbit`].
///
/// Returns the scene and the chain, root first.
///
/// # Errors
///
/// Fails only if the scene rejects a link, which a fresh chain never does.
pub fn build(depth: usize) -> Result<(Scene, Vec<NodeId>)> {
    let mut scene = Scene::with_config(SceneConfig::new("demo").with_capacity(depth + 1));
    let root = scene.spawn_named("root");
    let mut chain = vec![root];

    for i in 0..depth {
        let arm = scene.spawn_with(Transform3D::from_position(Vec3::X).scaled(0.5));
        scene.set_name(arm, format!("arm-{i}"))?;
        scene.add_child(chain[chain.len() - 1], arm)?;
        scene.add_behavior(
            arm,
            shared(Orbit {
                speed: 0.1 * (i + 1) as f32,
                angle: 0.0,
            }),
        )?;
        chain.push(arm);
    }

    info!(depth, nodes = scene.len(), "built demo scene");
    Ok((scene, chain))
}

/// Copy every [`Orbit`] angle into its node's local rotation.
///
/// # Errors
///
/// Fails if a node in `chain` no longer exists.
pub fn apply_orbits(scene: &mut Scene, chain: &[NodeId]) -> Result<()> {
    for &id in chain {
        if let Some(angle) = scene.with_behavior_of_type(id, |orbit: &mut Orbit| orbit.angle)? {
            scene.set_local_rotation(id, Quat::from_rotation_y(angle))?;
        }
    }
    Ok(())
}
