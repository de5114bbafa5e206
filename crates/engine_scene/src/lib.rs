//! # engine_scene
//!
//! A hierarchy of transform nodes with cached world matrices.
//!
//! This crate provides:
//!
//! - [`Scene`] — an arena of nodes linked into a forest. Owns every node and
//!   every parent/child link.
//! - [`NodeId`] — generational handles into the arena.
//! - Local and world transform queries and setters (see the `world` module docs
//!   for the composition convention).
//! - [`Behavior`] — the `{start, update}` capability attached to nodes.
//! - [`SharedScene`] — a coarse-grained lock for multi-threaded use.
//!
//! ## Usage
//!
//! ```rust
//! use engine_math::Vec3;
//! use engine_scene::Scene;
//!
//! let mut scene = Scene::new();
//! let root = scene.spawn_named("root");
//! let child = scene.spawn_named("child");
//! scene.add_child(root, child).unwrap();
//!
//! scene.set_local_scale(root, Vec3::splat(2.0)).unwrap();
//! scene.set_local_position(child, Vec3::new(1.0, 0.0, 0.0)).unwrap();
//!
//! assert_eq!(scene.world_position(child).unwrap(), Vec3::new(2.0, 0.0, 0.0));
//! ```

pub mod behavior;
pub mod config;
pub mod error;
pub mod node;
pub mod scene;
pub mod shared;
mod world;

pub use behavior::{AsAny, Behavior, SharedBehavior, shared};
pub use config::SceneConfig;
pub use error::{SceneError, SceneResult};
pub use node::NodeId;
pub use scene::{MAX_SLOTS, Scene};
pub use shared::SharedScene;
