//! Thread-safe access to a [`Scene`].
//!
//! A [`Scene`] is mutated by one owner per tick. When several threads need
//! it, wrap it in a [`SharedScene`]: one coarse lock over the whole graph.
//! Every operation, reparenting included, runs entirely under that lock, so
//! a reader can see a value from before or after a concurrent reparent but
//! never a half-updated parent/child link.

use std::sync::Arc;

use engine_math::Mat4;
use parking_lot::{Mutex, MutexGuard};

use crate::error::SceneResult;
use crate::node::NodeId;
use crate::scene::Scene;

/// A cloneable, lock-protected handle to a [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct SharedScene {
    inner: Arc<Mutex<Scene>>,
}

impl SharedScene {
    #[must_use]
    pub fn new(scene: Scene) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scene)),
        }
    }

    /// Lock the scene for a batch of operations.
    pub fn lock(&self) -> MutexGuard<'_, Scene> {
        self.inner.lock()
    }

    /// Run `f` with shared access to the scene.
    pub fn read<R>(&self, f: impl FnOnce(&Scene) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Run `f` with exclusive access to the scene.
    pub fn write<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Locked [`Scene::set_parent`].
    ///
    /// # Errors
    ///
    /// Same as [`Scene::set_parent`].
    pub fn set_parent(&self, child: NodeId, parent: Option<NodeId>) -> SceneResult<()> {
        self.write(|scene| scene.set_parent(child, parent))
    }

    /// Locked [`Scene::world_transform`].
    ///
    /// # Errors
    ///
    /// Same as [`Scene::world_transform`].
    pub fn world_transform(&self, id: NodeId) -> SceneResult<Mat4> {
        self.read(|scene| scene.world_transform(id))
    }
}
