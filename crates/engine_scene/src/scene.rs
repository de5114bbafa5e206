//! The scene graph arena.
//!
//! [`Scene`] owns every node and is the only place parent/child links are
//! changed. Both sides of a link are updated inside one `&mut self` call, so
//! no query can observe a half-finished reparent.
//!
//! ## Cache invalidation
//!
//! Each node caches its world matrix behind a dirty flag. Invalidation is
//! eager and top-down: dirtying a node dirties its whole subtree. A node only
//! becomes clean after its parent does, so a dirty node's subtree is always
//! already dirty and the walk can stop there.

use engine_math::Transform3D;
use tracing::{debug, warn};

use crate::behavior::{self, Behavior, SharedBehavior};
use crate::config::SceneConfig;
use crate::error::{SceneError, SceneResult};
use crate::node::{Node, NodeId, Slot};

/// Upper bound on arena slots, live or retired. Node indices are `u32`.
pub const MAX_SLOTS: usize = u32::MAX as usize;

fn next_index(len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(index) if (index as usize) < MAX_SLOTS => index,
        _ => panic!("scene cannot hold more than {MAX_SLOTS} slots"),
    }
}

/// An arena of transform nodes linked into a forest.
#[derive(Debug, Default)]
pub struct Scene {
    config: SceneConfig,
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Scene {
    /// Create a new empty scene with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    #[must_use]
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            slots: Vec::with_capacity(config.capacity),
            free: Vec::new(),
            len: 0,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Spawn a standalone node with the identity transform.
    ///
    /// # Panics
    ///
    /// Panics if the scene already has [`MAX_SLOTS`] slots in use or retired.
    pub fn spawn(&mut self) -> NodeId {
        self.insert(Node::new(None, Transform3D::IDENTITY))
    }

    /// Spawn a standalone node with a debug name.
    pub fn spawn_named(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(Node::new(Some(name.into()), Transform3D::IDENTITY))
    }

    /// Spawn a standalone node with the given local transform. The rotation
    /// must be a unit quaternion; [`Scene::set_local_transform`] normalises
    /// for you.
    pub fn spawn_with(&mut self, local: Transform3D) -> NodeId {
        self.insert(Node::new(None, local))
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId::new(index, slot.generation)
        } else {
            let index = next_index(self.slots.len());
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId::new(index, 0)
        };
        self.len += 1;
        debug!(scene = self.config.name, node = %id, "spawned node");
        id
    }

    /// Remove a node. Its parent forgets it and its children become roots;
    /// the children themselves are kept.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn remove(&mut self, id: NodeId) -> SceneResult<()> {
        self.set_parent(id, None)?;
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for &child in &children {
            self.node_mut(child)?.parent = None;
            self.invalidate(child);
        }
        self.free_slot(id);
        debug!(scene = self.config.name, node = %id, orphaned = children.len(), "removed node");
        Ok(())
    }

    /// Remove a node together with its whole subtree. Returns the number of
    /// nodes removed.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn remove_recursive(&mut self, id: NodeId) -> SceneResult<usize> {
        let subtree = self.descendants(id)?;
        self.set_parent(id, None)?;
        for &node in &subtree {
            self.free_slot(node);
        }
        debug!(scene = self.config.name, node = %id, removed = subtree.len(), "removed subtree");
        Ok(subtree.len())
    }

    fn free_slot(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index() as usize)
            && slot.generation == id.generation()
            && slot.node.take().is_some()
        {
            self.len -= 1;
            // An exhausted slot is retired so no stale handle can match it again.
            match slot.generation.checked_add(1) {
                Some(next) => {
                    slot.generation = next;
                    self.free.push(id.index());
                }
                None => debug!(scene = self.config.name, node = %id, "retired slot"),
            }
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    pub(crate) fn node(&self, id: NodeId) -> SceneResult<&Node> {
        self.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
            .ok_or(SceneError::NodeNotFound(id))
    }

    /// Mark `id` and its subtree dirty.
    pub(crate) fn invalidate(&self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            if node.dirty.replace(true) {
                continue;
            }
            stack.extend(node.children.iter().copied());
        }
    }

    /// Returns `true` if the world matrix cache of `id` is stale.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn is_dirty(&self, id: NodeId) -> SceneResult<bool> {
        Ok(self.node(id)?.dirty.get())
    }

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn name(&self, id: NodeId) -> SceneResult<Option<&str>> {
        Ok(self.node(id)?.name.as_deref())
    }

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> SceneResult<()> {
        self.node_mut(id)?.name = Some(name.into());
        Ok(())
    }

    // --- Hierarchy ---------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn parent(&self, id: NodeId) -> SceneResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Children of `id` in attachment order.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn children(&self, id: NodeId) -> SceneResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> SceneResult<bool> {
        let mut cursor = self.node(id)?.parent;
        while let Some(current) = cursor {
            if current == ancestor {
                return Ok(true);
            }
            cursor = self.node(current)?.parent;
        }
        Ok(false)
    }

    /// The root of the tree containing `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn root_of(&self, id: NodeId) -> SceneResult<NodeId> {
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Every live node, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node
                .as_ref()
                .map(|_| NodeId::new(index as u32, slot.generation))
        })
    }

    /// Every node without a parent, in slot order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(|&id| self.get(id).is_some_and(|node| node.parent.is_none()))
    }

    /// `id` followed by its descendants, depth-first in child order.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn descendants(&self, id: NodeId) -> SceneResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Reparent `child` under `parent`, or detach it with `None`.
    ///
    /// Setting the current parent again is a no-op. The child's world matrix
    /// is invalidated; its local transform is kept, so its world placement
    /// follows the new parent.
    ///
    /// # Errors
    ///
    /// - [`SceneError::NodeNotFound`] if either handle is not live.
    /// - [`SceneError::CycleRejected`] if `parent` is `child` or one of its
    ///   descendants. The graph is unchanged.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> SceneResult<()> {
        let old = self.node(child)?.parent;
        if old == parent {
            return Ok(());
        }
        if let Some(parent) = parent {
            self.node(parent)?;
            if parent == child || self.is_ancestor_of(child, parent)? {
                warn!(scene = self.config.name, %child, %parent, "rejected cyclic reparent");
                return Err(SceneError::CycleRejected { child, parent });
            }
        }

        if let Some(old) = old {
            self.node_mut(old)?.children.retain(|&c| c != child);
        }
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(child);
        }
        self.node_mut(child)?.parent = parent;
        self.invalidate(child);

        debug!(scene = self.config.name, %child, ?old, new = ?parent, "reparented node");
        Ok(())
    }

    /// Attach `child` under `parent`. A no-op if it is already a child.
    ///
    /// # Errors
    ///
    /// Same as [`Scene::set_parent`].
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.set_parent(child, Some(parent))
    }

    /// Detach `child` from `parent`, leaving it as a root. A no-op if `child`
    /// is not currently a child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `parent` is not live.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        if !self.node(parent)?.children.contains(&child) {
            return Ok(());
        }
        self.set_parent(child, None)
    }

    // --- Behaviors ---------------------------------------------------------

    /// Attach a behavior. Returns `false` if this handle is already attached.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn add_behavior(&mut self, id: NodeId, behavior: SharedBehavior) -> SceneResult<bool> {
        let node = self.node_mut(id)?;
        if node.behaviors.iter().any(|b| SharedBehavior::ptr_eq(b, &behavior)) {
            return Ok(false);
        }
        node.behaviors.push(behavior);
        Ok(true)
    }

    /// Detach a behavior. Returns `false` if it was not attached.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn remove_behavior(&mut self, id: NodeId, behavior: &SharedBehavior) -> SceneResult<bool> {
        let node = self.node_mut(id)?;
        let before = node.behaviors.len();
        node.behaviors.retain(|b| !SharedBehavior::ptr_eq(b, behavior));
        Ok(node.behaviors.len() != before)
    }

    /// Attached behaviors in attachment order.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn behaviors(&self, id: NodeId) -> SceneResult<&[SharedBehavior]> {
        Ok(&self.node(id)?.behaviors)
    }

    /// The first attached behavior whose runtime type is `T`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn behavior_of_type<T: Behavior>(&self, id: NodeId) -> SceneResult<Option<SharedBehavior>> {
        Ok(self
            .node(id)?
            .behaviors
            .iter()
            .find(|b| behavior::is_type::<T>(b))
            .cloned())
    }

    /// Run `f` on the first attached behavior of type `T`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if `id` is not live.
    pub fn with_behavior_of_type<T: Behavior, R>(
        &self,
        id: NodeId,
        f: impl FnOnce(&mut T) -> R,
    ) -> SceneResult<Option<R>> {
        for handle in &self.node(id)?.behaviors {
            let mut guard = handle.lock();
            let behavior: &mut dyn Behavior = &mut *guard;
            if let Some(typed) = behavior.as_any_mut().downcast_mut::<T>() {
                return Ok(Some(f(typed)));
            }
        }
        Ok(None)
    }

    /// Call `start` on every behavior of `id`, in attachment order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing behavior and returns
    /// [`SceneError::Behavior`].
    pub fn start(&self, id: NodeId) -> SceneResult<()> {
        self.broadcast(id, "start", |b| b.start())
    }

    /// Call `update` on every behavior of `id`, in attachment order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing behavior and returns
    /// [`SceneError::Behavior`].
    pub fn update(&self, id: NodeId) -> SceneResult<()> {
        self.broadcast(id, "update", |b| b.update())
    }

    /// [`Scene::start`] for every node, each tree visited depth-first from
    /// its root.
    ///
    /// # Errors
    ///
    /// Stops at the first failing behavior.
    pub fn start_all(&self) -> SceneResult<()> {
        self.for_each_depth_first(|id| self.start(id))
    }

    /// [`Scene::update`] for every node, each tree visited depth-first from
    /// its root.
    ///
    /// # Errors
    ///
    /// Stops at the first failing behavior.
    pub fn update_all(&self) -> SceneResult<()> {
        self.for_each_depth_first(|id| self.update(id))
    }

    fn for_each_depth_first(&self, mut f: impl FnMut(NodeId) -> SceneResult<()>) -> SceneResult<()> {
        for root in self.roots() {
            for id in self.descendants(root)? {
                f(id)?;
            }
        }
        Ok(())
    }

    fn broadcast(
        &self,
        id: NodeId,
        hook: &'static str,
        mut call: impl FnMut(&mut dyn Behavior) -> anyhow::Result<()>,
    ) -> SceneResult<()> {
        for handle in &self.node(id)?.behaviors {
            let mut guard = handle.lock();
            if let Err(source) = call(&mut *guard) {
                let behavior = guard.name();
                warn!(scene = self.config.name, node = %id, behavior, hook, error = %source, "behavior failed");
                return Err(SceneError::Behavior {
                    node: id,
                    behavior,
                    source,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(scene: &mut Scene, len: usize) -> Vec<NodeId> {
        let ids: Vec<NodeId> = (0..len).map(|_| scene.spawn()).collect();
        for pair in ids.windows(2) {
            scene.add_child(pair[0], pair[1]).unwrap();
        }
        ids
    }

    #[test]
    fn test_exhausted_slot_is_retired() {
        let mut scene = Scene::new();
        let first = scene.spawn();
        scene.slots[first.index() as usize].generation = u32::MAX;
        let last = NodeId::new(first.index(), u32::MAX);
        assert!(scene.contains(last));

        scene.remove(last).unwrap();
        assert!(scene.free.is_empty());
        assert!(!scene.contains(last));
        assert!(!scene.contains(first));

        let next = scene.spawn();
        assert_ne!(next.index(), first.index());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_next_index_within_capacity() {
        assert_eq!(next_index(0), 0);
        assert_eq!(next_index(MAX_SLOTS - 1), u32::MAX - 1);
    }

    #[test]
    #[should_panic(expected = "cannot hold more than")]
    fn test_next_index_past_capacity_panics() {
        next_index(MAX_SLOTS);
    }

    #[test]
    fn test_spawn_is_standalone() {
        let mut scene = Scene::new();
        let id = scene.spawn();
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.parent(id).unwrap(), None);
        assert!(scene.children(id).unwrap().is_empty());
        assert!(scene.behaviors(id).unwrap().is_empty());
        assert!(scene.is_dirty(id).unwrap());
    }

    #[test]
    fn test_links_are_mutual() {
        let mut scene = Scene::new();
        let a = scene.spawn();
        let b = scene.spawn();
        let c = scene.spawn();
        scene.add_child(a, c).unwrap();
        assert_eq!(scene.parent(c).unwrap(), Some(a));
        assert_eq!(scene.children(a).unwrap(), &[c]);

        scene.set_parent(c, Some(b)).unwrap();
        assert_eq!(scene.parent(c).unwrap(), Some(b));
        assert!(scene.children(a).unwrap().is_empty());
        assert_eq!(scene.children(b).unwrap(), &[c]);
    }

    #[test]
    fn test_add_child_is_idempotent() {
        let mut scene = Scene::new();
        let p = scene.spawn();
        let c = scene.spawn();
        scene.add_child(p, c).unwrap();
        scene.add_child(p, c).unwrap();
        assert_eq!(scene.children(p).unwrap(), &[c]);
    }

    #[test]
    fn test_remove_absent_child_is_noop() {
        let mut scene = Scene::new();
        let p = scene.spawn();
        let other = scene.spawn();
        let c = scene.spawn();
        scene.add_child(other, c).unwrap();
        scene.remove_child(p, c).unwrap();
        assert_eq!(scene.parent(c).unwrap(), Some(other));
        scene.remove_child(other, c).unwrap();
        assert_eq!(scene.parent(c).unwrap(), None);
        assert!(scene.contains(c));
        scene.remove_child(other, c).unwrap();
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut scene = Scene::new();
        let ids = chain(&mut scene, 4);
        let err = scene.set_parent(ids[0], Some(ids[3])).unwrap_err();
        assert!(matches!(err, SceneError::CycleRejected { child, parent } if child == ids[0] && parent == ids[3]));
        assert_eq!(scene.parent(ids[0]).unwrap(), None);
        assert_eq!(scene.children(ids[3]).unwrap(), &[] as &[NodeId]);

        let err = scene.add_child(ids[1], ids[1]).unwrap_err();
        assert!(matches!(err, SceneError::CycleRejected { .. }));
        assert_eq!(scene.parent(ids[1]).unwrap(), Some(ids[0]));
    }

    #[test]
    fn test_ancestry_queries() {
        let mut scene = Scene::new();
        let ids = chain(&mut scene, 3);
        assert!(scene.is_ancestor_of(ids[0], ids[2]).unwrap());
        assert!(!scene.is_ancestor_of(ids[2], ids[0]).unwrap());
        assert!(!scene.is_ancestor_of(ids[1], ids[1]).unwrap());
        assert_eq!(scene.root_of(ids[2]).unwrap(), ids[0]);
        assert_eq!(scene.roots().collect::<Vec<_>>(), vec![ids[0]]);
        assert_eq!(scene.descendants(ids[0]).unwrap(), ids);
    }

    #[test]
    fn test_remove_orphans_children() {
        let mut scene = Scene::new();
        let ids = chain(&mut scene, 3);
        scene.remove(ids[1]).unwrap();
        assert!(!scene.contains(ids[1]));
        assert!(scene.children(ids[0]).unwrap().is_empty());
        assert_eq!(scene.parent(ids[2]).unwrap(), None);
        assert_eq!(scene.len(), 2);
        assert!(matches!(scene.parent(ids[1]), Err(SceneError::NodeNotFound(_))));
    }

    #[test]
    fn test_remove_recursive() {
        let mut scene = Scene::new();
        let ids = chain(&mut scene, 3);
        let keep = scene.spawn();
        assert_eq!(scene.remove_recursive(ids[0]).unwrap(), 3);
        assert_eq!(scene.len(), 1);
        assert!(scene.contains(keep));
        assert!(ids.iter().all(|&id| !scene.contains(id)));
    }

    #[test]
    fn test_stale_handle_does_not_alias() {
        let mut scene = Scene::new();
        let old = scene.spawn();
        scene.remove(old).unwrap();
        let new = scene.spawn();
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(!scene.contains(old));
        assert!(scene.contains(new));
        assert!(scene.remove(old).is_err());
    }

    #[test]
    fn test_names() {
        let mut scene = Scene::new();
        let id = scene.spawn_named("root");
        assert_eq!(scene.name(id).unwrap(), Some("root"));
        scene.set_name(id, "renamed").unwrap();
        assert_eq!(scene.name(id).unwrap(), Some("renamed"));
        let unnamed = scene.spawn();
        assert_eq!(scene.name(unnamed).unwrap(), None);
    }

    #[test]
    fn test_config_is_kept() {
        let scene = Scene::with_config(SceneConfig::new("level").with_capacity(16));
        assert_eq!(scene.config().name, "level");
        assert!(scene.is_empty());
    }
}
