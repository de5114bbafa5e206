//! Local and world transform access on [`Scene`] nodes.
//!
//! The world matrix is `parent_world · T · R · S` with column vectors
//! ([`Mat4::transform_point`]). Read through the transpose, the same chain in
//! row-vector form is `S · RT · parent_world`.
//!
//! World position is the translation column of the world matrix, so it is
//! always the point a renderer reading [`Scene::world_transform`] sees.
//! World rotation and scale are composed live from every ancestor's local
//! values. They compose independently, which is exact whenever every
//! ancestor with a rotated child has uniform scale.

use engine_math::{Mat4, Quat, Transform3D, Vec3};
use tracing::trace;

use crate::error::SceneResult;
use crate::node::NodeId;
use crate::scene::Scene;

impl Scene {
    // --- Local state -------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn local_transform(&self, id: NodeId) -> SceneResult<Transform3D> {
        Ok(self.node(id)?.local)
    }

    /// Replace the whole local transform and invalidate the subtree. The
    /// rotation is normalised.
    ///
    /// # Errors
    ///
    /// - [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    /// - [`SceneError::Math`](crate::SceneError::Math) if the rotation is the zero quaternion.
    pub fn set_local_transform(&mut self, id: NodeId, mut local: Transform3D) -> SceneResult<()> {
        local.rotation = local.rotation.normalize()?;
        self.modify_local(id, |t| *t = local)
    }

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn local_position(&self, id: NodeId) -> SceneResult<Vec3> {
        Ok(self.node(id)?.local.position)
    }

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn set_local_position(&mut self, id: NodeId, position: Vec3) -> SceneResult<()> {
        self.modify_local(id, |t| t.position = position)
    }

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn local_rotation(&self, id: NodeId) -> SceneResult<Quat> {
        Ok(self.node(id)?.local.rotation)
    }

    /// Set the local rotation. The input is normalised.
    ///
    /// # Errors
    ///
    /// - [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    /// - [`SceneError::Math`](crate::SceneError::Math) if `rotation` is the zero quaternion.
    ///   The node is unchanged.
    pub fn set_local_rotation(&mut self, id: NodeId, rotation: Quat) -> SceneResult<()> {
        let rotation = rotation.normalize()?;
        self.modify_local(id, |t| t.rotation = rotation)
    }

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn local_scale(&self, id: NodeId) -> SceneResult<Vec3> {
        Ok(self.node(id)?.local.scale)
    }

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn set_local_scale(&mut self, id: NodeId, scale: Vec3) -> SceneResult<()> {
        self.modify_local(id, |t| t.scale = scale)
    }

    /// Local rotation as `(pitch, yaw, roll)` radians; see [`Quat::to_euler`].
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn local_euler_angles(&self, id: NodeId) -> SceneResult<Vec3> {
        Ok(self.node(id)?.local.rotation.to_euler())
    }

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn set_local_euler_angles(&mut self, id: NodeId, angles: Vec3) -> SceneResult<()> {
        self.set_local_rotation(id, Quat::from_euler(angles))
    }

    /// Move the node by `delta` in its parent's frame.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn translate(&mut self, id: NodeId, delta: Vec3) -> SceneResult<()> {
        self.modify_local(id, |t| t.position += delta)
    }

    /// Apply `rotation` after the current local rotation.
    ///
    /// # Errors
    ///
    /// - [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    /// - [`SceneError::Math`](crate::SceneError::Math) if `rotation` is the zero quaternion.
    pub fn rotate(&mut self, id: NodeId, rotation: Quat) -> SceneResult<()> {
        let rotation = rotation.normalize()?;
        self.modify_local(id, |t| *t = t.rotated(rotation))
    }

    fn modify_local(&mut self, id: NodeId, f: impl FnOnce(&mut Transform3D)) -> SceneResult<()> {
        f(&mut self.node_mut(id)?.local);
        self.invalidate(id);
        Ok(())
    }

    // --- World matrix ------------------------------------------------------

    /// The node's world matrix, recomputed if the cache is stale.
    ///
    /// Stale ancestors are refreshed on the way. The returned matrix is a
    /// copy.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn world_transform(&self, id: NodeId) -> SceneResult<Mat4> {
        let node = self.node(id)?;
        if !node.dirty.get() {
            return Ok(node.world.get());
        }

        // Collect the stale chain up to the first clean ancestor. Everything
        // above a clean node is clean too.
        let mut stale = vec![id];
        let mut world = Mat4::IDENTITY;
        let mut cursor = node.parent;
        while let Some(parent_id) = cursor {
            let parent = self.node(parent_id)?;
            if !parent.dirty.get() {
                world = parent.world.get();
                break;
            }
            stale.push(parent_id);
            cursor = parent.parent;
        }

        for &stale_id in stale.iter().rev() {
            let node = self.node(stale_id)?;
            let rigidbody = Mat4::from_rigidbody(node.local.rotation, node.local.position);
            world = world * rigidbody * Mat4::from_scale(node.local.scale);
            node.world.set(world);
            node.dirty.set(false);
            trace!(node = %stale_id, "recomputed world matrix");
        }
        Ok(world)
    }

    // --- World components --------------------------------------------------

    /// The node's world placement: position from the world matrix, rotation
    /// and scale composed live from every ancestor.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn world_trs(&self, id: NodeId) -> SceneResult<Transform3D> {
        let composed = self
            .ancestry(id)?
            .iter()
            .fold(Transform3D::IDENTITY, |world, local| world.compose(local));
        Ok(Transform3D {
            position: self.world_transform(id)?.translation(),
            ..composed
        })
    }

    /// Local transforms from the root down to `id`, inclusive.
    fn ancestry(&self, id: NodeId) -> SceneResult<Vec<Transform3D>> {
        let mut locals = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            locals.push(node.local);
            cursor = node.parent;
        }
        locals.reverse();
        Ok(locals)
    }

    /// The parent's world placement, or identity for a root.
    fn parent_world_trs(&self, id: NodeId) -> SceneResult<Transform3D> {
        match self.node(id)?.parent {
            Some(parent) => self.world_trs(parent),
            None => Ok(Transform3D::IDENTITY),
        }
    }

    /// The translation column of [`Scene::world_transform`].
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn world_position(&self, id: NodeId) -> SceneResult<Vec3> {
        Ok(self.world_transform(id)?.translation())
    }

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn world_rotation(&self, id: NodeId) -> SceneResult<Quat> {
        Ok(self.world_trs(id)?.rotation)
    }

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn world_scale(&self, id: NodeId) -> SceneResult<Vec3> {
        Ok(self.world_trs(id)?.scale)
    }

    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    pub fn world_euler_angles(&self, id: NodeId) -> SceneResult<Vec3> {
        Ok(self.world_rotation(id)?.to_euler())
    }

    /// Place the node at world position `position`.
    ///
    /// Undoes each ancestor's local transform from the root down,
    /// `p = S⁻¹ · R⁻¹ · (p − T)` per level, which inverts the parent's world
    /// matrix exactly.
    ///
    /// # Errors
    ///
    /// - [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    /// - [`SceneError::Math`](crate::SceneError::Math) if an ancestor's scale has a zero
    ///   component. The node is unchanged.
    pub fn set_world_position(&mut self, id: NodeId, position: Vec3) -> SceneResult<()> {
        let local = match self.node(id)?.parent {
            Some(parent) => self
                .ancestry(parent)?
                .iter()
                .try_fold(position, |p, level| level.inverse_transform_point(p))?,
            None => position,
        };
        self.set_local_position(id, local)
    }

    /// Give the node world rotation `rotation`. The input is normalised.
    ///
    /// # Errors
    ///
    /// - [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    /// - [`SceneError::Math`](crate::SceneError::Math) if `rotation` is the zero quaternion.
    pub fn set_world_rotation(&mut self, id: NodeId, rotation: Quat) -> SceneResult<()> {
        let rotation = rotation.normalize()?;
        let parent = self.parent_world_trs(id)?.rotation;
        let local = (parent.inverse()? * rotation).normalize()?;
        self.set_local_rotation(id, local)
    }

    /// # Errors
    ///
    /// Same as [`Scene::set_world_rotation`].
    pub fn set_world_euler_angles(&mut self, id: NodeId, angles: Vec3) -> SceneResult<()> {
        self.set_world_rotation(id, Quat::from_euler(angles))
    }

    /// Give the node world scale `scale` by dividing out the parent's world
    /// scale per axis.
    ///
    /// # Errors
    ///
    /// - [`SceneError::NodeNotFound`](crate::SceneError::NodeNotFound) if `id` is not live.
    /// - [`SceneError::Math`](crate::SceneError::Math) if the parent's world scale has a zero
    ///   component.
    pub fn set_world_scale(&mut self, id: NodeId, scale: Vec3) -> SceneResult<()> {
        let parent = self.parent_world_trs(id)?.scale;
        let local = scale.mul_elem(parent.recip_elem()?);
        self.set_local_scale(id, local)
    }
}
