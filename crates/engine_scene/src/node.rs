//! Node handles and per-node storage.
//!
//! A [`NodeId`] is a generational index into the scene's arena. When a node
//! is removed its slot's generation is bumped, so any handle still pointing
//! at the old occupant stops resolving instead of aliasing a new node. A slot
//! whose generation would overflow is retired instead of reused.

use std::cell::Cell;
use std::fmt;

use engine_math::{Mat4, Transform3D};
use serde::{Deserialize, Serialize};

use crate::behavior::SharedBehavior;

/// A handle to a node in a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    #[must_use]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the arena.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Number of times the slot had been vacated when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}v{})", self.index, self.generation)
    }
}

/// Storage for one live node.
///
/// The world matrix cache lives in [`Cell`]s so world queries can refresh it
/// through a shared reference.
pub(crate) struct Node {
    pub(crate) name: Option<String>,
    pub(crate) local: Transform3D,
    pub(crate) world: Cell<Mat4>,
    pub(crate) dirty: Cell<bool>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) behaviors: Vec<SharedBehavior>,
}

impl Node {
    pub(crate) fn new(name: Option<String>, local: Transform3D) -> Self {
        Self {
            name,
            local,
            world: Cell::new(Mat4::IDENTITY),
            dirty: Cell::new(true),
            parent: None,
            children: Vec::new(),
            behaviors: Vec::new(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("local", &self.local)
            .field("dirty", &self.dirty.get())
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("behaviors", &self.behaviors.len())
            .finish()
    }
}

/// An arena slot. `node` is `None` while the slot is on the free list.
#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) node: Option<Node>,
}
