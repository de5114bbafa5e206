//! Scene-graph error types.

use engine_math::MathError;

use crate::node::NodeId;

/// Errors that can occur while querying or mutating a [`Scene`](crate::Scene).
///
/// A failed operation never leaves the graph partially modified.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The handle does not refer to a live node (never spawned, or removed).
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Reparenting would make a node its own ancestor.
    #[error("cannot parent {child} under {parent}: would create a cycle")]
    CycleRejected {
        /// The node being reparented.
        child: NodeId,
        /// The rejected new parent.
        parent: NodeId,
    },

    /// An algebra operation rejected its input.
    #[error(transparent)]
    Math(#[from] MathError),

    /// A behavior's `start` or `update` hook failed.
    #[error("behavior {behavior} on {node} failed")]
    Behavior {
        /// The node the behavior is attached to.
        node: NodeId,
        /// The behavior's name.
        behavior: &'static str,
        /// The error the behavior returned.
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience alias for results in this crate.
pub type SceneResult<T> = Result<T, SceneError>;
