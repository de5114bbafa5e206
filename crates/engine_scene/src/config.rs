//! Scene configuration.

/// Configuration for a [`Scene`](crate::Scene).
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Human-readable scene name, attached to log events.
    pub name: String,
    /// Number of node slots to reserve up front.
    pub capacity: usize,
}

impl SceneConfig {
    /// Create a config with the given name and no reserved capacity.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity: 0,
        }
    }

    /// Reserve room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new("scene")
    }
}
