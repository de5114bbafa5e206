//! Behavior capability attached to scene nodes.
//!
//! Anything that implements [`Behavior`] can be attached to a node. The scene
//! calls [`Behavior::start`] once when the node starts and
//! [`Behavior::update`] once per tick, in attachment order.
//!
//! Behaviors are shared through [`SharedBehavior`] handles. Identity is the
//! handle's allocation, so attaching the same handle twice is a no-op while
//! two separately created behaviors of the same type are both kept.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

/// Upcast to [`Any`] for runtime type checks on trait objects.
///
/// Implemented for every `'static` type; behaviors never implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The `{start, update}` contract every attached behavior satisfies.
pub trait Behavior: AsAny + Send {
    /// Called once when the owning node starts.
    ///
    /// # Errors
    ///
    /// Any error aborts the broadcast and is reported to the caller.
    fn start(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once per tick.
    ///
    /// # Errors
    ///
    /// Any error aborts the broadcast and is reported to the caller.
    fn update(&mut self) -> anyhow::Result<()>;

    /// Name used in logs and errors. Defaults to the Rust type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A reference-counted, lockable behavior handle.
pub type SharedBehavior = Arc<Mutex<dyn Behavior>>;

/// Wrap a behavior in a [`SharedBehavior`] handle.
#[must_use]
pub fn shared<B: Behavior>(behavior: B) -> SharedBehavior {
    Arc::new(Mutex::new(behavior))
}

/// Returns `true` if the behavior behind `handle` has runtime type `T`.
#[must_use]
pub fn is_type<T: Behavior>(handle: &SharedBehavior) -> bool {
    let guard = handle.lock();
    let behavior: &dyn Behavior = &*guard;
    behavior.as_any().is::<T>()
}
