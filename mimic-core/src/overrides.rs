//! Per-wrapper replacement behaviour
//!
//! An [`OverrideTable`] maps operations to closures that take over a call
//! before any delegate sees it. The typed [`Operation`] handle fixes the
//! closure's signature, so a mismatched override does not compile.

use crate::identity::{Operation, OperationId};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Shared replacement behaviour for one operation
pub type Behavior<P, R> = Rc<dyn Fn(P) -> R>;

/// Map from operation to replacement behaviour
#[derive(Default)]
pub struct OverrideTable {
    entries: RefCell<HashMap<OperationId, Box<dyn Any>>>,
}

impl OverrideTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `behavior` for `operation`, replacing any previous one
    pub fn set<P, R>(&self, operation: &Operation<P, R>, behavior: impl Fn(P) -> R + 'static)
    where
        P: 'static,
        R: 'static,
    {
        let behavior: Behavior<P, R> = Rc::new(behavior);
        let replaced = self
            .entries
            .borrow_mut()
            .insert(operation.id(), Box::new(behavior))
            .is_some();

        if replaced {
            tracing::debug!(operation = operation.name(), "Replaced override");
        }
    }

    /// The behaviour registered for `operation`, if any
    pub fn get<P, R>(&self, operation: &Operation<P, R>) -> Option<Behavior<P, R>>
    where
        P: 'static,
        R: 'static,
    {
        self.entries
            .borrow()
            .get(&operation.id())
            .and_then(|entry| entry.downcast_ref::<Behavior<P, R>>())
            .cloned()
    }

    /// Drop the behaviour for `operation`; returns whether one was registered
    pub fn remove<P, R>(&self, operation: &Operation<P, R>) -> bool {
        self.entries.borrow_mut().remove(&operation.id()).is_some()
    }

    /// Whether `operation` is overridden
    pub fn contains<P, R>(&self, operation: &Operation<P, R>) -> bool {
        self.entries.borrow().contains_key(&operation.id())
    }

    /// Number of overridden operations
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no operation is overridden
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop every override
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl fmt::Debug for OverrideTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideTable")
            .field("entries", &self.len())
            .finish()
    }
}
