//! Re-entrancy suppression for propagated changes.
//!
//! Writing into a system through its native API makes that system emit the
//! same lifecycle events the controller listens to. While a propagation into
//! a system is in flight, events from that system are echoes of our own
//! writes and must not be propagated back.

use groupbridge_types::System;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

/// Shared flag set, one per target system. Cloning yields another handle to
/// the same flags.
#[derive(Debug, Clone, Default)]
pub struct LoopGuard {
    in_flight: Arc<[AtomicUsize; 2]>,
}

impl LoopGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, target: System) -> &AtomicUsize {
        match target {
            System::Social => &self.in_flight[0],
            System::Course => &self.in_flight[1],
        }
    }

    /// Returns true while a propagation into `target` is in flight, meaning
    /// events observed on `target` are echoes.
    pub fn is_suppressed(&self, target: System) -> bool {
        self.slot(target).load(Ordering::Acquire) > 0
    }

    /// Marks a propagation into `target` as in flight until the returned
    /// scope is dropped. Scopes nest.
    #[must_use = "the guard is released as soon as the scope is dropped"]
    pub fn enter(&self, target: System) -> PropagationScope<'_> {
        let depth = self.slot(target).fetch_add(1, Ordering::AcqRel) + 1;
        trace!(%target, depth, "propagation scope entered");
        PropagationScope {
            guard: self,
            target,
        }
    }
}

/// Holds a [`LoopGuard`] flag for one target system. Released on drop,
/// including early returns and unwinding.
#[derive(Debug)]
pub struct PropagationScope<'a> {
    guard: &'a LoopGuard,
    target: System,
}

impl PropagationScope<'_> {
    pub fn target(&self) -> System {
        self.target
    }
}

impl Drop for PropagationScope<'_> {
    fn drop(&mut self) {
        self.guard.slot(self.target).fetch_sub(1, Ordering::AcqRel);
        trace!(target = %self.target, "propagation scope released");
    }
}
