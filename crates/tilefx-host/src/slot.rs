//! The module slot: the one piece of mutable lifecycle state per configuration.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use parking_lot::RwLock;
use tracing::warn;

use crate::isolation;
use crate::module::EffectModule;

/// Lifecycle of a slot within one configuration.
///
/// `Unloaded -> Ready -> Disabled`, or `Unloaded -> Disabled` when setup
/// fails. `Disabled` is terminal until the next configuration replaces the
/// slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LifecycleState {
    Unloaded = 0,
    Ready = 1,
    Disabled = 2,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Unloaded,
            1 => LifecycleState::Ready,
            2 => LifecycleState::Disabled,
            // Only `set_state` writes the byte.
            _ => unreachable!("invalid lifecycle state byte {value}"),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Unloaded => write!(f, "unloaded"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::Disabled => write!(f, "disabled"),
        }
    }
}

/// Holds the live module, if any, and its lifecycle state.
///
/// Invariant: a module is present iff the state is `Ready`. Both change only
/// under the exclusive lock (or through `&mut self`), and a module is
/// disposed and dropped before that lock is released. Render workers hold the shared lock
/// for the duration of their module call, so no worker can observe a module
/// that has already been disposed.
pub struct ModuleSlot {
    state: AtomicU8,
    module: RwLock<Option<Box<dyn EffectModule>>>,
    diagnostics_pending: AtomicBool,
}

impl Default for ModuleSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModuleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSlot")
            .field("state", &self.state())
            .field("diagnostics_pending", &self.diagnostics_pending.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ModuleSlot {
    /// An empty slot in the `Unloaded` state.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Unloaded as u8),
            module: RwLock::new(None),
            diagnostics_pending: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LifecycleState::Ready
    }

    pub fn has_module(&self) -> bool {
        self.module.read().is_some()
    }

    /// Returns true while the one-shot diagnostic fetch has not run yet.
    pub fn diagnostics_pending(&self) -> bool {
        self.diagnostics_pending.load(Ordering::Acquire)
    }

    fn set_state(&self, state: LifecycleState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Install a module whose setup call succeeded.
    pub(crate) fn install_ready(&mut self, module: Box<dyn EffectModule>) {
        *self.module.get_mut() = Some(module);
        *self.diagnostics_pending.get_mut() = true;
        self.set_state(LifecycleState::Ready);
    }

    /// Mark the slot disabled without ever having held a module.
    pub(crate) fn mark_disabled(&mut self) {
        debug_assert!(self.module.get_mut().is_none());
        *self.diagnostics_pending.get_mut() = false;
        self.set_state(LifecycleState::Disabled);
    }

    /// Run `f` against the live module under the shared lock.
    ///
    /// Returns `None` without calling `f` if the slot holds no module.
    pub(crate) fn with_module<R>(&self, f: impl FnOnce(&dyn EffectModule) -> R) -> Option<R> {
        let guard = self.module.read();
        guard.as_deref().map(|module| f(module))
    }

    /// Consume the pending diagnostics flag. Returns true exactly once per
    /// installed module.
    pub(crate) fn take_diagnostics_pending(&self) -> bool {
        self.diagnostics_pending.swap(false, Ordering::AcqRel)
    }

    /// Perform the fault transition to `Disabled`.
    ///
    /// Under the exclusive lock: if a module is still present, the slot is
    /// cleared and marked `Disabled`, `on_first` runs, the module is released,
    /// and this returns true. If another caller already disabled the slot
    /// nothing happens and this returns false. A module that faulted is never
    /// called again.
    pub(crate) fn disable_with(&self, on_first: impl FnOnce()) -> bool {
        let mut guard = self.module.write();
        let Some(module) = guard.take() else {
            return false;
        };

        self.diagnostics_pending.store(false, Ordering::Release);
        self.set_state(LifecycleState::Disabled);
        on_first();
        release(module);
        true
    }

    /// Dispose and drop the module, if present, leaving the slot `Unloaded`.
    ///
    /// Returns true if a module was disposed.
    pub(crate) fn vacate(&mut self) -> bool {
        let Some(module) = self.module.get_mut().take() else {
            return false;
        };

        *self.diagnostics_pending.get_mut() = false;
        if self.state() == LifecycleState::Ready {
            self.set_state(LifecycleState::Unloaded);
        }
        release(module);
        true
    }
}

/// Dispose and drop a module that has left its slot, containing panics from
/// both its dispose capability and its destructor.
pub(crate) fn release(mut module: Box<dyn EffectModule>) {
    if let Err(cause) = isolation::catch(|| module.dispose()) {
        warn!(%cause, "effect module panicked during dispose");
    }
    if let Err(cause) = isolation::catch(move || drop(module)) {
        warn!(%cause, "effect module panicked while being dropped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use tilefx_surface::Rect;

    use super::*;
    use crate::module::{ModuleResult, RenderContext};

    struct Counting {
        disposals: Arc<AtomicUsize>,
    }

    impl EffectModule for Counting {
        fn configure(&mut self, _ctx: &RenderContext<'_>) -> ModuleResult {
            Ok(())
        }

        fn render_tile(&self, _ctx: &RenderContext<'_>, _region: Rect) -> ModuleResult {
            Ok(())
        }

        fn dispose(&mut self) {
            self.disposals.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct DropPanics;

    impl EffectModule for DropPanics {
        fn configure(&mut self, _ctx: &RenderContext<'_>) -> ModuleResult {
            Ok(())
        }

        fn render_tile(&self, _ctx: &RenderContext<'_>, _region: Rect) -> ModuleResult {
            Ok(())
        }
    }

    impl Drop for DropPanics {
        fn drop(&mut self) {
            panic!("destructor panicked");
        }
    }

    fn ready_slot() -> (ModuleSlot, Arc<AtomicUsize>) {
        let disposals = Arc::new(AtomicUsize::new(0));
        let mut slot = ModuleSlot::new();
        slot.install_ready(Box::new(Counting {
            disposals: Arc::clone(&disposals),
        }));
        (slot, disposals)
    }

    #[test]
    fn test_new_slot_is_unloaded() {
        let slot = ModuleSlot::new();
        assert_eq!(slot.state(), LifecycleState::Unloaded);
        assert!(!slot.has_module());
        assert!(!slot.diagnostics_pending());
    }

    #[test]
    fn test_install_ready() {
        let (slot, _) = ready_slot();
        assert_eq!(slot.state(), LifecycleState::Ready);
        assert!(slot.has_module());
        assert!(slot.diagnostics_pending());
    }

    #[test]
    fn test_diagnostics_flag_taken_once() {
        let (slot, _) = ready_slot();
        assert!(slot.take_diagnostics_pending());
        assert!(!slot.take_diagnostics_pending());
    }

    #[test]
    fn test_disable_runs_once() {
        let (slot, disposals) = ready_slot();
        let mut first_calls = 0;

        assert!(slot.disable_with(|| first_calls += 1));
        assert!(!slot.disable_with(|| first_calls += 1));

        assert_eq!(first_calls, 1);
        assert_eq!(disposals.load(Ordering::SeqCst), 1);
        assert_eq!(slot.state(), LifecycleState::Disabled);
        assert!(!slot.has_module());
        assert!(slot.with_module(|_| ()).is_none());
    }

    #[test]
    fn test_vacate_is_idempotent() {
        let (mut slot, disposals) = ready_slot();
        assert!(slot.vacate());
        assert!(!slot.vacate());
        assert_eq!(disposals.load(Ordering::SeqCst), 1);
        assert_eq!(slot.state(), LifecycleState::Unloaded);
    }

    #[test]
    fn test_vacate_keeps_disabled_state() {
        let mut slot = ModuleSlot::new();
        slot.mark_disabled();
        assert!(!slot.vacate());
        assert_eq!(slot.state(), LifecycleState::Disabled);
    }

    #[test]
    fn test_state_byte_round_trip() {
        for state in [
            LifecycleState::Unloaded,
            LifecycleState::Ready,
            LifecycleState::Disabled,
        ] {
            assert_eq!(LifecycleState::from_u8(state as u8), state);
        }
    }

    #[test]
    fn test_disable_contains_destructor_panic() {
        let mut slot = ModuleSlot::new();
        slot.install_ready(Box::new(DropPanics));

        let mut first_calls = 0;
        assert!(slot.disable_with(|| first_calls += 1));

        assert_eq!(first_calls, 1);
        assert_eq!(slot.state(), LifecycleState::Disabled);
        assert!(!slot.has_module());
        assert!(!slot.diagnostics_pending());
    }

    #[test]
    fn test_vacate_contains_destructor_panic() {
        let mut slot = ModuleSlot::new();
        slot.install_ready(Box::new(DropPanics));

        assert!(slot.vacate());
        assert_eq!(slot.state(), LifecycleState::Unloaded);
        assert!(!slot.has_module());
    }
}
