//! Scripted effect module shared by the host integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};

use serde_json::Value;
use tilefx_host::{EffectModule, ModuleError, ModuleResult, ParameterToken, RenderContext};
use tilefx_surface::{ColorBgra, Rect, Surface};

/// How a scripted call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Error,
    Panic,
}

impl Failure {
    fn raise(self, what: &str) -> ModuleResult {
        match self {
            Failure::Error => Err(ModuleError::msg(format!("{} failed", what))),
            Failure::Panic => panic!("{} panicked", what),
        }
    }
}

/// Counters observed from outside the module.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    pub configures: Arc<AtomicUsize>,
    pub tiles: Arc<AtomicUsize>,
    pub disposals: Arc<AtomicUsize>,
    pub diagnostic_reads: Arc<AtomicUsize>,
    pub calls_after_dispose: Arc<AtomicUsize>,
    pub drops: Arc<AtomicUsize>,
    pub tokens: Arc<Mutex<Vec<Option<ParameterToken>>>>,
}

impl Probe {
    pub fn disposals(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }

    pub fn tiles(&self) -> usize {
        self.tiles.load(Ordering::SeqCst)
    }

    pub fn configures(&self) -> usize {
        self.configures.load(Ordering::SeqCst)
    }

    pub fn diagnostic_reads(&self) -> usize {
        self.diagnostic_reads.load(Ordering::SeqCst)
    }

    pub fn calls_after_dispose(&self) -> usize {
        self.calls_after_dispose.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }
}

/// An effect that inverts its source and fails on command.
pub struct ScriptedModule {
    probe: Probe,
    disposed: bool,
    configure_failure: Option<Failure>,
    fail_on_tile: Option<(usize, Failure)>,
    fail_region: Option<(Rect, Failure)>,
    fail_every_tile: Option<Failure>,
    dispose_panics: bool,
    drop_panics: bool,
    diagnostics: Arc<Mutex<Option<Value>>>,
    barrier: Option<Arc<Barrier>>,
}

impl ScriptedModule {
    pub fn new(probe: &Probe) -> Self {
        Self {
            probe: probe.clone(),
            disposed: false,
            configure_failure: None,
            fail_on_tile: None,
            fail_region: None,
            fail_every_tile: None,
            dispose_panics: false,
            drop_panics: false,
            diagnostics: Arc::new(Mutex::new(None)),
            barrier: None,
        }
    }

    pub fn failing_configure(mut self, failure: Failure) -> Self {
        self.configure_failure = Some(failure);
        self
    }

    /// Fail on the `n`th `render_tile` call (1-based).
    pub fn failing_on_tile(mut self, n: usize, failure: Failure) -> Self {
        self.fail_on_tile = Some((n, failure));
        self
    }

    /// Fail whenever asked to render `region`.
    pub fn failing_region(mut self, region: Rect, failure: Failure) -> Self {
        self.fail_region = Some((region, failure));
        self
    }

    /// Fail every `render_tile` call.
    pub fn failing_every_tile(mut self, failure: Failure) -> Self {
        self.fail_every_tile = Some(failure);
        self
    }

    pub fn panicking_dispose(mut self) -> Self {
        self.dispose_panics = true;
        self
    }

    /// Panic from the module's destructor.
    pub fn panicking_drop(mut self) -> Self {
        self.drop_panics = true;
        self
    }

    /// Diagnostics the module exposes; the handle can be changed later.
    pub fn with_diagnostics(mut self, diagnostics: Arc<Mutex<Option<Value>>>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Every `render_tile` call waits on this barrier first.
    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn boxed(self) -> Box<dyn EffectModule> {
        Box::new(self)
    }

    fn check_alive(&self) {
        if self.disposed {
            self.probe.calls_after_dispose.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl EffectModule for ScriptedModule {
    fn configure(&mut self, ctx: &RenderContext<'_>) -> ModuleResult {
        self.check_alive();
        self.probe.configures.fetch_add(1, Ordering::SeqCst);
        self.probe
            .tokens
            .lock()
            .unwrap()
            .push(ctx.token.cloned());
        match self.configure_failure {
            Some(failure) => failure.raise("configure"),
            None => Ok(()),
        }
    }

    fn render_tile(&self, ctx: &RenderContext<'_>, region: Rect) -> ModuleResult {
        self.check_alive();
        if let Some(barrier) = &self.barrier {
            barrier.wait();
        }

        let n = self.probe.tiles.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((at, failure)) = self.fail_on_tile {
            if n == at {
                return failure.raise("render_tile");
            }
        }
        if let Some(failure) = self.fail_every_tile {
            return failure.raise("render_tile");
        }
        if let Some((bad, failure)) = self.fail_region {
            if bad == region {
                return failure.raise("render_tile");
            }
        }

        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                ctx.dst.set(x, y, ctx.src.get(x, y).inverted());
            }
        }
        Ok(())
    }

    fn dispose(&mut self) {
        self.check_alive();
        self.disposed = true;
        self.probe.disposals.fetch_add(1, Ordering::SeqCst);
        if self.dispose_panics {
            panic!("dispose panicked");
        }
    }

    fn diagnostics(&self) -> ModuleResult<Option<Value>> {
        self.check_alive();
        self.probe.diagnostic_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.diagnostics.lock().unwrap().clone())
    }
}

impl Drop for ScriptedModule {
    fn drop(&mut self) {
        self.probe.drops.fetch_add(1, Ordering::SeqCst);
        if self.drop_panics {
            panic!("module destructor panicked");
        }
    }
}

/// A source frame where every pixel differs from its neighbours.
pub fn gradient(width: u32, height: u32) -> Surface {
    let surface = Surface::transparent(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            surface.set(x, y, ColorBgra::rgb((x * 7) as u8, (y * 11) as u8, 42));
        }
    }
    surface
}

/// A destination pre-filled with a color no test effect produces.
pub fn blank(width: u32, height: u32) -> Surface {
    Surface::new(width, height, ColorBgra::rgba(1, 2, 3, 4)).unwrap()
}

/// Returns true if `dst` holds the inverted source inside `region`.
pub fn is_rendered(dst: &Surface, src: &Surface, region: Rect) -> bool {
    (region.y..region.bottom())
        .all(|y| (region.x..region.right()).all(|x| dst.get(x, y) == src.get(x, y).inverted()))
}
