//! Deliberately faulty modules for exercising fault containment.

use std::sync::atomic::{AtomicUsize, Ordering};

use tilefx_host::{EffectModule, ModuleError, ModuleResult, RenderContext};
use tilefx_surface::Rect;

use super::pixel::map_region;

/// Inverts the first `after` tiles it is given, then panics.
pub struct PanicOnTile {
    after: usize,
    rendered: AtomicUsize,
}

impl PanicOnTile {
    pub fn new(after: usize) -> Self {
        Self {
            after,
            rendered: AtomicUsize::new(0),
        }
    }
}

impl EffectModule for PanicOnTile {
    fn configure(&mut self, _ctx: &RenderContext<'_>) -> ModuleResult {
        self.rendered = AtomicUsize::new(0);
        Ok(())
    }

    fn render_tile(&self, ctx: &RenderContext<'_>, region: Rect) -> ModuleResult {
        let n = self.rendered.fetch_add(1, Ordering::SeqCst);
        if n >= self.after {
            panic!(
                "tile {}x{} at ({}, {}) out of bounds",
                region.width, region.height, region.x, region.y
            );
        }
        map_region(ctx, region, |c| c.inverted());
        Ok(())
    }
}

/// Rejects every setup call.
pub struct FailConfigure {
    message: String,
}

impl FailConfigure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl EffectModule for FailConfigure {
    fn configure(&mut self, _ctx: &RenderContext<'_>) -> ModuleResult {
        Err(ModuleError::msg(self.message.clone()))
    }

    fn render_tile(&self, _ctx: &RenderContext<'_>, _region: Rect) -> ModuleResult {
        Err(ModuleError::msg("render_tile called on an unconfigured module"))
    }
}
