//! Per-pixel color mapping effects.

use tilefx_host::{EffectModule, ModuleResult, RenderContext};
use tilefx_surface::{ColorBgra, Rect};

/// Applies a pure color function to every pixel of a region.
pub struct PixelMap {
    map: fn(ColorBgra) -> ColorBgra,
}

impl PixelMap {
    pub fn new(map: fn(ColorBgra) -> ColorBgra) -> Self {
        Self { map }
    }

    pub fn invert() -> Self {
        Self::new(ColorBgra::inverted)
    }

    pub fn grayscale() -> Self {
        Self::new(|c| {
            let l = c.luminance();
            ColorBgra::rgba(l, l, l, c.a)
        })
    }
}

/// Copy `region` from source to destination through `map`.
pub(crate) fn map_region(ctx: &RenderContext<'_>, region: Rect, map: impl Fn(ColorBgra) -> ColorBgra) {
    for y in region.y..region.bottom() {
        for x in region.x..region.right() {
            ctx.dst.set(x, y, map(ctx.src.get(x, y)));
        }
    }
}

impl EffectModule for PixelMap {
    fn configure(&mut self, _ctx: &RenderContext<'_>) -> ModuleResult {
        Ok(())
    }

    fn render_tile(&self, ctx: &RenderContext<'_>, region: Rect) -> ModuleResult {
        map_region(ctx, region, self.map);
        Ok(())
    }
}
