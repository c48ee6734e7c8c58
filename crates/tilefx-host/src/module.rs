//! The capability set an effect module exposes to the host.
//!
//! Modules are produced outside the host (typically compiled from user
//! source) and are not trusted: any call may return an error or panic. The
//! host only ever talks to a module through [`EffectModule`].

use serde_json::Value;
use thiserror::Error;
use tilefx_surface::{ColorBgra, Rect, Surface};

/// User-facing effect parameters, as collected by the editor UI.
pub type ParameterToken = serde_json::Map<String, Value>;

/// Result type for module capability calls.
pub type ModuleResult<T = ()> = Result<T, ModuleError>;

/// Error returned by a module capability.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ModuleError {
    /// Create an error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Which kind of pass the host is rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderPass {
    /// Interactive low-resolution preview while the user edits parameters.
    Preview,
    /// Final render applied to the image.
    #[default]
    Final,
}

/// Host environment threaded through to every module call.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentParameters {
    /// Current primary (foreground) color.
    pub primary_color: ColorBgra,
    /// Current secondary (background) color.
    pub secondary_color: ColorBgra,
    /// Current brush width in pixels.
    pub brush_width: f32,
    /// Bounds of the active selection, if any.
    pub selection: Option<Rect>,
}

impl Default for EnvironmentParameters {
    fn default() -> Self {
        Self {
            primary_color: ColorBgra::black(),
            secondary_color: ColorBgra::white(),
            brush_width: 2.0,
            selection: None,
        }
    }
}

/// Per-call data handed to a module.
///
/// Modules read from `src` and write their output into `dst`. During tile
/// rendering a module must only write pixels inside the region it was given;
/// other workers may be writing the rest of `dst` at the same time.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub dst: &'a Surface,
    pub src: &'a Surface,
    pub pass: RenderPass,
    pub environment: &'a EnvironmentParameters,
    /// Parameter token, present on preview passes only. Final passes use the
    /// values the module was built with.
    pub token: Option<&'a ParameterToken>,
}

impl RenderContext<'_> {
    /// Returns true for interactive preview passes.
    pub fn is_preview(&self) -> bool {
        self.pass == RenderPass::Preview
    }
}

/// An opaque, possibly faulty render effect.
///
/// `render_tile` takes `&self` because the host calls it from several render
/// workers at once, each with a disjoint region.
pub trait EffectModule: Send + Sync {
    /// One-time setup for a configuration, before any tile is rendered.
    fn configure(&mut self, ctx: &RenderContext<'_>) -> ModuleResult;

    /// Render one region of the destination.
    fn render_tile(&self, ctx: &RenderContext<'_>, region: Rect) -> ModuleResult;

    /// Release module resources. Called exactly once, after which the host
    /// drops the module without calling anything else on it.
    fn dispose(&mut self) {}

    /// Free-form debug output the module wants to show the user.
    ///
    /// Only a non-empty JSON string is displayed; any other value is ignored.
    fn diagnostics(&self) -> ModuleResult<Option<Value>> {
        Ok(None)
    }
}
