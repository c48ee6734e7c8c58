//! tilefx effect host
//!
//! Runs untrusted effect modules inside a tiled render pipeline without
//! letting them destabilize it.
//!
//! # Overview
//!
//! - [`EffectModule`]: the capability set a module exposes (setup, per-tile
//!   render, dispose, optional diagnostics)
//! - [`EffectConfig`]: one configuration: the module, render parameters and
//!   the fault/output logs the UI reads
//! - [`EffectHost`]: `prepare` once per configuration, then `render_regions`
//!   from any number of workers
//! - [`ModuleSlot`]: the `Unloaded -> Ready -> Disabled` lifecycle
//!
//! Every module call is isolated: errors and panics become a
//! [`FaultRecord`], the destination receives the unmodified source, and the
//! module is disposed and disabled for the rest of the configuration.
//!
//! # Example
//!
//! ```
//! use tilefx_host::{EffectConfig, EffectHost, EffectModule, ModuleResult, RenderContext};
//! use tilefx_surface::{ColorBgra, Rect, Surface};
//!
//! struct Invert;
//!
//! impl EffectModule for Invert {
//!     fn configure(&mut self, _ctx: &RenderContext<'_>) -> ModuleResult {
//!         Ok(())
//!     }
//!
//!     fn render_tile(&self, ctx: &RenderContext<'_>, region: Rect) -> ModuleResult {
//!         for y in region.y..region.bottom() {
//!             for x in region.x..region.right() {
//!                 ctx.dst.set(x, y, ctx.src.get(x, y).inverted());
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let src = Surface::new(32, 32, ColorBgra::white()).unwrap();
//! let dst = Surface::transparent(32, 32).unwrap();
//! let mut config = EffectConfig::new(Box::new(Invert));
//!
//! let mut host = EffectHost::new();
//! host.prepare(&mut config, &dst, &src);
//!
//! let tiles = src.bounds().tiles(16);
//! host.render_regions(&config, &dst, &src, &tiles, 0, tiles.len());
//!
//! assert_eq!(dst.get(0, 0), ColorBgra::black());
//! assert!(config.faults().is_empty());
//! ```

pub mod config;
pub mod diagnostics;
pub mod fault;
pub mod host;
pub mod isolation;
pub mod module;
pub mod output;
pub mod slot;

pub use config::EffectConfig;
pub use fault::{CauseKind, FaultCause, FaultOrigin, FaultRecord, FaultRecorder};
pub use host::EffectHost;
pub use module::{
    EffectModule, EnvironmentParameters, ModuleError, ModuleResult, ParameterToken, RenderContext,
    RenderPass,
};
pub use output::OutputLog;
pub use slot::{LifecycleState, ModuleSlot};
