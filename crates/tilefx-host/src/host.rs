//! The effect host: the two entry points the render pipeline calls.

use std::ops::Range;

use tilefx_surface::{Rect, Surface};
use tracing::{debug, info, trace, warn};

use crate::config::EffectConfig;
use crate::diagnostics;
use crate::fault::{FaultCause, FaultRecord};
use crate::isolation;
use crate::slot::{self, LifecycleState, ModuleSlot};

/// Drives an untrusted effect module inside a tiled render pipeline.
///
/// The pipeline calls [`prepare`](Self::prepare) once per configuration and
/// then [`render_regions`](Self::render_regions) any number of times, from
/// any number of threads, each call owning a disjoint subrange of the region
/// list. Module faults never reach the caller: they are recorded on the
/// configuration's [`FaultRecorder`](crate::FaultRecorder), the destination
/// receives a copy of the source, and the module is disposed and never called
/// again for that configuration.
///
/// `prepare` and `teardown` take `&mut self`, so they cannot overlap with
/// in-flight renders.
#[derive(Debug, Default)]
pub struct EffectHost {
    slot: ModuleSlot,
}

impl EffectHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state of the loaded configuration.
    pub fn state(&self) -> LifecycleState {
        self.slot.state()
    }

    /// Returns true while the first successful render has not yet fetched
    /// module diagnostics.
    pub fn diagnostics_pending(&self) -> bool {
        self.slot.diagnostics_pending()
    }

    /// Start a new configuration.
    ///
    /// Any module left over from the previous configuration is disposed
    /// first. The module is taken out of `config`; if there is none, the slot
    /// stays `Unloaded` and every render becomes an identity copy. Otherwise
    /// the module's setup call runs under fault isolation: success makes the
    /// slot `Ready`, a fault is recorded and leaves the slot `Disabled`.
    pub fn prepare(&mut self, config: &mut EffectConfig, dst: &Surface, src: &Surface) {
        self.teardown();
        self.slot = ModuleSlot::new();

        let Some(mut module) = config.take_module() else {
            debug!("configuration has no effect module; renders will copy the source");
            return;
        };

        let ctx = config.context(dst, src);
        match isolation::guard(|| module.configure(&ctx)) {
            Ok(()) => {
                info!(pass = ?ctx.pass, "effect module configured");
                self.slot.install_ready(module);
            }
            Err(cause) => {
                warn!(%cause, "effect module failed to configure; disabling");
                config.faults().record(FaultRecord::configure(cause));
                dst.copy_surface(src);
                self.slot.mark_disabled();
                slot::release(module);
            }
        }
    }

    /// Render `regions[start_index..start_index + length]`.
    ///
    /// The subrange is clipped to the region list. When the slot is not
    /// `Ready` the whole source frame is copied to the destination instead.
    /// The first successful render of a configuration also fetches the
    /// module's diagnostics into the configuration's output log.
    pub fn render_regions(
        &self,
        config: &EffectConfig,
        dst: &Surface,
        src: &Surface,
        regions: &[Rect],
        start_index: usize,
        length: usize,
    ) {
        if !self.slot.is_ready() {
            trace!(state = %self.slot.state(), "no live module; copying source");
            dst.copy_surface(src);
            return;
        }

        let range = clip_range(regions.len(), start_index, length);
        let own = &regions[range.clone()];
        let ctx = config.context(dst, src);

        let outcome = self.slot.with_module(|module| {
            let rendered = isolation::guard(|| {
                for region in own {
                    module.render_tile(&ctx, *region)?;
                }
                Ok(())
            });

            if rendered.is_ok() && self.slot.take_diagnostics_pending() {
                diagnostics::fetch_into(module, config.output());
            }
            rendered
        });

        match outcome {
            Some(Ok(())) => {}
            // Disabled by a concurrent fault between the state check and the lock.
            None => dst.copy_surface(src),
            Some(Err(cause)) => self.contain_render_fault(config, dst, src, own, range, cause),
        }
    }

    fn contain_render_fault(
        &self,
        config: &EffectConfig,
        dst: &Surface,
        src: &Surface,
        own: &[Rect],
        range: Range<usize>,
        cause: FaultCause,
    ) {
        let first = self.slot.disable_with(|| {
            warn!(
                regions = ?range,
                %cause,
                "effect module faulted while rendering; disabling for this configuration"
            );
            config.faults().record(FaultRecord::render(range.clone(), cause.clone()));
            dst.copy_surface(src);
        });

        if !first {
            debug!(regions = ?range, %cause, "module already disabled; copying own regions");
            for region in own {
                dst.copy_region(src, *region);
            }
        }
    }

    /// Dispose the current module, if any. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.slot.vacate() {
            info!("effect module disposed");
        }
    }
}

impl Drop for EffectHost {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn clip_range(len: usize, start_index: usize, length: usize) -> Range<usize> {
    let start = start_index.min(len);
    let end = start.saturating_add(length).min(len);
    start..end
}
