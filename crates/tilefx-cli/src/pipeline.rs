//! Tiled render pipeline driving an [`EffectHost`].
//!
//! The pipeline splits the frame into tiles, groups them into batches and
//! lets a pool of scoped worker threads pull batches until none remain.
//! Every batch goes through `render_regions`, so a faulting module is
//! contained the same way no matter which worker hit it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tilefx_host::{EffectConfig, EffectHost, EnvironmentParameters, LifecycleState};
use tilefx_surface::{ColorBgra, Surface, SurfaceError};
use tracing::{debug, info};

use crate::effects::EffectRegistry;
use crate::job::RenderJob;

const CHECKER_CELL: u32 = 16;
const CHECKER_LIGHT: ColorBgra = ColorBgra::rgb(224, 196, 128);
const CHECKER_DARK: ColorBgra = ColorBgra::rgb(48, 64, 112);

/// Checkerboard source used when a job names no input image.
pub fn checkerboard(width: u32, height: u32) -> Result<Surface, SurfaceError> {
    let surface = Surface::new(width, height, CHECKER_LIGHT)?;
    for y in 0..height {
        for x in 0..width {
            if (x / CHECKER_CELL + y / CHECKER_CELL) % 2 == 1 {
                surface.set(x, y, CHECKER_DARK);
            }
        }
    }
    Ok(surface)
}

/// One recorded fault, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultSummary {
    pub origin: String,
    pub kind: String,
    pub message: String,
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub effect: String,
    pub width: u32,
    pub height: u32,
    pub tiles: usize,
    pub batches: usize,
    pub workers: usize,
    /// Module state after the last batch, before teardown.
    pub state: String,
    /// Set when the effect could not be built; the frame is then a copy of
    /// the source.
    pub build_error: Option<String>,
    pub faults: Vec<FaultSummary>,
    pub output: Vec<String>,
    /// BLAKE3 hash of the encoded output image, once written.
    pub output_hash: Option<String>,
    #[serde(skip)]
    pub elapsed: Duration,
    pub elapsed_ms: u128,
}

impl RenderReport {
    /// True when the module ran to completion without faults.
    pub fn is_clean(&self) -> bool {
        self.build_error.is_none() && self.faults.is_empty()
    }
}

/// Run `job` over `src` and return the rendered frame and a report.
pub fn run(
    job: &RenderJob,
    registry: &EffectRegistry,
    src: &Surface,
) -> Result<(Surface, RenderReport), SurfaceError> {
    let start = Instant::now();
    let dst = Surface::transparent(src.width(), src.height())?;

    // An effect that fails to build behaves like an empty configuration.
    let (module, build_error) = match registry.build(&job.effect, &job.parameters) {
        Ok(module) => (Some(module), None),
        Err(e) => {
            info!(effect = %job.effect, error = %e, "effect failed to build");
            (None, Some(e.to_string()))
        }
    };

    let mut config = EffectConfig::from_module(module)
        .with_pass(job.pass())
        .with_parameters(job.parameters.clone())
        .with_environment(EnvironmentParameters::from(&job.environment));

    let mut host = EffectHost::new();
    host.prepare(&mut config, &dst, src);

    let tiles = src.bounds().tiles(job.tile_size);
    let batch = job.batch.max(1);
    let batches = tiles.len().div_ceil(batch);
    let workers = job.worker_count().min(batches.max(1));
    debug!(tiles = tiles.len(), batches, workers, "rendering");

    let next = AtomicUsize::new(0);
    std::thread::scope(|scope| {
        for _ in 0..workers {
            let (host, config, dst, tiles, next) = (&host, &config, &dst, &tiles, &next);
            scope.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                if index >= batches {
                    break;
                }
                host.render_regions(config, dst, src, tiles, index * batch, batch);
            });
        }
    });

    let state = host.state();
    host.teardown();

    let faults = config
        .faults()
        .records()
        .into_iter()
        .map(|record| FaultSummary {
            origin: record.origin.to_string(),
            kind: record.cause.kind.to_string(),
            message: record.cause.message,
        })
        .collect();

    let elapsed = start.elapsed();
    let report = RenderReport {
        effect: job.effect.clone(),
        width: src.width(),
        height: src.height(),
        tiles: tiles.len(),
        batches,
        workers,
        state: state.to_string(),
        build_error,
        faults,
        output: config.output().entries(),
        output_hash: None,
        elapsed,
        elapsed_ms: elapsed.as_millis(),
    };

    if state == LifecycleState::Disabled {
        info!(effect = %job.effect, faults = report.faults.len(), "effect disabled");
    }

    Ok((dst, report))
}
