//! Render command implementation
//!
//! Runs an effect over a source image through the tiled pipeline and writes
//! the result as PNG.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::Value;
use tilefx_surface::png::{self, PngConfig};
use tilefx_surface::Surface;

use crate::effects::EffectRegistry;
use crate::job::RenderJob;
use crate::pipeline::{self, RenderReport};

/// Command line overrides applied on top of a job file.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub job: Option<PathBuf>,
    pub effect: Option<String>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub params: Vec<(String, Value)>,
    pub preview: bool,
    pub tile_size: Option<u32>,
    pub workers: Option<usize>,
    pub batch: Option<usize>,
    pub json: bool,
}

impl RenderOptions {
    /// Load the job file, if any, and apply the overrides.
    pub fn resolve(&self) -> Result<RenderJob> {
        let mut job = match (&self.job, &self.effect) {
            (Some(path), _) => RenderJob::load(path)?,
            (None, Some(effect)) => RenderJob::new(effect.clone()),
            (None, None) => bail!("either --job or --effect is required"),
        };

        if let Some(effect) = &self.effect {
            job.effect = effect.clone();
        }
        if let Some(input) = &self.input {
            job.input = Some(input.clone());
        }
        if let Some(output) = &self.output {
            job.output = Some(output.clone());
        }
        for (key, value) in &self.params {
            job.parameters.insert(key.clone(), value.clone());
        }
        if self.preview {
            job.preview = true;
        }
        if let Some(tile_size) = self.tile_size {
            job.tile_size = tile_size;
        }
        if let Some(workers) = self.workers {
            job.workers = workers;
        }
        if let Some(batch) = self.batch {
            job.batch = batch;
        }

        job.validate()?;
        Ok(job)
    }
}

/// Run the render command
///
/// # Returns
/// Exit code: 0 if the effect rendered cleanly, 1 if it faulted or failed
/// to build (the output then holds the unmodified source)
pub fn run(options: &RenderOptions) -> Result<ExitCode> {
    let report = render(options)?;
    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Resolve, render, write the output image and print the report.
pub fn render(options: &RenderOptions) -> Result<RenderReport> {
    let job = options.resolve()?;
    let registry = EffectRegistry::builtin();

    if !options.json {
        println!("{} {}", "Rendering:".cyan().bold(), job.effect);
    }

    let src = load_source(&job)?;
    let (dst, mut report) = pipeline::run(&job, &registry, &src).context("Failed to render")?;

    if let Some(output) = &job.output {
        report.output_hash = Some(write_output(&dst, output)?);
    }

    if options.json {
        let text = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", text);
    } else {
        print_report(&report, job.output.as_deref());
    }

    Ok(report)
}

fn load_source(job: &RenderJob) -> Result<Surface> {
    match &job.input {
        Some(path) => png::read_surface(path)
            .with_context(|| format!("Failed to read input image: {}", path.display())),
        None => pipeline::checkerboard(job.width, job.height)
            .context("Failed to create checkerboard source"),
    }
}

/// Encode and write the output image, returning its BLAKE3 hash.
fn write_output(surface: &Surface, path: &Path) -> Result<String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    let (data, hash) = png::write_surface_to_vec_with_hash(surface, &PngConfig::default())
        .context("Failed to encode output image")?;
    std::fs::write(path, data)
        .with_context(|| format!("Failed to write output image: {}", path.display()))?;
    Ok(hash)
}

fn print_report(report: &RenderReport, output: Option<&Path>) {
    println!(
        "  {} {}x{}, {} tiles in {} batches on {} workers",
        "Frame:".dimmed(),
        report.width,
        report.height,
        report.tiles,
        report.batches,
        report.workers
    );

    if let Some(error) = &report.build_error {
        println!("  {} {}", "Build failed:".red().bold(), error);
    }
    for fault in &report.faults {
        println!(
            "  {} {} ({}): {}",
            "Fault:".red().bold(),
            fault.origin,
            fault.kind,
            fault.message
        );
    }
    for line in &report.output {
        println!("  {} {}", "Output:".dimmed(), line);
    }

    if let Some(path) = output {
        println!("  {} {}", "Wrote:".dimmed(), path.display());
    }
    if let Some(hash) = &report.output_hash {
        println!("  {} {}", "Hash:".dimmed(), hash);
    }

    let status = if report.is_clean() {
        "SUCCESS".green().bold()
    } else {
        "FALLBACK".yellow().bold()
    };
    println!("\n{} {} in {:?}", status, report.state, report.elapsed);
}
