//! Info command implementation

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;

use crate::job::{DEFAULT_SOURCE_SIZE, DEFAULT_TILE_SIZE};

/// Print build information and render defaults.
pub fn run() -> Result<ExitCode> {
    println!(
        "{} {}",
        env!("CARGO_PKG_NAME").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("  {} {}", "About:".dimmed(), env!("CARGO_PKG_DESCRIPTION"));
    println!("  {} {}", "License:".dimmed(), env!("CARGO_PKG_LICENSE"));
    println!("  {} {}px", "Tile size:".dimmed(), DEFAULT_TILE_SIZE);
    println!(
        "  {} {}x{} checkerboard",
        "Default source:".dimmed(),
        DEFAULT_SOURCE_SIZE,
        DEFAULT_SOURCE_SIZE
    );
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    println!("  {} {}", "Workers:".dimmed(), cores);
    Ok(ExitCode::SUCCESS)
}
