//! List command implementation

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::effects::EffectRegistry;

/// Print the registered effects.
pub fn run(json: bool) -> Result<ExitCode> {
    let registry = EffectRegistry::builtin();

    if json {
        let entries: Vec<_> = registry.list().collect();
        let text = serde_json::to_string_pretty(&entries).context("Failed to serialize effects")?;
        println!("{}", text);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} ({})", "Effects".cyan().bold(), registry.len());
    for entry in registry.list() {
        println!("  {} {}", format!("{:<16}", entry.name).bold(), entry.description);
        if !entry.parameters.is_empty() {
            println!("  {:<16} params: {}", "", entry.parameters.join(", ").dimmed());
        }
    }
    Ok(ExitCode::SUCCESS)
}
