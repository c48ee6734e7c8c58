//! tilefx CLI
//!
//! Command-line tool for running tiled render effects inside the
//! fault-containing effect host.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tilefx_cli::commands;
use tilefx_cli::commands::render::RenderOptions;
use tilefx_cli::job::parse_param;

/// tilefx: run untrusted render effects without risking the frame
#[derive(Parser)]
#[command(name = "tilefx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an effect over an image
    Render {
        /// Path to a JSON render job
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Effect name (overrides the job's effect)
        #[arg(short, long)]
        effect: Option<String>,

        /// Source PNG (default: generated checkerboard)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output PNG
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Effect parameter as key=value; the value is parsed as JSON when possible
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, serde_json::Value)>,

        /// Render as an interactive preview pass
        #[arg(long)]
        preview: bool,

        /// Tile edge length in pixels (0 renders the frame as one tile)
        #[arg(long)]
        tile_size: Option<u32>,

        /// Render worker threads (0 = one per core)
        #[arg(long)]
        workers: Option<usize>,

        /// Tiles per render call
        #[arg(long)]
        batch: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List built-in effects
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show build information and render defaults
    Info,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Render {
            job,
            effect,
            input,
            output,
            params,
            preview,
            tile_size,
            workers,
            batch,
            json,
        } => commands::render::run(&RenderOptions {
            job,
            effect,
            input,
            output,
            params,
            preview,
            tile_size,
            workers,
            batch,
            json,
        }),
        Commands::List { json } => commands::list::run(json),
        Commands::Info => commands::info::run(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
