//! `prepkit` command-line entry point.
//!
//! ```bash
//! prepkit profile data.csv
//! prepkit validate upload.csv --delimiter ';' --schema schema.json
//! prepkit apply data.csv --recipe recipe.json -o clean.csv
//! ```
//!
//! Settings come from `--config`, `$PREPKIT_CONFIG`, or the platform config
//! directory, in that order. Logs go to stderr; set `RUST_LOG=debug` to see
//! every applied operation.

#![expect(clippy::print_stdout)]

mod cli;

use anyhow::Result;
use clap::Parser as _;
use prepkit::config::{Settings, load_settings, load_settings_from};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let (settings, fallback): (Settings, _) = match &cli.config {
        Some(path) => (load_settings_from(path)?, None),
        None => load_settings(),
    };
    prepkit::logging::init(&settings.logging)?;
    if let Some(e) = fallback {
        tracing::warn!("Using default settings: {e:#}");
    }

    cli::run_command(cli.command, &settings)
}
