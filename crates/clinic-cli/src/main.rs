//! `clinic` — interactive, in-memory clinic scheduler.
//!
//! # Usage
//!
//! ```
//! clinic
//! clinic --config ./clinic.toml
//! clinic --non-interactive < script.txt
//! ```
//!
//! All records live in memory and are discarded on exit. Use the Export menu
//! entry to dump them as JSON.

mod settings;
mod shell;

use std::{io, path::PathBuf};

use anyhow::Context as _;
use clap::Parser;
use clinic_core::Clinic;
use settings::Settings;
use shell::Shell;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clinic", author, version, about = "In-memory clinic scheduler")]
struct Cli {
  /// Path to the TOML configuration file. A missing file is not an error.
  #[arg(short, long, value_name = "FILE", default_value = "clinic.toml")]
  config: PathBuf,

  /// Do not print menus or prompt labels; only results and errors.
  #[arg(long)]
  non_interactive: bool,
}

fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let settings = Settings::load(cli.config)?;

  // RUST_LOG wins over the config file. Logs go to stderr so they never mix
  // with the menu dialogue on stdout.
  let filter = match EnvFilter::try_from_default_env() {
    Ok(filter) => filter,
    Err(_) => EnvFilter::try_new(settings.log.as_deref().unwrap_or("warn"))
      .context("invalid log filter in config")?,
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();

  let mut clinic = Clinic::with_config(&settings.clinic);
  tracing::debug!(?settings, "clinic ready");

  let stdin = io::stdin();
  let stdout = io::stdout();
  Shell::new(stdin.lock(), stdout.lock(), &mut clinic)
    .quiet(cli.non_interactive)
    .run()
}
