//! Runtime settings, read from an optional TOML file and `CLINIC_*`
//! environment variables.

use std::path::PathBuf;

use anyhow::Context as _;
use clinic_core::ClinicConfig;
use serde::Deserialize;

/// Shape of `clinic.toml`. Every key is optional.
///
/// ```toml
/// max_patients    = 500
/// max_specialties = 100
/// log             = "clinic_core=debug"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Store ceilings, read from the top-level `max_*` keys.
  #[serde(flatten)]
  pub clinic: ClinicConfig,
  /// `tracing` filter directive used when `RUST_LOG` is unset.
  pub log:    Option<String>,
}

impl Settings {
  /// Load settings from `path` (which may be absent), then let `CLINIC_*`
  /// environment variables override individual keys.
  pub fn load(path: PathBuf) -> anyhow::Result<Self> { Self::load_from(path, None) }

  /// As [`Settings::load`], reading variables from `env` instead of the
  /// process environment when given.
  fn load_from(
    path: PathBuf,
    env: Option<config::Map<String, String>>,
  ) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("CLINIC")
          .try_parsing(true)
          .source(env),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}
