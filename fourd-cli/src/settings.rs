use std::path::Path;

use anyhow::{Context, Result};
use fourd_engine::EngineConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// Engine settings from a TOML file, or the defaults when no file is given.
/// Either way the result is validated.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read config {:?}", path))?;
            toml::from_str(&text).with_context(|| format!("Invalid config {:?}", path))?
        }
        None => EngineConfig::default(),
    };
    config.validate().context("Invalid engine settings")?;
    Ok(config)
}

/// Installs the fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
