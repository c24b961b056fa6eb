//! Configuration file loading

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tikzgraph_core::TikzOptions;

/// Settings read from the optional `--config` TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tikz: TikzOptions,
}

impl Config {
    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[tikz]\nprecision = 3\n").unwrap();
        assert_eq!(config.tikz.precision, 3);
        assert_eq!(config.tikz.indent, "\t");
    }

    #[test]
    fn test_missing_path_means_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.tikz, TikzOptions::default());
    }
}
