//! Configuration loading for the command line tool.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use grid_processor::GridProcessorConfig;
use tracing::info;

/// Load processing defaults: YAML file if given, then `GRID_*` environment
/// overrides, then validation.
pub fn load(path: Option<&Path>) -> Result<GridProcessorConfig> {
    load_with(path, |key| std::env::var(key).ok())
}

pub fn load_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<GridProcessorConfig> {
    let base = match path {
        Some(path) => GridProcessorConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GridProcessorConfig::default(),
    };

    let config = base.with_overrides(env);
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {}", e))?;

    info!(
        method = %config.downsample_method,
        factor = config.downsample_factor,
        search_distance = config.search_distance,
        "Loaded configuration"
    );
    Ok(config)
}
