use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use studio_engine::EngineConfig;
use studio_logging::{studio_info, studio_warn};

const DEFAULT_CONFIG_FILENAME: &str = "studio.ron";

/// Loads the engine config. An explicit path must exist; the default file is optional.
pub(crate) fn load_config(
    explicit: Option<&Path>,
    base_url: Option<&str>,
) -> anyhow::Result<EngineConfig> {
    let mut config = match explicit {
        Some(path) => read_config(path)?,
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILENAME);
            if fallback.is_file() {
                read_config(&fallback)?
            } else {
                EngineConfig::default()
            }
        }
    };

    if let Some(base_url) = base_url {
        config.base_url = base_url.to_string();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn read_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: EngineConfig = ron::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    if config.auth_token.is_none() {
        studio_warn!("Config {:?} has no auth_token; requests are anonymous", path);
    }
    studio_info!("Loaded config from {:?}", path);
    Ok(config)
}
