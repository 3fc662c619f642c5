use std::path::PathBuf;

use anyhow::{Context, Result};

use super::{Config, ImageEngine, default_config_path, validate_threshold};

/// Values extracted from the CLI that participate in the merge.
#[derive(Debug, Default)]
pub struct CliOverrides {
    /// Explicit config file; when unset `.pdfvrt/config.toml` is used if present.
    pub config: Option<PathBuf>,
    pub image_engine: Option<ImageEngine>,
    pub threshold: Option<f64>,
    pub tolerance: Option<u64>,
    pub density: Option<u32>,
    pub password: Option<String>,
    pub no_match_page_count: bool,
    pub keep_pngs: bool,
}

fn env_parsed<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(name)
        .ok()
        .map(|v| v.parse::<T>().map_err(|e| anyhow::anyhow!("{e}")))
        .transpose()
        .with_context(|| format!("{name} is not valid"))
}

/// Fully resolved config after CLI > env > file > defaults merge.
pub fn resolve(cli: CliOverrides) -> Result<Config> {
    // 1. File layer (an explicit --config must exist, the default one may not)
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => {
            let path = default_config_path();
            if path.exists() {
                Config::load(&path)?
            } else {
                Config::default()
            }
        }
    };

    // 2. Env layer
    let env_engine: Option<ImageEngine> = env_parsed("PDFVRT_IMAGE_ENGINE")?;
    let env_threshold: Option<f64> = env_parsed("PDFVRT_THRESHOLD")?;
    let env_tolerance: Option<u64> = env_parsed("PDFVRT_TOLERANCE")?;

    // 3. CLI > env > file
    let settings = &mut config.settings;
    if let Some(engine) = cli.image_engine.or(env_engine) {
        settings.image_engine = engine;
    }
    if let Some(threshold) = cli.threshold.or(env_threshold) {
        settings.threshold = validate_threshold(threshold).map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    if let Some(tolerance) = cli.tolerance.or(env_tolerance) {
        settings.tolerance = tolerance;
    }
    if let Some(density) = cli.density {
        settings.density = density;
    }
    if cli.password.is_some() {
        settings.password = cli.password;
    }
    if cli.no_match_page_count {
        settings.match_page_count = false;
    }
    if cli.keep_pngs {
        settings.clean_png_paths = false;
    }

    config.validate()?;
    Ok(config)
}
