use anyhow::{Result, bail};
use clap::ValueEnum;
use pdfvrt::config::{self, ImageEngine};

/// `pdfvrt init`: create .pdfvrt/config.toml.
pub fn init(engine: ImageEngine, force: bool) -> Result<()> {
    if !force && config::config_file_exists() {
        bail!(".pdfvrt/config.toml already exists (use --force to overwrite)");
    }

    let engine_name = engine
        .to_possible_value()
        .map(|v| v.get_name().to_owned())
        .unwrap_or_else(|| "imagemagick".into());
    config::write_template(&engine_name)?;
    config::write_gitignore(force)?;

    let verb = if force { "Regenerated" } else { "Created" };
    println!("{verb} .pdfvrt/config.toml");
    println!("  settings.image_engine = {engine_name}");
    Ok(())
}
