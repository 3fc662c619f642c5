use std::path::Path;

use anyhow::{Context, Result};

use super::{CONFIG_DIR, CONFIG_FILE};

/// Hand-crafted config template with commented-out keys.
/// Used by `pdfvrt init` instead of `toml::to_string_pretty()` so that
/// users can see the available knobs without reading the docs.
const CONFIG_TEMPLATE: &str = r#"[paths]
actual_pdf_root_folder = "data/actualPdfs"
baseline_pdf_root_folder = "data/baselinePdfs"
actual_png_root_folder = "data/actualPngs"
baseline_png_root_folder = "data/baselinePngs"
diff_png_root_folder = "data/diffPngs"

# ─────────────────────────────────────────────────────────
# Rendering
# ─────────────────────────────────────────────────────────
[settings]
image_engine = "{engine}"          # "native" (pdfium) | "imagemagick"
density = 100                       # DPI
quality = 70                        # imagemagick only
# password = "secret"               # for encrypted documents
# render_timeout_secs = 120         # per external tool invocation
# magick_path = "/usr/bin/magick"
# pdfium_library_path = "/opt/pdfium/lib"

# ─────────────────────────────────────────────────────────
# Comparison
# ─────────────────────────────────────────────────────────
threshold = 0.05                    # per-pixel colour distance (0.0 = exact)
tolerance = 0                       # differing pixels allowed per page
match_page_count = true
clean_png_paths = true              # diff images are always kept
# detect_anti_aliased = true
# diff_color = [255, 0, 0]
# diff_color_alt = [0, 255, 0]      # actual lighter than baseline
"#;

pub fn config_file_exists() -> bool {
    Path::new(CONFIG_DIR).join(CONFIG_FILE).exists()
}

pub fn write_gitignore(force: bool) -> Result<()> {
    let path = Path::new(CONFIG_DIR).join(".gitignore");
    if !force && path.exists() {
        return Ok(());
    }
    std::fs::write(&path, "*\n!.gitignore\n!config.toml\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write the hand-crafted config template (with commented-out keys).
pub fn write_template(engine: &str) -> Result<()> {
    let dir = Path::new(CONFIG_DIR);
    std::fs::create_dir_all(dir).context("Failed to create .pdfvrt directory")?;
    let path = dir.join(CONFIG_FILE);
    let content = CONFIG_TEMPLATE.replace("{engine}", engine);
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ImageEngine};

    #[test]
    fn template_parses_to_defaults() {
        let content = CONFIG_TEMPLATE.replace("{engine}", "imagemagick");
        let parsed: Config = toml::from_str(&content).unwrap();
        parsed.validate().unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.settings.image_engine, ImageEngine::ImageMagick);
        assert_eq!(parsed.settings.threshold, defaults.settings.threshold);
        assert_eq!(parsed.settings.tolerance, defaults.settings.tolerance);
        assert_eq!(parsed.paths.diff_png_root_folder, defaults.paths.diff_png_root_folder);
    }
}
