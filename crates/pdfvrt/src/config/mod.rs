pub mod resolve;
pub mod template;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub use self::resolve::{CliOverrides, resolve};
pub use self::template::{config_file_exists, write_gitignore, write_template};

pub(crate) const CONFIG_DIR: &str = ".pdfvrt";
pub(crate) const CONFIG_FILE: &str = "config.toml";

/// Which raster backend turns PDF pages into PNGs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageEngine {
    /// In-process rendering through pdfium.
    Native,
    /// Shell out to ImageMagick (`magick` / `convert`).
    #[default]
    #[value(name = "imagemagick", alias = "graphicsmagick", alias = "graphicsMagick")]
    #[serde(rename = "imagemagick", alias = "graphicsMagick", alias = "graphicsmagick")]
    ImageMagick,
}

impl std::str::FromStr for ImageEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "imagemagick" | "graphicsmagick" => Ok(Self::ImageMagick),
            other => Err(format!(
                "unknown image engine '{other}' (expected 'native' or 'imagemagick')"
            )),
        }
    }
}

/// Where inputs are looked up and where rendered/diff PNGs are written.
///
/// PNG roots are optional so that a half-filled config is reported as a
/// configuration error instead of writing into the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub actual_pdf_root_folder: PathBuf,
    pub baseline_pdf_root_folder: PathBuf,
    pub actual_png_root_folder: Option<PathBuf>,
    pub baseline_png_root_folder: Option<PathBuf>,
    pub diff_png_root_folder: Option<PathBuf>,
}

impl Default for Paths {
    fn default() -> Self {
        let data = PathBuf::from("data");
        Self {
            actual_pdf_root_folder: data.join("actualPdfs"),
            baseline_pdf_root_folder: data.join("baselinePdfs"),
            actual_png_root_folder: Some(data.join("actualPngs")),
            baseline_png_root_folder: Some(data.join("baselinePngs")),
            diff_png_root_folder: Some(data.join("diffPngs")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub image_engine: ImageEngine,
    /// Render resolution in DPI.
    pub density: u32,
    /// Encoder quality passed to the external tool (0-100).
    pub quality: u8,
    /// Per-pixel colour distance sensitivity (0.0-1.0). Lower is stricter.
    pub threshold: f64,
    /// Maximum number of differing pixels that still passes.
    pub tolerance: u64,
    /// Purge the rendered page directories once the run is aggregated.
    pub clean_png_paths: bool,
    pub match_page_count: bool,
    /// Exclude anti-aliased pixels from the diff count.
    pub detect_anti_aliased: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_color: Option<[u8; 3]>,
    /// Colour for differing pixels where the actual page is lighter than the baseline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_color_alt: Option<[u8; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magick_path: Option<PathBuf>,
    /// Directory holding the pdfium shared library for the native engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdfium_library_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_engine: ImageEngine::default(),
            density: 100,
            quality: 70,
            threshold: 0.05,
            tolerance: 0,
            clean_png_paths: true,
            match_page_count: true,
            detect_anti_aliased: true,
            password: None,
            diff_color: None,
            diff_color_alt: None,
            render_timeout_secs: None,
            magick_path: None,
            pdfium_library_path: None,
        }
    }
}

impl Settings {
    pub fn render_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.render_timeout_secs.unwrap_or(120))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub settings: Settings,
}

pub fn validate_threshold(v: f64) -> Result<f64, String> {
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("threshold must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

impl Config {
    /// Validate semantic constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.settings.threshold).map_err(|e| anyhow::anyhow!("settings.{e}"))?;
        if self.settings.density == 0 {
            bail!("settings.density must be > 0");
        }
        if self.settings.quality > 100 {
            bail!(
                "settings.quality must be between 0 and 100, got {}",
                self.settings.quality
            );
        }
        Ok(())
    }

    /// Load and validate a config file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Path of the project config file (`.pdfvrt/config.toml`).
pub fn default_config_path() -> PathBuf {
    Path::new(CONFIG_DIR).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = Config::default();
        assert_eq!(c.settings.density, 100);
        assert_eq!(c.settings.quality, 70);
        assert_eq!(c.settings.threshold, 0.05);
        assert_eq!(c.settings.tolerance, 0);
        assert!(c.settings.clean_png_paths);
        assert!(c.settings.match_page_count);
        assert_eq!(c.settings.image_engine, ImageEngine::ImageMagick);
        assert!(c.paths.diff_png_root_folder.is_some());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let c: Config = toml::from_str(
            r#"
            [settings]
            image_engine = "native"
            tolerance = 25
            "#,
        )
        .unwrap();
        assert_eq!(c.settings.image_engine, ImageEngine::Native);
        assert_eq!(c.settings.tolerance, 25);
        assert_eq!(c.settings.density, 100);
        assert_eq!(c.paths.actual_pdf_root_folder, PathBuf::from("data/actualPdfs"));
        c.validate().unwrap();
    }

    #[test]
    fn diff_colors_parse_as_rgb_triples() {
        let c: Config = toml::from_str(
            r#"
            [settings]
            diff_color = [0, 0, 255]
            diff_color_alt = [0, 255, 0]
            "#,
        )
        .unwrap();
        assert_eq!(c.settings.diff_color, Some([0, 0, 255]));
        assert_eq!(c.settings.diff_color_alt, Some([0, 255, 0]));
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let mut c = Config::default();
        c.settings.threshold = 1.5;
        let err = c.validate().unwrap_err().to_string();
        assert!(err.contains("threshold"), "{err}");
    }

    #[test]
    fn zero_density_rejected() {
        let mut c = Config::default();
        c.settings.density = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn engine_names_parse() {
        assert_eq!("native".parse::<ImageEngine>(), Ok(ImageEngine::Native));
        assert_eq!(
            "graphicsMagick".parse::<ImageEngine>(),
            Ok(ImageEngine::ImageMagick)
        );
        assert!("ghostscript".parse::<ImageEngine>().is_err());
    }

    #[test]
    fn graphicsmagick_in_file_selects_imagemagick() {
        for name in ["graphicsMagick", "graphicsmagick", "imagemagick"] {
            let c: Config =
                toml::from_str(&format!("[settings]\nimage_engine = \"{name}\"\n")).unwrap();
            assert_eq!(c.settings.image_engine, ImageEngine::ImageMagick, "{name}");
        }
    }
}
