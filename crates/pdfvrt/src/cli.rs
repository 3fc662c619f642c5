use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pdfvrt::config::{self, ImageEngine};
use pdfvrt::opts::{self, CropSpec, MaskSpec};

fn parse_threshold(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    config::validate_threshold(v)
}

#[derive(Parser)]
#[command(name = "pdfvrt", about = "Visual regression testing for PDF documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .pdfvrt/config.toml with default settings
    Init {
        /// Raster engine written into the template
        #[arg(long, value_enum, default_value_t = ImageEngine::ImageMagick)]
        engine: ImageEngine,
        /// Overwrite existing config and gitignore
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Render, diff, and report two PDFs page by page (exit 0/1)
    Compare(CompareArgs),
}

#[derive(Args)]
pub struct CompareArgs {
    /// Actual PDF (a path, or a bare name looked up in actual_pdf_root_folder)
    pub actual: String,
    /// Baseline PDF (a path, or a bare name looked up in baseline_pdf_root_folder)
    pub baseline: String,
    /// Config file (default: .pdfvrt/config.toml when present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    /// Raster engine (overrides config)
    #[arg(long, value_enum)]
    pub engine: Option<ImageEngine>,
    /// Per-pixel colour distance (0.0-1.0) below which pixels are equal
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,
    /// Differing pixels allowed per page or crop
    #[arg(long)]
    pub tolerance: Option<u64>,
    /// Render resolution in DPI
    #[arg(long)]
    pub density: Option<u32>,
    /// Password for encrypted documents
    #[arg(long)]
    pub password: Option<String>,
    /// Mask a region on both sides: PAGE:X0,Y0,X1,Y1[:COLOR]
    #[arg(long = "mask", value_parser = opts::parse_mask)]
    pub masks: Vec<MaskSpec>,
    /// Compare only a region: PAGE:WIDTH,HEIGHT,X,Y (repeatable per page)
    #[arg(long = "crop", value_parser = opts::parse_crop)]
    pub crops: Vec<CropSpec>,
    /// Compare only this page index (0-based, repeatable)
    #[arg(long = "only")]
    pub only: Vec<usize>,
    /// Skip this page index (0-based, repeatable, wins over --only)
    #[arg(long = "skip")]
    pub skip: Vec<usize>,
    /// Compare the common pages even if page counts differ
    #[arg(long)]
    pub no_match_page_count: bool,
    /// Keep rendered page PNGs after the run
    #[arg(long)]
    pub keep_pngs: bool,
    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}
