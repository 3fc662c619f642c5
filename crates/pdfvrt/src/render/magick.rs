use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use image::Rgba;
use tokio::process::Command;
use tracing::{debug, info};

use super::{PageImage, RasterEngine, RasterError, ops};
use crate::config::Settings;
use crate::document::Document;
use crate::opts::{CropRect, MaskRect};
use crate::store;

/// External engine: every operation is one ImageMagick invocation.
pub struct MagickEngine {
    program: PathBuf,
    timeout: Duration,
}

impl MagickEngine {
    /// Use `settings.magick_path` if set, otherwise find the tool on PATH.
    pub fn locate(settings: &Settings) -> Result<Self, RasterError> {
        let program = match &settings.magick_path {
            Some(path) => path.clone(),
            None => find_magick()?,
        };
        info!(path = %program.display(), "using ImageMagick");
        Ok(Self::with_program(program, settings.render_timeout()))
    }

    pub fn with_program(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn tool(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Run the tool with `args`, killing it once the timeout elapses.
    async fn run(&self, args: &[String]) -> Result<(), RasterError> {
        let tool = self.tool();
        debug!(tool = %tool, ?args, "invoking");
        let t0 = Instant::now();

        let output = Command::new(&self.program)
            .args(args)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| RasterError::Timeout {
                tool: tool.clone(),
                timeout: self.timeout,
            })?
            .map_err(|e| RasterError::io(&self.program, e))?;

        if !output.status.success() {
            return Err(RasterError::Tool {
                tool,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "tool finished");
        Ok(())
    }
}

/// Collect the artifacts ImageMagick wrote for `base`: `<base>.png` for a
/// single page, `<base>-0.png`, `<base>-1.png`, ... otherwise.
fn collect_pages(target_dir: &Path, base: &str) -> Result<Vec<PageImage>, RasterError> {
    let single = store::page_path(target_dir, base, 0, 1);
    if single.is_file() {
        return Ok(vec![PageImage {
            page_index: 0,
            path: single,
        }]);
    }

    let mut pages = Vec::new();
    loop {
        let page_index = pages.len();
        // Any count > 1 selects the indexed name.
        let path = store::page_path(target_dir, base, page_index, 2);
        if !path.is_file() {
            break;
        }
        pages.push(PageImage { page_index, path });
    }
    if pages.is_empty() {
        return Err(RasterError::Empty);
    }
    Ok(pages)
}

impl RasterEngine for MagickEngine {
    fn name(&self) -> &str {
        "imagemagick"
    }

    async fn render(
        &self,
        document: &Document,
        target_dir: &Path,
        settings: &Settings,
    ) -> Result<Vec<PageImage>, RasterError> {
        let base = document.base_name();

        // The tool reads from disk, so stage the bytes in a scratch dir.
        let scratch = scratch_dir()?;
        let input = scratch.path().join(STAGED_INPUT);
        tokio::fs::write(&input, document.bytes())
            .await
            .map_err(|e| RasterError::io(&input, e))?;

        let density = settings.density.to_string();
        let mut args = vec!["-density".to_owned(), format!("{density}x{density}")];
        if let Some(password) = &settings.password {
            args.push("-authenticate".to_owned());
            args.push(password.clone());
        }
        args.push(input.display().to_string());
        args.push("-quality".to_owned());
        args.push(settings.quality.to_string());
        args.push(
            scratch
                .path()
                .join(format!("{STAGED_PAGE}.png"))
                .display()
                .to_string(),
        );

        self.run(&args)
            .await
            .map_err(|e| match e {
                RasterError::Tool { stderr, .. } => RasterError::Load(stderr),
                other => other,
            })?;

        let staged = collect_pages(scratch.path(), STAGED_PAGE)?;
        let mut pages = Vec::with_capacity(staged.len());
        for page in &staged {
            let path = store::page_path(target_dir, &base, page.page_index, staged.len());
            copy(&page.path, &path).await?;
            pages.push(PageImage {
                page_index: page.page_index,
                path,
            });
        }
        debug!(pages = pages.len(), dir = %target_dir.display(), "rendered document");
        Ok(pages)
    }

    async fn mask(&self, page: &Path, rect: MaskRect, color: Rgba<u8>) -> Result<(), RasterError> {
        if rect.x1 < rect.x0 || rect.y1 < rect.y0 {
            return Ok(());
        }
        let scratch = scratch_dir()?;
        let staged = scratch.path().join(format!("{STAGED_PAGE}.png"));
        copy(page, &staged).await?;

        let path = staged.display().to_string();
        let args = [
            path.clone(),
            "-fill".to_owned(),
            ops::to_hex(color),
            "-draw".to_owned(),
            format!("rectangle {},{} {},{}", rect.x0, rect.y0, rect.x1, rect.y1),
            path,
        ];
        self.run(&args).await?;
        copy(&staged, page).await
    }

    async fn crop(
        &self,
        page: &Path,
        rect: CropRect,
        ordinal: usize,
    ) -> Result<PathBuf, RasterError> {
        let scratch = scratch_dir()?;
        let staged = scratch.path().join(format!("{STAGED_PAGE}.png"));
        let staged_out = scratch.path().join("crop.png");
        copy(page, &staged).await?;

        let args = [
            staged.display().to_string(),
            "-crop".to_owned(),
            format!("{}x{}+{}+{}", rect.width, rect.height, rect.x, rect.y),
            "+repage".to_owned(),
            staged_out.display().to_string(),
        ];
        self.run(&args).await?;

        let out = store::crop_path(page, ordinal);
        copy(&staged_out, &out).await?;
        Ok(out)
    }
}

/// Fixed names the tool sees. Document names may contain `[n]` or `%d`,
/// which ImageMagick reads as frame selections and scene patterns.
const STAGED_INPUT: &str = "input.pdf";
const STAGED_PAGE: &str = "page";

fn scratch_dir() -> Result<tempfile::TempDir, RasterError> {
    tempfile::tempdir().map_err(|e| RasterError::io(&std::env::temp_dir(), e))
}

async fn copy(from: &Path, to: &Path) -> Result<(), RasterError> {
    tokio::fs::copy(from, to)
        .await
        .map(|_| ())
        .map_err(|e| RasterError::io(from, e))
}

/// Find the ImageMagick executable on the current platform.
fn find_magick() -> Result<PathBuf, RasterError> {
    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &["magick"]
    } else {
        &["magick", "convert"]
    };
    let which = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };

    for name in candidates {
        if std::process::Command::new(which)
            .arg(name)
            .output()
            .is_ok_and(|o| o.status.success())
        {
            return Ok(PathBuf::from(name));
        }
    }

    Err(RasterError::Unavailable(format!(
        "ImageMagick not found. Tried: {}",
        candidates.join(", ")
    )))
}
