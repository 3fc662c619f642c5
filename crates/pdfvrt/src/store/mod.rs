//! On-disk layout of rendered pages and diff images.
//!
//! ```text
//! <actual_png_root>/<actual base>/<actual base>[-<page>].png
//! <baseline_png_root>/<baseline base>/<baseline base>[-<page>].png
//! <diff_png_root>/<actual base>/<actual base>_diff[-<page>][-<crop>].png
//! ```

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::CompareError;

/// Empty `dir` (if it exists) and recreate it, so that nothing from a
/// previous run is mistaken for output of this one.
pub fn ensure_clean_dir(dir: &Path) -> Result<(), CompareError> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|source| CompareError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    std::fs::create_dir_all(dir).map_err(|source| CompareError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    debug!(dir = %dir.display(), "output directory ready");
    Ok(())
}

/// Absolute, lexically normalised form of `dir`, for telling output
/// directories apart. `.` and `..` are folded without touching the disk.
pub fn normalize_dir(dir: &Path) -> Result<PathBuf, CompareError> {
    let absolute = std::path::absolute(dir).map_err(|source| CompareError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Remove a render directory after a run. Failures are logged only.
pub fn purge_dir(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(dir = %dir.display(), error = %e, "failed to purge render directory");
        }
    } else {
        debug!(dir = %dir.display(), "purged render directory");
    }
}

/// `-<page>` for multi-page documents, nothing for single-page ones.
pub fn page_suffix(page_index: usize, page_count: usize) -> String {
    if page_count > 1 {
        format!("-{page_index}")
    } else {
        String::new()
    }
}

/// Rendered page artifact: `<dir>/<base><suffix>.png`.
pub fn page_path(dir: &Path, base: &str, page_index: usize, page_count: usize) -> PathBuf {
    dir.join(format!("{base}{}.png", page_suffix(page_index, page_count)))
}

/// Cropped derivative of a page artifact: `<stem>-<ordinal>.png` next to it.
pub fn crop_path(page: &Path, ordinal: usize) -> PathBuf {
    let stem = page
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    page.with_file_name(format!("{stem}-{ordinal}.png"))
}

/// Diff artifact for a page (or one crop of it).
pub fn diff_path(
    dir: &Path,
    base: &str,
    page_index: usize,
    page_count: usize,
    crop: Option<usize>,
) -> PathBuf {
    let crop_suffix = crop.map(|c| format!("-{c}")).unwrap_or_default();
    dir.join(format!(
        "{base}_diff{}{crop_suffix}.png",
        page_suffix(page_index, page_count)
    ))
}
