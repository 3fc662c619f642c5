use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::opts::{CropRect, Opts};
use crate::render::{RasterEngine, RasterError, ops};
use crate::report::UnitResult;
use crate::store;

/// The atomic thing diffed: a whole page pair, or one cropped sub-page pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonUnit {
    pub page_index: usize,
    pub crop_index: Option<usize>,
    pub actual: PathBuf,
    pub baseline: PathBuf,
    pub diff: PathBuf,
}

/// One aligned page pair and where its diff artifacts go.
pub struct PagePair<'a> {
    pub page_index: usize,
    pub actual: &'a Path,
    pub baseline: &'a Path,
    pub diff_dir: &'a Path,
    pub diff_base: &'a str,
    /// Page count of the baseline, which decides diff artifact naming.
    pub page_count: usize,
}

impl PagePair<'_> {
    fn diff_path(&self, crop: Option<usize>) -> PathBuf {
        store::diff_path(
            self.diff_dir,
            self.diff_base,
            self.page_index,
            self.page_count,
            crop,
        )
    }
}

/// Apply the page's masks to both sides, then split it into comparison units.
///
/// Masks run first and in declared order. If any crop targets the page, each
/// crop becomes its own unit and the whole page is not diffed. Colours and crop
/// regions are checked here, before any engine sees them, so every engine
/// accepts and rejects the same inputs. Failures are returned in place of the
/// unit they broke, so the run can continue.
pub async fn transform<E: RasterEngine>(
    engine: &E,
    pair: &PagePair<'_>,
    opts: &Opts,
) -> Vec<Result<ComparisonUnit, UnitResult>> {
    let page = pair.page_index;
    let errored = |crop: Option<usize>, e: RasterError| -> Result<ComparisonUnit, UnitResult> {
        Err(UnitResult::errored(
            page,
            crop,
            Some(pair.actual.to_path_buf()),
            e,
        ))
    };

    for mask in opts.masks_for(page) {
        let color = match ops::parse_color(&mask.color) {
            Ok(color) => color,
            Err(e) => {
                warn!(page, error = %e, "invalid mask colour");
                return vec![errored(None, e)];
            }
        };
        for side in [pair.actual, pair.baseline] {
            if let Err(e) = engine.mask(side, mask.rect, color).await {
                warn!(page, error = %e, path = %side.display(), "mask failed");
                return vec![errored(None, e)];
            }
        }
        debug!(page, rect = ?mask.rect, color = %mask.color, "masked");
    }

    let crops: Vec<_> = opts.crops_for(page).collect();
    if crops.is_empty() {
        return vec![Ok(ComparisonUnit {
            page_index: page,
            crop_index: None,
            actual: pair.actual.to_path_buf(),
            baseline: pair.baseline.to_path_buf(),
            diff: pair.diff_path(None),
        })];
    }

    let mut units = Vec::with_capacity(crops.len());
    for (ordinal, spec) in crops.into_iter().enumerate() {
        let cropped = async {
            let actual = crop_side(engine, pair.actual, spec.rect, ordinal).await?;
            let baseline = crop_side(engine, pair.baseline, spec.rect, ordinal).await?;
            Ok::<_, RasterError>((actual, baseline))
        }
        .await;

        units.push(match cropped {
            Ok((actual, baseline)) => {
                debug!(page, crop = ordinal, rect = ?spec.rect, "cropped");
                Ok(ComparisonUnit {
                    page_index: page,
                    crop_index: Some(ordinal),
                    actual,
                    baseline,
                    diff: pair.diff_path(Some(ordinal)),
                })
            }
            Err(e) => {
                warn!(page, crop = ordinal, error = %e, "crop failed");
                errored(Some(ordinal), e)
            }
        });
    }
    units
}

async fn crop_side<E: RasterEngine>(
    engine: &E,
    page: &Path,
    rect: CropRect,
    ordinal: usize,
) -> Result<PathBuf, RasterError> {
    ops::check_crop(rect, ops::dimensions(page)?)?;
    engine.crop(page, rect, ordinal).await
}
