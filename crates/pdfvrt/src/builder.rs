use crate::compare::compare_documents;
use crate::config::Config;
use crate::document::{Document, Side};
use crate::error::CompareError;
use crate::opts::{CropRect, CropSpec, MaskRect, MaskSpec, Opts};
use crate::report::Report;

/// Fluent entry point: collect both documents and the per-run options,
/// then run a single [`compare`](Self::compare).
///
/// Input errors are kept until `compare` so the chain stays infallible.
///
/// ```no_run
/// # async fn demo() -> Result<(), pdfvrt::CompareError> {
/// use pdfvrt::{Config, MaskRect, PdfComparison};
///
/// let report = PdfComparison::new(Config::default())
///     .actual_pdf_file("invoice.pdf")
///     .baseline_pdf_file("invoice.pdf")
///     .add_mask(0, MaskRect { x0: 0, y0: 0, x1: 200, y1: 40 }, None)
///     .skip_page_indexes([3])
///     .compare()
///     .await?;
/// assert!(report.is_passed());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PdfComparison {
    config: Config,
    opts: Opts,
    actual: Option<Result<Document, CompareError>>,
    baseline: Option<Result<Document, CompareError>>,
}

impl Default for PdfComparison {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl PdfComparison {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            opts: Opts::default(),
            actual: None,
            baseline: None,
        }
    }

    /// Actual document from a path, resolved against `actual_pdf_root_folder`.
    pub fn actual_pdf_file(mut self, path: &str) -> Self {
        self.actual = Some(Document::from_file(
            path,
            &self.config.paths.actual_pdf_root_folder,
            Side::Actual,
        ));
        self
    }

    pub fn actual_pdf_buffer(mut self, bytes: impl Into<Vec<u8>>, filename: &str) -> Self {
        self.actual = Some(Document::from_buffer(bytes.into(), filename, Side::Actual));
        self
    }

    /// Baseline document from a path, resolved against `baseline_pdf_root_folder`.
    pub fn baseline_pdf_file(mut self, path: &str) -> Self {
        self.baseline = Some(Document::from_file(
            path,
            &self.config.paths.baseline_pdf_root_folder,
            Side::Baseline,
        ));
        self
    }

    pub fn baseline_pdf_buffer(mut self, bytes: impl Into<Vec<u8>>, filename: &str) -> Self {
        self.baseline = Some(Document::from_buffer(
            bytes.into(),
            filename,
            Side::Baseline,
        ));
        self
    }

    /// Paint `rect` on page `page_index` of both sides. Colour defaults to black.
    pub fn add_mask(mut self, page_index: usize, rect: MaskRect, color: Option<&str>) -> Self {
        self.opts.masks.push(MaskSpec::new(page_index, rect, color));
        self
    }

    pub fn add_masks(mut self, masks: impl IntoIterator<Item = MaskSpec>) -> Self {
        self.opts.masks.extend(masks);
        self
    }

    pub fn only_page_indexes(mut self, pages: impl IntoIterator<Item = usize>) -> Self {
        self.opts.filter.only_page_indexes.extend(pages);
        self
    }

    pub fn skip_page_indexes(mut self, pages: impl IntoIterator<Item = usize>) -> Self {
        self.opts.filter.skip_page_indexes.extend(pages);
        self
    }

    /// Compare only `rect` of page `page_index`. Several crops per page are allowed.
    pub fn crop_page(mut self, page_index: usize, rect: CropRect) -> Self {
        self.opts.crops.push(CropSpec { page_index, rect });
        self
    }

    pub fn crop_pages(mut self, crops: impl IntoIterator<Item = CropSpec>) -> Self {
        self.opts.crops.extend(crops);
        self
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Override individual settings before comparing.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Run the comparison with the accumulated options.
    ///
    /// Settings changed through [`config_mut`](Self::config_mut) are
    /// validated here, before anything is rendered.
    pub async fn compare(self) -> Result<Report, CompareError> {
        self.config
            .validate()
            .map_err(|e| CompareError::Config(format!("{e:#}")))?;
        let actual = self.actual.unwrap_or_else(|| Err(unset(Side::Actual)))?;
        let baseline = self.baseline.unwrap_or_else(|| Err(unset(Side::Baseline)))?;
        compare_documents(&actual, &baseline, &self.config, &self.opts).await
    }
}

fn unset(side: Side) -> CompareError {
    CompareError::Input(format!(
        "{} pdf file path was not set. Please define correctly then try again.",
        side.label()
    ))
}
