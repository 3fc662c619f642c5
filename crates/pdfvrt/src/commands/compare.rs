use std::time::Instant;

use anyhow::{Context, Result};
use pdfvrt::report::terminal;
use pdfvrt::{Config, PdfComparison};
use tracing::debug;

use crate::cli::CompareArgs;

/// `pdfvrt compare`: render, diff, report.
/// Returns exit code: 0 = passed, 1 = any unit failed.
pub async fn compare(config: Config, args: CompareArgs) -> Result<i32> {
    debug!(?config, "resolved config");
    let start = Instant::now();

    let report = PdfComparison::new(config)
        .actual_pdf_file(&args.actual)
        .baseline_pdf_file(&args.baseline)
        .add_masks(args.masks)
        .crop_pages(args.crops)
        .only_page_indexes(args.only)
        .skip_page_indexes(args.skip)
        .compare()
        .await?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{json}");
    } else {
        terminal::print_report(&report, start.elapsed());
    }

    Ok(if report.is_passed() { 0 } else { 1 })
}
