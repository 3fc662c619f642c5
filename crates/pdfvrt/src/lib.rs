//! Visual regression testing for PDF documents.
//!
//! Both documents are rasterized page by page, optional masks and crops are
//! applied, and every aligned page pair is diffed with a perceptual pixel
//! comparison. The outcome is a [`Report`] listing the failed units.

pub mod align;
pub mod builder;
pub mod compare;
pub mod config;
pub mod document;
pub mod error;
pub mod opts;
pub mod render;
pub mod report;
pub mod store;
pub mod transform;

#[cfg(test)]
mod testutil;

pub use builder::PdfComparison;
pub use config::{Config, ImageEngine, Paths, Settings};
pub use document::{Document, Side};
pub use error::CompareError;
pub use opts::{CropRect, CropSpec, MaskRect, MaskSpec, Opts, PageFilter};
pub use report::{Report, Status, UnitResult};
