use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a whole comparison run.
///
/// Everything else (undecodable page images, failed masks or crops,
/// dimension mismatches) is downgraded to a failed unit in the report.
#[derive(Debug, Error)]
pub enum CompareError {
    /// Missing or unresolvable document.
    #[error("{0}")]
    Input(String),

    /// Required configuration missing or invalid.
    #[error("{0}")]
    Config(String),

    /// The raster engine could not rasterize a document.
    #[error("failed to render {document}: {reason}")]
    Render { document: String, reason: String },

    #[error("failed to prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompareError {
    pub(crate) fn render(document: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Render {
            document: document.into(),
            reason: reason.to_string(),
        }
    }
}
