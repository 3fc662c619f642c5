use std::path::{Path, PathBuf};

use crate::error::CompareError;

/// Which side of the comparison a document is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Actual,
    Baseline,
}

impl Side {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Actual => "Actual",
            Self::Baseline => "Baseline",
        }
    }
}

/// A PDF to compare: the filename names derived artifacts, the bytes are rendered.
#[derive(Clone)]
pub struct Document {
    filename: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Document {
    /// Resolve `path` as given, falling back to `<root_folder>/<stem>.pdf`.
    ///
    /// The fallback lets callers pass a bare name such as `"baseline"` and
    /// have it found in the configured PDF root folder.
    pub fn from_file(path: &str, root_folder: &Path, side: Side) -> Result<Self, CompareError> {
        if path.is_empty() {
            return Err(CompareError::Input(format!(
                "{} pdf file path was not set. Please define correctly then try again.",
                side.label()
            )));
        }

        let given = PathBuf::from(path);
        let resolved = if given.is_file() {
            Some(given.clone())
        } else {
            file_stem(&given)
                .map(|stem| root_folder.join(format!("{stem}.pdf")))
                .filter(|p| p.is_file())
        };

        let Some(resolved) = resolved else {
            return Err(CompareError::Input(format!(
                "{} pdf file path does not exist: {path}",
                side.label()
            )));
        };

        let bytes = std::fs::read(&resolved).map_err(|source| CompareError::Io {
            path: resolved.clone(),
            source,
        })?;
        let filename = resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_owned());
        Ok(Self { filename, bytes })
    }

    /// Wrap an in-memory PDF. An empty buffer is an input error.
    pub fn from_buffer(
        bytes: Vec<u8>,
        filename: impl Into<String>,
        side: Side,
    ) -> Result<Self, CompareError> {
        if bytes.is_empty() {
            return Err(CompareError::Input(format!(
                "{} pdf buffer is empty. Please define correctly then try again.",
                side.label()
            )));
        }
        let filename = filename.into();
        let filename = if filename.is_empty() {
            format!("{}.pdf", side.label().to_lowercase())
        } else {
            filename
        };
        Ok(Self { filename, bytes })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Filename without directory or extension; prefix of every derived artifact.
    pub fn base_name(&self) -> String {
        file_stem(Path::new(&self.filename)).unwrap_or_else(|| self.filename.clone())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
