pub mod terminal;

use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
}

/// Outcome of diffing one comparison unit (a page, or one crop of a page).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitResult {
    pub status: Status,
    pub page_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_diff_pixels: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_image_path: Option<PathBuf>,
    /// The actual-side image the unit was built from; set on errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UnitResult {
    pub fn passed(page_index: usize, crop_index: Option<usize>) -> Self {
        Self {
            status: Status::Passed,
            page_index,
            crop_index,
            num_diff_pixels: None,
            diff_image_path: None,
            actual: None,
            error: None,
        }
    }

    pub fn failed(
        page_index: usize,
        crop_index: Option<usize>,
        num_diff_pixels: u64,
        diff_image_path: PathBuf,
    ) -> Self {
        Self {
            status: Status::Failed,
            num_diff_pixels: Some(num_diff_pixels),
            diff_image_path: Some(diff_image_path),
            ..Self::passed(page_index, crop_index)
        }
    }

    pub fn errored(
        page_index: usize,
        crop_index: Option<usize>,
        actual: Option<PathBuf>,
        error: impl std::fmt::Display,
    ) -> Self {
        Self {
            status: Status::Failed,
            actual,
            error: Some(format!("{error}")),
            ..Self::passed(page_index, crop_index)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }
}

/// Result of a whole comparison. `details` lists the failed units only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<UnitResult>,
}

impl Report {
    pub fn passed() -> Self {
        Self {
            status: Status::Passed,
            message: None,
            details: Vec::new(),
        }
    }

    pub fn failed(message: impl Into<String>, details: Vec<UnitResult>) -> Self {
        Self {
            status: Status::Failed,
            message: Some(message.into()),
            details,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == Status::Passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_detail_keys() {
        let report = Report::failed(
            "a.pdf is not the same as b.pdf compared by their images.",
            vec![UnitResult::failed(1, None, 42, PathBuf::from("diff/a_diff-1.png"))],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["details"][0]["numDiffPixels"], 42);
        assert_eq!(json["details"][0]["diffImagePath"], "diff/a_diff-1.png");
        assert!(json["details"][0].get("error").is_none());
    }

    #[test]
    fn passed_report_is_minimal() {
        let json = serde_json::to_value(Report::passed()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "passed" }));
    }
}
