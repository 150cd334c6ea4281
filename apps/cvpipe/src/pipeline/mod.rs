//! Batch extraction pipeline — one worker per document under a bounded
//! pool, chunked scheduling with pacing, partial-failure statistics.

pub mod orchestrator;
pub mod worker;

use serde::{Deserialize, Serialize};

use crate::models::candidate::CandidateRecord;

/// Technical metadata attached to every per-document outcome,
/// serialized as the `_metadata` key of each record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub filename: String,
    pub file_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The outcome of running one document through the extraction worker.
/// Exactly one of these exists per enumerated document; failures are
/// data, not errors. Serializes to the flat record shape of the output
/// file: candidate fields at the top level plus `_metadata`.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    #[serde(flatten)]
    pub candidate: Option<CandidateRecord>,
    #[serde(rename = "_metadata")]
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    pub fn success(
        candidate: CandidateRecord,
        filename: String,
        file_type: &str,
        tokens_used: u32,
    ) -> Self {
        Self {
            candidate: Some(candidate),
            metadata: ExtractionMetadata {
                filename,
                file_type: file_type.to_string(),
                tokens_used: Some(tokens_used),
                success: true,
                error: None,
            },
        }
    }

    pub fn failure(filename: String, file_type: &str, error: String) -> Self {
        Self {
            candidate: None,
            metadata: ExtractionMetadata {
                filename,
                file_type: file_type.to_string(),
                tokens_used: None,
                success: false,
                error: Some(error),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.metadata.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serializes_metadata_only() {
        let result = ExtractionResult::failure(
            "cv.pdf".to_string(),
            ".pdf",
            "File not found: cv.pdf".to_string(),
        );
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["_metadata"]["success"], false);
        assert_eq!(v["_metadata"]["error"], "File not found: cv.pdf");
        assert!(v.get("Full Name").is_none());
        assert!(v["_metadata"].get("tokens_used").is_none());
    }

    #[test]
    fn test_success_flattens_candidate_fields() {
        let candidate: CandidateRecord =
            serde_json::from_str(crate::models::candidate::SAMPLE_CANDIDATE).unwrap();
        let result =
            ExtractionResult::success(candidate, "jane.txt".to_string(), ".txt", 1200);
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["Full Name"], "Jane Doe");
        assert_eq!(v["_metadata"]["tokens_used"], 1200);
        assert_eq!(v["_metadata"]["success"], true);
        assert!(v["_metadata"].get("error").is_none());
    }
}
