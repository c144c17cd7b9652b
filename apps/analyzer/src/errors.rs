use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline-level error type.
/// Every fatal condition of an analysis surfaces as one of these variants, unchanged,
/// so the caller can translate it for the user with `ErrorBody::from`.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),

    #[error("Job description is empty")]
    EmptyJobDescription,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("History I/O error: {0}")]
    HistoryIo(#[from] std::io::Error),

    #[error("History file is corrupt at line {line}: {source}")]
    CorruptHistory {
        line: usize,
        source: serde_json::Error,
    },

    #[error("History serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalyzeError {
    /// Stable machine-readable code, mirrored in logs.
    pub fn code(&self) -> &'static str {
        match self {
            AnalyzeError::UnreadableDocument(_) => "UNREADABLE_DOCUMENT",
            AnalyzeError::EmptyJobDescription => "EMPTY_JOB_DESCRIPTION",
            AnalyzeError::Configuration(_) => "CONFIGURATION_ERROR",
            AnalyzeError::HistoryIo(_)
            | AnalyzeError::CorruptHistory { .. }
            | AnalyzeError::Serialization(_) => "HISTORY_ERROR",
        }
    }

    /// Message suitable for showing to the person who submitted the resume.
    pub fn user_message(&self) -> String {
        match self {
            AnalyzeError::UnreadableDocument(_) => {
                "Failed to extract text from the resume. Please upload a PDF with a text layer; scanned documents are not supported.".to_string()
            }
            AnalyzeError::EmptyJobDescription => {
                "The job description is empty. Please paste the job description text.".to_string()
            }
            AnalyzeError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                "The analyzer is misconfigured. Please contact the administrator.".to_string()
            }
            other => {
                tracing::error!("History error: {other}");
                "Analysis history could not be read or written.".to_string()
            }
        }
    }
}

/// The `{error: string}` response shape consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&AnalyzeError> for ErrorBody {
    fn from(err: &AnalyzeError) -> Self {
        ErrorBody {
            error: err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_for_fatal_variants() {
        let codes = [
            AnalyzeError::UnreadableDocument("x".into()).code(),
            AnalyzeError::EmptyJobDescription.code(),
            AnalyzeError::Configuration("x".into()).code(),
        ];
        assert_eq!(codes, ["UNREADABLE_DOCUMENT", "EMPTY_JOB_DESCRIPTION", "CONFIGURATION_ERROR"]);
    }

    #[test]
    fn test_error_body_serializes_to_error_key() {
        let body = ErrorBody::from(&AnalyzeError::EmptyJobDescription);
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("job description"));
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_unreadable_document_message_mentions_scans() {
        let err = AnalyzeError::UnreadableDocument("no text layer".into());
        assert!(err.to_string().contains("no text layer"));
        assert!(err.user_message().contains("scanned"));
    }
}
