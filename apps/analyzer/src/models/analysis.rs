use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::engine::MatchResult;

/// One persisted analysis: a line of the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub resume_file: String,
    pub job_description: String,
    pub result: MatchResult,
}

impl AnalysisRecord {
    pub fn new(resume_file: impl Into<String>, job_description: impl Into<String>, result: MatchResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            resume_file: resume_file.into(),
            job_description: job_description.into(),
            result,
        }
    }
}
