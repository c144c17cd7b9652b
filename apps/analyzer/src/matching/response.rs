use serde::{Deserialize, Serialize};

use crate::matching::engine::{MatchResult, Verdict};

/// JSON shape consumed by the presentation layer.
///
/// `skills` lists what the job asks for. `matched_skills` and `skills_score` go beyond
/// the client's original fields; clients that do not know them ignore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub result: Verdict,
    pub overall_score: f64,
    pub skills: Vec<String>,
    pub resume_skills: Vec<String>,
    pub matched_skills: Vec<String>,
    pub match_count: usize,
    pub skills_length: usize,
    pub skills_score: f64,
    pub education_result: Verdict,
    pub education_score: f64,
    pub experience_result: Verdict,
    pub experience_score: f64,
}

fn verdict(pass: bool) -> Verdict {
    if pass {
        Verdict::Pass
    } else {
        Verdict::Fail
    }
}

impl From<&MatchResult> for MatchResponse {
    fn from(result: &MatchResult) -> Self {
        Self {
            result: result.result,
            overall_score: result.overall_score,
            skills: result.required_skills.to_vec(),
            resume_skills: result.resume_skills.to_vec(),
            matched_skills: result.matched_skills.to_vec(),
            match_count: result.match_count,
            skills_length: result.required_skill_count,
            skills_score: result.skills_score,
            education_result: verdict(result.education_pass),
            education_score: result.education_score,
            experience_result: verdict(result.experience_pass),
            experience_score: result.experience_score,
        }
    }
}
