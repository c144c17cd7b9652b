use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AnalyzeError;
use crate::extraction::education::{extract_education, DegreeLevel};
use crate::extraction::experience::required_experience_months;
use crate::extraction::skills::SkillSet;
use crate::pipeline::config::PipelineConfig;

/// A job as handed to the analyzer: the description text plus optional overrides
/// for criteria the text states poorly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub description: String,
    pub min_education: Option<DegreeLevel>,
    pub min_experience_months: Option<u32>,
}

impl JobPosting {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_min_education(mut self, level: DegreeLevel) -> Self {
        self.min_education = Some(level);
        self
    }

    pub fn with_min_experience_months(mut self, months: u32) -> Self {
        self.min_experience_months = Some(months);
        self
    }
}

/// Fallbacks used when neither the posting nor its text states a criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementDefaults {
    pub min_education: DegreeLevel,
    pub min_experience_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    pub required_skills: SkillSet,
    pub min_education: DegreeLevel,
    pub min_experience_months: u32,
}

impl JobRequirement {
    /// Derives the requirement from a posting.
    ///
    /// Overrides win. Otherwise the minimum degree is the lowest one the text mentions
    /// ("Bachelor's or Master's" asks for a bachelor), and the minimum experience is the
    /// largest duration it states as an experience requirement, ranges at their lower bound.
    pub fn from_posting(posting: &JobPosting, config: &PipelineConfig) -> Result<Self, AnalyzeError> {
        let text = posting.description.trim();
        if text.is_empty() {
            return Err(AnalyzeError::EmptyJobDescription);
        }

        let required_skills = config.lexicon().extract(text);

        let min_education = posting.min_education.unwrap_or_else(|| {
            extract_education(text, config.degree_patterns())
                .iter()
                .map(|r| r.level)
                .min()
                .unwrap_or(config.defaults().min_education)
        });

        let min_experience_months = posting.min_experience_months.unwrap_or_else(|| {
            let lexicon = config.lexicon();
            required_experience_months(text, |phrase| !lexicon.extract(phrase).is_empty())
                .unwrap_or(config.defaults().min_experience_months)
        });

        debug!(
            required_skills = required_skills.len(),
            %min_education,
            min_experience_months,
            "Built job requirement"
        );

        Ok(Self {
            required_skills,
            min_education,
            min_experience_months,
        })
    }
}
