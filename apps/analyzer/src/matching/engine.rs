//! Match Engine: compares a candidate profile with a job requirement.
//!
//! Algorithm:
//! 1. matched = resume skills ∩ required skills
//! 2. skills score = 100 × |matched| / |required| (0 when nothing is required)
//! 3. education passes when the highest degree ≥ the job minimum (100 / 0)
//! 4. experience passes when total months ≥ the job minimum, scored per `ExperiencePolicy`
//! 5. overall = weighted mean; Pass iff overall ≥ threshold

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extraction::education::{
    extract_education, highest_level, DegreeLevel, DegreePatternTable, EducationRecord,
};
use crate::extraction::experience::{extract_experience, total_months, ExperienceRecord};
use crate::extraction::skills::{SkillLexicon, SkillSet};
use crate::matching::requirements::JobRequirement;
use crate::matching::scoring::{compute_combined_score, experience_score, skills_score, ScoringPolicy};
use crate::pipeline::config::PipelineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Fail,
    Pass,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Fail => "Fail",
            Verdict::Pass => "Pass",
        }
    }
}

/// Everything the extractors found in one resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub skills: SkillSet,
    pub education: Vec<EducationRecord>,
    pub experience: Vec<ExperienceRecord>,
}

impl CandidateProfile {
    /// Runs the three extractors over `text`. They are independent of each other.
    pub fn extract(
        text: &str,
        lexicon: &SkillLexicon,
        degree_patterns: &DegreePatternTable,
        reference_date: NaiveDate,
    ) -> Self {
        Self {
            skills: lexicon.extract(text),
            education: extract_education(text, degree_patterns),
            experience: extract_experience(text, reference_date),
        }
    }

    pub fn highest_education(&self) -> DegreeLevel {
        highest_level(&self.education)
    }

    pub fn experience_months(&self) -> u32 {
        total_months(&self.experience)
    }
}

/// Outcome of one resume/job comparison. Built once by `score_match`; outside this
/// crate it is read-only and every field is exposed through an accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub(crate) matched_skills: SkillSet,
    pub(crate) match_count: usize,
    pub(crate) required_skill_count: usize,
    pub(crate) skills_score: f64,
    pub(crate) education_pass: bool,
    pub(crate) education_score: f64,
    pub(crate) experience_pass: bool,
    pub(crate) experience_score: f64,
    pub(crate) overall_score: f64,
    pub(crate) result: Verdict,

    // Explanation of the scores above.
    pub(crate) resume_skills: SkillSet,
    pub(crate) required_skills: SkillSet,
    pub(crate) highest_education: DegreeLevel,
    pub(crate) required_education: DegreeLevel,
    pub(crate) experience_months: u32,
    pub(crate) required_experience_months: u32,
}

impl MatchResult {
    pub fn matched_skills(&self) -> &SkillSet {
        &self.matched_skills
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn required_skill_count(&self) -> usize {
        self.required_skill_count
    }

    pub fn skills_score(&self) -> f64 {
        self.skills_score
    }

    pub fn education_pass(&self) -> bool {
        self.education_pass
    }

    pub fn education_score(&self) -> f64 {
        self.education_score
    }

    pub fn experience_pass(&self) -> bool {
        self.experience_pass
    }

    pub fn experience_score(&self) -> f64 {
        self.experience_score
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn result(&self) -> Verdict {
        self.result
    }

    pub fn resume_skills(&self) -> &SkillSet {
        &self.resume_skills
    }

    pub fn required_skills(&self) -> &SkillSet {
        &self.required_skills
    }

    pub fn highest_education(&self) -> DegreeLevel {
        self.highest_education
    }

    pub fn required_education(&self) -> DegreeLevel {
        self.required_education
    }

    pub fn experience_months(&self) -> u32 {
        self.experience_months
    }

    pub fn required_experience_months(&self) -> u32 {
        self.required_experience_months
    }
}

pub fn score_match(
    profile: &CandidateProfile,
    requirement: &JobRequirement,
    policy: &ScoringPolicy,
) -> MatchResult {
    let matched_skills = profile.skills.intersection(&requirement.required_skills);
    let match_count = matched_skills.len();
    let required_skill_count = requirement.required_skills.len();
    let skills = skills_score(match_count, required_skill_count);

    let highest_education = profile.highest_education();
    let education_pass = highest_education >= requirement.min_education;
    let education = if education_pass { 100.0 } else { 0.0 };

    let experience_months = profile.experience_months();
    let experience_pass = experience_months >= requirement.min_experience_months;
    let experience = experience_score(
        experience_months,
        requirement.min_experience_months,
        policy.experience_policy,
    );

    let overall_score = compute_combined_score(skills, education, experience, &policy.weights);
    let result = if overall_score >= policy.pass_threshold {
        Verdict::Pass
    } else {
        Verdict::Fail
    };

    MatchResult {
        matched_skills,
        match_count,
        required_skill_count,
        skills_score: skills,
        education_pass,
        education_score: education,
        experience_pass,
        experience_score: experience,
        overall_score,
        result,
        resume_skills: profile.skills.clone(),
        required_skills: requirement.required_skills.clone(),
        highest_education,
        required_education: requirement.min_education,
        experience_months,
        required_experience_months: requirement.min_experience_months,
    }
}

/// Extracts the candidate profile from `resume_text` and scores it against `requirement`.
pub fn evaluate(resume_text: &str, requirement: &JobRequirement, config: &PipelineConfig) -> MatchResult {
    let profile = CandidateProfile::extract(
        resume_text,
        config.lexicon(),
        config.degree_patterns(),
        config.reference_date(),
    );
    score_match(&profile, requirement, config.scoring())
}
