//! The analysis pipeline: resume bytes and a job posting in, one `MatchResult` out.
//!
//! `Analyzer` holds the shared configuration as `Arc<PipelineConfig>` and the text
//! extractor behind the `TextExtractor` trait. Cloning it is cheap; every call to
//! `analyze` owns its own document and extraction results.

pub mod config;

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AnalyzeError;
use crate::extraction::text::{Document, PdfTextExtractor, TextExtractor};
use crate::matching::engine::{evaluate, MatchResult};
use crate::matching::requirements::{JobPosting, JobRequirement};

pub use config::PipelineConfig;

#[derive(Debug, Clone)]
pub struct Analyzer<E = PdfTextExtractor> {
    config: Arc<PipelineConfig>,
    extractor: E,
}

impl Analyzer<PdfTextExtractor> {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self {
            config,
            extractor: PdfTextExtractor,
        }
    }
}

impl<E: TextExtractor> Analyzer<E> {
    pub fn with_extractor(config: Arc<PipelineConfig>, extractor: E) -> Self {
        Self { config, extractor }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the whole pipeline for one resume and one job.
    ///
    /// The job text is checked first, so a blank posting never costs a PDF parse.
    /// The first failure aborts the analysis and is returned unchanged.
    pub fn analyze(&self, resume: &[u8], posting: &JobPosting) -> Result<MatchResult, AnalyzeError> {
        if posting.description.trim().is_empty() {
            warn!("Rejected analysis: job description is empty");
            return Err(AnalyzeError::EmptyJobDescription);
        }

        let document = Document::extract(resume, &self.extractor)?;
        let requirement = JobRequirement::from_posting(posting, &self.config)?;
        let result = evaluate(document.text(), &requirement, &self.config);

        info!(
            result = result.result.as_str(),
            overall_score = result.overall_score,
            matched = result.match_count,
            required = result.required_skill_count,
            pages = document.page_count(),
            "Analysis complete"
        );

        Ok(result)
    }
}

/// One-shot form of `Analyzer::analyze` for a PDF resume and bare job text.
pub fn analyze(resume: &[u8], job_text: &str, config: &Arc<PipelineConfig>) -> Result<MatchResult, AnalyzeError> {
    Analyzer::new(Arc::clone(config)).analyze(resume, &JobPosting::new(job_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::education::DegreeLevel;
    use crate::matching::engine::Verdict;
    use chrono::NaiveDate;

    /// Treats the input bytes as the single page of text.
    struct PlainText;

    impl TextExtractor for PlainText {
        fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, AnalyzeError> {
            Ok(vec![String::from_utf8_lossy(bytes).into_owned()])
        }
    }

    fn analyzer() -> Analyzer<PlainText> {
        Analyzer::with_extractor(Arc::new(PipelineConfig::builtin().unwrap()), PlainText)
    }

    const RESUME: &str = "Jane Doe\n\
        Skills: Python, SQL, Docker\n\
        Experience\n\
        Backend Developer, Acme Corp | Jan 2019 - Mar 2021\n\
        Internship at Initech: 6 months\n\
        Education\n\
        B.Sc. in Computer Science, State University\n";

    #[test]
    fn test_skills_scenario() {
        let posting = JobPosting::new("Looking for Python, SQL and Kubernetes skills.");
        let result = analyzer().analyze(RESUME.as_bytes(), &posting).unwrap();
        assert_eq!(result.matched_skills.to_vec(), vec!["Python", "SQL"]);
        assert_eq!(result.match_count, 2);
        assert_eq!(result.required_skill_count, 3);
        assert!((result.skills_score - 66.67).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_degree_fails_education() {
        let resume = "Self-taught engineer. Python, SQL.";
        let posting = JobPosting::new("Python developer").with_min_education(DegreeLevel::Bachelor);
        let result = analyzer().analyze(resume.as_bytes(), &posting).unwrap();
        assert!(!result.education_pass);
        assert_eq!(result.education_score, 0.0);
        assert_eq!(result.highest_education, DegreeLevel::Unknown);
    }

    #[test]
    fn test_experience_scenario() {
        let posting = JobPosting::new("Python engineer").with_min_experience_months(24);
        let result = analyzer().analyze(RESUME.as_bytes(), &posting).unwrap();
        assert_eq!(result.experience_months, 33);
        assert!(result.experience_pass);
        assert_eq!(result.experience_score, 100.0);
    }

    #[test]
    fn test_requirements_inferred_from_job_text() {
        let posting = JobPosting::new("Bachelor's degree required. 2+ years with Python and Docker.");
        let result = analyzer().analyze(RESUME.as_bytes(), &posting).unwrap();
        assert_eq!(result.required_education, DegreeLevel::Bachelor);
        assert_eq!(result.highest_education, DegreeLevel::Bachelor);
        assert_eq!(result.required_experience_months, 24);
        assert_eq!(result.overall_score, 100.0);
        assert_eq!(result.result, Verdict::Pass);
    }

    #[test]
    fn test_empty_job_description_rejected_before_extraction() {
        // Not a PDF: would fail extraction if it ever got that far.
        let err = analyze(b"not a pdf", "   ", &Arc::new(PipelineConfig::builtin().unwrap())).unwrap_err();
        assert!(matches!(err, AnalyzeError::EmptyJobDescription));
    }

    #[test]
    fn test_unreadable_document_propagates() {
        let err = analyze(b"not a pdf", "Python developer", &Arc::new(PipelineConfig::builtin().unwrap()))
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::UnreadableDocument(_)));
    }

    #[test]
    fn test_open_range_uses_configured_reference_date() {
        let config = PipelineConfig::builtin()
            .unwrap()
            .with_reference_date(NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
        let analyzer = Analyzer::with_extractor(Arc::new(config), PlainText);
        let posting = JobPosting::new("Rust developer");
        let result = analyzer
            .analyze(b"Engineer | Jan 2020 - Present", &posting)
            .unwrap();
        assert_eq!(result.experience_months, 12);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let analyzer = analyzer();
        let posting = JobPosting::new("Python, SQL, Kubernetes. Master's degree. 3 years.");
        let first = analyzer.analyze(RESUME.as_bytes(), &posting).unwrap();
        let second = analyzer.analyze(RESUME.as_bytes(), &posting).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_analyses_share_configuration() {
        let analyzer = analyzer();
        let posting = JobPosting::new("Python, SQL, Kubernetes");
        let expected = analyzer.analyze(RESUME.as_bytes(), &posting).unwrap();

        let results: Vec<MatchResult> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| analyzer.analyze(RESUME.as_bytes(), &posting).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(|r| *r == expected));
    }
}
