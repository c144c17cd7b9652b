use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AnalyzeError;
use crate::extraction::education::{DegreePatternSpec, DegreePatternTable};
use crate::extraction::skills::{LexiconEntry, SkillLexicon};
use crate::matching::requirements::RequirementDefaults;
use crate::matching::scoring::ScoringPolicy;

const BUILTIN_LEXICON: &str = include_str!("../../data/default_lexicon.json");

/// On-disk lexicon file: skills plus an optional degree table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconSource {
    pub skills: Vec<LexiconEntry>,
    #[serde(default)]
    pub degrees: Option<Vec<DegreePatternSpec>>,
}

impl LexiconSource {
    /// The lexicon and degree table bundled with the binary.
    pub fn builtin() -> Result<Self, AnalyzeError> {
        Self::from_json(BUILTIN_LEXICON)
    }

    pub fn from_json(json: &str) -> Result<Self, AnalyzeError> {
        serde_json::from_str(json)
            .map_err(|e| AnalyzeError::Configuration(format!("malformed lexicon: {e}")))
    }

    pub fn from_path(path: &Path) -> Result<Self, AnalyzeError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AnalyzeError::Configuration(format!("cannot read lexicon {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

/// Immutable configuration shared by every analysis. Built once at startup,
/// then passed by reference (or `Arc`) to any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    lexicon: SkillLexicon,
    degree_patterns: DegreePatternTable,
    scoring: ScoringPolicy,
    defaults: RequirementDefaults,
    reference_date: NaiveDate,
}

impl PipelineConfig {
    /// Compiles `source`. A source without a degree table falls back to the bundled one.
    pub fn new(
        source: &LexiconSource,
        scoring: ScoringPolicy,
        defaults: RequirementDefaults,
        reference_date: NaiveDate,
    ) -> Result<Self, AnalyzeError> {
        scoring.validate()?;

        let lexicon = SkillLexicon::compile(&source.skills)?;
        let degree_patterns = match &source.degrees {
            Some(specs) => DegreePatternTable::compile(specs)?,
            None => {
                let builtin = LexiconSource::builtin()?;
                let specs = builtin.degrees.ok_or_else(|| {
                    AnalyzeError::Configuration("bundled lexicon has no degree table".to_string())
                })?;
                DegreePatternTable::compile(&specs)?
            }
        };

        info!(
            skills = lexicon.len(),
            degree_patterns = degree_patterns.len(),
            pass_threshold = scoring.pass_threshold,
            experience_policy = %scoring.experience_policy,
            %reference_date,
            "Pipeline configuration compiled"
        );

        Ok(Self {
            lexicon,
            degree_patterns,
            scoring,
            defaults,
            reference_date,
        })
    }

    /// Bundled lexicon, default scoring, no job defaults, reference date of 1 Jan 2025.
    /// Stable across runs, which makes it the configuration tests use.
    pub fn builtin() -> Result<Self, AnalyzeError> {
        let reference_date = NaiveDate::from_ymd_opt(2025, 1, 1)
            .ok_or_else(|| AnalyzeError::Configuration("invalid reference date".to_string()))?;
        Self::new(
            &LexiconSource::builtin()?,
            ScoringPolicy::default(),
            RequirementDefaults::default(),
            reference_date,
        )
    }

    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = reference_date;
        self
    }

    pub fn lexicon(&self) -> &SkillLexicon {
        &self.lexicon
    }

    pub fn degree_patterns(&self) -> &DegreePatternTable {
        &self.degree_patterns
    }

    pub fn scoring(&self) -> &ScoringPolicy {
        &self.scoring
    }

    pub fn defaults(&self) -> &RequirementDefaults {
        &self.defaults
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scoring::ScoringWeights;
    use std::io::Write;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_builtin_compiles() {
        let config = PipelineConfig::builtin().unwrap();
        assert!(config.lexicon().len() > 50);
        assert!(config.degree_patterns().len() > 20);
        assert_eq!(config.scoring().pass_threshold, 50.0);
    }

    #[test]
    fn test_builtin_lexicon_ignores_ordinary_words() {
        let config = PipelineConfig::builtin().unwrap();
        assert!(config.lexicon().extract("Implemented a graph node traversal with ts timestamps").is_empty());
        assert_eq!(
            config.lexicon().extract("Node.js and NodeJS services in TypeScript").to_vec(),
            vec!["Node.js", "TypeScript"]
        );
    }

    #[test]
    fn test_source_without_degrees_uses_bundled_table() {
        let source = LexiconSource::from_json(r#"{"skills": ["Rust", {"name": "Go", "aliases": ["golang"]}]}"#).unwrap();
        assert!(source.degrees.is_none());
        let config = PipelineConfig::new(
            &source,
            ScoringPolicy::default(),
            RequirementDefaults::default(),
            date(),
        )
        .unwrap();
        assert_eq!(config.lexicon().len(), 2);
        assert!(config.degree_patterns().len() > 0);
    }

    #[test]
    fn test_malformed_lexicon_rejected() {
        let err = LexiconSource::from_json(r#"{"skills": 42}"#).unwrap_err();
        assert!(matches!(err, AnalyzeError::Configuration(_)));
    }

    #[test]
    fn test_empty_lexicon_rejected() {
        let source = LexiconSource::from_json(r#"{"skills": []}"#).unwrap();
        let err = PipelineConfig::new(
            &source,
            ScoringPolicy::default(),
            RequirementDefaults::default(),
            date(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalyzeError::Configuration(_)));
    }

    #[test]
    fn test_invalid_scoring_rejected() {
        let scoring = ScoringPolicy {
            weights: ScoringWeights {
                skills: 0.0,
                education: 0.0,
                experience: 0.0,
            },
            ..ScoringPolicy::default()
        };
        let err = PipelineConfig::new(
            &LexiconSource::builtin().unwrap(),
            scoring,
            RequirementDefaults::default(),
            date(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalyzeError::Configuration(_)));
    }

    #[test]
    fn test_lexicon_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"skills": ["Elixir"], "degrees": [{{"level": "bachelor", "phrases": ["bachelor"]}}]}}"#).unwrap();
        let source = LexiconSource::from_path(file.path()).unwrap();
        assert_eq!(source.skills, vec![LexiconEntry::Name("Elixir".to_string())]);
        assert_eq!(source.degrees.as_ref().map(Vec::len), Some(1));

        let missing = LexiconSource::from_path(Path::new("/nonexistent/lexicon.json"));
        assert!(matches!(missing, Err(AnalyzeError::Configuration(_))));
    }
}
