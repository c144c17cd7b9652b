use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use crate::extraction::education::DegreeLevel;
use crate::matching::requirements::RequirementDefaults;
use crate::matching::scoring::{ExperiencePolicy, ScoringPolicy, ScoringWeights};
use crate::pipeline::config::{LexiconSource, PipelineConfig};

/// Application configuration loaded from environment variables.
/// Every variable is optional; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub lexicon_path: Option<PathBuf>,
    pub pass_threshold: f64,
    pub weights: ScoringWeights,
    pub experience_policy: ExperiencePolicy,
    pub min_education: DegreeLevel,
    pub min_experience_months: u32,
    pub history_path: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            lexicon_path: var("RESUMATCH_LEXICON").map(PathBuf::from),
            pass_threshold: parse_var(&var, "RESUMATCH_PASS_THRESHOLD")?.unwrap_or(50.0),
            weights: match var("RESUMATCH_WEIGHTS") {
                Some(raw) => parse_weights(&raw).context("RESUMATCH_WEIGHTS must be 'skills,education,experience'")?,
                None => ScoringWeights::default(),
            },
            experience_policy: parse_var(&var, "RESUMATCH_EXPERIENCE_POLICY")?.unwrap_or_default(),
            min_education: parse_var(&var, "RESUMATCH_MIN_EDUCATION")?.unwrap_or_default(),
            min_experience_months: parse_var(&var, "RESUMATCH_MIN_EXPERIENCE_MONTHS")?.unwrap_or(0),
            history_path: var("RESUMATCH_HISTORY")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("resumatch-history.jsonl")),
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Compiles the pipeline configuration this environment describes.
    pub fn pipeline_config(&self, reference_date: NaiveDate) -> Result<PipelineConfig> {
        let source = match &self.lexicon_path {
            Some(path) => LexiconSource::from_path(path)?,
            None => LexiconSource::builtin()?,
        };
        let scoring = ScoringPolicy {
            pass_threshold: self.pass_threshold,
            weights: self.weights,
            experience_policy: self.experience_policy,
        };
        let defaults = RequirementDefaults {
            min_education: self.min_education,
            min_experience_months: self.min_experience_months,
        };
        PipelineConfig::new(&source, scoring, defaults, reference_date)
            .context("Failed to build the analysis pipeline")
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(None),
    }
}

fn parse_weights(raw: &str) -> Result<ScoringWeights> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("'{raw}' is not a list of numbers"))?;
    let &[skills, education, experience] = parts.as_slice() else {
        bail!("expected three weights, got {}", parts.len());
    };
    Ok(ScoringWeights {
        skills,
        education,
        experience,
    })
}
