use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AnalyzeError;

/// Relative weight of each criterion in the overall score. Normalized by their sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub education: f64,
    pub experience: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 1.0,
            education: 1.0,
            experience: 1.0,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), AnalyzeError> {
        let parts = [self.skills, self.education, self.experience];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AnalyzeError::Configuration(format!(
                "scoring weights must be finite and non-negative, got {self:?}"
            )));
        }
        if parts.iter().sum::<f64>() <= 0.0 {
            return Err(AnalyzeError::Configuration(
                "scoring weights must not all be zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// How the experience criterion turns months into a percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperiencePolicy {
    /// 100 when the minimum is met, else 0.
    #[default]
    Binary,
    /// Proportional to the minimum, capped at 100.
    Prorated,
}

impl fmt::Display for ExperiencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperiencePolicy::Binary => f.write_str("binary"),
            ExperiencePolicy::Prorated => f.write_str("prorated"),
        }
    }
}

impl FromStr for ExperiencePolicy {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binary" => Ok(ExperiencePolicy::Binary),
            "prorated" | "proportional" => Ok(ExperiencePolicy::Prorated),
            other => Err(AnalyzeError::Configuration(format!(
                "unknown experience policy '{other}' (expected binary or prorated)"
            ))),
        }
    }
}

/// Thresholds and weights applied by the match engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub pass_threshold: f64,
    pub weights: ScoringWeights,
    pub experience_policy: ExperiencePolicy,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            pass_threshold: 50.0,
            weights: ScoringWeights::default(),
            experience_policy: ExperiencePolicy::default(),
        }
    }
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<(), AnalyzeError> {
        if !(0.0..=100.0).contains(&self.pass_threshold) {
            return Err(AnalyzeError::Configuration(format!(
                "pass threshold must be within 0..=100, got {}",
                self.pass_threshold
            )));
        }
        self.weights.validate()
    }
}

/// 100 × matched / required; 0 when nothing is required.
pub fn skills_score(matched: usize, required: usize) -> f64 {
    if required == 0 {
        return 0.0;
    }
    round2(100.0 * matched as f64 / required as f64)
}

pub fn experience_score(months: u32, required_months: u32, policy: ExperiencePolicy) -> f64 {
    match policy {
        ExperiencePolicy::Binary => {
            if months >= required_months {
                100.0
            } else {
                0.0
            }
        }
        ExperiencePolicy::Prorated => {
            if required_months == 0 {
                return 100.0;
            }
            round2((100.0 * f64::from(months) / f64::from(required_months)).min(100.0))
        }
    }
}

/// Weighted mean of the three percentages, clamped to 0..=100 and rounded to two decimals.
pub fn compute_combined_score(
    skills: f64,
    education: f64,
    experience: f64,
    weights: &ScoringWeights,
) -> f64 {
    let total = weights.skills + weights.education + weights.experience;
    if total <= 0.0 {
        return 0.0;
    }
    let combined = (weights.skills * skills
        + weights.education * education
        + weights.experience * experience)
        / total;
    round2(combined.clamp(0.0, 100.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skills_score_two_of_three() {
        assert!((skills_score(2, 3) - 66.67).abs() < f64::EPSILON);
    }

    #[test]
    fn test_skills_score_nothing_required_is_zero() {
        assert_eq!(skills_score(0, 0), 0.0);
    }

    #[test]
    fn test_binary_experience() {
        assert_eq!(experience_score(33, 24, ExperiencePolicy::Binary), 100.0);
        assert_eq!(experience_score(23, 24, ExperiencePolicy::Binary), 0.0);
        assert_eq!(experience_score(0, 0, ExperiencePolicy::Binary), 100.0);
    }

    #[test]
    fn test_prorated_experience() {
        assert_eq!(experience_score(12, 24, ExperiencePolicy::Prorated), 50.0);
        assert_eq!(experience_score(48, 24, ExperiencePolicy::Prorated), 100.0);
        assert_eq!(experience_score(0, 0, ExperiencePolicy::Prorated), 100.0);
        assert!((experience_score(1, 3, ExperiencePolicy::Prorated) - 33.33).abs() < f64::EPSILON);
    }

    #[test]
    fn test_combined_score_equal_thirds() {
        let w = ScoringWeights::default();
        // (66.67 + 0 + 100) / 3 = 55.556
        let score = compute_combined_score(66.67, 0.0, 100.0, &w);
        assert!((score - 55.56).abs() < 0.001, "Score was {score}");
    }

    #[test]
    fn test_combined_score_weights_normalized() {
        let w = ScoringWeights {
            skills: 2.0,
            education: 1.0,
            experience: 1.0,
        };
        // (2*80 + 100 + 0) / 4 = 65
        let score = compute_combined_score(80.0, 100.0, 0.0, &w);
        assert!((score - 65.0).abs() < 0.001, "Score was {score}");
    }

    #[test]
    fn test_combined_score_clamped() {
        let w = ScoringWeights {
            skills: 1.0,
            education: 0.0,
            experience: 0.0,
        };
        assert_eq!(compute_combined_score(150.0, 0.0, 0.0, &w), 100.0);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let zero = ScoringWeights {
            skills: 0.0,
            education: 0.0,
            experience: 0.0,
        };
        assert!(matches!(zero.validate(), Err(AnalyzeError::Configuration(_))));

        let negative = ScoringWeights {
            skills: -1.0,
            ..ScoringWeights::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let policy = ScoringPolicy {
            pass_threshold: 120.0,
            ..ScoringPolicy::default()
        };
        assert!(policy.validate().is_err());
        assert!(ScoringPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_experience_policy_parse() {
        assert_eq!("Prorated".parse::<ExperiencePolicy>().unwrap(), ExperiencePolicy::Prorated);
        assert_eq!("binary".parse::<ExperiencePolicy>().unwrap(), ExperiencePolicy::Binary);
        assert!("linear".parse::<ExperiencePolicy>().is_err());
    }
}
