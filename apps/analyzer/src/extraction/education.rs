//! Education Extractor: degree phrases via a configured pattern table.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::errors::AnalyzeError;

/// Ordinal degree level. Declaration order is the comparison order; `Unknown` ranks lowest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DegreeLevel {
    #[default]
    Unknown,
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

impl DegreeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegreeLevel::Unknown => "unknown",
            DegreeLevel::HighSchool => "high-school",
            DegreeLevel::Associate => "associate",
            DegreeLevel::Bachelor => "bachelor",
            DegreeLevel::Master => "master",
            DegreeLevel::Doctorate => "doctorate",
        }
    }
}

impl fmt::Display for DegreeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown degree level '{0}' (expected high-school, associate, bachelor, master, doctorate or unknown)")]
pub struct ParseDegreeLevelError(String);

impl FromStr for DegreeLevel {
    type Err = ParseDegreeLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "unknown" | "none" => Ok(DegreeLevel::Unknown),
            "highschool" | "secondary" => Ok(DegreeLevel::HighSchool),
            "associate" | "diploma" => Ok(DegreeLevel::Associate),
            "bachelor" | "bachelors" | "undergraduate" => Ok(DegreeLevel::Bachelor),
            "master" | "masters" | "postgraduate" => Ok(DegreeLevel::Master),
            "doctorate" | "phd" | "doctoral" => Ok(DegreeLevel::Doctorate),
            _ => Err(ParseDegreeLevelError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub level: DegreeLevel,
    pub field_of_study: Option<String>,
    pub institution: Option<String>,
}

/// Highest level across `records`; `Unknown` when there are none.
pub fn highest_level(records: &[EducationRecord]) -> DegreeLevel {
    records
        .iter()
        .map(|r| r.level)
        .max()
        .unwrap_or(DegreeLevel::Unknown)
}

// ────────────────────────────────────────────────────────────────────────────
// Pattern table
// ────────────────────────────────────────────────────────────────────────────

/// Configured phrases for one degree level.
///
/// - `phrases`: whole words, whitespace between words is flexible ("bachelor of science").
/// - `abbreviations`: dot-separated segments where each separator may be a period, hyphen,
///   space or nothing ("b.sc" matches "BSc", "B.Sc.", "B-Sc", "B. Sc").
/// - `dotted`: like abbreviations but the inner periods are mandatory, for short forms that
///   collide with ordinary words ("m.s." matches "M.S." and "M.S" but not "MS Office").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreePatternSpec {
    pub level: DegreeLevel,
    #[serde(default)]
    pub phrases: Vec<String>,
    #[serde(default)]
    pub abbreviations: Vec<String>,
    #[serde(default)]
    pub dotted: Vec<String>,
}

#[derive(Debug, Clone)]
struct DegreePattern {
    regex: Regex,
    level: DegreeLevel,
}

#[derive(Debug, Clone)]
pub struct DegreePatternTable {
    patterns: Vec<DegreePattern>,
}

impl DegreePatternTable {
    pub fn compile(specs: &[DegreePatternSpec]) -> Result<Self, AnalyzeError> {
        let mut patterns = Vec::new();

        for spec in specs {
            if spec.level == DegreeLevel::Unknown {
                return Err(AnalyzeError::Configuration(
                    "degree patterns cannot map to the 'unknown' level".to_string(),
                ));
            }
            let sources = spec
                .phrases
                .iter()
                .map(|p| phrase_regex(p))
                .chain(spec.abbreviations.iter().map(|a| abbreviation_regex(a, false)))
                .chain(spec.dotted.iter().map(|a| abbreviation_regex(a, true)));

            for source in sources {
                let source = source.ok_or_else(|| {
                    AnalyzeError::Configuration(format!(
                        "empty degree pattern for level '{}'",
                        spec.level
                    ))
                })?;
                let regex = Regex::new(&source).map_err(|e| {
                    AnalyzeError::Configuration(format!("invalid degree pattern '{source}': {e}"))
                })?;
                patterns.push(DegreePattern {
                    regex,
                    level: spec.level,
                });
            }
        }

        if patterns.is_empty() {
            return Err(AnalyzeError::Configuration(
                "degree pattern table is empty".to_string(),
            ));
        }

        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// All non-overlapping degree hits, leftmost first and longest at equal starts.
    fn find_hits(&self, text: &str) -> Vec<DegreeHit> {
        let mut hits = Vec::new();
        for pattern in &self.patterns {
            for m in pattern.regex.find_iter(text) {
                if ends_on_boundary(text, m.end()) {
                    hits.push(DegreeHit {
                        start: m.start(),
                        end: m.end(),
                        level: pattern.level,
                    });
                }
            }
        }

        hits.sort_by(|a, b| a.start.cmp(&b.start).then((b.end - b.start).cmp(&(a.end - a.start))));

        let mut accepted: Vec<DegreeHit> = Vec::new();
        for hit in hits {
            if accepted.last().map_or(true, |last| hit.start >= last.end) {
                accepted.push(hit);
            }
        }
        accepted
    }
}

#[derive(Debug, Clone, Copy)]
struct DegreeHit {
    start: usize,
    end: usize,
    level: DegreeLevel,
}

fn phrase_regex(phrase: &str) -> Option<String> {
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }
    Some(format!(r"(?i)\b{}", words.join(r"\s+")))
}

fn abbreviation_regex(abbreviation: &str, dotted: bool) -> Option<String> {
    let segments: Vec<String> = abbreviation
        .split(['.', '-', ' '])
        .filter(|s| !s.is_empty())
        .map(regex::escape)
        .collect();
    if segments.is_empty() {
        return None;
    }
    let pattern = if dotted {
        format!(r"(?i)\b{}\.?", segments.join(r"\.\s?"))
    } else {
        format!(r"(?i)\b{}\.?", segments.join(r"[.\-]?\s?"))
    };
    Some(pattern)
}

/// A hit must not run into a following letter or digit ("m.s." in "m.s.c" is rejected).
fn ends_on_boundary(text: &str, end: usize) -> bool {
    text[end..].chars().next().map_or(true, |c| !c.is_alphanumeric())
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

static RE_FIELD_IN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[\s,(])in[ \t]+([A-Z][A-Za-z&]*(?:[ \t]+(?:and[ \t]+|&[ \t]+)?[A-Z][A-Za-z&]*)*)")
        .unwrap()
});
// "of" is usually consumed by the degree phrase itself ("master of").
static RE_FIELD_OF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[ \t.,]*(?:of[ \t]+)?([A-Z][A-Za-z&]*(?:[ \t]+(?:and[ \t]+|&[ \t]+)?[A-Z][A-Za-z&]*)*)",
    )
    .unwrap()
});
static RE_INSTITUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:[A-Z][\w&.'\-]*[ \t]+)*(?:University|College|Institute|Academy|School)(?:[ \t]+of(?:[ \t]+[A-Z][\w&.'\-]*)+)?",
    )
    .unwrap()
});

/// Emits one record per distinct (level, field, institution) found in `text`.
pub fn extract_education(text: &str, table: &DegreePatternTable) -> Vec<EducationRecord> {
    let institutions: Vec<(usize, usize)> = RE_INSTITUTION
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    let mut records: Vec<EducationRecord> = Vec::new();

    for hit in table.find_hits(text) {
        // "High School" at the tail of "Lincoln High School" names a place, not a degree.
        if institutions
            .iter()
            .any(|&(start, end)| start < hit.start && hit.end <= end)
        {
            continue;
        }

        let line_start = text[..hit.start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = text[hit.end..].find('\n').map_or(text.len(), |i| hit.end + i);
        let rest = &text[hit.end..line_end];

        let field_of_study = RE_FIELD_IN
            .captures(rest)
            .or_else(|| RE_FIELD_OF.captures(rest))
            .map(|caps| caps[1].trim().to_string())
            .filter(|field| !RE_INSTITUTION.is_match(field));

        let institution = institutions
            .iter()
            .filter(|&&(start, end)| start >= line_start && end <= line_end)
            .find(|&&(start, end)| end <= hit.start || start >= hit.end)
            .map(|&(start, end)| text[start..end].trim().to_string());

        let record = EducationRecord {
            level: hit.level,
            field_of_study,
            institution,
        };
        if !records.contains(&record) {
            records.push(record);
        }
    }

    debug!(records = records.len(), "Education scan complete");
    records
}
