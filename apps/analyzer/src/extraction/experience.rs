//! Experience Extractor: duration phrases and date ranges converted to months.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anything longer than fifty years is a misread number, not experience.
const MAX_SPAN_MONTHS: u32 = 600;
const MAX_ROLE_CHARS: usize = 80;

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

static RE_DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)\b(?:(?P<sm>{MONTH})\.?,?\s*(?P<sy>\d{{4}})|(?P<snm>\d{{1,2}})/(?P<sny>\d{{4}}))\s*(?:--|-|–|—|to|until|till)\s*(?:(?P<em>{MONTH})\.?,?\s*(?P<ey>\d{{4}})|(?P<enm>\d{{1,2}})/(?P<eny>\d{{4}})|(?P<open>present|current(?:ly)?|now|ongoing|till\s+date|to\s+date|date))\b"
    );
    Regex::new(&pattern).unwrap()
});

static RE_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?P<n>\d+(?:\.\d+)?)(?:\s*(?:-|–|to)\s*(?P<hi>\d+(?:\.\d+)?))?\s*\+?\s*(?P<unit>years?|yrs?|months?|mos?)\b(?:,?\s*(?:and\s+)?(?P<extra>\d+)\s*(?:months?|mos?)\b)?",
    )
    .unwrap()
});

/// How a span was written in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    DateRange,
    Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    pub months: u32,
    pub role: Option<String>,
    pub kind: SpanKind,
}

/// Sum of all spans. Overlapping spans are counted twice.
pub fn total_months(records: &[ExperienceRecord]) -> u32 {
    records
        .iter()
        .fold(0u32, |acc, r| acc.saturating_add(r.months))
}

/// Finds every date range and duration phrase in `text`.
///
/// Open-ended ranges ("Present", "Till date") close at `reference_date`, so the
/// result depends only on the arguments. Reversed ranges and implausibly long
/// spans are skipped. A duration written in brackets right after a date range
/// ("Jan 2019 - Mar 2021 (2 years 3 months)") restates that range and is not
/// counted again.
pub fn extract_experience(text: &str, reference_date: NaiveDate) -> Vec<ExperienceRecord> {
    let mut records = Vec::new();
    let mut ranges: Vec<(usize, usize)> = Vec::new();

    for caps in RE_DATE_RANGE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        ranges.push((whole.start(), whole.end()));

        let Some(months) = range_months(&caps, reference_date) else {
            debug!(span = whole.as_str(), "Ignoring unusable date range");
            continue;
        };
        records.push(ExperienceRecord {
            months,
            role: role_near(text, whole.start(), whole.end(), true),
            kind: SpanKind::DateRange,
        });
    }

    for caps in RE_DURATION.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if ranges
            .iter()
            .any(|&(start, end)| restates_range(text, start, end, whole.start()))
        {
            continue;
        }
        let Some(months) = duration_months(&caps) else {
            continue;
        };
        records.push(ExperienceRecord {
            months,
            role: role_near(text, whole.start(), whole.end(), false),
            kind: SpanKind::Duration,
        });
    }

    debug!(
        records = records.len(),
        months = total_months(&records),
        "Experience scan complete"
    );
    records
}

/// Minimum experience a job text asks for: the largest duration phrase that reads as an
/// experience requirement, ranges counted at their lower bound.
///
/// A phrase qualifies when it is open-ended ("3+ years"), when its clause mentions
/// experience ("3-5 years of experience", "Experience: 2 years"), or when it is followed
/// by a skill ("5 years of Rust", per `names_skill`). Anything else ("a company with
/// 25 years of history") is not a requirement.
pub fn required_experience_months(text: &str, names_skill: impl Fn(&str) -> bool) -> Option<u32> {
    let spans: Vec<Captures<'_>> = RE_DURATION.captures_iter(text).collect();
    let mut required = None;

    for (idx, caps) in spans.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let floor = idx
            .checked_sub(1)
            .and_then(|prev| spans[prev].get(0))
            .map_or(0, |m| m.end());
        let ceiling = spans
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let head = clause_head(&text[floor..whole.start()], idx > 0);
        let tail = clause_tail(&text[whole.end()..ceiling]);

        let qualifies = whole.as_str().contains('+')
            || RE_EXPERIENCE_CUE.is_match(head)
            || RE_EXPERIENCE_CUE.is_match(tail)
            || RE_SKILL_AFTER
                .captures(tail)
                .and_then(|c| c.get(1))
                .is_some_and(|m| names_skill(m.as_str()));
        if !qualifies {
            debug!(span = whole.as_str(), "Duration is not an experience requirement");
            continue;
        }
        if let Some(months) = duration_months(caps) {
            required = required.max(Some(months));
        }
    }
    required
}

static RE_EXPERIENCE_CUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:experience[ds]?|exp|expertise|hands-on)\b").unwrap());
static RE_CLAUSE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n;!?,]|\.(?:\s|$)").unwrap());
static RE_SKILL_AFTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:of|in|with)\s+(\S+(?:\s+\S+){0,3})").unwrap());

/// Text after the last clause break in `before`. Without a break, text that follows an
/// earlier duration belongs to that duration's clause.
fn clause_head(before: &str, after_duration: bool) -> &str {
    match RE_CLAUSE_BREAK.find_iter(before).last() {
        Some(m) => &before[m.end()..],
        None if after_duration => "",
        None => before,
    }
}

/// Text up to the first clause break in `after`.
fn clause_tail(after: &str) -> &str {
    RE_CLAUSE_BREAK
        .find(after)
        .map_or(after, |m| &after[..m.start()])
}

// ────────────────────────────────────────────────────────────────────────────
// Span arithmetic
// ────────────────────────────────────────────────────────────────────────────

fn range_months(caps: &Captures<'_>, reference_date: NaiveDate) -> Option<u32> {
    let start = month_index(caps, "sm", "sy", "snm", "sny")?;
    let end = if caps.name("open").is_some() {
        reference_date.year() * 12 + reference_date.month0() as i32
    } else {
        month_index(caps, "em", "ey", "enm", "eny")?
    };

    if end < start {
        return None;
    }
    let months = u32::try_from(end - start + 1).ok()?;
    (months <= MAX_SPAN_MONTHS).then_some(months)
}

/// Months since year zero for a "Mon YYYY" or "MM/YYYY" capture pair.
fn month_index(caps: &Captures<'_>, name: &str, year: &str, num: &str, num_year: &str) -> Option<i32> {
    let (month, year) = if let Some(m) = caps.name(name) {
        (month_number(m.as_str())?, caps.name(year)?.as_str().parse::<i32>().ok()?)
    } else {
        let month = caps.name(num)?.as_str().parse::<u32>().ok()?;
        (month, caps.name(num_year)?.as_str().parse::<i32>().ok()?)
    };
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(year * 12 + month as i32 - 1)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn duration_months(caps: &Captures<'_>) -> Option<u32> {
    let low = caps.name("n")?.as_str().parse::<f64>().ok()?;
    let value = match caps.name("hi").and_then(|hi| hi.as_str().parse::<f64>().ok()) {
        Some(high) => low.min(high),
        None => low,
    };

    let unit = caps.name("unit")?.as_str().to_lowercase();
    let mut months = if unit.starts_with('y') {
        (value * 12.0).round()
    } else {
        value.round()
    };
    if let Some(extra) = caps.name("extra") {
        months += extra.as_str().parse::<f64>().ok()?;
    }

    if !(0.0..=MAX_SPAN_MONTHS as f64).contains(&months) {
        return None;
    }
    Some(months as u32)
}

fn restates_range(text: &str, range_start: usize, range_end: usize, at: usize) -> bool {
    if at >= range_start && at < range_end {
        return true;
    }
    if at < range_end {
        return false;
    }
    let gap = &text[range_end..at];
    gap.contains(['(', '['])
        && gap
            .chars()
            .all(|c| c.is_whitespace() || matches!(c, '(' | '[' | ',' | '-' | '|' | ':'))
}

// ────────────────────────────────────────────────────────────────────────────
// Role titles
// ────────────────────────────────────────────────────────────────────────────

const TRIM_CHARS: &[char] = &['|', ',', '-', '–', '—', ':', '@', '(', ')', '[', ']', '•', '·', '.', ' ', '\t'];
const TRAILING_CONNECTORS: &[&str] = &["with", "for", "of", "over", "about", "around", "approximately", "since", "from"];

/// Text on the same line as the span: before it first, and after it for date ranges.
fn role_near(text: &str, start: usize, end: usize, look_after: bool) -> Option<String> {
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);

    clean_role(&text[line_start..start])
        .or_else(|| look_after.then(|| clean_role(&text[end..line_end])).flatten())
}

fn clean_role(raw: &str) -> Option<String> {
    let mut role = raw.trim_matches(TRIM_CHARS);
    loop {
        let lower = role.to_lowercase();
        let Some(connector) = TRAILING_CONNECTORS
            .iter()
            .find(|w| lower.ends_with(&format!(" {w}")) || lower == **w)
        else {
            break;
        };
        role = role[..role.len() - connector.len()].trim_matches(TRIM_CHARS);
    }

    if role.is_empty()
        || role.chars().count() > MAX_ROLE_CHARS
        || !role.chars().any(char::is_alphabetic)
        || role.to_lowercase().ends_with("experience")
    {
        return None;
    }
    Some(role.to_string())
}
