//! Skill Extractor: longest-match phrase scan over a compiled lexicon.
//!
//! Lexicon phrases and input text go through the same tokenizer, so a phrase can only
//! ever match on token boundaries: "java" never matches inside "javascript", and
//! "CI/CD" in a lexicon matches "CI/CD" or "ci cd" in text alike.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AnalyzeError;

// ────────────────────────────────────────────────────────────────────────────
// SkillSet
// ────────────────────────────────────────────────────────────────────────────

/// Case-insensitive, deduplicated set of canonical skill names.
/// Iterates in normalized-key order so results are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SkillSet {
    entries: BTreeMap<String, String>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `name`; returns false when a case-insensitive equal name is already present.
    pub fn insert(&mut self, name: &str) -> bool {
        let key = name.trim().to_lowercase();
        if key.is_empty() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, name.trim().to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    /// Skills present in both sets, named as in `self`.
    pub fn intersection(&self, other: &SkillSet) -> SkillSet {
        let entries = self
            .entries
            .iter()
            .filter(|(key, _)| other.entries.contains_key(*key))
            .map(|(key, name)| (key.clone(), name.clone()))
            .collect();
        SkillSet { entries }
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.values().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for SkillSet {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<SkillSet> for Vec<String> {
    fn from(set: SkillSet) -> Self {
        set.entries.into_values().collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lexicon
// ────────────────────────────────────────────────────────────────────────────

/// One configured skill: a bare canonical name, or a name with aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LexiconEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        aliases: Vec<String>,
    },
}

impl LexiconEntry {
    pub fn name(&self) -> &str {
        match self {
            LexiconEntry::Name(name) => name,
            LexiconEntry::Detailed { name, .. } => name,
        }
    }

    pub fn aliases(&self) -> &[String] {
        match self {
            LexiconEntry::Name(_) => &[],
            LexiconEntry::Detailed { aliases, .. } => aliases,
        }
    }
}

/// Compiled lexicon: token-sequence phrase table keyed to canonical names.
#[derive(Debug, Clone)]
pub struct SkillLexicon {
    phrases: HashMap<Vec<String>, usize>,
    canonical: Vec<String>,
    max_phrase_len: usize,
}

impl SkillLexicon {
    /// Compiles `entries`. A canonical name repeated case-insensitively merges into the
    /// first occurrence; a phrase claimed by two different skills is a configuration error.
    pub fn compile(entries: &[LexiconEntry]) -> Result<Self, AnalyzeError> {
        if entries.is_empty() {
            return Err(AnalyzeError::Configuration(
                "skill lexicon has no entries".to_string(),
            ));
        }

        let mut canonical: Vec<String> = Vec::new();
        let mut index_by_key: HashMap<String, usize> = HashMap::new();
        let mut phrases: HashMap<Vec<String>, usize> = HashMap::new();

        for entry in entries {
            let name = entry.name().trim();
            if name.is_empty() {
                return Err(AnalyzeError::Configuration(
                    "skill lexicon contains an empty name".to_string(),
                ));
            }

            let idx = *index_by_key.entry(name.to_lowercase()).or_insert_with(|| {
                canonical.push(name.to_string());
                canonical.len() - 1
            });

            for phrase in std::iter::once(name).chain(entry.aliases().iter().map(String::as_str)) {
                let tokens = tokenize(phrase);
                if tokens.is_empty() {
                    return Err(AnalyzeError::Configuration(format!(
                        "skill '{name}' has an alias with no matchable characters: '{phrase}'"
                    )));
                }
                match phrases.get(&tokens) {
                    Some(&existing) if existing != idx => {
                        return Err(AnalyzeError::Configuration(format!(
                            "phrase '{phrase}' maps to both '{}' and '{name}'",
                            canonical[existing]
                        )));
                    }
                    Some(_) => {}
                    None => {
                        phrases.insert(tokens, idx);
                    }
                }
            }
        }

        let max_phrase_len = phrases.keys().map(Vec::len).max().unwrap_or(1);

        Ok(Self {
            phrases,
            canonical,
            max_phrase_len,
        })
    }

    /// Number of canonical skills.
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    /// Scans `text` once, left to right, taking the longest phrase that starts at each token.
    pub fn extract(&self, text: &str) -> SkillSet {
        let tokens = tokenize(text);
        let mut found = SkillSet::new();

        let mut i = 0;
        while i < tokens.len() {
            let longest = self.max_phrase_len.min(tokens.len() - i);
            let hit = (1..=longest).rev().find_map(|len| {
                self.phrases
                    .get(&tokens[i..i + len])
                    .map(|&idx| (idx, len))
            });

            match hit {
                Some((idx, len)) => {
                    found.insert(&self.canonical[idx]);
                    i += len;
                }
                None => i += 1,
            }
        }

        debug!(tokens = tokens.len(), skills = found.len(), "Skill scan complete");
        found
    }
}

/// Lowercased word tokens. Letters and digits form tokens; `+` and `#` stay attached as
/// a suffix (`c++`, `c#`); a `.` stays when it sits between alphanumerics (`node.js`)
/// or leads a word (`.net`). Everything else separates.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };
        let next = chars.get(i + 1).copied();
        let next_is_alnum = next.is_some_and(char::is_alphanumeric);

        let keep = if c.is_alphanumeric() {
            true
        } else if c == '+' || c == '#' {
            !current.is_empty() && !next_is_alnum
        } else if c == '.' {
            let prev_is_alnum = prev.is_some_and(char::is_alphanumeric);
            next_is_alnum && (prev_is_alnum || current.is_empty())
        } else {
            false
        };

        if keep {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
