//! Identifier vs. descriptive classification of raw utterances.
//!
//! Classification is structural: equipment codes have a recognisable shape
//! (`RFCC-00123`, `PE-V2884`, `12345-A`, `"quoted tag"`, `ID 4411`), and
//! anything without that shape is treated as a description. The keyword
//! table only raises the confidence of a descriptive verdict; it never
//! changes the label.

use regex_lite::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::warn;
use workmatch_core::Scenario;

/// Ordered identifier patterns. Capture group 1, when present, is the identifier itself.
const IDENTIFIER_PATTERNS: &[&str] = &[
    // Letter-code prefix joined to alphanumeric segments: RFCC-00123, PE-V2884-A
    r"\b([A-Z]{2,4}-[A-Z0-9]+(?:-[A-Z0-9]+)*)\b",
    // Leading run of digits then a hyphen: 12345-A01
    r"\b(\d{4,}-[A-Za-z0-9]+(?:-[A-Za-z0-9]+)*)",
    // Quoted tags
    r#""([^"]+)""#,
    r"“([^”]+)”",
    // Explicit id token: ID 123, itemno: 4411
    r"(?i)\b(?:id|itemno)\s*[:#]?\s*(\d+)",
];

/// Equipment nouns and failure symptoms, Korean and English.
const DESCRIPTIVE_KEYWORDS: &[&str] = &[
    // equipment
    "압력", "베젤", "용기", "펌프", "밸브", "배관", "탱크", "모터", "열교환기", "압축기",
    "컨베이어", "vessel", "pump", "valve", "pipe", "tank", "motor", "exchanger",
    "compressor", "conveyor",
    // symptoms
    "고장", "누설", "누유", "진동", "소음", "파손", "균열", "부식", "막힘", "과열", "작동불량",
    "leak", "vibration", "noise", "crack", "corrosion", "failure", "broken", "overheat",
    "blocked",
    // work
    "점검", "교체", "수리", "정비", "repair", "replace", "inspection",
];

/// Confidence attached to each way of reaching a verdict.
const IDENTIFIER_CONFIDENCE: f32 = 0.9;
const KEYWORD_CONFIDENCE: f32 = 0.8;
const FALLBACK_CONFIDENCE: f32 = 0.5;

static DEFAULT_CLASSIFIER: LazyLock<ScenarioClassifier> = LazyLock::new(ScenarioClassifier::new);

/// Classify with the built-in pattern and keyword tables.
pub fn classify(text: &str) -> Scenario {
    DEFAULT_CLASSIFIER.classify(text)
}

/// A classification with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioAnalysis {
    pub scenario: Scenario,
    pub confidence: f32,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ScenarioClassifier {
    patterns: Vec<Regex>,
    keywords: Vec<String>,
}

impl ScenarioClassifier {
    pub fn new() -> Self {
        let patterns = IDENTIFIER_PATTERNS
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern, error = %e, "Skipping invalid identifier pattern");
                    None
                }
            })
            .collect();

        Self {
            patterns,
            keywords: DESCRIPTIVE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Add site-specific descriptive keywords.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords
            .extend(keywords.into_iter().map(|k| k.into().to_lowercase()));
        self
    }

    /// Total: every input gets a label, and unknown input is descriptive.
    pub fn classify(&self, text: &str) -> Scenario {
        if self.has_identifier(text) {
            Scenario::Identifier
        } else {
            Scenario::Descriptive
        }
    }

    pub fn analyze(&self, text: &str) -> ScenarioAnalysis {
        let text = text.trim();
        if text.is_empty() {
            return ScenarioAnalysis {
                scenario: Scenario::Descriptive,
                confidence: 0.0,
                reason: "empty input".into(),
            };
        }

        if let Some(id) = self.extract_identifiers(text).into_iter().next() {
            return ScenarioAnalysis {
                scenario: Scenario::Identifier,
                confidence: IDENTIFIER_CONFIDENCE,
                reason: format!("identifier pattern matched: {id}"),
            };
        }

        match self.matched_keyword(text) {
            Some(keyword) => ScenarioAnalysis {
                scenario: Scenario::Descriptive,
                confidence: KEYWORD_CONFIDENCE,
                reason: format!("domain keyword: {keyword}"),
            },
            None => ScenarioAnalysis {
                scenario: Scenario::Descriptive,
                confidence: FALLBACK_CONFIDENCE,
                reason: "no identifier pattern".into(),
            },
        }
    }

    /// Identifier-looking substrings, in order of appearance, without duplicates.
    pub fn extract_identifiers(&self, text: &str) -> Vec<String> {
        let mut found: Vec<(usize, String)> = Vec::new();
        for re in &self.patterns {
            for caps in re.captures_iter(text) {
                let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
                    continue;
                };
                let value = m.as_str().trim();
                if !value.is_empty() {
                    found.push((m.start(), value.to_string()));
                }
            }
        }

        found.sort_by_key(|(start, _)| *start);
        let mut ids: Vec<String> = Vec::with_capacity(found.len());
        for (_, value) in found {
            if !ids.contains(&value) {
                ids.push(value);
            }
        }
        ids
    }

    fn has_identifier(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }

    fn matched_keyword(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
    }
}

impl Default for ScenarioClassifier {
    fn default() -> Self {
        Self::new()
    }
}
