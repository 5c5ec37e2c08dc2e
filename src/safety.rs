//! Output safety filter for generated health text.
//!
//! Generated answers must stay informational. Sentences that diagnose the
//! user or prescribe treatment are dropped, and every answer carries the
//! standard disclaimer.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::prompt::{DISCLAIMER, FALLBACK_EXPLANATION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    DiagnosticLanguage,
    PrescriptiveLanguage,
}

/// A sentence removed from a generated answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub category: ViolationCategory,
    pub reason: &'static str,
}

/// Filtered answer ready to show to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredResponse {
    pub text: String,
    pub violations: Vec<Violation>,
    pub disclaimer_added: bool,
}

struct SafetyPattern {
    regex: Regex,
    category: ViolationCategory,
    description: &'static str,
}

static PATTERNS: LazyLock<Vec<SafetyPattern>> = LazyLock::new(|| {
    vec![
        pattern(
            r"(?i)\byou\s+have\s+(?:been\s+diagnosed\s+with\s+)?(?:(?:a|an|the)\s+)?(?:[a-z]+\s+)?(?:[a-z]+(?:itis|osis|emia|oma)|infection|disease|syndrome|disorder|diabetes|cancer|flu|covid(?:-19)?)\b",
            ViolationCategory::DiagnosticLanguage,
            "Direct diagnosis: 'you have [condition]'",
        ),
        pattern(
            r"(?i)\byou\s+are\s+suffering\s+from\b",
            ViolationCategory::DiagnosticLanguage,
            "Direct diagnosis: 'you are suffering from'",
        ),
        pattern(
            r"(?i)\byou\s+(?:likely|probably|possibly|definitely)\s+have\b",
            ViolationCategory::DiagnosticLanguage,
            "Speculative diagnosis: 'you likely have'",
        ),
        pattern(
            r"(?i)\bthis\s+(?:means|indicates|confirms)\s+(?:that\s+)?you\s+have\b",
            ViolationCategory::DiagnosticLanguage,
            "Indirect diagnosis: 'this means you have'",
        ),
        pattern(
            r"(?i)\byou\s+should\s+(?:take|stop|start|increase|decrease|discontinue|switch)\b",
            ViolationCategory::PrescriptiveLanguage,
            "Direct prescription: 'you should take/stop'",
        ),
        pattern(
            r"(?i)\b(?:increase|decrease|double|halve)\s+your\s+(?:dose|dosage|medication)\b",
            ViolationCategory::PrescriptiveLanguage,
            "Dose instruction",
        ),
        pattern(
            r"(?i)\btake\s+\d+\s*(?:mg|ml|tablets?|pills?|capsules?)\b",
            ViolationCategory::PrescriptiveLanguage,
            "Dosing instruction: 'take N mg'",
        ),
        pattern(
            r"(?i)\bI\s+(?:would\s+)?(?:recommend|prescribe)\s+(?:taking|that\s+you\s+take)\b",
            ViolationCategory::PrescriptiveLanguage,
            "Direct recommendation: 'I recommend taking'",
        ),
    ]
});

static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?\n]+[.!?]*").expect("Invalid sentence regex"));

fn pattern(regex_str: &str, category: ViolationCategory, description: &'static str) -> SafetyPattern {
    SafetyPattern {
        regex: Regex::new(regex_str).expect("Invalid safety regex pattern"),
        category,
        description,
    }
}

/// Violations found in a piece of text, one per matching pattern.
pub fn scan(text: &str) -> Vec<Violation> {
    PATTERNS
        .iter()
        .filter(|sp| sp.regex.is_match(text))
        .map(|sp| Violation {
            category: sp.category,
            reason: sp.description,
        })
        .collect()
}

/// Drop offending sentences and ensure the disclaimer is present.
pub fn filter_response(text: &str) -> FilteredResponse {
    let mut violations = Vec::new();
    let mut kept = Vec::new();

    for sentence in SENTENCE.find_iter(text) {
        let sentence = sentence.as_str().trim();
        if sentence.is_empty() {
            continue;
        }
        let found = scan(sentence);
        if found.is_empty() {
            kept.push(sentence);
        } else {
            violations.extend(found);
        }
    }

    let mut body = kept.join(" ");
    if body.trim().is_empty() {
        body = FALLBACK_EXPLANATION.to_string();
    }

    let disclaimer_added = !body.contains(DISCLAIMER);
    if disclaimer_added {
        body.push_str("\n\n");
        body.push_str(DISCLAIMER);
    }

    if !violations.is_empty() {
        tracing::info!(removed = violations.len(), "Safety filter removed sentences");
    }

    FilteredResponse {
        text: body,
        violations,
        disclaimer_added,
    }
}
