//! Symptom severity triage.
//!
//! Maps a symptom report (selected symptom chips, optional free text and an
//! optional duration answer) to a three-level [`SeverityLevel`]. Red-flag
//! phrases override everything; otherwise a simple symptom count decides.
//!
//! Pure and synchronous: no I/O, no clock, no shared state.

use std::collections::BTreeMap;

pub use crate::models::enums::{DurationFlag, SeverityLevel};

/// Phrases whose presence alone classifies a report as `High`.
pub const RED_FLAG_PHRASES: &[&str] = &[
    "chest pain",
    "breathing difficulty",
    "shortness of breath",
    "severe dizziness",
    "unconscious",
    "loss of consciousness",
    "persistent high fever",
];

/// Symptom count at which a report is at least `Moderate`, and at which a
/// persistent duration escalates it to `High`.
pub const MULTI_SYMPTOM_THRESHOLD: usize = 2;

const SEARCH_TEXT_SEPARATOR: &str = " | ";

/// One classification request. Built fresh per request, never mutated.
///
/// Built through [`SymptomReport::new`] (or `Default`, the empty report), so it holds
/// trimmed, non-blank, case-insensitively unique labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomReport {
    /// Lowercased label → first spelling seen.
    selected_symptoms: BTreeMap<String, String>,
    free_text: Option<String>,
    duration: Option<DurationFlag>,
}

impl SymptomReport {
    /// Blank labels are dropped and labels differing only in case collapse
    /// to the first spelling. Blank free text is treated as absent.
    pub fn new<I, S>(selected: I, free_text: Option<&str>, duration: Option<DurationFlag>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected_symptoms = BTreeMap::new();
        for label in selected {
            let label = label.as_ref().trim();
            if !label.is_empty() {
                selected_symptoms
                    .entry(normalize(label))
                    .or_insert_with(|| label.to_string());
            }
        }
        let free_text = free_text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Self {
            selected_symptoms,
            free_text,
            duration,
        }
    }

    pub fn selected_symptoms(&self) -> impl Iterator<Item = &str> {
        self.selected_symptoms.values().map(String::as_str)
    }

    pub fn free_text(&self) -> Option<&str> {
        self.free_text.as_deref()
    }

    pub fn duration(&self) -> Option<DurationFlag> {
        self.duration
    }

    /// Selected chips plus one unit for any free text, however many
    /// symptoms that text describes.
    pub fn symptom_count(&self) -> usize {
        self.selected_symptoms.len() + usize::from(self.free_text.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.symptom_count() == 0
    }

    /// Lowercased, trimmed labels then free text, in a stable order.
    pub fn search_text(&self) -> String {
        self.selected_symptoms
            .keys()
            .cloned()
            .chain(self.free_text.iter().map(|t| normalize(t)))
            .collect::<Vec<_>>()
            .join(SEARCH_TEXT_SEPARATOR)
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Returns the first red-flag phrase found in the report, if any.
pub fn find_red_flag(report: &SymptomReport) -> Option<&'static str> {
    let haystack = report.search_text();
    RED_FLAG_PHRASES
        .iter()
        .copied()
        .find(|phrase| haystack.contains(phrase))
}

/// Classify a symptom report.
///
/// 1. Any red-flag phrase → `High`.
/// 2. Persistent duration with two or more symptoms → `High`.
/// 3. Two or more symptoms → `Moderate`.
/// 4. Otherwise `Low`.
pub fn classify(report: &SymptomReport) -> SeverityLevel {
    if find_red_flag(report).is_some() {
        return SeverityLevel::High;
    }

    let count = report.symptom_count();
    let persistent = report.duration.is_some_and(DurationFlag::is_persistent);

    if persistent && count >= MULTI_SYMPTOM_THRESHOLD {
        return SeverityLevel::High;
    }
    if count >= MULTI_SYMPTOM_THRESHOLD {
        return SeverityLevel::Moderate;
    }
    SeverityLevel::Low
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(selected: &[&str], free_text: &str, duration: Option<DurationFlag>) -> SeverityLevel {
        let free = if free_text.is_empty() { None } else { Some(free_text) };
        classify(&SymptomReport::new(selected.iter().copied(), free, duration))
    }

    #[test]
    fn empty_report_is_low() {
        assert_eq!(level(&[], "", None), SeverityLevel::Low);
        assert!(SymptomReport::default().is_empty());
    }

    #[test]
    fn single_symptom_is_low() {
        assert_eq!(level(&["Fever"], "", None), SeverityLevel::Low);
    }

    #[test]
    fn two_symptoms_are_moderate() {
        assert_eq!(level(&["Fever", "Cough"], "", None), SeverityLevel::Moderate);
        assert_eq!(level(&["Headache", "Fatigue"], "", None), SeverityLevel::Moderate);
    }

    #[test]
    fn many_symptoms_stay_moderate_without_duration() {
        assert_eq!(
            level(&["Fever", "Cough", "Fatigue", "Nausea"], "sore muscles", None),
            SeverityLevel::Moderate
        );
    }

    #[test]
    fn red_flag_chip_is_high_regardless_of_case() {
        assert_eq!(level(&["Chest Pain"], "", None), SeverityLevel::High);
        assert_eq!(level(&["chest pain"], "", None), SeverityLevel::High);
        assert_eq!(level(&["  CHEST PAIN  "], "", None), SeverityLevel::High);
    }

    #[test]
    fn red_flag_in_free_text_alone_is_high() {
        assert_eq!(level(&[], "loss of consciousness", None), SeverityLevel::High);
        assert_eq!(
            level(&[], "woke up with Shortness of Breath", None),
            SeverityLevel::High
        );
    }

    #[test]
    fn red_flag_wins_over_duration_and_count() {
        assert_eq!(
            level(&["Fever"], "persistent high fever", Some(DurationFlag::LessThanWeek)),
            SeverityLevel::High
        );
    }

    #[test]
    fn every_red_flag_phrase_triggers_high() {
        for phrase in RED_FLAG_PHRASES {
            assert_eq!(level(&[], phrase, None), SeverityLevel::High, "{phrase}");
        }
    }

    #[test]
    fn free_text_counts_once() {
        assert_eq!(level(&[], "chills, fatigue, mild fever", None), SeverityLevel::Low);
        assert_eq!(level(&["Fever"], "chills", None), SeverityLevel::Moderate);
    }

    #[test]
    fn blank_free_text_does_not_count() {
        assert_eq!(level(&["Fever"], "   ", None), SeverityLevel::Low);
    }

    #[test]
    fn persistent_duration_escalates_multiple_symptoms() {
        assert_eq!(
            level(&["Fever", "Cough"], "", Some(DurationFlag::OneWeekOrMore)),
            SeverityLevel::High
        );
        assert_eq!(
            level(&["Fever"], "chills", Some(DurationFlag::OneWeekOrMore)),
            SeverityLevel::High
        );
    }

    #[test]
    fn persistent_duration_needs_two_symptoms() {
        assert_eq!(
            level(&["Fever"], "", Some(DurationFlag::OneWeekOrMore)),
            SeverityLevel::Low
        );
    }

    #[test]
    fn short_duration_does_not_escalate() {
        assert_eq!(
            level(&["Fever", "Cough"], "", Some(DurationFlag::LessThanWeek)),
            SeverityLevel::Moderate
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let report = SymptomReport::new(["Cough", "Fever"], Some("runny nose"), None);
        let first = classify(&report);
        for _ in 0..10 {
            assert_eq!(classify(&report), first);
        }
    }

    #[test]
    fn search_text_order_is_stable() {
        let a = SymptomReport::new(["Fever", "Cough"], Some(" Chills "), None);
        let b = SymptomReport::new(["Cough", "Fever"], Some("chills"), None);
        assert_eq!(a.search_text(), "cough | fever | chills");
        assert_eq!(a.search_text(), b.search_text());
    }

    #[test]
    fn case_only_duplicates_count_once() {
        assert_eq!(level(&["Fever", "fever"], "", None), SeverityLevel::Low);
        assert_eq!(level(&["Fever", "fever"], "", None), level(&["fever"], "", None));

        let report = SymptomReport::new(["Fever", " FEVER ", "Cough"], None, None);
        assert_eq!(report.symptom_count(), 2);
        assert_eq!(report.selected_symptoms().collect::<Vec<_>>(), ["Cough", "Fever"]);
        assert_eq!(classify(&report), SeverityLevel::Moderate);
    }

    #[test]
    fn blank_labels_and_text_make_empty_report() {
        let report = SymptomReport::new(["  ", ""], Some("   "), None);
        assert!(report.is_empty());
        assert_eq!(classify(&report), SeverityLevel::Low);
    }

    #[test]
    fn red_flag_lookup_reports_phrase() {
        let report = SymptomReport::new(["Severe dizziness"], None, None);
        assert_eq!(find_red_flag(&report), Some("severe dizziness"));
        assert_eq!(find_red_flag(&SymptomReport::new(["Fever"], None, None)), None);
    }
}
