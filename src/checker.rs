//! Symptom check workflow.
//!
//! validate → classify → explain (generator) → safety filter → persist.
//! The generator call happens before the database is touched so callers
//! never hold a connection across network I/O.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DatabaseError;
use crate::journal::{self, NewSymptomCheck, SymptomCheck};
use crate::llm::TextGenerator;
use crate::prompt;
use crate::safety;
use crate::triage::{self, DurationFlag, SeverityLevel, SymptomReport};

const MAX_SELECTED: usize = 30;
const MAX_LABEL_LEN: usize = 100;
const MAX_FREE_TEXT_LEN: usize = 1000;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Select at least one symptom or describe how you feel")]
    EmptyReport,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Symptom check as submitted by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymptomCheckRequest {
    #[serde(default)]
    pub selected_symptoms: Vec<String>,
    #[serde(default)]
    pub free_text: Option<String>,
    #[serde(default)]
    pub duration: Option<DurationFlag>,
}

/// Classification plus explanation, not yet persisted.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub report: SymptomReport,
    pub level: SeverityLevel,
    pub red_flag: Option<&'static str>,
    pub explanation: String,
    pub explanation_available: bool,
}

impl SymptomCheckRequest {
    /// Check limits and reject the genuinely-empty case, then build the
    /// report. De-duplication happens in `SymptomReport::new`.
    pub fn validate(&self) -> Result<SymptomReport, CheckError> {
        if self.selected_symptoms.len() > MAX_SELECTED {
            return Err(CheckError::Validation(format!(
                "At most {MAX_SELECTED} symptoms can be selected"
            )));
        }

        for label in self.selected_symptoms.iter().map(|s| s.trim()) {
            if label.chars().count() > MAX_LABEL_LEN {
                return Err(CheckError::Validation("Symptom label too long".into()));
            }
            if !label.is_empty() && !journal::is_known_symptom(label) {
                tracing::debug!(len = label.len(), "Custom symptom label");
            }
        }

        let free_text = self
            .free_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(text) = free_text {
            if text.chars().count() > MAX_FREE_TEXT_LEN {
                return Err(CheckError::Validation(format!(
                    "Description must be {MAX_FREE_TEXT_LEN} characters or fewer"
                )));
            }
        }

        let report = SymptomReport::new(&self.selected_symptoms, free_text, self.duration);
        if report.is_empty() {
            return Err(CheckError::EmptyReport);
        }
        Ok(report)
    }
}

/// Classify and explain a validated report. Generator failures degrade to
/// the fallback explanation; the severity level is always returned.
pub fn assess(generator: &dyn TextGenerator, report: SymptomReport) -> Assessment {
    let level = triage::classify(&report);
    let red_flag = triage::find_red_flag(&report);

    tracing::info!(
        level = %level,
        count = report.symptom_count(),
        red_flag = red_flag.is_some(),
        "Symptom report classified"
    );

    let symptom_prompt = prompt::symptom_prompt(&report, level);
    let (explanation, explanation_available) =
        match generator.generate(prompt::SYSTEM_PROMPT, &symptom_prompt) {
            Ok(text) => (safety::filter_response(&text).text, true),
            Err(e) => {
                tracing::warn!(
                    model = generator.model_name(),
                    error = %e,
                    "Explanation unavailable, using fallback"
                );
                (
                    format!("{}\n\n{}", prompt::FALLBACK_EXPLANATION, prompt::DISCLAIMER),
                    false,
                )
            }
        };

    Assessment {
        report,
        level,
        red_flag,
        explanation,
        explanation_available,
    }
}

/// Persist an assessment and return the stored record.
pub fn record(conn: &Connection, assessment: &Assessment) -> Result<SymptomCheck, CheckError> {
    let new = NewSymptomCheck {
        selected_symptoms: assessment
            .report
            .selected_symptoms()
            .map(str::to_string)
            .collect(),
        free_text: assessment.report.free_text().map(str::to_string),
        duration: assessment.report.duration(),
        symptom_count: assessment.report.symptom_count(),
        level: assessment.level,
        red_flag: assessment.red_flag.map(str::to_string),
        explanation: assessment.explanation.clone(),
        explanation_available: assessment.explanation_available,
    };
    let id = journal::save_check(conn, &new)?;
    Ok(journal::get_check(conn, &id.to_string())?)
}

/// Full workflow on a single thread: validate, assess, persist.
pub fn run_check(
    conn: &Connection,
    generator: &dyn TextGenerator,
    request: &SymptomCheckRequest,
) -> Result<SymptomCheck, CheckError> {
    let report = request.validate()?;
    let assessment = assess(generator, report);
    record(conn, &assessment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::llm::MockGenerator;

    fn request(selected: &[&str], free_text: Option<&str>) -> SymptomCheckRequest {
        SymptomCheckRequest {
            selected_symptoms: selected.iter().map(|s| s.to_string()).collect(),
            free_text: free_text.map(str::to_string),
            duration: None,
        }
    }

    #[test]
    fn empty_request_rejected() {
        let err = request(&[], None).validate().unwrap_err();
        assert!(matches!(err, CheckError::EmptyReport));

        let err = request(&["  ", ""], Some("   ")).validate().unwrap_err();
        assert!(matches!(err, CheckError::EmptyReport));
    }

    #[test]
    fn duplicate_labels_collapse() {
        let report = request(&["Fever", "fever", " FEVER "], None).validate().unwrap();
        assert_eq!(report.symptom_count(), 1);
        assert_eq!(triage::classify(&report), SeverityLevel::Low);
    }

    #[test]
    fn oversized_inputs_rejected() {
        let long_label = "x".repeat(MAX_LABEL_LEN + 1);
        assert!(matches!(
            request(&[long_label.as_str()], None).validate(),
            Err(CheckError::Validation(_))
        ));

        let long_text = "y".repeat(MAX_FREE_TEXT_LEN + 1);
        assert!(request(&[], Some(&long_text)).validate().is_err());

        let many: Vec<String> = (0..=MAX_SELECTED).map(|i| format!("s{i}")).collect();
        let req = SymptomCheckRequest {
            selected_symptoms: many,
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        let accented = "é".repeat(MAX_FREE_TEXT_LEN);
        assert!(request(&[], Some(&accented)).validate().is_ok());

        let label = "ü".repeat(MAX_LABEL_LEN);
        assert!(request(&[label.as_str()], None).validate().is_ok());
    }

    #[test]
    fn assess_uses_generator_and_filters() {
        let generator = MockGenerator::new("You likely have the flu. Rest and drink fluids.");
        let report = request(&["Fever", "Cough"], None).validate().unwrap();
        let assessment = assess(&generator, report);

        assert_eq!(assessment.level, SeverityLevel::Moderate);
        assert!(assessment.explanation_available);
        assert!(assessment.explanation.contains("Rest and drink fluids."));
        assert!(!assessment.explanation.contains("likely have"));
        assert!(generator.prompts()[0].contains("Severity rating: Moderate"));
    }

    #[test]
    fn assess_degrades_when_generator_unavailable() {
        let generator = MockGenerator::unavailable();
        let report = request(&[], Some("loss of consciousness")).validate().unwrap();
        let assessment = assess(&generator, report);

        assert_eq!(assessment.level, SeverityLevel::High);
        assert_eq!(assessment.red_flag, Some("loss of consciousness"));
        assert!(!assessment.explanation_available);
        assert!(assessment.explanation.starts_with(prompt::FALLBACK_EXPLANATION));
    }

    #[test]
    fn run_check_persists_record() {
        let conn = open_memory_database().unwrap();
        let generator = MockGenerator::new("Headaches and tiredness often go together.");
        let req = SymptomCheckRequest {
            selected_symptoms: vec!["Headache".into(), "Fatigue".into()],
            free_text: None,
            duration: Some(DurationFlag::OneWeekOrMore),
        };

        let stored = run_check(&conn, &generator, &req).unwrap();
        assert_eq!(stored.level, SeverityLevel::High);
        assert_eq!(stored.symptom_count, 2);
        assert_eq!(stored.duration, Some(DurationFlag::OneWeekOrMore));

        let history = journal::fetch_checks(&conn, &journal::CheckFilter::default()).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, stored.id);
    }
}
