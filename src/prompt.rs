//! Prompt construction for the generative text backend.

use crate::triage::{SeverityLevel, SymptomReport};

/// System instruction shared by every request.
pub const SYSTEM_PROMPT: &str = "You are CareCompass, a calm health information assistant. \
You explain symptoms and health topics in plain language for a general audience. \
You never diagnose, never name a condition the person has, and never prescribe \
medicines or doses. When something could be serious, you encourage the person to \
contact a healthcare professional. Keep answers under 200 words.";

/// Appended to every answer shown to the user.
pub const DISCLAIMER: &str = "This information is for general education only and is not a \
diagnosis or a substitute for advice from a qualified healthcare professional.";

/// Shown when the generator is unreachable or its answer was unusable.
pub const FALLBACK_EXPLANATION: &str = "A detailed explanation is not available right now. \
The severity rating above is based on the symptoms you reported.";

fn level_guidance(level: SeverityLevel) -> &'static str {
    match level {
        SeverityLevel::High => {
            "Some reported symptoms can signal an urgent problem. Start by encouraging the \
             person to seek medical care promptly, then explain briefly why."
        }
        SeverityLevel::Moderate => {
            "Suggest monitoring the symptoms and contacting a doctor if they worsen or do \
             not improve within a few days."
        }
        SeverityLevel::Low => {
            "Offer general self-care information and say when it would be sensible to see a doctor."
        }
    }
}

/// Prompt for explaining a classified symptom report.
pub fn symptom_prompt(report: &SymptomReport, level: SeverityLevel) -> String {
    let selected: Vec<&str> = report.selected_symptoms().collect();
    let selected = if selected.is_empty() {
        "none".to_string()
    } else {
        selected.join(", ")
    };
    let duration = report
        .duration()
        .map(|d| d.as_str())
        .unwrap_or("not specified");

    let mut prompt = String::new();
    prompt.push_str("A person reported the following symptoms.\n");
    prompt.push_str(&format!("Selected symptoms: {selected}\n"));
    if let Some(free_text) = report.free_text() {
        prompt.push_str(&format!("Additional description: {free_text}\n"));
    }
    prompt.push_str(&format!("Duration: {duration}\n"));
    prompt.push_str(&format!("Severity rating: {level}\n\n"));
    prompt.push_str(level_guidance(level));
    prompt.push_str(
        "\nExplain what these symptoms commonly relate to in general terms and which \
         warning signs to watch for.",
    );
    prompt
}

/// Prompt for a free-form health question.
pub fn question_prompt(question: &str) -> String {
    format!(
        "Answer this general health question for a non-specialist reader.\n\nQuestion: {}",
        question.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::DurationFlag;

    #[test]
    fn symptom_prompt_embeds_level_and_symptoms() {
        let report = SymptomReport::new(
            ["Fever", "Cough"],
            Some("night sweats"),
            Some(DurationFlag::OneWeekOrMore),
        );
        let prompt = symptom_prompt(&report, SeverityLevel::High);
        assert!(prompt.contains("Selected symptoms: Cough, Fever"));
        assert!(prompt.contains("Additional description: night sweats"));
        assert!(prompt.contains("Duration: 1 week+"));
        assert!(prompt.contains("Severity rating: High"));
        assert!(prompt.contains("seek medical care"));
    }

    #[test]
    fn symptom_prompt_without_selection() {
        let report = SymptomReport::new(Vec::<String>::new(), Some("itchy eyes"), None);
        let prompt = symptom_prompt(&report, SeverityLevel::Low);
        assert!(prompt.contains("Selected symptoms: none"));
        assert!(prompt.contains("Duration: not specified"));
    }

    #[test]
    fn question_prompt_trims_input() {
        let prompt = question_prompt("  What is a normal resting heart rate?  ");
        assert!(prompt.ends_with("Question: What is a normal resting heart rate?"));
    }

    #[test]
    fn disclaimer_is_single_sentence() {
        assert_eq!(DISCLAIMER.matches('.').count(), 1);
        assert!(DISCLAIMER.ends_with('.'));
    }
}
