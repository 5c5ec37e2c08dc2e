//! Assistant chat: free-form, non-diagnostic health questions.
//!
//! Stateless: each question is answered on its own and nothing is stored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::{LlmError, TextGenerator};
use crate::prompt;
use crate::safety;

const MAX_QUESTION_LEN: usize = 2000;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Question is required")]
    EmptyQuestion,

    #[error("Question must be 2000 characters or fewer")]
    QuestionTooLong,

    #[error("Assistant unavailable: {0}")]
    Generator(#[from] LlmError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub filtered: bool,
}

/// Answer one question through the generator and the safety filter.
pub fn ask(generator: &dyn TextGenerator, question: &str) -> Result<Answer, ChatError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ChatError::EmptyQuestion);
    }
    if question.chars().count() > MAX_QUESTION_LEN {
        return Err(ChatError::QuestionTooLong);
    }

    let raw = generator.generate(prompt::SYSTEM_PROMPT, &prompt::question_prompt(question))?;
    let filtered = safety::filter_response(&raw);

    tracing::info!(
        question_chars = question.chars().count(),
        removed = filtered.violations.len(),
        "Assistant answered"
    );

    Ok(Answer {
        answer: filtered.text,
        filtered: !filtered.violations.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockGenerator;

    #[test]
    fn answer_includes_disclaimer() {
        let generator = MockGenerator::new("A resting heart rate of 60 to 100 bpm is typical.");
        let answer = ask(&generator, "What is a normal heart rate?").unwrap();
        assert!(answer.answer.contains("60 to 100 bpm"));
        assert!(answer.answer.ends_with(prompt::DISCLAIMER));
        assert!(!answer.filtered);
    }

    #[test]
    fn blank_question_rejected() {
        let generator = MockGenerator::new("unused");
        assert!(matches!(ask(&generator, "   "), Err(ChatError::EmptyQuestion)));
        assert!(generator.prompts().is_empty());
    }

    #[test]
    fn long_question_rejected() {
        let generator = MockGenerator::new("unused");
        let question = "a".repeat(MAX_QUESTION_LEN + 1);
        assert!(matches!(ask(&generator, &question), Err(ChatError::QuestionTooLong)));
    }

    #[test]
    fn question_limit_counts_characters() {
        let generator = MockGenerator::new("Noted.");
        let question = "ñ".repeat(MAX_QUESTION_LEN);
        assert!(ask(&generator, &question).is_ok());
    }

    #[test]
    fn generator_failure_propagates() {
        let generator = MockGenerator::unavailable();
        assert!(matches!(
            ask(&generator, "Is coffee bad for sleep?"),
            Err(ChatError::Generator(_))
        ));
    }

    #[test]
    fn unsafe_sentences_flagged() {
        let generator = MockGenerator::new("You should stop your statin. Sleep matters too.");
        let answer = ask(&generator, "Why am I tired?").unwrap();
        assert!(answer.filtered);
        assert!(!answer.answer.contains("statin"));
    }
}
