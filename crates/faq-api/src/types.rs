use serde::{Deserialize, Serialize};

/// Maximum length of a question, in characters
pub const MAX_QUESTION_LENGTH: usize = 300;

/// Full FAQ record as served by `/api/faqs` and `/api/faq`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub id: i64,
    pub question: String,
    pub answer: String,
    #[serde(default, rename = "createdAt", alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(default, rename = "updatedAt", alias = "updated_at")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Search hit. Extra fields in the payload are ignored, missing or mistyped
/// ones make the whole response malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqSummary {
    pub id: i64,
    pub question: String,
    pub answer: String,
}

impl From<Faq> for FaqSummary {
    fn from(faq: Faq) -> Self {
        Self {
            id: faq.id,
            question: faq.question,
            answer: faq.answer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Question is required")]
    MissingQuestion,

    #[error("Answer is required")]
    MissingAnswer,

    #[error("Question is too long ({len}/{max} characters)")]
    QuestionTooLong { len: usize, max: usize },
}

/// Payload for `POST /api/faq`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFaq {
    pub question: String,
    pub answer: String,
}

impl NewFaq {
    /// Trim both fields and check them before anything is sent
    pub fn new(question: &str, answer: &str) -> Result<Self, ValidationError> {
        let question = question.trim();
        let answer = answer.trim();

        if question.is_empty() {
            return Err(ValidationError::MissingQuestion);
        }
        if answer.is_empty() {
            return Err(ValidationError::MissingAnswer);
        }

        let len = question.chars().count();
        if len > MAX_QUESTION_LENGTH {
            return Err(ValidationError::QuestionTooLong {
                len,
                max: MAX_QUESTION_LENGTH,
            });
        }

        Ok(Self {
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }
}

/// FAQs directly before and after `id` in ascending id order
pub fn neighbors(faqs: &[Faq], id: i64) -> (Option<&Faq>, Option<&Faq>) {
    let prev = faqs.iter().filter(|f| f.id < id).max_by_key(|f| f.id);
    let next = faqs.iter().filter(|f| f.id > id).min_by_key(|f| f.id);
    (prev, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq(id: i64) -> Faq {
        Faq {
            id,
            question: format!("q{id}"),
            answer: format!("a{id}"),
            created_at: None,
            updated_at: None,
            slug: None,
        }
    }

    #[test]
    fn test_new_faq_trims_fields() {
        let new = NewFaq::new("  ¿Hay prueba gratuita? ", "\tSí, 30 días.\n").unwrap();
        assert_eq!(new.question, "¿Hay prueba gratuita?");
        assert_eq!(new.answer, "Sí, 30 días.");
    }

    #[test]
    fn test_new_faq_rejects_blank_fields() {
        assert_eq!(
            NewFaq::new("   ", "answer"),
            Err(ValidationError::MissingQuestion)
        );
        assert_eq!(
            NewFaq::new("question", ""),
            Err(ValidationError::MissingAnswer)
        );
    }

    #[test]
    fn test_new_faq_question_length_counts_chars() {
        // 300 multi-byte characters is still within the limit
        let at_limit = "é".repeat(MAX_QUESTION_LENGTH);
        assert!(NewFaq::new(&at_limit, "a").is_ok());

        let over = "x".repeat(MAX_QUESTION_LENGTH + 1);
        assert_eq!(
            NewFaq::new(&over, "a"),
            Err(ValidationError::QuestionTooLong { len: 301, max: 300 })
        );
    }

    #[test]
    fn test_neighbors() {
        let faqs = vec![faq(3), faq(1), faq(2), faq(7)];

        let (prev, next) = neighbors(&faqs, 2);
        assert_eq!(prev.map(|f| f.id), Some(1));
        assert_eq!(next.map(|f| f.id), Some(3));

        // Gaps are skipped
        let (prev, next) = neighbors(&faqs, 3);
        assert_eq!(prev.map(|f| f.id), Some(2));
        assert_eq!(next.map(|f| f.id), Some(7));

        let (prev, next) = neighbors(&faqs, 1);
        assert!(prev.is_none());
        assert_eq!(next.map(|f| f.id), Some(2));

        let (prev, next) = neighbors(&faqs, 7);
        assert_eq!(prev.map(|f| f.id), Some(3));
        assert!(next.is_none());
    }

    #[test]
    fn test_faq_accepts_both_timestamp_spellings() {
        let camel: Faq = serde_json::from_str(
            r#"{"id":1,"question":"q","answer":"a","createdAt":"2025-04-01T00:00:00","updatedAt":"2025-04-02T00:00:00","slug":"q"}"#,
        )
        .unwrap();
        let snake: Faq = serde_json::from_str(
            r#"{"id":1,"question":"q","answer":"a","created_at":"2025-04-01T00:00:00","updated_at":"2025-04-02T00:00:00","slug":"q"}"#,
        )
        .unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.created_at.as_deref(), Some("2025-04-01T00:00:00"));
    }
}
