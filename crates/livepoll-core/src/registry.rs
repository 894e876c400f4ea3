//! Question registry: the ordered set of questions in a session.
//!
//! The registry is the source of truth for which questions exist. It knows
//! nothing about activation; the [`SessionCoordinator`] keeps the active
//! pointer consistent when questions are removed.
//!
//! [`SessionCoordinator`]: crate::session::SessionCoordinator

use livepoll_types::{NewQuestion, Question, QuestionId};
use tracing::debug;

use crate::error::ValidationError;

/// Minimum number of non-empty options for a choice question.
pub const MIN_CHOICE_OPTIONS: usize = 2;

/// Insertion-ordered collection of questions.
#[derive(Debug, Clone, Default)]
pub struct QuestionRegistry {
    questions: Vec<Question>,
}

impl QuestionRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            questions: Vec::new(),
        }
    }

    /// Validate a creation request and append the new question. Returns a
    /// snapshot of the stored question.
    ///
    /// The title and every option are trimmed; blank options are dropped.
    /// Options of free-text questions are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTitle`] for a blank title and
    /// [`ValidationError::TooFewOptions`] when a choice question has fewer
    /// than [`MIN_CHOICE_OPTIONS`] options left. Nothing is stored on error.
    pub fn create(&mut self, request: NewQuestion) -> Result<Question, ValidationError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let options: Vec<String> = if request.kind.requires_options() {
            request
                .options
                .iter()
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .map(str::to_owned)
                .collect()
        } else {
            Vec::new()
        };

        if request.kind.requires_options() && options.len() < MIN_CHOICE_OPTIONS {
            return Err(ValidationError::TooFewOptions {
                kind: request.kind,
                found: options.len(),
            });
        }

        let question = Question::new(title.to_owned(), request.kind, options);
        debug!(question_id = %question.id, kind = %question.kind, "question created");
        self.questions.push(question.clone());
        Ok(question)
    }

    /// Remove the question with this id. Returns it, or `None` if absent.
    pub fn delete(&mut self, id: QuestionId) -> Option<Question> {
        let index = self.questions.iter().position(|q| q.id == id)?;
        Some(self.questions.remove(index))
    }

    /// Look up a question by id.
    pub fn find(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Look up a question by id for mutation.
    pub fn find_mut(&mut self, id: QuestionId) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == id)
    }

    /// All questions in insertion order.
    pub fn list(&self) -> &[Question] {
        &self.questions
    }

    /// Reset a question's tally and response count. Returns the cleared
    /// question, or `None` if the id is unknown.
    pub fn clear_answers(&mut self, id: QuestionId) -> Option<&Question> {
        let question = self.find_mut(id)?;
        question.clear_answers();
        Some(question)
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the registry holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
