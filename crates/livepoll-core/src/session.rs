//! Session coordinator: the single owner of the active-question pointer.
//!
//! Every inbound action goes through [`SessionCoordinator`]. An action runs
//! to completion, registry/aggregator mutation followed by the resulting
//! broadcast, before the method returns. Callers that share a coordinator
//! between connections wrap it in one mutex held for the whole call, so no
//! observer ever sees a partial update.
//!
//! # State machine
//!
//! ```text
//!         activate(id)            activate(other)
//!   Idle ───────────────▶ Active(id) ────────────▶ Active(other)
//!    ▲                        │
//!    └──── deactivate() ──────┤
//!    └──── delete(id) ────────┘
//! ```

use livepoll_types::{ClientEvent, NewQuestion, Question, QuestionId, RawAnswer, Scope, ServerEvent};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::aggregator::{self, AggregationRules};
use crate::broadcast::Audience;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::registry::QuestionRegistry;

/// Which question, if any, respondents are currently shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveQuestion {
    /// No question is active.
    #[default]
    Idle,
    /// The given question is active.
    Active(QuestionId),
}

impl ActiveQuestion {
    /// The active question id, if any.
    pub const fn id(self) -> Option<QuestionId> {
        match self {
            Self::Idle => None,
            Self::Active(id) => Some(id),
        }
    }

    /// Whether `id` is the active question.
    pub fn is(self, id: QuestionId) -> bool {
        self == Self::Active(id)
    }
}

/// A new connection's view of the session.
#[derive(Debug)]
pub struct Subscription {
    /// Live events for the connection's scope.
    pub receiver: broadcast::Receiver<ServerEvent>,
    /// Events to deliver before anything from `receiver`.
    pub catch_up: Vec<ServerEvent>,
}

/// Ties the registry, aggregator and broadcaster together for one session.
#[derive(Debug)]
pub struct SessionCoordinator {
    registry: QuestionRegistry,
    active: ActiveQuestion,
    audience: Audience,
    config: SessionConfig,
}

impl SessionCoordinator {
    /// Create an empty, idle session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            registry: QuestionRegistry::new(),
            active: ActiveQuestion::Idle,
            audience: Audience::new(config.broadcast_capacity),
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All questions in insertion order.
    pub fn questions(&self) -> &[Question] {
        self.registry.list()
    }

    /// Look up one question.
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.registry.find(id)
    }

    /// Current state of the active-question pointer.
    pub const fn state(&self) -> ActiveQuestion {
        self.active
    }

    /// The active question, if any.
    pub fn active_question(&self) -> Option<&Question> {
        self.active.id().and_then(|id| self.registry.find(id))
    }

    /// The broadcaster, for inspecting receiver counts.
    pub const fn audience(&self) -> &Audience {
        &self.audience
    }

    /// Session settings in effect.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// Register a new connection of the given scope.
    ///
    /// The receiver is created before the catch-up events are computed, and
    /// both happen under the caller's lock, so the connection neither misses
    /// nor duplicates an event.
    pub fn connect(&self, scope: Scope) -> Subscription {
        let receiver = self.audience.subscribe(scope);
        let catch_up = Audience::catch_up(scope, self.registry.list(), self.active_question());
        debug!(%scope, catch_up = catch_up.len(), "connection subscribed");
        Subscription { receiver, catch_up }
    }

    // -----------------------------------------------------------------------
    // Operator actions
    // -----------------------------------------------------------------------

    /// Create a question and send the new list to operators.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Validation`] when the request is invalid.
    /// Nothing is stored or broadcast in that case.
    pub fn create_question(&mut self, request: NewQuestion) -> Result<Question, SessionError> {
        let question = self.registry.create(request)?;
        info!(question_id = %question.id, kind = %question.kind, "question added");
        self.audience.questions_updated(self.registry.list());
        Ok(question)
    }

    /// Make `id` the active question and announce it to every scope.
    ///
    /// Activating the already-active question re-announces it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::QuestionNotFound`] for an unknown id. The
    /// active pointer is left unchanged and nothing is broadcast.
    pub fn activate(&mut self, id: QuestionId) -> Result<(), SessionError> {
        let question = self
            .registry
            .find(id)
            .ok_or(SessionError::QuestionNotFound(id))?;
        self.active = ActiveQuestion::Active(id);
        info!(question_id = %id, "question activated");
        self.audience.question_activated(question);
        Ok(())
    }

    /// Return to idle and announce it to every scope. Idempotent.
    pub fn deactivate(&mut self) {
        self.active = ActiveQuestion::Idle;
        info!("question deactivated");
        self.audience.question_deactivated();
    }

    /// Delete a question. Unknown ids are a silent no-op.
    ///
    /// Deleting the active question forces the session back to idle; that
    /// transition is announced to every scope. The new list goes to
    /// operators. Returns whether a question was removed.
    pub fn delete_question(&mut self, id: QuestionId) -> bool {
        if self.registry.delete(id).is_none() {
            debug!(question_id = %id, "delete ignored, question not found");
            return false;
        }
        info!(question_id = %id, "question deleted");
        if self.active.is(id) {
            self.deactivate();
        }
        self.audience.questions_updated(self.registry.list());
        true
    }

    /// Reset a question's tally and push the empty results. Unknown ids are a
    /// silent no-op. Returns whether a question was cleared.
    pub fn clear_answers(&mut self, id: QuestionId) -> bool {
        let is_active = self.active.is(id);
        let Some(question) = self.registry.clear_answers(id) else {
            debug!(question_id = %id, "clear ignored, question not found");
            return false;
        };
        info!(question_id = %id, "answers cleared");
        self.audience.results_updated(question, is_active);
        true
    }

    // -----------------------------------------------------------------------
    // Respondent actions
    // -----------------------------------------------------------------------

    /// Tally one submission and push the new results to operators and, for
    /// the active question, viewers.
    ///
    /// Any known question accepts answers unless
    /// [`SessionConfig::require_active_question`] is set.
    ///
    /// # Errors
    ///
    /// - [`SessionError::QuestionNotFound`] for an unknown id.
    /// - [`SessionError::QuestionNotActive`] when only the active question
    ///   accepts answers and `id` is not it.
    /// - [`SessionError::Answer`] when the answer shape does not fit.
    ///
    /// The tally is untouched and nothing is broadcast on error.
    pub fn submit_answer(&mut self, id: QuestionId, answer: RawAnswer) -> Result<(), SessionError> {
        let is_active = self.active.is(id);
        let rules = AggregationRules {
            count_empty_free_text: self.config.count_empty_free_text,
        };
        let require_active = self.config.require_active_question;

        let question = self
            .registry
            .find_mut(id)
            .ok_or(SessionError::QuestionNotFound(id))?;
        if require_active && !is_active {
            return Err(SessionError::QuestionNotActive(id));
        }

        let applied = aggregator::apply(question, answer, rules)?;
        debug!(
            question_id = %id,
            increments = applied.increments,
            total_responses = question.response_count,
            "answer tallied"
        );
        self.audience.results_updated(question, is_active);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Protocol dispatch
    // -----------------------------------------------------------------------

    /// Route a decoded client event from a connection of `scope`.
    ///
    /// Returns a reply meant for the calling connection only, if the event
    /// has one (`get-questions`).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Forbidden`] when a non-operator sends an
    /// operator-only event, or whatever the underlying action returns.
    pub fn dispatch(
        &mut self,
        scope: Scope,
        event: ClientEvent,
    ) -> Result<Option<ServerEvent>, SessionError> {
        if event.is_operator_only() && scope != Scope::Operator {
            return Err(SessionError::Forbidden {
                action: event.name(),
                scope,
            });
        }

        match event {
            ClientEvent::GetQuestions => {
                return Ok(Some(ServerEvent::QuestionsUpdated {
                    questions: self.registry.list().to_vec(),
                }));
            }
            ClientEvent::CreateQuestion(request) => {
                self.create_question(request)?;
            }
            ClientEvent::ActivateQuestion { question_id } => self.activate(question_id)?,
            ClientEvent::DeactivateQuestion => self.deactivate(),
            ClientEvent::DeleteQuestion { question_id } => {
                self.delete_question(question_id);
            }
            ClientEvent::ClearAnswers { question_id } => {
                self.clear_answers(question_id);
            }
            ClientEvent::SubmitAnswer {
                question_id,
                answer,
            } => self.submit_answer(question_id, answer)?,
        }
        Ok(None)
    }
}

impl Default for SessionCoordinator {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
