//! Audience broadcaster: scope-aware fan-out of server events.
//!
//! Each [`Scope`] has its own [`broadcast`] channel. A connection subscribes
//! to exactly one of them, so what it can ever see is fixed by its scope:
//!
//! | Event | Operator | Viewer | Respondent |
//! |-------|:--------:|:------:|:----------:|
//! | `questions-updated` | yes | | |
//! | `question-activated` | yes | yes | yes |
//! | `question-deactivated` | yes | yes | yes |
//! | `results-updated` | any question | active question only | |
//!
//! Delivery is best-effort. A receiver that falls more than the channel
//! capacity behind receives [`broadcast::error::RecvError::Lagged`] and
//! resumes from the oldest retained event.

use livepoll_types::{Question, Scope, ServerEvent};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Largest per-scope channel capacity accepted from configuration.
pub const MAX_BROADCAST_CAPACITY: usize = 1 << 16;

/// One broadcast channel per audience scope.
#[derive(Debug, Clone)]
pub struct Audience {
    operator: broadcast::Sender<ServerEvent>,
    viewer: broadcast::Sender<ServerEvent>,
    respondent: broadcast::Sender<ServerEvent>,
}

impl Audience {
    /// Create the three channels, each holding up to `capacity` events.
    ///
    /// The capacity is clamped to `1..=MAX_BROADCAST_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let clamped = capacity.clamp(1, MAX_BROADCAST_CAPACITY);
        if clamped != capacity {
            warn!(requested = capacity, capacity = clamped, "broadcast capacity clamped");
        }
        let capacity = clamped;
        let (operator, _) = broadcast::channel(capacity);
        let (viewer, _) = broadcast::channel(capacity);
        let (respondent, _) = broadcast::channel(capacity);
        Self {
            operator,
            viewer,
            respondent,
        }
    }

    const fn sender(&self, scope: Scope) -> &broadcast::Sender<ServerEvent> {
        match scope {
            Scope::Operator => &self.operator,
            Scope::Viewer => &self.viewer,
            Scope::Respondent => &self.respondent,
        }
    }

    /// Subscribe to the events of one scope.
    pub fn subscribe(&self, scope: Scope) -> broadcast::Receiver<ServerEvent> {
        self.sender(scope).subscribe()
    }

    /// Number of live receivers in a scope.
    pub fn receiver_count(&self, scope: Scope) -> usize {
        self.sender(scope).receiver_count()
    }

    /// Publish an event to one scope.
    ///
    /// Returns the number of receivers that got the event. Zero receivers
    /// is not an error.
    pub fn publish(&self, scope: Scope, event: ServerEvent) -> usize {
        let name = event.name();
        // send returns Err only when there are zero receivers,
        // which is normal when nobody in this scope is connected.
        let receivers = self.sender(scope).send(event).unwrap_or(0);
        debug!(%scope, event = name, receivers, "event published");
        receivers
    }

    /// Send the full question list to operators.
    pub fn questions_updated(&self, questions: &[Question]) {
        self.publish(
            Scope::Operator,
            ServerEvent::QuestionsUpdated {
                questions: questions.to_vec(),
            },
        );
    }

    /// Announce an activation, with the full question snapshot, to every
    /// scope.
    pub fn question_activated(&self, question: &Question) {
        for scope in Scope::ALL {
            self.publish(
                scope,
                ServerEvent::QuestionActivated {
                    question: question.clone(),
                },
            );
        }
    }

    /// Announce a deactivation to every scope.
    pub fn question_deactivated(&self) {
        for scope in Scope::ALL {
            self.publish(scope, ServerEvent::QuestionDeactivated);
        }
    }

    /// Send updated results to operators, and to viewers when the question
    /// is the active one. Respondents never receive tallies.
    pub fn results_updated(&self, question: &Question, is_active: bool) {
        let event = ServerEvent::ResultsUpdated(question.results());
        if is_active {
            self.publish(Scope::Viewer, event.clone());
        }
        self.publish(Scope::Operator, event);
    }

    /// Events a newly connected client of `scope` needs to look as if it had
    /// been connected all along.
    ///
    /// `questions` is the full list and `active` the active question, if
    /// any.
    pub fn catch_up(
        scope: Scope,
        questions: &[Question],
        active: Option<&Question>,
    ) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        if scope == Scope::Operator {
            events.push(ServerEvent::QuestionsUpdated {
                questions: questions.to_vec(),
            });
        }
        if let Some(question) = active {
            events.push(ServerEvent::QuestionActivated {
                question: question.clone(),
            });
            if scope == Scope::Viewer {
                events.push(ServerEvent::ResultsUpdated(question.results()));
            }
        }
        events
    }
}

impl Default for Audience {
    fn default() -> Self {
        Self::new(256)
    }
}
