use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::events::{ClientEvent, ServerEvent};
use crate::feedback::FeedbackScorer;
use crate::generator::ResponseGenerator;
use crate::question_bank::{Difficulty, QuestionBank};
use crate::registry::SessionRegistry;
use crate::selector::QuestionSelector;
use crate::session::{Session, SessionKey};

const GREETING_PREAMBLE: &str = "Hello! I'm your AI interviewer today.";

fn level_blurb(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Fresher => {
            "Welcome to your technical interview! I'm excited to learn about you. \
             Since this is a fresher-level interview, we'll focus on fundamental \
             concepts and your learning potential."
        }
        Difficulty::Intermediate => {
            "Welcome to your technical interview! I'm looking forward to discussing \
             your experience. This intermediate-level interview will cover both \
             concepts and practical scenarios."
        }
        Difficulty::Advanced => {
            "Welcome to your senior-level technical interview! I'm eager to dive \
             deep into your expertise. We'll explore system design, architecture \
             decisions, and complex problem-solving."
        }
    }
}

fn compose_greeting(difficulty: Difficulty, first_question: Option<&str>) -> String {
    let blurb = level_blurb(difficulty);
    match first_question {
        Some(question) => format!("{GREETING_PREAMBLE} {blurb} Let's begin! {question}"),
        None => format!("{GREETING_PREAMBLE} {blurb}"),
    }
}

/// Orchestrates the externally observable interview protocol: one state
/// machine per connection key, driven by inbound client events.
///
/// The hub owns every collaborator. Handlers for one key are invoked in the
/// key's own event order by the gateway; keys never share session state, so
/// cross-connection interleaving is safe by construction.
pub struct InterviewHub {
    bank: QuestionBank,
    registry: SessionRegistry,
    generator: ResponseGenerator,
    scorer: FeedbackScorer,
    rng: Mutex<StdRng>,
}

impl InterviewHub {
    pub fn new(bank: QuestionBank, generator: ResponseGenerator) -> Self {
        Self {
            bank,
            registry: SessionRegistry::new(),
            generator,
            scorer: FeedbackScorer::default(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_scorer(mut self, scorer: FeedbackScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Replaces the selection randomness source, for deterministic tests.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Dispatches one inbound event to its handler, yielding the outbound
    /// events to emit in order.
    pub async fn handle(&self, key: SessionKey, event: ClientEvent) -> Vec<ServerEvent> {
        match event {
            ClientEvent::StartInterview { difficulty } => {
                self.start_interview(key, difficulty.as_deref())
            }
            ClientEvent::UserMessage { message } => {
                self.user_message(key, &message).await.into_iter().collect()
            }
            ClientEvent::EndInterview => self.end_interview(key).into_iter().collect(),
        }
    }

    /// Creates a brand-new session for the key (replacing any live one) and
    /// emits the greeting that carries question one. Exclusions accumulated
    /// by earlier runs on this key still apply.
    pub fn start_interview(
        &self,
        key: SessionKey,
        difficulty: Option<&str>,
    ) -> Vec<ServerEvent> {
        let difficulty = Difficulty::parse_or_default(difficulty);
        let mut used = self.registry.used_questions(key);
        let questions = {
            let mut rng = self.rng.lock().unwrap();
            QuestionSelector::new(&self.bank).select(difficulty, &mut used, &mut *rng)
        };
        let total_questions = questions.len();
        tracing::info!(%key, %difficulty, total_questions, "starting interview");

        let greeting = compose_greeting(difficulty, questions.first().map(String::as_str));
        let session = Session::new(difficulty, questions, greeting.clone());
        self.registry.install(key, session, used);

        vec![
            ServerEvent::InterviewStarted {
                total_questions,
                difficulty: difficulty.as_str().to_string(),
            },
            ServerEvent::AiResponse {
                message: greeting,
                question_number: 1,
                total_questions,
            },
        ]
    }

    /// Records the candidate's answer, generates the interviewer's reply,
    /// and advances the cursor. `None` when the key has no active session
    /// (protocol misuse is silently ignored) or when the session was torn
    /// down while the generation call was in flight.
    pub async fn user_message(&self, key: SessionKey, message: &str) -> Option<ServerEvent> {
        let ctx = self.registry.append_candidate(key, message)?;
        // The registry lock is released here; only the model call suspends.
        let reply = self
            .generator
            .generate(message, &ctx.recent_history, ctx.next_question.as_deref())
            .await;

        let Some((question_number, total_questions)) = self.registry.complete_turn(key, &reply)
        else {
            tracing::debug!(%key, "session closed during generation, discarding reply");
            return None;
        };
        Some(ServerEvent::AiResponse {
            message: reply,
            question_number,
            total_questions,
        })
    }

    /// Scores the conversation and tears the session down. Idempotent: a
    /// second call (or one after disconnect) finds no session and yields
    /// nothing.
    pub fn end_interview(&self, key: SessionKey) -> Option<ServerEvent> {
        let session = self.registry.finish(key)?;
        let feedback = self.scorer.score(&session.history);
        tracing::info!(
            %key,
            responses = feedback.responses_given,
            "interview ended"
        );
        Some(ServerEvent::InterviewFeedback(feedback))
    }

    /// Cleanup on abrupt termination: identical to `end_interview` minus
    /// the feedback emission, because the peer is gone.
    pub fn disconnect(&self, key: SessionKey) {
        self.registry.remove(key);
        tracing::debug!(%key, "connection cleaned up");
    }

    pub fn active_sessions(&self) -> usize {
        self.registry.session_count()
    }
}
