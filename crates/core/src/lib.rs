//! Core of the mock technical interview service: the per-connection session
//! registry, non-repeating question selection, the conversational state
//! machine, AI response generation with a deterministic fallback, and the
//! closing feedback scorer. Transport lives in the gateway service; this
//! crate's only I/O is the outbound generative-text call.

pub mod events;
pub mod feedback;
pub mod generator;
pub mod lifecycle;
pub mod question_bank;
pub mod registry;
pub mod selector;
pub mod session;

pub use events::{ClientEvent, ServerEvent};
pub use feedback::{Feedback, FeedbackBands, FeedbackScorer};
pub use generator::{GeminiModel, ModelError, ResponseGenerator, TextModel};
pub use lifecycle::InterviewHub;
pub use question_bank::{BankError, Difficulty, QuestionBank};
pub use registry::SessionRegistry;
pub use selector::QuestionSelector;
pub use session::{Role, Session, SessionKey, Turn};
