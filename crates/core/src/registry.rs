use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::session::{Session, SessionKey, Turn};

/// Everything the response generator needs for one turn, snapshotted so the
/// registry lock is released before the (slow) outbound model call.
#[derive(Debug, Clone)]
pub struct TurnContext {
    /// The most recent turns, candidate's latest included.
    pub recent_history: Vec<Turn>,
    /// The question to ask next, `None` on the closing turn.
    pub next_question: Option<String>,
    pub total_questions: usize,
}

/// How much conversation context accompanies each generation request.
const CONTEXT_TURNS: usize = 4;

/// The single owner of all live sessions and per-connection exclusion sets.
///
/// Sessions and used-question sets live in separate maps: a restarted
/// interview on the same key replaces its session but keeps its exclusions,
/// while `finish`/`remove` drop both. Guards are internal and never held
/// across an await point.
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionKey, Session>,
    used_questions: HashMap<SessionKey, HashSet<String>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// A copy of the key's exclusion set (empty if none yet).
    pub fn used_questions(&self, key: SessionKey) -> HashSet<String> {
        let inner = self.inner.lock().unwrap();
        inner.used_questions.get(&key).cloned().unwrap_or_default()
    }

    /// Installs a freshly started session, replacing any previous one for
    /// the key, and stores its updated exclusion set.
    pub fn install(&self, key: SessionKey, session: Session, used: HashSet<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.insert(key, session);
        inner.used_questions.insert(key, used);
    }

    /// Appends the candidate's turn and returns the context for generating
    /// the reply. `None` when the key has no active session, in which case
    /// the message is a protocol no-op.
    pub fn append_candidate(&self, key: SessionKey, message: &str) -> Option<TurnContext> {
        let mut inner = self.inner.lock().unwrap();
        let session = inner.sessions.get_mut(&key)?;
        session.history.push(Turn::candidate(message));

        let tail_start = session.history.len().saturating_sub(CONTEXT_TURNS);
        Some(TurnContext {
            recent_history: session.history[tail_start..].to_vec(),
            next_question: session.next_question().map(str::to_owned),
            total_questions: session.total_questions(),
        })
    }

    /// Records the interviewer's reply and advances the cursor, returning
    /// `(question_number, total_questions)` for the outbound event.
    ///
    /// Returns `None` when the session was torn down while the generation
    /// call was in flight; the late reply is then discarded rather than
    /// resurrecting state.
    pub fn complete_turn(&self, key: SessionKey, reply: &str) -> Option<(usize, usize)> {
        let mut inner = self.inner.lock().unwrap();
        let session = inner.sessions.get_mut(&key)?;
        session.history.push(Turn::interviewer(reply));
        session.advance_cursor();
        Some((session.question_number(), session.total_questions()))
    }

    /// Removes and returns the session for scoring, dropping the exclusion
    /// set with it. `None` if the interview was already closed.
    pub fn finish(&self, key: SessionKey) -> Option<Session> {
        let mut inner = self.inner.lock().unwrap();
        inner.used_questions.remove(&key);
        inner.sessions.remove(&key)
    }

    /// Silent cleanup on disconnect: same as `finish` but nothing is
    /// returned because nobody is left to receive feedback.
    pub fn remove(&self, key: SessionKey) {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.remove(&key);
        inner.used_questions.remove(&key);
    }

    pub fn contains(&self, key: SessionKey) -> bool {
        self.inner.lock().unwrap().sessions.contains_key(&key)
    }

    pub fn session_count(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }
}
