use std::fmt;

use uuid::Uuid;

use crate::question_bank::Difficulty;

/// Opaque identity of one connection. All per-session state is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey(Uuid);

impl SessionKey {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Interviewer,
    Candidate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Interviewer => "interviewer",
            Role::Candidate => "candidate",
        }
    }
}

/// One turn of the conversation. History is append-only and alternates
/// roles, starting with the interviewer's greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn interviewer(text: impl Into<String>) -> Self {
        Self {
            role: Role::Interviewer,
            text: text.into(),
        }
    }

    pub fn candidate(text: impl Into<String>) -> Self {
        Self {
            role: Role::Candidate,
            text: text.into(),
        }
    }
}

/// Live state of one interview attempt.
///
/// Created on `start_interview`, destroyed on `end_interview` or
/// disconnect. The cursor indexes the next question to ask and only ever
/// moves forward, clamped at the question list's length.
#[derive(Debug)]
pub struct Session {
    pub difficulty: Difficulty,
    pub questions: Vec<String>,
    pub cursor: usize,
    pub history: Vec<Turn>,
}

impl Session {
    /// A fresh session whose greeting (containing question one) is already
    /// on the record; the cursor therefore starts at one.
    pub fn new(difficulty: Difficulty, questions: Vec<String>, greeting: String) -> Self {
        Self {
            difficulty,
            questions,
            cursor: 1,
            history: vec![Turn::interviewer(greeting)],
        }
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// The next pending question, or `None` once the list is spent (the
    /// closing turn).
    pub fn next_question(&self) -> Option<&str> {
        self.questions.get(self.cursor).map(String::as_str)
    }

    pub fn advance_cursor(&mut self) {
        if self.cursor < self.questions.len() {
            self.cursor += 1;
        }
    }

    /// The question number to report alongside an answer, clamped to the
    /// total so the final closing exchange still shows the last question.
    pub fn question_number(&self) -> usize {
        self.cursor.min(self.questions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(
            Difficulty::Fresher,
            vec!["q1".into(), "q2".into(), "q3".into()],
            "welcome, first up: q1".into(),
        )
    }

    #[test]
    fn starts_with_greeting_and_cursor_one() {
        let s = session();
        assert_eq!(s.cursor, 1);
        assert_eq!(s.history.len(), 1);
        assert_eq!(s.history[0].role, Role::Interviewer);
        assert_eq!(s.next_question(), Some("q2"));
    }

    #[test]
    fn cursor_clamps_at_question_count() {
        let mut s = session();
        for _ in 0..10 {
            s.advance_cursor();
        }
        assert_eq!(s.cursor, 3);
        assert_eq!(s.next_question(), None);
        assert_eq!(s.question_number(), 3);
    }

    #[test]
    fn question_number_tracks_cursor() {
        let mut s = session();
        assert_eq!(s.question_number(), 1);
        s.advance_cursor();
        assert_eq!(s.question_number(), 2);
    }
}
