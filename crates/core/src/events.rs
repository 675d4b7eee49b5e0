//! Application-level events exchanged over the duplex channel.
//!
//! Frames are JSON objects tagged by a `type` field; payload fields use the
//! camelCase names the clients already speak.

use serde::{Deserialize, Serialize};

use crate::feedback::Feedback;

/// Client → core events.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "start_interview")]
    StartInterview {
        #[serde(default)]
        difficulty: Option<String>,
    },
    #[serde(rename = "user_message")]
    UserMessage { message: String },
    #[serde(rename = "end_interview")]
    EndInterview,
}

/// Core → client events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "interview_started", rename_all = "camelCase")]
    InterviewStarted {
        total_questions: usize,
        difficulty: String,
    },
    #[serde(rename = "ai_response", rename_all = "camelCase")]
    AiResponse {
        message: String,
        question_number: usize,
        total_questions: usize,
    },
    #[serde(rename = "interview_feedback")]
    InterviewFeedback(Feedback),
}
