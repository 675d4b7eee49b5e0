use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;

use crate::session::Turn;

/// Generation budget passed to the model, matching the interview's
/// "2-3 sentences" register.
const MAX_OUTPUT_TOKENS: u32 = 200;

/// How long one model call may run before the deterministic fallback takes
/// over. A stuck upstream must never stall a session.
const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(10);

/// Canned acknowledgment openers used whenever the model is unavailable.
pub const ACKNOWLEDGMENTS: [&str; 7] = [
    "That's a great answer! ",
    "Interesting perspective. ",
    "Thank you for sharing that. ",
    "Good point! ",
    "I appreciate your detailed response. ",
    "Nice explanation! ",
    "That shows good understanding. ",
];

/// Fixed closing used on the final turn when the model is unavailable.
pub const CLOSING_REMARK: &str = "Thank you for your time! That concludes our \
technical interview. You did great! We covered a lot of important topics today.";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no generative model configured")]
    Unavailable,
    #[error("model request failed")]
    Transport(#[from] reqwest::Error),
    #[error("model returned a completion with no text")]
    Malformed,
    #[error("model call exceeded {0:?}")]
    Timeout(Duration),
}

// Narrow interface over any external generative-text service: one prompt in,
// one completion out. Keeping it this small means the timeout and fallback
// logic in `ResponseGenerator` is independent of which provider is wired in,
// and tests can substitute `MockTextModel` without touching the network.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, ModelError>;
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiModel {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ContentCandidate>,
}

#[derive(Debug, Deserialize)]
struct ContentCandidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl TextModel for GeminiModel {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, ModelError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.7,
                "maxOutputTokens": max_tokens
            }
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateContentResponse>()
            .await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(ModelError::Malformed)?;
        if text.trim().is_empty() {
            return Err(ModelError::Malformed);
        }
        Ok(text)
    }
}

/// Turns a candidate answer plus conversation context into interviewer text.
///
/// The model call runs under a bounded timeout; any failure (no credentials,
/// transport error, malformed completion, timeout) drops to a deterministic
/// template so the caller always receives usable text.
pub struct ResponseGenerator {
    model: Option<Arc<dyn TextModel>>,
    timeout: Duration,
    rng: Mutex<StdRng>,
}

impl ResponseGenerator {
    pub fn new(model: Option<Arc<dyn TextModel>>) -> Self {
        Self {
            model,
            timeout: DEFAULT_MODEL_TIMEOUT,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the fallback's randomness source, for deterministic tests.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Always yields non-empty text; never errors toward the caller.
    pub async fn generate(
        &self,
        candidate_text: &str,
        recent_history: &[Turn],
        next_question: Option<&str>,
    ) -> String {
        match self
            .call_model(candidate_text, recent_history, next_question)
            .await
        {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!("model returned blank text, using fallback response");
                self.fallback(next_question)
            }
            Err(ModelError::Unavailable) => {
                tracing::debug!("no model configured, using fallback response");
                self.fallback(next_question)
            }
            Err(err) => {
                tracing::warn!(error = %err, "model call failed, using fallback response");
                self.fallback(next_question)
            }
        }
    }

    async fn call_model(
        &self,
        candidate_text: &str,
        recent_history: &[Turn],
        next_question: Option<&str>,
    ) -> Result<String, ModelError> {
        let model = self.model.as_ref().ok_or(ModelError::Unavailable)?;
        let prompt = build_prompt(candidate_text, recent_history, next_question);
        match tokio::time::timeout(self.timeout, model.complete(&prompt, MAX_OUTPUT_TOKENS)).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::Timeout(self.timeout)),
        }
    }

    fn fallback(&self, next_question: Option<&str>) -> String {
        match next_question {
            Some(question) => {
                let mut rng = self.rng.lock().unwrap();
                let ack = ACKNOWLEDGMENTS[rng.gen_range(0..ACKNOWLEDGMENTS.len())];
                format!("{ack}{question}")
            }
            None => CLOSING_REMARK.to_string(),
        }
    }
}

/// Builds the role-tagged prompt: interviewer persona, the last few turns,
/// the candidate's latest answer, and an instruction to ask the pending
/// question verbatim. With no pending question the prompt asks for a short
/// closing remark instead.
fn build_prompt(
    candidate_text: &str,
    recent_history: &[Turn],
    next_question: Option<&str>,
) -> String {
    match next_question {
        None => format!(
            "You are an AI technical interviewer. The candidate just answered \
             the final question.\n\
             Their answer: \"{candidate_text}\"\n\n\
             Thank them warmly for completing the interview and give a brief \
             encouraging closing remark.\n\
             Keep it to 2 sentences max."
        ),
        Some(question) => {
            let transcript = recent_history
                .iter()
                .map(|turn| format!("{}: {}", turn.role.as_str(), turn.text))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "You are an AI technical interviewer conducting a MERN stack \
                 interview.\n\
                 You are friendly but professional. Keep responses concise \
                 (2-3 sentences max).\n\n\
                 Previous conversation:\n{transcript}\n\n\
                 Candidate just said: \"{candidate_text}\"\n\n\
                 The next question you MUST ask is: \"{question}\"\n\n\
                 Briefly acknowledge their answer (1 sentence), then ask the \
                 next question naturally."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[tokio::test]
    async fn no_model_yields_acknowledgment_plus_next_question() {
        let generator = ResponseGenerator::new(None).with_rng(seeded(1));
        let reply = generator
            .generate("I have 0 years experience", &[], Some("What is a closure?"))
            .await;

        assert!(reply.ends_with("What is a closure?"), "got: {reply}");
        assert!(
            ACKNOWLEDGMENTS.iter().any(|ack| reply.starts_with(ack)),
            "reply should open with a canned acknowledgment: {reply}"
        );
    }

    #[tokio::test]
    async fn no_model_final_turn_yields_closing_remark() {
        let generator = ResponseGenerator::new(None).with_rng(seeded(1));
        let reply = generator.generate("that was my answer", &[], None).await;
        assert_eq!(reply, CLOSING_REMARK);
    }

    #[tokio::test]
    async fn fallback_is_deterministic_under_a_fixed_seed() {
        let a = ResponseGenerator::new(None).with_rng(seeded(99));
        let b = ResponseGenerator::new(None).with_rng(seeded(99));
        assert_eq!(
            a.generate("x", &[], Some("Q?")).await,
            b.generate("x", &[], Some("Q?")).await
        );
    }

    #[tokio::test]
    async fn model_reply_is_returned_verbatim() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .returning(|_, _| Box::pin(async { Ok("Well put. Now, what is hoisting?".to_string()) }));

        let generator = ResponseGenerator::new(Some(Arc::new(model)));
        let reply = generator
            .generate("closures capture scope", &[], Some("What is hoisting?"))
            .await;
        assert_eq!(reply, "Well put. Now, what is hoisting?");
    }

    #[tokio::test]
    async fn model_error_falls_back_to_template() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .returning(|_, _| Box::pin(async { Err(ModelError::Malformed) }));

        let generator = ResponseGenerator::new(Some(Arc::new(model))).with_rng(seeded(2));
        let reply = generator.generate("answer", &[], Some("Next question?")).await;
        assert!(reply.ends_with("Next question?"));
    }

    #[tokio::test]
    async fn blank_model_reply_falls_back() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .returning(|_, _| Box::pin(async { Ok("   \n".to_string()) }));

        let generator = ResponseGenerator::new(Some(Arc::new(model))).with_rng(seeded(3));
        let reply = generator.generate("answer", &[], None).await;
        assert_eq!(reply, CLOSING_REMARK);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_model_hits_timeout_and_falls_back() {
        let mut model = MockTextModel::new();
        model.expect_complete().returning(|_, _| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("too late".to_string())
            })
        });

        let generator = ResponseGenerator::new(Some(Arc::new(model)))
            .with_timeout(Duration::from_millis(50))
            .with_rng(seeded(4));
        let reply = generator.generate("answer", &[], Some("Still there?")).await;
        assert!(reply.ends_with("Still there?"));
    }

    #[tokio::test]
    async fn prompt_carries_persona_context_and_verbatim_question() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .withf(|prompt, max_tokens| {
                prompt.contains("AI technical interviewer")
                    && prompt.contains("interviewer: Welcome! First, tell me about yourself.")
                    && prompt.contains("candidate: I studied CS.")
                    && prompt.contains("Candidate just said: \"I studied CS.\"")
                    && prompt.contains("The next question you MUST ask is: \"What is the event loop?\"")
                    && *max_tokens == 200
            })
            .returning(|_, _| Box::pin(async { Ok("ok".to_string()) }));

        let history = vec![
            Turn::interviewer("Welcome! First, tell me about yourself."),
            Turn::candidate("I studied CS."),
        ];
        let generator = ResponseGenerator::new(Some(Arc::new(model)));
        let reply = generator
            .generate("I studied CS.", &history, Some("What is the event loop?"))
            .await;
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn closing_prompt_asks_for_a_two_sentence_remark() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .withf(|prompt, _| {
                prompt.contains("answered the final question")
                    && prompt.contains("Keep it to 2 sentences max.")
            })
            .returning(|_, _| Box::pin(async { Ok("Thanks, well done.".to_string()) }));

        let generator = ResponseGenerator::new(Some(Arc::new(model)));
        let reply = generator.generate("my last answer", &[], None).await;
        assert_eq!(reply, "Thanks, well done.");
    }
}
