use serde::Serialize;

use crate::session::{Role, Turn};

/// The closing performance summary sent as `interview_feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Interviewer turns delivered, greeting and closing included.
    pub total_questions: usize,
    pub responses_given: usize,
    /// Mean word count of candidate answers, rounded.
    pub average_response_length: u32,
    pub feedback: String,
}

/// Qualitative tiers keyed on average answer length, in words. Thresholds
/// and wording are configuration; the defaults mirror the product copy.
#[derive(Debug, Clone)]
pub struct FeedbackBands {
    pub detailed_min: f64,
    pub adequate_min: f64,
    pub detailed: String,
    pub adequate: String,
    pub brief: String,
}

impl Default for FeedbackBands {
    fn default() -> Self {
        Self {
            detailed_min: 50.0,
            adequate_min: 25.0,
            detailed: "Excellent! Your answers were detailed and comprehensive. You \
                       demonstrated strong communication skills and deep technical knowledge."
                .to_string(),
            adequate: "Good job! Your answers were clear and concise. Consider adding \
                       more examples and details to strengthen your responses."
                .to_string(),
            brief: "You completed the interview. Try to elaborate more on your answers \
                    with specific examples and technical details to make a stronger \
                    impression."
                .to_string(),
        }
    }
}

/// Reduces a finished conversation into a quantitative + qualitative
/// summary. Pure: no I/O, no randomness, total over every history
/// including an empty one.
#[derive(Debug, Clone, Default)]
pub struct FeedbackScorer {
    bands: FeedbackBands,
}

impl FeedbackScorer {
    pub fn new(bands: FeedbackBands) -> Self {
        Self { bands }
    }

    pub fn score(&self, history: &[Turn]) -> Feedback {
        let questions_asked = history
            .iter()
            .filter(|t| t.role == Role::Interviewer)
            .count();
        let answers: Vec<&Turn> = history
            .iter()
            .filter(|t| t.role == Role::Candidate)
            .collect();

        let average_words = if answers.is_empty() {
            0.0
        } else {
            let total_words: usize = answers
                .iter()
                .map(|t| t.text.split_whitespace().count())
                .sum();
            total_words as f64 / answers.len() as f64
        };

        let feedback = if average_words > self.bands.detailed_min {
            self.bands.detailed.clone()
        } else if average_words > self.bands.adequate_min {
            self.bands.adequate.clone()
        } else {
            self.bands.brief.clone()
        };

        Feedback {
            total_questions: questions_asked,
            responses_given: answers.len(),
            average_response_length: average_words.round() as u32,
            feedback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(spec: &[(Role, &str)]) -> Vec<Turn> {
        spec.iter()
            .map(|(role, text)| Turn {
                role: *role,
                text: text.to_string(),
            })
            .collect()
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn empty_history_scores_zero_and_weakest_tier() {
        let scorer = FeedbackScorer::default();
        let feedback = scorer.score(&[]);
        assert_eq!(feedback.total_questions, 0);
        assert_eq!(feedback.responses_given, 0);
        assert_eq!(feedback.average_response_length, 0);
        assert_eq!(feedback.feedback, FeedbackBands::default().brief);
    }

    #[test]
    fn counts_candidate_turns_exactly() {
        let scorer = FeedbackScorer::default();
        let history = turns(&[
            (Role::Interviewer, "greeting"),
            (Role::Candidate, "answer one"),
            (Role::Interviewer, "ack plus question"),
            (Role::Candidate, "answer two"),
            (Role::Interviewer, "closing"),
        ]);
        let feedback = scorer.score(&history);
        assert_eq!(feedback.responses_given, 2);
        assert_eq!(feedback.total_questions, 3);
    }

    #[test]
    fn tiers_threshold_on_average_word_count() {
        let scorer = FeedbackScorer::default();
        let bands = FeedbackBands::default();

        let long = turns(&[(Role::Candidate, &words(60))]);
        assert_eq!(scorer.score(&long).feedback, bands.detailed);

        let medium = turns(&[(Role::Candidate, &words(30))]);
        assert_eq!(scorer.score(&medium).feedback, bands.adequate);

        let short = turns(&[(Role::Candidate, &words(5))]);
        assert_eq!(scorer.score(&short).feedback, bands.brief);
    }

    #[test]
    fn thresholds_are_exclusive_at_the_boundary() {
        let scorer = FeedbackScorer::default();
        let bands = FeedbackBands::default();

        // Exactly 50 words is not "detailed", exactly 25 is not "adequate".
        let at_fifty = turns(&[(Role::Candidate, &words(50))]);
        assert_eq!(scorer.score(&at_fifty).feedback, bands.adequate);

        let at_twenty_five = turns(&[(Role::Candidate, &words(25))]);
        assert_eq!(scorer.score(&at_twenty_five).feedback, bands.brief);
    }

    #[test]
    fn average_is_rounded_to_nearest_word() {
        let scorer = FeedbackScorer::default();
        // 3 and 4 words average to 3.5, which rounds to 4.
        let history = turns(&[
            (Role::Candidate, &words(3)),
            (Role::Candidate, &words(4)),
        ]);
        assert_eq!(scorer.score(&history).average_response_length, 4);
    }

    #[test]
    fn scoring_is_deterministic() {
        let scorer = FeedbackScorer::default();
        let history = turns(&[
            (Role::Interviewer, "q"),
            (Role::Candidate, "a reasonably sized answer with several words"),
        ]);
        assert_eq!(scorer.score(&history), scorer.score(&history));
    }

    #[test]
    fn custom_bands_are_honored() {
        let scorer = FeedbackScorer::new(FeedbackBands {
            detailed_min: 2.0,
            adequate_min: 1.0,
            detailed: "great".into(),
            adequate: "fine".into(),
            brief: "thin".into(),
        });
        let history = turns(&[(Role::Candidate, "three whole words")]);
        assert_eq!(scorer.score(&history).feedback, "great");
    }

    #[test]
    fn serializes_with_camel_case_wire_names() {
        let feedback = Feedback {
            total_questions: 8,
            responses_given: 7,
            average_response_length: 31,
            feedback: "Good job!".into(),
        };
        let value = serde_json::to_value(&feedback).unwrap();
        assert_eq!(value["totalQuestions"], 8);
        assert_eq!(value["responsesGiven"], 7);
        assert_eq!(value["averageResponseLength"], 31);
    }
}
