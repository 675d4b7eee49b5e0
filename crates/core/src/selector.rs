use std::collections::HashSet;

use rand::RngCore;

use crate::question_bank::{Difficulty, QuestionBank};

/// Picks a bounded, ordered list of non-repeating questions for one
/// interview run.
///
/// Selection walks the level's categories in their declared order and
/// samples `per_category` questions from each, skipping questions already
/// in `used`. Output is category-major: every pick for category *i*
/// precedes every pick for category *i + 1*.
pub struct QuestionSelector<'a> {
    bank: &'a QuestionBank,
}

impl<'a> QuestionSelector<'a> {
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self { bank }
    }

    /// Selects questions for `difficulty`, recording every pick in `used`.
    ///
    /// When a category's pool is fully spent for this session, sampling
    /// falls back to the full pool for that category. That deliberately
    /// allows a repeat rather than starving a long-lived session; the
    /// exclusion set keeps growing otherwise.
    pub fn select(
        &self,
        difficulty: Difficulty,
        used: &mut HashSet<String>,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        let config = difficulty.config();
        let mut selected = Vec::new();

        for &category in config.categories {
            let Some(pool) = self.bank.category(difficulty, category) else {
                // Category absent from the bank: skip it, never fail.
                tracing::debug!(%difficulty, category, "category missing from bank, skipping");
                continue;
            };
            if pool.is_empty() {
                continue;
            }

            let available: Vec<&String> =
                pool.iter().filter(|q| !used.contains(q.as_str())).collect();
            let sampling_pool: Vec<&String> = if available.is_empty() {
                pool.iter().collect()
            } else {
                available
            };

            let take = config.per_category.min(sampling_pool.len());
            for index in rand::seq::index::sample(rng, sampling_pool.len(), take) {
                let question = sampling_pool[index].clone();
                used.insert(question.clone());
                selected.push(question);
            }
        }

        selected
    }
}
