use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading the question bank at startup.
///
/// Only a document we cannot read or parse at all is an error. A document
/// that is merely sparse (a level or category missing) loads fine; the
/// selector skips the holes at selection time.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to read question bank at {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("question bank is not valid JSON")]
    Parse(#[from] serde_json::Error),
}

/// Interview difficulty level. Selects the category set, the per-category
/// question count, and the greeting blurb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Fresher,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Parses a client-supplied difficulty string. Anything unrecognized
    /// (including an absent value) maps to `Fresher` rather than an error.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("intermediate") => Difficulty::Intermediate,
            Some("advanced") => Difficulty::Advanced,
            _ => Difficulty::Fresher,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Fresher => "fresher",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    /// The category order and per-category question count for this level.
    ///
    /// The order is load-bearing: the greeting assumes the first category
    /// (`introduction`) yields question one, and `closing` comes last.
    pub fn config(&self) -> LevelConfig {
        match self {
            Difficulty::Fresher => LevelConfig {
                categories: &[
                    "introduction",
                    "javascript",
                    "react",
                    "nodejs",
                    "database",
                    "general",
                    "closing",
                ],
                per_category: 1,
            },
            Difficulty::Intermediate => LevelConfig {
                categories: &[
                    "introduction",
                    "javascript",
                    "react",
                    "nodejs",
                    "database",
                    "api",
                    "closing",
                ],
                per_category: 2,
            },
            Difficulty::Advanced => LevelConfig {
                categories: &[
                    "introduction",
                    "javascript",
                    "react",
                    "nodejs",
                    "systemDesign",
                    "security",
                    "devops",
                    "closing",
                ],
                per_category: 2,
            },
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed selection shape for one difficulty level.
#[derive(Debug, Clone, Copy)]
pub struct LevelConfig {
    pub categories: &'static [&'static str],
    pub per_category: usize,
}

/// Immutable, leveled, categorized corpus of interview questions.
///
/// Loaded once at process start and shared read-only across all sessions.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    levels: HashMap<String, HashMap<String, Vec<String>>>,
}

impl QuestionBank {
    pub fn from_json_str(raw: &str) -> Result<Self, BankError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, BankError> {
        let raw = fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn levels(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    /// The category pools for a level, falling back to the fresher pool
    /// when the requested level is absent from the document.
    pub fn level_pool(&self, difficulty: Difficulty) -> Option<&HashMap<String, Vec<String>>> {
        self.levels
            .get(difficulty.as_str())
            .or_else(|| self.levels.get(Difficulty::Fresher.as_str()))
    }

    /// All questions for one category of one level, if present.
    pub fn category(&self, difficulty: Difficulty, category: &str) -> Option<&[String]> {
        self.level_pool(difficulty)
            .and_then(|pool| pool.get(category))
            .map(Vec::as_slice)
    }
}
