//! QA lookup table: static question -> answer data, loaded once.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::error::{ConfigError, Error, QaError};

/// Read-only, exact-match question -> answer table.
///
/// Keeps the source order of questions so a question cycle can follow it.
#[derive(Debug, Clone, Default)]
pub struct QaTable {
    answers: HashMap<String, String>,
    order: Vec<String>,
}

impl QaTable {
    /// Build from `(question, answer)` pairs. A repeated question keeps its
    /// first position and its last answer.
    pub fn from_pairs<I, Q, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: Into<String>,
        A: Into<String>,
    {
        let mut table = Self::default();
        for (question, answer) in pairs {
            let question = question.into();
            if !table.answers.contains_key(&question) {
                table.order.push(question.clone());
            }
            table.answers.insert(question, answer.into());
        }
        table
    }

    /// Parse a JSON object of `{"question": "answer"}`.
    pub fn from_json_str(raw: &str) -> Result<Self, QaError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let serde_json::Value::Object(map) = value else {
            return Err(QaError::NotAnObject);
        };

        let mut pairs = Vec::with_capacity(map.len());
        for (question, answer) in map {
            match answer {
                serde_json::Value::String(answer) => pairs.push((question, answer)),
                _ => return Err(QaError::InvalidAnswer { question }),
            }
        }
        Ok(Self::from_pairs(pairs))
    }

    /// Load from a JSON file on disk. Malformed content is a configuration
    /// error naming the file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let table = Self::from_json_str(&raw).map_err(|e| {
            ConfigError::ParseError(format!("{}: {e}", path.display()))
        })?;
        info!(path = %path.display(), entries = table.len(), "Loaded QA table");
        Ok(table)
    }

    /// Exact, case-sensitive lookup. `None` means there is no answer.
    pub fn lookup(&self, question: &str) -> Option<&str> {
        self.answers.get(question).map(String::as_str)
    }

    /// Questions in source order.
    pub fn questions(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
