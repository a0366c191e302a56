//! Domain types shared across the evaluation service.

use serde::{Deserialize, Serialize};

/// A code fragment together with its declared source language, as extracted
/// from a fenced code block by the command grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub language: String,
    pub code: String,
}

impl Snippet {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
        }
    }
}

/// A named, owner-scoped execution environment: a container image paired
/// with the Dockerfile that produced it and an optional language binding.
///
/// `author_id == None` marks a shared library environment usable by any
/// requester. `language == None` marks an unbound environment.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Environment {
    pub id: i64,
    pub author_id: Option<String>,
    pub name: String,
    pub image: String,
    pub dockerfile: String,
    pub language: Option<String>,
}

impl Environment {
    /// Normalized language binding. The store may carry a legacy `"none"`
    /// sentinel alongside NULL; both read as unbound.
    pub fn bound_language(&self) -> Option<&str> {
        match self.language.as_deref() {
            None | Some("") | Some("none") => None,
            Some(lang) => Some(lang),
        }
    }

    pub fn is_library(&self) -> bool {
        self.author_id.is_none()
    }
}

/// Per-user evaluation mode: whether detected snippets run automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    Manual,
    Auto,
}

impl Behavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Manual => "manual",
            Behavior::Auto => "auto",
        }
    }

    /// Parses a raw user token. Unknown values yield `None`; the behavior
    /// store treats those as a silent no-op.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "manual" => Some(Behavior::Manual),
            "auto" => Some(Behavior::Auto),
            _ => None,
        }
    }
}

impl std::fmt::Display for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ephemeral request to run a code fragment. Lives for one execution
/// pipeline run; never shared across concurrent requests.
#[derive(Debug, Clone)]
pub struct ExecRequest {
    pub author_id: String,
    pub snippet: Snippet,
}

/// Ephemeral request to build an environment image. `author_id == None`
/// targets the shared library.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub author_id: Option<String>,
    pub env_name: String,
    /// Language to bind on successful commit, if any.
    pub language: Option<String>,
    pub dockerfile: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_parses_known_values_only() {
        assert_eq!(Behavior::parse("auto"), Some(Behavior::Auto));
        assert_eq!(Behavior::parse("manual"), Some(Behavior::Manual));
        assert_eq!(Behavior::parse("Auto"), None);
        assert_eq!(Behavior::parse("aggressive"), None);
        assert_eq!(Behavior::parse(""), None);
    }

    #[test]
    fn bound_language_normalizes_sentinels() {
        let mut env = Environment {
            id: 1,
            author_id: Some("42".to_string()),
            name: "sci".to_string(),
            image: "runbot_build_sci:42".to_string(),
            dockerfile: "FROM python:3".to_string(),
            language: Some("python".to_string()),
        };
        assert_eq!(env.bound_language(), Some("python"));

        env.language = Some("none".to_string());
        assert_eq!(env.bound_language(), None);

        env.language = None;
        assert_eq!(env.bound_language(), None);
    }
}
