//! Declarative command grammar of composable matchers.
//!
//! A pattern is a sequence of matchers evaluated left to right against the
//! raw message text: literal tokens, bound word captures, bound snippet
//! captures (fenced code blocks carrying a language tag), and an explicit
//! end-of-input marker. The grammar knows nothing about what the commands
//! do; the dispatch table in [`crate::commands`] owns that.

use runbot_core::Snippet;
use std::collections::HashMap;

/// One step of a pattern.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// The next whitespace-delimited token must equal this string.
    Literal(&'static str),
    /// Capture the next whitespace-delimited token under this name.
    Word(&'static str),
    /// Capture a fenced code block (```lang ... ```) under this name.
    Snippet(&'static str),
    /// Only trailing whitespace may remain.
    Eof,
}

/// Values bound by a successful match.
#[derive(Debug, Default)]
pub struct Captures {
    words: HashMap<&'static str, String>,
    snippets: HashMap<&'static str, Snippet>,
}

impl Captures {
    pub fn word(&self, name: &str) -> Option<&str> {
        self.words.get(name).map(String::as_str)
    }

    pub fn snippet(&self, name: &str) -> Option<&Snippet> {
        self.snippets.get(name)
    }
}

#[derive(Debug, Clone)]
pub struct Pattern {
    matchers: Vec<Matcher>,
}

impl Pattern {
    pub fn new(matchers: Vec<Matcher>) -> Self {
        Self { matchers }
    }

    /// Evaluate the pattern against `input`, returning the bound captures
    /// on success. Patterns without a trailing [`Matcher::Eof`] accept
    /// trailing input.
    pub fn matches(&self, input: &str) -> Option<Captures> {
        let mut captures = Captures::default();
        let mut rest = input;

        for matcher in &self.matchers {
            match matcher {
                Matcher::Literal(token) => {
                    let (word, remainder) = next_word(rest)?;
                    if word != *token {
                        return None;
                    }
                    rest = remainder;
                }
                Matcher::Word(name) => {
                    let (word, remainder) = next_word(rest)?;
                    if word.starts_with("```") {
                        return None;
                    }
                    captures.words.insert(name, word.to_string());
                    rest = remainder;
                }
                Matcher::Snippet(name) => {
                    let (snippet, remainder) = next_snippet(rest)?;
                    captures.snippets.insert(name, snippet);
                    rest = remainder;
                }
                Matcher::Eof => {
                    if !rest.trim().is_empty() {
                        return None;
                    }
                }
            }
        }

        Some(captures)
    }
}

fn next_word(input: &str) -> Option<(&str, &str)> {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed
        .find(char::is_whitespace)
        .unwrap_or(trimmed.len());
    Some((&trimmed[..end], &trimmed[end..]))
}

fn next_snippet(input: &str) -> Option<(Snippet, &str)> {
    let trimmed = input.trim_start();
    let body = trimmed.strip_prefix("```")?;

    let language_end = body.find('\n')?;
    let language = body[..language_end].trim();
    let after_language = &body[language_end + 1..];

    let code_end = after_language.find("```")?;
    let code = after_language[..code_end].strip_suffix('\n').unwrap_or(&after_language[..code_end]);

    let remainder = &after_language[code_end + 3..];
    Some((Snippet::new(language, code), remainder))
}
