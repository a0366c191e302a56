//! Command surface: ordered pattern table mapping raw text to typed
//! commands.
//!
//! Specific subcommands are tried before the bare snippet form, so
//! `!eval env list` never parses as a snippet evaluation. Unrecognized
//! input is simply not a command.

use crate::grammar::{Matcher, Pattern};
use runbot_core::Snippet;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `!eval <snippet>`
    Eval { snippet: Snippet },
    /// `!eval env inspect <name>`
    EnvInspect { name: String },
    /// `!eval env list`
    EnvList,
    /// `!eval env map`
    EnvMap,
    /// `!eval env set <language> <name>`
    EnvSet { language: String, name: String },
    /// `!eval env build <name> <snippet>` (privileged)
    EnvBuild { name: String, snippet: Snippet },
    /// `!eval env library build <name> <language> <snippet>` (privileged)
    EnvLibraryBuild {
        name: String,
        language: String,
        snippet: Snippet,
    },
    /// `!eval behavior`
    BehaviorShow,
    /// `!eval behavior set <value>`
    BehaviorSet { value: String },
}

/// Parse a raw message into a command, or `None` when it is not one.
pub fn parse_command(input: &str) -> Option<Command> {
    use Matcher::{Eof, Literal, Snippet as Snip, Word};

    let table: Vec<(Pattern, fn(&crate::grammar::Captures) -> Option<Command>)> = vec![
        (
            Pattern::new(vec![
                Literal("!eval"),
                Literal("env"),
                Literal("inspect"),
                Word("name"),
            ]),
            |c| {
                Some(Command::EnvInspect {
                    name: c.word("name")?.to_string(),
                })
            },
        ),
        (
            Pattern::new(vec![Literal("!eval"), Literal("env"), Literal("list")]),
            |_| Some(Command::EnvList),
        ),
        (
            Pattern::new(vec![Literal("!eval"), Literal("env"), Literal("map")]),
            |_| Some(Command::EnvMap),
        ),
        (
            Pattern::new(vec![
                Literal("!eval"),
                Literal("env"),
                Literal("set"),
                Word("language"),
                Word("name"),
            ]),
            |c| {
                Some(Command::EnvSet {
                    language: c.word("language")?.to_string(),
                    name: c.word("name")?.to_string(),
                })
            },
        ),
        (
            Pattern::new(vec![
                Literal("!eval"),
                Literal("env"),
                Literal("library"),
                Literal("build"),
                Word("name"),
                Word("language"),
                Snip("snippet"),
            ]),
            |c| {
                Some(Command::EnvLibraryBuild {
                    name: c.word("name")?.to_string(),
                    language: c.word("language")?.to_string(),
                    snippet: c.snippet("snippet")?.clone(),
                })
            },
        ),
        (
            Pattern::new(vec![
                Literal("!eval"),
                Literal("env"),
                Literal("build"),
                Word("name"),
                Snip("snippet"),
            ]),
            |c| {
                Some(Command::EnvBuild {
                    name: c.word("name")?.to_string(),
                    snippet: c.snippet("snippet")?.clone(),
                })
            },
        ),
        (
            Pattern::new(vec![
                Literal("!eval"),
                Literal("behavior"),
                Literal("set"),
                Word("value"),
            ]),
            |c| {
                Some(Command::BehaviorSet {
                    value: c.word("value")?.to_string(),
                })
            },
        ),
        (
            Pattern::new(vec![Literal("!eval"), Literal("behavior"), Eof]),
            |_| Some(Command::BehaviorShow),
        ),
        (
            Pattern::new(vec![Literal("!eval"), Snip("snippet")]),
            |c| {
                Some(Command::Eval {
                    snippet: c.snippet("snippet")?.clone(),
                })
            },
        ),
    ];

    for (pattern, build) in &table {
        if let Some(captures) = pattern.matches(input) {
            if let Some(command) = build(&captures) {
                return Some(command);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_form_parses() {
        assert!(matches!(
            parse_command("!eval ```python\nprint(1)\n```"),
            Some(Command::Eval { .. })
        ));
        assert_eq!(
            parse_command("!eval env inspect sci"),
            Some(Command::EnvInspect {
                name: "sci".to_string()
            })
        );
        assert_eq!(parse_command("!eval env list"), Some(Command::EnvList));
        assert_eq!(parse_command("!eval env map"), Some(Command::EnvMap));
        assert_eq!(
            parse_command("!eval env set python sci"),
            Some(Command::EnvSet {
                language: "python".to_string(),
                name: "sci".to_string()
            })
        );
        assert!(matches!(
            parse_command("!eval env build sci ```dockerfile\nFROM python:3.12\n```"),
            Some(Command::EnvBuild { .. })
        ));
        assert!(matches!(
            parse_command("!eval env library build py python ```dockerfile\nFROM python:3.12\n```"),
            Some(Command::EnvLibraryBuild { .. })
        ));
        assert_eq!(parse_command("!eval behavior"), Some(Command::BehaviorShow));
        assert_eq!(
            parse_command("!eval behavior set auto"),
            Some(Command::BehaviorSet {
                value: "auto".to_string()
            })
        );
    }

    #[test]
    fn subcommands_win_over_the_bare_snippet_form() {
        let parsed =
            parse_command("!eval env build sci ```dockerfile\nFROM alpine\n```").unwrap();
        assert!(matches!(parsed, Command::EnvBuild { .. }));
    }

    #[test]
    fn library_build_binds_both_name_and_language() {
        let parsed =
            parse_command("!eval env library build py python ```dockerfile\nFROM python\n```")
                .unwrap();
        match parsed {
            Command::EnvLibraryBuild {
                name,
                language,
                snippet,
            } => {
                assert_eq!(name, "py");
                assert_eq!(language, "python");
                assert_eq!(snippet.language, "dockerfile");
                assert_eq!(snippet.code, "FROM python");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn non_commands_are_ignored() {
        assert_eq!(parse_command("hello there"), None);
        assert_eq!(parse_command("!giveaway start"), None);
        assert_eq!(parse_command("!eval"), None);
        assert_eq!(parse_command("!eval just words"), None);
    }
}
