// src/process/command_line.rs

//! Turning the user's command-line string into something we can spawn.
//!
//! In direct mode the string is split into words with POSIX-shell-like
//! quoting and the first word is executed as the program, so a missing
//! program is reported as a spawn failure. In shell mode the string is
//! handed to `sh -c` (or `cmd /C` on Windows) untouched.

use tokio::process::Command;

use crate::errors::{Result, RunnerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    Direct {
        raw: String,
        program: String,
        args: Vec<String>,
    },
    Shell {
        raw: String,
    },
}

impl CommandLine {
    pub fn parse(raw: &str, use_shell: bool) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(RunnerError::InvalidCommandLine(
                "command line is empty".to_string(),
            ));
        }

        if use_shell {
            return Ok(CommandLine::Shell {
                raw: raw.to_string(),
            });
        }

        let mut words = split_words(raw).map_err(RunnerError::InvalidCommandLine)?;
        if words.is_empty() {
            return Err(RunnerError::InvalidCommandLine(
                "command line is empty".to_string(),
            ));
        }
        let program = words.remove(0);

        Ok(CommandLine::Direct {
            raw: raw.to_string(),
            program,
            args: words,
        })
    }

    /// The command line exactly as the user typed it.
    pub fn raw(&self) -> &str {
        match self {
            CommandLine::Direct { raw, .. } | CommandLine::Shell { raw } => raw,
        }
    }

    /// Build a `tokio::process::Command` for this command line.
    ///
    /// stdio is inherited; nothing here pipes or kills the child.
    pub fn to_command(&self) -> Command {
        match self {
            CommandLine::Direct { program, args, .. } => {
                let mut c = Command::new(program);
                c.args(args);
                c
            }
            CommandLine::Shell { raw } => {
                if cfg!(windows) {
                    let mut c = Command::new("cmd");
                    c.arg("/C").arg(raw);
                    c
                } else {
                    let mut c = Command::new("sh");
                    c.arg("-c").arg(raw);
                    c
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Split a command line into words.
///
/// - Unquoted whitespace separates words.
/// - `'...'` is taken literally.
/// - `"..."` is literal except that `\"` and `\\` are unescaped.
/// - Outside quotes, `\x` yields `x`.
/// - Adjacent quoted/unquoted pieces join into one word (`a"b c"` is `ab c`).
pub fn split_words(raw: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = Quote::None;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => return Err("unterminated double quote".to_string()),
                },
                _ => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_word = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_word = true;
                }
                '\\' => match chars.next() {
                    Some(next) => {
                        current.push(next);
                        in_word = true;
                    }
                    None => return Err("trailing backslash".to_string()),
                },
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    match quote {
        Quote::Single => return Err("unterminated single quote".to_string()),
        Quote::Double => return Err("unterminated double quote".to_string()),
        Quote::None => {}
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}
