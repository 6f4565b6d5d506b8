//! Shell command parsing for sage_core
//!
//! Breaks a raw command line into a structured form: base command,
//! positional arguments, flags with optional values, redirections, sudo
//! handling, and pipelines. Tokenization is POSIX-like (single/double
//! quotes, backslash escapes) without aiming for full shell grammar
//! coverage.
//!
//! Known limitations, kept deliberately: the redirection scan does not
//! exclude operators inside quoted strings, and an unescaped `|` inside
//! quotes still splits the pipeline.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SageError};

/// Value carried by a parsed flag
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagValue {
    /// Flag given without a value
    Present,
    /// Flag given with an explicit or consumed value
    WithValue(String),
}

impl FlagValue {
    /// The carried value, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            FlagValue::Present => None,
            FlagValue::WithValue(v) => Some(v.as_str()),
        }
    }
}

/// A single fully-parsed command (a simple command or one pipeline stage)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// Trimmed original text this parse consumed
    pub raw: String,
    /// First token after any leading `sudo`
    pub base: String,
    /// Positional arguments in order
    pub args: Vec<String>,
    /// Flags keyed by name without leading dashes, insertion-ordered
    pub flags: IndexMap<String, FlagValue>,
    /// Redirections keyed by operator string; the last occurrence of an
    /// operator wins
    pub redirections: IndexMap<String, String>,
    /// Whether the command was prefixed with sudo
    pub is_sudo: bool,
}

impl ParsedCommand {
    /// Whether a flag was given (name without dashes)
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// Value carried by a flag, if the flag was given with one
    pub fn flag_value(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(|f| f.value())
    }
}

/// Result of a parse: one command, or an ordered pipeline of them
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandLine {
    Single(ParsedCommand),
    Pipeline(Vec<ParsedCommand>),
}

impl CommandLine {
    /// The dominant stage: the command itself, or the first pipeline segment
    pub fn primary(&self) -> &ParsedCommand {
        match self {
            CommandLine::Single(cmd) => cmd,
            CommandLine::Pipeline(cmds) => &cmds[0],
        }
    }

    /// All stages in order (a single command is one stage)
    pub fn segments(&self) -> &[ParsedCommand] {
        match self {
            CommandLine::Single(cmd) => std::slice::from_ref(cmd),
            CommandLine::Pipeline(cmds) => cmds,
        }
    }

    pub fn is_pipeline(&self) -> bool {
        matches!(self, CommandLine::Pipeline(_))
    }
}

/// Shell command parser
pub struct CommandParser {
    /// Single-character flags that take the following token as their value
    value_short_flags: Vec<char>,
    /// Long flags that take the following token as their value
    value_long_flags: Vec<&'static str>,
    redirect_re: Regex,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandParser {
    pub fn new() -> Self {
        Self {
            value_short_flags: vec!['m', 'p', 'i', 'n', 'o', 'e', 't'],
            value_long_flags: vec!["output", "file", "port"],
            redirect_re: Regex::new(r"([012]?[<>]+)\s*(\S+)").unwrap(),
        }
    }

    /// Parse a raw command line into a single command or a pipeline.
    ///
    /// Fails with `EmptyInput` on blank input and `Syntax` on unterminated
    /// quoting, a trailing bare escape, a blank pipeline segment, or a
    /// missing command after `sudo`.
    pub fn parse(&self, raw: &str) -> Result<CommandLine> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SageError::EmptyInput);
        }

        let segments = split_pipeline(trimmed);
        if segments.len() > 1 {
            let mut parsed = Vec::with_capacity(segments.len());
            for segment in &segments {
                let cmd = self.parse_single(segment).map_err(|e| match e {
                    SageError::EmptyInput => {
                        SageError::Syntax("Empty pipeline segment".to_string())
                    }
                    other => other,
                })?;
                parsed.push(cmd);
            }
            return Ok(CommandLine::Pipeline(parsed));
        }

        Ok(CommandLine::Single(self.parse_single(trimmed)?))
    }

    /// Parse one pipeline-free command.
    fn parse_single(&self, text: &str) -> Result<ParsedCommand> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SageError::EmptyInput);
        }

        let (stripped, redirections) = self.extract_redirections(trimmed);
        let tokens = tokenize(&stripped)?;
        if tokens.is_empty() {
            return Err(SageError::Syntax("No command parts after parsing".to_string()));
        }

        let mut start = 0;
        let is_sudo = tokens[0] == "sudo";
        if is_sudo {
            if tokens.len() == 1 {
                return Err(SageError::Syntax("No command specified after sudo".to_string()));
            }
            start = 1;
        }

        let base = tokens[start].clone();
        let mut args: Vec<String> = Vec::new();
        let mut flags: IndexMap<String, FlagValue> = IndexMap::new();

        let mut i = start + 1;
        while i < tokens.len() {
            let part = tokens[i].as_str();

            if part == "--" {
                args.extend(tokens[i + 1..].iter().cloned());
                break;
            } else if let Some(long) = part.strip_prefix("--") {
                if let Some((name, value)) = long.split_once('=') {
                    flags.insert(name.to_string(), FlagValue::WithValue(value.to_string()));
                } else if self.value_long_flags.contains(&long)
                    && i + 1 < tokens.len()
                    && !tokens[i + 1].starts_with('-')
                {
                    flags.insert(long.to_string(), FlagValue::WithValue(tokens[i + 1].clone()));
                    i += 1;
                } else {
                    flags.insert(long.to_string(), FlagValue::Present);
                }
            } else if part.len() > 1 && part.starts_with('-') {
                let chars: Vec<char> = part[1..].chars().collect();
                if chars.len() == 1 {
                    i += self.push_short_flag(&base, chars[0], &tokens, i, &mut flags);
                } else {
                    // Combined short flags: all but the last are bare, the
                    // last may still take a value
                    for &c in &chars[..chars.len() - 1] {
                        flags.insert(c.to_string(), FlagValue::Present);
                    }
                    i += self.push_short_flag(&base, chars[chars.len() - 1], &tokens, i, &mut flags);
                }
            } else {
                args.push(part.to_string());
            }
            i += 1;
        }

        Ok(ParsedCommand {
            raw: trimmed.to_string(),
            base,
            args,
            flags,
            redirections,
            is_sudo,
        })
    }

    /// Insert a single-character flag, consuming the next token as its value
    /// when the flag is value-taking. Returns how many extra tokens were
    /// consumed (0 or 1).
    fn push_short_flag(
        &self,
        base: &str,
        flag: char,
        tokens: &[String],
        i: usize,
        flags: &mut IndexMap<String, FlagValue>,
    ) -> usize {
        let next_exists = i + 1 < tokens.len();

        // Command-specific override table: tar's f always names the archive
        if base == "tar" && flag == 'f' {
            if next_exists {
                flags.insert(flag.to_string(), FlagValue::WithValue(tokens[i + 1].clone()));
                return 1;
            }
            flags.insert(flag.to_string(), FlagValue::Present);
            return 0;
        }

        if self.value_short_flags.contains(&flag) && next_exists && !tokens[i + 1].starts_with('-') {
            flags.insert(flag.to_string(), FlagValue::WithValue(tokens[i + 1].clone()));
            return 1;
        }
        flags.insert(flag.to_string(), FlagValue::Present);
        0
    }

    /// Pull redirections out of the text before tokenization. Matches are
    /// removed by span; for a repeated operator the last target wins.
    fn extract_redirections(&self, text: &str) -> (String, IndexMap<String, String>) {
        let mut redirections = IndexMap::new();
        let mut stripped = String::with_capacity(text.len());
        let mut last = 0;

        for caps in self.redirect_re.captures_iter(text) {
            if let Some(whole) = caps.get(0) {
                redirections.insert(caps[1].to_string(), caps[2].to_string());
                stripped.push_str(&text[last..whole.start()]);
                last = whole.end();
            }
        }
        stripped.push_str(&text[last..]);

        (stripped, redirections)
    }
}

/// Split on unescaped `|`. A backslash escapes the following character; the
/// escape itself is preserved for the tokenizer.
fn split_pipeline(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            current.push(c);
            escaped = true;
        } else if c == '|' {
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    segments.push(current);

    segments
}

/// POSIX-like word splitting. Single quotes protect everything, double
/// quotes honor `\"` and `\\`, and outside quotes a backslash escapes the
/// next character.
fn tokenize(text: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => {
                    current.push(next);
                    in_word = true;
                }
                None => return Err(SageError::Syntax("No escaped character".to_string())),
            },
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => current.push(inner),
                        None => {
                            return Err(SageError::Syntax("No closing quotation".to_string()))
                        }
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('"') => current.push('"'),
                            Some('\\') => current.push('\\'),
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => {
                                return Err(SageError::Syntax(
                                    "No closing quotation".to_string(),
                                ))
                            }
                        },
                        Some(inner) => current.push(inner),
                        None => {
                            return Err(SageError::Syntax("No closing quotation".to_string()))
                        }
                    }
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    tokens.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            other => {
                current.push(other);
                in_word = true;
            }
        }
    }
    if in_word {
        tokens.push(current);
    }

    Ok(tokens)
}
