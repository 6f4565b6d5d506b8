//! Bounded command-history analytics
//!
//! Keeps a FIFO-bounded log of executed commands and derives statistics on
//! demand: per-command usage patterns (frequency, success rate, common
//! flags/arguments, follow-up commands) and analysis of repeated command
//! sequences.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::parser::CommandParser;

/// One executed command with its outcome
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    pub exit_code: i32,
    /// Wall-clock duration in seconds
    pub duration: f64,
    pub timestamp: DateTime<Utc>,
    pub working_dir: Option<String>,
    pub environment: Option<HashMap<String, String>>,
}

impl HistoryEntry {
    pub fn new(command: &str, exit_code: i32, duration: f64) -> Self {
        Self {
            command: command.to_string(),
            exit_code,
            duration,
            timestamp: Utc::now(),
            working_dir: None,
            environment: None,
        }
    }

    pub fn with_working_dir(mut self, working_dir: &str) -> Self {
        self.working_dir = Some(working_dir.to_string());
        self
    }

    pub fn with_environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = Some(environment);
        self
    }
}

/// Usage statistics for a base command across history
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommandPattern {
    pub frequency: usize,
    /// Fraction of matching invocations that exited zero
    pub success_rate: f64,
    pub average_duration: f64,
    /// Up to five most frequent positional arguments
    pub common_args: Vec<String>,
    /// Up to five most frequent flag names, stored without dashes
    pub common_flags: Vec<String>,
    /// Base commands observed immediately after this one, first-seen order
    pub related_commands: Vec<String>,
}

/// Aggregate view of a repeated command sequence
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SequenceAnalysis {
    /// Fraction of matching runs where every command exited zero
    pub success_rate: f64,
    /// Mean of the summed durations of each matching run
    pub total_duration: f64,
    pub common_patterns: Vec<CommandPattern>,
    /// Commands historically issued right after this sequence
    pub suggestions: Vec<String>,
}

/// FIFO-bounded store of executed commands
pub struct CommandHistory {
    entries: Vec<HistoryEntry>,
    capacity: usize,
    parser: CommandParser,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            parser: CommandParser::new(),
        }
    }

    /// Append an entry, evicting the oldest once past capacity.
    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
    }

    /// Record a completed command with the current timestamp.
    pub fn record(&mut self, command: &str, exit_code: i32, duration: f64) {
        self.add(HistoryEntry::new(command, exit_code, duration));
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Usage statistics for the base command of `command`.
    ///
    /// Matching compares the first whitespace token of the stored text, so
    /// differently quoted spellings of the same command do not merge. Returns
    /// `None` for blank input or when nothing in history matches.
    pub fn command_patterns(&self, command: &str) -> Option<CommandPattern> {
        let base = command.split_whitespace().next()?;
        let matches: Vec<&HistoryEntry> = self
            .entries
            .iter()
            .filter(|e| e.command.split_whitespace().next() == Some(base))
            .collect();
        if matches.is_empty() {
            return None;
        }

        let frequency = matches.len();
        let successes = matches.iter().filter(|e| e.exit_code == 0).count();
        let success_rate = successes as f64 / frequency as f64;
        let average_duration = matches.iter().map(|e| e.duration).sum::<f64>() / frequency as f64;

        let mut arg_counts: IndexMap<String, usize> = IndexMap::new();
        let mut flag_counts: IndexMap<String, usize> = IndexMap::new();
        for entry in &matches {
            // Entries that no longer re-parse are skipped rather than
            // poisoning the whole pattern
            if let Ok(line) = self.parser.parse(&entry.command) {
                let cmd = line.primary();
                for arg in &cmd.args {
                    *arg_counts.entry(arg.clone()).or_insert(0) += 1;
                }
                for flag in cmd.flags.keys() {
                    *flag_counts.entry(flag.clone()).or_insert(0) += 1;
                }
            }
        }

        Some(CommandPattern {
            frequency,
            success_rate,
            average_duration,
            common_args: top_counted(arg_counts),
            common_flags: top_counted(flag_counts),
            related_commands: self.successor_bases(base),
        })
    }

    /// Analyze how a sequence of exact command texts has fared historically.
    pub fn analyze_sequence<S: AsRef<str>>(&self, commands: &[S]) -> SequenceAnalysis {
        if commands.is_empty() {
            return SequenceAnalysis::default();
        }
        let wanted: Vec<&str> = commands.iter().map(|c| c.as_ref()).collect();

        let mut runs = 0usize;
        let mut clean_runs = 0usize;
        let mut duration_sum = 0.0f64;
        for window in self.entries.windows(wanted.len()) {
            if window
                .iter()
                .zip(wanted.iter())
                .all(|(entry, want)| entry.command == *want)
            {
                runs += 1;
                if window.iter().all(|e| e.exit_code == 0) {
                    clean_runs += 1;
                }
                duration_sum += window.iter().map(|e| e.duration).sum::<f64>();
            }
        }
        if runs == 0 {
            return SequenceAnalysis::default();
        }

        let common_patterns = wanted
            .iter()
            .filter_map(|c| self.command_patterns(c))
            .filter(|p| p.frequency > 1)
            .collect();

        SequenceAnalysis {
            success_rate: clean_runs as f64 / runs as f64,
            total_duration: duration_sum / runs as f64,
            common_patterns,
            suggestions: self.follow_up_suggestions(wanted[wanted.len() - 1]),
        }
    }

    /// Base commands observed immediately after entries matching `base`,
    /// distinct, first-seen order.
    fn successor_bases(&self, base: &str) -> Vec<String> {
        let mut related: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for window in self.entries.windows(2) {
            if window[0].command.split_whitespace().next() == Some(base) {
                if let Some(next) = window[1].command.split_whitespace().next() {
                    if seen.insert(next) {
                        related.push(next.to_string());
                    }
                }
            }
        }
        related
    }

    /// Full command texts historically issued right after `last`, distinct,
    /// first-seen order, capped at five.
    fn follow_up_suggestions(&self, last: &str) -> Vec<String> {
        let mut suggestions: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for window in self.entries.windows(2) {
            if window[0].command == last {
                let next = window[1].command.as_str();
                if seen.insert(next) {
                    suggestions.push(next.to_string());
                }
            }
        }
        suggestions.truncate(5);
        suggestions
    }
}

/// Most frequent names first, insertion order breaking ties, capped at five.
fn top_counted(counts: IndexMap<String, usize>) -> Vec<String> {
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(5);
    ranked.into_iter().map(|(name, _)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> CommandHistory {
        let mut history = CommandHistory::new();
        history.record("git status", 0, 0.1);
        history.record("cargo build", 0, 12.0);
        history.record("git push", 1, 2.0);
        history.record("ls -la", 0, 0.05);
        history
    }

    #[test]
    fn test_record_and_eviction() {
        let mut history = CommandHistory::with_capacity(3);
        history.record("one", 0, 0.1);
        history.record("two", 0, 0.1);
        history.record("three", 0, 0.1);
        history.record("four", 0, 0.1);
        assert_eq!(history.len(), 3);
        assert_eq!(history.entries()[0].command, "two");
        assert!(history.command_patterns("one").is_none());
        assert!(history.command_patterns("four").is_some());
    }

    #[test]
    fn test_patterns_on_empty_history() {
        let history = CommandHistory::new();
        assert!(history.command_patterns("git status").is_none());
    }

    #[test]
    fn test_patterns_blank_query() {
        let history = seeded();
        assert!(history.command_patterns("").is_none());
        assert!(history.command_patterns("   ").is_none());
    }

    #[test]
    fn test_pattern_statistics() {
        let mut history = CommandHistory::new();
        history.record("git status", 0, 1.0);
        history.record("git push", 1, 2.0);
        history.record("git status", 0, 3.0);

        let pattern = history.command_patterns("git").unwrap();
        assert_eq!(pattern.frequency, 3);
        assert!((pattern.success_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((pattern.average_duration - 2.0).abs() < 1e-9);
        assert_eq!(pattern.common_args[0], "status");
        assert!(pattern.common_args.contains(&"push".to_string()));
    }

    #[test]
    fn test_common_flags_ranked_by_frequency() {
        let mut history = CommandHistory::new();
        history.record("ls -la", 0, 0.1);
        history.record("ls -la", 0, 0.1);
        history.record("ls -h", 0, 0.1);

        let pattern = history.command_patterns("ls").unwrap();
        assert_eq!(pattern.common_flags, vec!["l", "a", "h"]);
    }

    #[test]
    fn test_related_commands_are_successors() {
        let history = seeded();
        let pattern = history.command_patterns("git").unwrap();
        assert_eq!(pattern.related_commands, vec!["cargo", "ls"]);
    }

    #[test]
    fn test_analyze_sequence() {
        let mut history = CommandHistory::new();
        history.record("git add .", 0, 0.2);
        history.record("git commit -m 'wip'", 0, 0.3);
        history.record("git push", 0, 1.5);
        history.record("git add .", 0, 0.2);
        history.record("git commit -m 'wip'", 1, 0.4);

        let analysis = history.analyze_sequence(&["git add .", "git commit -m 'wip'"]);
        assert!((analysis.success_rate - 0.5).abs() < 1e-9);
        assert!((analysis.total_duration - 0.55).abs() < 1e-9);
        assert_eq!(analysis.suggestions, vec!["git push"]);
        assert_eq!(analysis.common_patterns.len(), 2);
    }

    #[test]
    fn test_sequence_without_match_is_empty() {
        let history = seeded();
        let analysis = history.analyze_sequence(&["never", "ran"]);
        assert_eq!(analysis.success_rate, 0.0);
        assert_eq!(analysis.total_duration, 0.0);
        assert!(analysis.common_patterns.is_empty());
        assert!(analysis.suggestions.is_empty());
    }

    #[test]
    fn test_sequence_empty_input() {
        let history = seeded();
        let analysis = history.analyze_sequence::<&str>(&[]);
        assert_eq!(analysis.success_rate, 0.0);
        assert!(analysis.suggestions.is_empty());
    }

    #[test]
    fn test_entry_builders() {
        let entry = HistoryEntry::new("make test", 0, 4.2).with_working_dir("/tmp/project");
        assert_eq!(entry.working_dir.as_deref(), Some("/tmp/project"));
        assert!(entry.environment.is_none());
    }
}
