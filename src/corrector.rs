//! Correction suggestions for failed commands
//!
//! Dispatches on the error text of a failed invocation (command not found,
//! permission denied, missing file, invalid option) and produces ranked
//! corrections: typo fixes against known and previously-successful commands,
//! package install hints, sudo/permission advice, fuzzy filename matches,
//! and flag fixes mined from history.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::history::CommandHistory;
use crate::knowledge::KnowledgeBase;
use crate::parser::{CommandParser, ParsedCommand};
use crate::similarity;

/// Minimum similarity ratio for typo, filename, and flag candidates
const SIMILARITY_THRESHOLD: f64 = 0.6;

/// The diagnosed failure class a correction addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CommandNotFound,
    PackageMissing,
    PermissionDenied,
    NoSuchFile,
    InvalidOption,
    MissingFlag,
}

/// One suggested correction for a failed command
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorCorrection {
    pub original_command: String,
    pub suggested_command: String,
    pub confidence: f64,
    pub explanation: String,
    pub error_type: ErrorKind,
}

/// Analyzes failed commands and generates correction suggestions
pub struct ErrorCorrector {
    parser: CommandParser,
    knowledge: KnowledgeBase,
    working_dir: PathBuf,
}

impl Default for ErrorCorrector {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorCorrector {
    pub fn new() -> Self {
        Self::with_knowledge(KnowledgeBase::builtin())
    }

    pub fn with_knowledge(knowledge: KnowledgeBase) -> Self {
        Self {
            parser: CommandParser::new(),
            knowledge,
            working_dir: PathBuf::from("."),
        }
    }

    /// Directory searched for fuzzy filename matches (defaults to `.`).
    pub fn with_working_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Generate up to three corrections for a failed command, sorted by
    /// confidence descending (discovery order breaks ties).
    pub fn correct(
        &self,
        failed_command: &str,
        error_output: &str,
        history: &CommandHistory,
    ) -> Result<Vec<ErrorCorrection>> {
        let line = self.parser.parse(failed_command)?;
        let cmd = line.primary();
        let error_lower = error_output.to_lowercase();

        let mut corrections: Vec<ErrorCorrection> = Vec::new();

        if error_lower.contains("command not found") {
            corrections.extend(self.command_not_found(cmd, history));
        } else if error_lower.contains("permission denied") {
            corrections.extend(self.permission_denied(cmd));
        } else if error_lower.contains("no such file or directory") {
            corrections.extend(self.no_such_file(cmd));
        } else if error_lower.contains("invalid option") || error_lower.contains("unknown option") {
            corrections.extend(self.invalid_option(cmd, history));
        }

        corrections.extend(self.missing_flag_suggestions(cmd, history));

        corrections.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
        corrections.truncate(3);
        Ok(corrections)
    }

    fn command_not_found(
        &self,
        cmd: &ParsedCommand,
        history: &CommandHistory,
    ) -> Vec<ErrorCorrection> {
        let mut corrections = Vec::new();

        for (candidate, score) in self.similar_commands(&cmd.base, history) {
            corrections.push(ErrorCorrection {
                original_command: cmd.raw.clone(),
                suggested_command: cmd.raw.replace(&cmd.base, &candidate),
                confidence: score,
                explanation: format!("Did you mean '{}'?", candidate),
                error_type: ErrorKind::CommandNotFound,
            });
        }

        if let Some(package) = self.knowledge.package_for(&cmd.base) {
            corrections.push(ErrorCorrection {
                original_command: cmd.raw.clone(),
                suggested_command: format!("sudo apt install {}", package),
                confidence: 0.8,
                explanation: format!(
                    "Command '{}' is available in package '{}'",
                    cmd.base, package
                ),
                error_type: ErrorKind::PackageMissing,
            });
        }

        corrections
    }

    fn permission_denied(&self, cmd: &ParsedCommand) -> Vec<ErrorCorrection> {
        let mut corrections = Vec::new();

        if !cmd.is_sudo {
            corrections.push(ErrorCorrection {
                original_command: cmd.raw.clone(),
                suggested_command: format!("sudo {}", cmd.raw),
                confidence: 0.9,
                explanation: "This command requires elevated privileges".to_string(),
                error_type: ErrorKind::PermissionDenied,
            });
        }

        if let Some(first_arg) = cmd.args.first() {
            corrections.push(ErrorCorrection {
                original_command: cmd.raw.clone(),
                suggested_command: format!("ls -l {}", first_arg),
                confidence: 0.7,
                explanation: "Check file permissions first".to_string(),
                error_type: ErrorKind::PermissionDenied,
            });
        }

        corrections
    }

    fn no_such_file(&self, cmd: &ParsedCommand) -> Vec<ErrorCorrection> {
        let mut corrections = vec![ErrorCorrection {
            original_command: cmd.raw.clone(),
            suggested_command: "ls".to_string(),
            confidence: 0.7,
            explanation: "List directory contents to verify file existence".to_string(),
            error_type: ErrorKind::NoSuchFile,
        }];

        if let Some(first_arg) = cmd.args.first() {
            for (file, score) in self.similar_files(first_arg) {
                corrections.push(ErrorCorrection {
                    original_command: cmd.raw.clone(),
                    suggested_command: cmd.raw.replace(first_arg.as_str(), &file),
                    confidence: score,
                    explanation: format!("Did you mean '{}'?", file),
                    error_type: ErrorKind::NoSuchFile,
                });
            }
        }

        corrections
    }

    fn invalid_option(
        &self,
        cmd: &ParsedCommand,
        history: &CommandHistory,
    ) -> Vec<ErrorCorrection> {
        let mut corrections = Vec::new();

        if let Some(pattern) = history.command_patterns(&cmd.base) {
            if !pattern.common_flags.is_empty() {
                for flag in cmd.flags.keys() {
                    if pattern.common_flags.contains(flag) {
                        continue;
                    }
                    for (valid, score) in similar_flags(flag, &pattern.common_flags) {
                        let old = dashed_flag(flag);
                        let new = dashed_flag(&valid);
                        corrections.push(ErrorCorrection {
                            original_command: cmd.raw.clone(),
                            suggested_command: cmd.raw.replace(&old, &new),
                            confidence: score,
                            explanation: format!("Flag '{}' might be '{}'", old, new),
                            error_type: ErrorKind::InvalidOption,
                        });
                    }
                }
            }
        }

        corrections.push(ErrorCorrection {
            original_command: cmd.raw.clone(),
            suggested_command: format!("{} --help", cmd.base),
            confidence: 0.6,
            explanation: "Check command help for valid options".to_string(),
            error_type: ErrorKind::InvalidOption,
        });

        corrections
    }

    /// Flags frequently used with this command historically but absent from
    /// the failing invocation.
    fn missing_flag_suggestions(
        &self,
        cmd: &ParsedCommand,
        history: &CommandHistory,
    ) -> Vec<ErrorCorrection> {
        let mut corrections = Vec::new();

        if let Some(pattern) = history.command_patterns(&cmd.base) {
            if pattern.success_rate > 0.0 {
                for flag in &pattern.common_flags {
                    if !cmd.flags.contains_key(flag) {
                        let dashed = dashed_flag(flag);
                        corrections.push(ErrorCorrection {
                            original_command: cmd.raw.clone(),
                            suggested_command: format!("{} {}", cmd.raw, dashed),
                            confidence: 0.7,
                            explanation: format!("Common flag '{}' might be helpful", dashed),
                            error_type: ErrorKind::MissingFlag,
                        });
                    }
                }
            }
        }

        corrections
    }

    /// Typo candidates: previously-successful base commands plus every
    /// command the package map knows, scored against the failed base.
    fn similar_commands(&self, base: &str, history: &CommandHistory) -> Vec<(String, f64)> {
        let mut candidates: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for entry in history.entries() {
            if entry.exit_code == 0 {
                if let Some(first) = entry.command.split_whitespace().next() {
                    if seen.insert(first) {
                        candidates.push(first);
                    }
                }
            }
        }
        for name in self.knowledge.package_commands() {
            if seen.insert(name) {
                candidates.push(name);
            }
        }

        let mut similar: Vec<(String, f64)> = Vec::new();
        for candidate in candidates {
            if candidate == base {
                continue;
            }
            let score = similarity::ratio(base, candidate);
            if score > SIMILARITY_THRESHOLD {
                similar.push((candidate.to_string(), score));
            }
        }
        similar.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        similar
    }

    /// Fuzzy matches for a filename among the working directory's entries.
    /// Filesystem errors yield no matches rather than failing the correction.
    fn similar_files(&self, filename: &str) -> Vec<(String, f64)> {
        let mut names: Vec<String> = Vec::new();
        if let Ok(entries) = fs::read_dir(&self.working_dir) {
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let mut similar: Vec<(String, f64)> = Vec::new();
        for name in names {
            let score = similarity::ratio(filename, &name);
            if score > SIMILARITY_THRESHOLD {
                similar.push((name, score));
            }
        }
        similar.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        similar
    }
}

fn similar_flags(flag: &str, valid_flags: &[String]) -> Vec<(String, f64)> {
    let mut similar: Vec<(String, f64)> = Vec::new();
    for valid in valid_flags {
        let score = similarity::ratio(flag, valid);
        if score > SIMILARITY_THRESHOLD {
            similar.push((valid.clone(), score));
        }
    }
    similar.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    similar
}

fn dashed_flag(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{}", name)
    } else {
        format!("--{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SageError;

    #[test]
    fn test_command_not_found_typo() {
        let corrector = ErrorCorrector::new();
        let history = CommandHistory::new();
        let corrections = corrector
            .correct("gti status", "bash: gti: command not found", &history)
            .unwrap();

        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].suggested_command, "git status");
        assert_eq!(corrections[0].explanation, "Did you mean 'git'?");
        assert_eq!(corrections[0].error_type, ErrorKind::CommandNotFound);
        assert!((corrections[0].confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_command_not_found_suggests_package() {
        let corrector = ErrorCorrector::new();
        let history = CommandHistory::new();
        let corrections = corrector
            .correct("docker ps", "docker: command not found", &history)
            .unwrap();

        let install = corrections
            .iter()
            .find(|c| c.error_type == ErrorKind::PackageMissing)
            .unwrap();
        assert_eq!(install.suggested_command, "sudo apt install docker.io");
        assert_eq!(
            install.explanation,
            "Command 'docker' is available in package 'docker.io'"
        );
        assert!((install.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_typo_candidates_include_successful_history() {
        let mut history = CommandHistory::new();
        history.record("deploy --all", 0, 3.0);

        let corrector = ErrorCorrector::new();
        let corrections = corrector
            .correct("deploi --all", "deploi: command not found", &history)
            .unwrap();

        assert_eq!(corrections[0].suggested_command, "deploy --all");
        assert_eq!(corrections[0].explanation, "Did you mean 'deploy'?");
    }

    #[test]
    fn test_permission_denied() {
        let corrector = ErrorCorrector::new();
        let history = CommandHistory::new();
        let corrections = corrector
            .correct(
                "touch /etc/hosts",
                "touch: cannot touch '/etc/hosts': Permission denied",
                &history,
            )
            .unwrap();

        assert_eq!(corrections.len(), 2);
        assert_eq!(corrections[0].suggested_command, "sudo touch /etc/hosts");
        assert!((corrections[0].confidence - 0.9).abs() < 1e-9);
        assert_eq!(corrections[1].suggested_command, "ls -l /etc/hosts");
        assert_eq!(corrections[1].explanation, "Check file permissions first");
    }

    #[test]
    fn test_permission_denied_already_sudo() {
        let corrector = ErrorCorrector::new();
        let history = CommandHistory::new();
        let corrections = corrector
            .correct("sudo systemctl restart nginx", "Permission denied", &history)
            .unwrap();

        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].suggested_command, "ls -l restart");
    }

    #[test]
    fn test_no_such_file_fuzzy_filename() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let corrector = ErrorCorrector::new().with_working_dir(dir.path());
        let history = CommandHistory::new();
        let corrections = corrector
            .correct(
                "cat nots.txt",
                "cat: nots.txt: No such file or directory",
                &history,
            )
            .unwrap();

        assert_eq!(corrections[0].suggested_command, "cat notes.txt");
        assert_eq!(corrections[0].explanation, "Did you mean 'notes.txt'?");
        assert_eq!(corrections[1].suggested_command, "ls");
    }

    #[test]
    fn test_no_such_file_without_args() {
        let dir = tempfile::tempdir().unwrap();
        let corrector = ErrorCorrector::new().with_working_dir(dir.path());
        let history = CommandHistory::new();
        let corrections = corrector
            .correct("pwd", "pwd: No such file or directory", &history)
            .unwrap();

        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].suggested_command, "ls");
    }

    #[test]
    fn test_invalid_option_flag_substitution() {
        let mut history = CommandHistory::new();
        history.record("tar --extract archive.tar", 0, 1.0);
        history.record("tar --extract other.tar", 0, 1.0);

        let corrector = ErrorCorrector::new();
        let corrections = corrector
            .correct(
                "tar --exract archive.tar",
                "tar: invalid option -- 'exract'",
                &history,
            )
            .unwrap();

        assert_eq!(corrections[0].suggested_command, "tar --extract archive.tar");
        assert_eq!(
            corrections[0].explanation,
            "Flag '--exract' might be '--extract'"
        );
        assert_eq!(corrections[0].error_type, ErrorKind::InvalidOption);
        assert!(corrections
            .iter()
            .any(|c| c.suggested_command == "tar --help"));
    }

    #[test]
    fn test_missing_flag_filler_and_cap() {
        let mut history = CommandHistory::new();
        history.record("ls -l -a", 0, 0.1);
        history.record("ls -h -t", 0, 0.1);

        let corrector = ErrorCorrector::new();
        let corrections = corrector
            .correct("ls", "ls: exit status 2", &history)
            .unwrap();

        assert_eq!(corrections.len(), 3);
        assert_eq!(corrections[0].suggested_command, "ls -l");
        assert_eq!(
            corrections[0].explanation,
            "Common flag '-l' might be helpful"
        );
        assert!(corrections
            .iter()
            .all(|c| c.error_type == ErrorKind::MissingFlag));
        assert!(corrections
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn test_weak_candidates_are_dropped() {
        let corrector = ErrorCorrector::new();
        let history = CommandHistory::new();
        let corrections = corrector
            .correct("xyzzy", "xyzzy: command not found", &history)
            .unwrap();
        assert!(corrections.is_empty());
    }

    #[test]
    fn test_empty_command_is_an_error() {
        let corrector = ErrorCorrector::new();
        let history = CommandHistory::new();
        assert!(matches!(
            corrector.correct("", "anything", &history),
            Err(SageError::EmptyInput)
        ));
    }
}
