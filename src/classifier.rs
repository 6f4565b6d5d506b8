//! Command categorization and risk analysis
//!
//! Deterministic lookups over fixed membership tables: what kind of command
//! this is, how risky the invocation looks, and what execution context the
//! surrounding tooling should gather before running it.

use serde::{Deserialize, Serialize};

use crate::parser::ParsedCommand;

const PACKAGE_MANAGERS: &[&str] = &["apt", "apt-get", "yum", "dnf", "pacman", "brew"];
const CONTAINER_TOOLS: &[&str] = &["docker", "docker-compose", "podman"];
const FILE_COMMANDS: &[&str] = &[
    "cat", "cd", "cp", "ls", "mkdir", "mv", "pwd", "rm", "rmdir", "touch",
];
const TEXT_COMMANDS: &[&str] = &[
    "grep", "sed", "awk", "cat", "head", "tail", "less", "more", "sort", "uniq", "wc", "diff",
    "patch",
];
const SYSTEM_TOOLS: &[&str] = &["ps", "top", "kill", "service", "systemctl"];
const NETWORK_TOOLS: &[&str] = &["curl", "wget", "ping", "ssh", "scp", "nc", "telnet"];
const ENVIRONMENT_COMMANDS: &[&str] = &["export", "env", "printenv", "set"];
const USER_COMMANDS: &[&str] = &[
    "useradd", "usermod", "userdel", "passwd", "chown", "chgrp", "sudo", "su",
];

const DESTRUCTIVE_COMMANDS: &[&str] = &["rm", "dd", "mkfs", "fdisk", "format", "shred"];
const SYSTEM_CONTROL_COMMANDS: &[&str] = &["shutdown", "reboot", "halt", "poweroff", "init"];
const NETWORK_LISTENERS: &[&str] = &["nc", "netcat", "telnet"];

/// What kind of tool a base command is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandCategory {
    PackageManagement,
    VersionControl,
    ContainerManagement,
    FileOperation,
    TextOperation,
    SystemOperation,
    NetworkOperation,
    ScriptExecution,
    EnvironmentManagement,
    UserManagement,
    Other,
}

/// Risk tiers, ordered so that evidence can only push the level upward
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Outcome of risk analysis for one invocation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// Human-readable reasons, in rule order
    pub reasons: Vec<String>,
    /// Short machine-friendly factor tags, in rule order
    pub risk_factors: Vec<String>,
    pub requires_confirmation: bool,
}

/// Execution context the surrounding tooling should gather
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRequirements {
    pub working_dir: bool,
    pub file_info: bool,
    pub needs_network: bool,
    pub needs_git: bool,
    pub needs_environment: bool,
}

/// Classifies parsed commands by category, risk, and context needs
pub struct CommandClassifier;

impl Default for CommandClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Categorize by base command. Membership tables are checked in a fixed
    /// order; `cat` is a file operation even though it also appears in the
    /// text table.
    pub fn classify(&self, command: &ParsedCommand) -> CommandCategory {
        let base = command.base.as_str();

        if PACKAGE_MANAGERS.contains(&base) {
            CommandCategory::PackageManagement
        } else if base == "git" {
            CommandCategory::VersionControl
        } else if CONTAINER_TOOLS.contains(&base) {
            CommandCategory::ContainerManagement
        } else if FILE_COMMANDS.contains(&base) {
            CommandCategory::FileOperation
        } else if TEXT_COMMANDS.contains(&base) {
            CommandCategory::TextOperation
        } else if SYSTEM_TOOLS.contains(&base) {
            CommandCategory::SystemOperation
        } else if NETWORK_TOOLS.contains(&base) {
            CommandCategory::NetworkOperation
        } else if base.starts_with("./") || base.contains('/') || base.ends_with(".sh") || base.ends_with(".py") {
            CommandCategory::ScriptExecution
        } else if ENVIRONMENT_COMMANDS.contains(&base) {
            CommandCategory::EnvironmentManagement
        } else if USER_COMMANDS.contains(&base) {
            CommandCategory::UserManagement
        } else {
            CommandCategory::Other
        }
    }

    /// Assess how dangerous an invocation is. The level starts at low and
    /// only ever escalates as rules fire.
    pub fn assess_risk(&self, command: &ParsedCommand) -> RiskAssessment {
        let mut level = RiskLevel::Low;
        let mut reasons: Vec<String> = Vec::new();
        let mut risk_factors: Vec<String> = Vec::new();
        let base = command.base.as_str();

        if command.is_sudo {
            level = level.max(RiskLevel::High);
            reasons.push("requires elevated privileges".to_string());
            risk_factors.push("sudo execution".to_string());
        }

        if DESTRUCTIVE_COMMANDS.contains(&base) {
            let floor = if command.is_sudo {
                RiskLevel::High
            } else {
                RiskLevel::Medium
            };
            level = level.max(floor);
            reasons.push("system modification".to_string());
            risk_factors.push("destructive operation".to_string());

            let force = command.has_flag("f") || command.has_flag("force");
            let recursive =
                command.has_flag("r") || command.has_flag("R") || command.has_flag("recursive");
            if force {
                reasons.push("force flag used".to_string());
                risk_factors.push("force flag".to_string());
            }
            if recursive {
                reasons.push("recursive operation".to_string());
                risk_factors.push("recursive".to_string());
            }
            if base == "rm" && force && recursive {
                reasons
                    .push("combined force and recursive flags are especially dangerous".to_string());
            }
        }

        if SYSTEM_CONTROL_COMMANDS.contains(&base) {
            level = level.max(RiskLevel::High);
            reasons.push("system-wide impact".to_string());
            risk_factors.push("system control".to_string());
        }

        if NETWORK_LISTENERS.contains(&base) {
            level = level.max(RiskLevel::Medium);
            reasons.push("network exposure".to_string());
            risk_factors.push("network operation".to_string());
        }

        if command.redirections.contains_key(">") {
            risk_factors.push("file overwrite".to_string());
            level = level.max(RiskLevel::Medium);
        }

        RiskAssessment {
            level,
            reasons,
            risk_factors,
            requires_confirmation: level != RiskLevel::Low,
        }
    }

    /// Narrative risk warnings for explanation output
    pub fn risk_notes(&self, command: &ParsedCommand) -> Vec<String> {
        let mut notes: Vec<String> = Vec::new();
        let base = command.base.as_str();

        if ["rm", "mv", "dd"].contains(&base) {
            notes.push("This command can permanently delete or modify files".to_string());

            let force = command.has_flag("f");
            let recursive = command.has_flag("r") || command.has_flag("R");
            if force {
                notes.push("Force flag (-f) bypasses confirmation prompts".to_string());
            }
            if recursive {
                notes.push("Recursive operation affects all subdirectories".to_string());
            }
            if base == "rm" && force && recursive {
                notes.push("Combination of -rf flags is extremely dangerous".to_string());
            }
        }

        if command.is_sudo {
            notes.push("Command runs with elevated privileges (sudo)".to_string());
        }

        if ["curl", "wget", "ssh", "scp"].contains(&base) {
            notes.push("Command performs network operations".to_string());
        }

        if ["chmod", "chown", "mount"].contains(&base) {
            notes.push("Command modifies system settings or permissions".to_string());
        }

        notes
    }

    /// What the surrounding tooling should inspect before execution
    pub fn context_requirements(&self, command: &ParsedCommand) -> ContextRequirements {
        let mut context = ContextRequirements::default();

        match self.classify(command) {
            CommandCategory::FileOperation => {
                context.working_dir = true;
                context.file_info = true;
            }
            CommandCategory::NetworkOperation => {
                context.needs_network = true;
            }
            CommandCategory::VersionControl => {
                context.needs_git = true;
                context.working_dir = true;
            }
            CommandCategory::EnvironmentManagement => {
                context.needs_environment = true;
            }
            _ => {}
        }

        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CommandLine, CommandParser};

    fn parse_one(raw: &str) -> ParsedCommand {
        let parser = CommandParser::new();
        match parser.parse(raw).unwrap() {
            CommandLine::Single(cmd) => cmd,
            CommandLine::Pipeline(_) => panic!("expected a single command"),
        }
    }

    #[test]
    fn test_category_classification() {
        let classifier = CommandClassifier::new();
        assert_eq!(
            classifier.classify(&parse_one("apt install vim")),
            CommandCategory::PackageManagement
        );
        assert_eq!(
            classifier.classify(&parse_one("git status")),
            CommandCategory::VersionControl
        );
        assert_eq!(
            classifier.classify(&parse_one("docker ps")),
            CommandCategory::ContainerManagement
        );
        assert_eq!(
            classifier.classify(&parse_one("ls -la")),
            CommandCategory::FileOperation
        );
        assert_eq!(
            classifier.classify(&parse_one("grep pattern file.txt")),
            CommandCategory::TextOperation
        );
        assert_eq!(
            classifier.classify(&parse_one("systemctl restart nginx")),
            CommandCategory::SystemOperation
        );
        assert_eq!(
            classifier.classify(&parse_one("curl https://example.com")),
            CommandCategory::NetworkOperation
        );
        assert_eq!(
            classifier.classify(&parse_one("export PATH=/usr/bin")),
            CommandCategory::EnvironmentManagement
        );
        assert_eq!(
            classifier.classify(&parse_one("passwd alice")),
            CommandCategory::UserManagement
        );
        assert_eq!(
            classifier.classify(&parse_one("frobnicate")),
            CommandCategory::Other
        );
    }

    #[test]
    fn test_cat_is_a_file_operation() {
        let classifier = CommandClassifier::new();
        assert_eq!(
            classifier.classify(&parse_one("cat notes.txt")),
            CommandCategory::FileOperation
        );
    }

    #[test]
    fn test_script_execution_detection() {
        let classifier = CommandClassifier::new();
        assert_eq!(
            classifier.classify(&parse_one("./deploy.sh production")),
            CommandCategory::ScriptExecution
        );
        assert_eq!(
            classifier.classify(&parse_one("scripts/run.py")),
            CommandCategory::ScriptExecution
        );
        assert_eq!(
            classifier.classify(&parse_one("backup.sh")),
            CommandCategory::ScriptExecution
        );
    }

    #[test]
    fn test_rm_rf_is_medium_risk_with_warnings() {
        let classifier = CommandClassifier::new();
        let risk = classifier.assess_risk(&parse_one("rm -rf /path"));
        assert_eq!(risk.level, RiskLevel::Medium);
        assert!(risk.requires_confirmation);
        assert!(risk.reasons.iter().any(|r| r == "force flag used"));
        assert!(risk.reasons.iter().any(|r| r == "recursive operation"));
        assert!(risk
            .reasons
            .iter()
            .any(|r| r == "combined force and recursive flags are especially dangerous"));
        assert!(risk.risk_factors.iter().any(|f| f == "destructive operation"));
    }

    #[test]
    fn test_sudo_rm_rf_is_high_risk() {
        let classifier = CommandClassifier::new();
        let risk = classifier.assess_risk(&parse_one("sudo rm -rf /"));
        assert_eq!(risk.level, RiskLevel::High);
        assert!(risk.reasons.iter().any(|r| r == "requires elevated privileges"));
        assert!(risk.risk_factors.iter().any(|f| f == "sudo execution"));
    }

    #[test]
    fn test_network_rule_never_demotes() {
        let classifier = CommandClassifier::new();
        let risk = classifier.assess_risk(&parse_one("sudo nc -l 8080"));
        assert_eq!(risk.level, RiskLevel::High);
        assert!(risk.reasons.iter().any(|r| r == "network exposure"));
    }

    #[test]
    fn test_overwrite_redirection_escalates() {
        let classifier = CommandClassifier::new();
        let risk = classifier.assess_risk(&parse_one("echo hi > notes.txt"));
        assert_eq!(risk.level, RiskLevel::Medium);
        assert!(risk.risk_factors.iter().any(|f| f == "file overwrite"));

        let append = classifier.assess_risk(&parse_one("echo hi >> notes.txt"));
        assert_eq!(append.level, RiskLevel::Low);
        assert!(!append.requires_confirmation);
    }

    #[test]
    fn test_harmless_command_is_low_risk() {
        let classifier = CommandClassifier::new();
        let risk = classifier.assess_risk(&parse_one("ls -la"));
        assert_eq!(risk.level, RiskLevel::Low);
        assert!(risk.reasons.is_empty());
        assert!(!risk.requires_confirmation);
    }

    #[test]
    fn test_risk_notes_for_rm_rf() {
        let classifier = CommandClassifier::new();
        let notes = classifier.risk_notes(&parse_one("rm -rf build"));
        assert!(notes.contains(&"This command can permanently delete or modify files".to_string()));
        assert!(notes.contains(&"Force flag (-f) bypasses confirmation prompts".to_string()));
        assert!(notes.contains(&"Recursive operation affects all subdirectories".to_string()));
        assert!(notes.contains(&"Combination of -rf flags is extremely dangerous".to_string()));
    }

    #[test]
    fn test_risk_notes_outside_destructive_trio() {
        let classifier = CommandClassifier::new();
        // Force flag warnings only apply to the destructive commands
        let notes = classifier.risk_notes(&parse_one("cp -rf src dst"));
        assert!(notes.is_empty());

        let scp = classifier.risk_notes(&parse_one("scp file host:"));
        assert_eq!(scp, vec!["Command performs network operations".to_string()]);
    }

    #[test]
    fn test_context_requirements() {
        let classifier = CommandClassifier::new();

        let file = classifier.context_requirements(&parse_one("ls -la"));
        assert!(file.working_dir && file.file_info);
        assert!(!file.needs_network);

        let net = classifier.context_requirements(&parse_one("ssh host"));
        assert!(net.needs_network);
        assert!(!net.working_dir);

        let git = classifier.context_requirements(&parse_one("git status"));
        assert!(git.needs_git && git.working_dir);

        let env = classifier.context_requirements(&parse_one("export FOO=bar"));
        assert!(env.needs_environment);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_value(CommandCategory::VersionControl).unwrap(),
            serde_json::json!("version_control")
        );
        assert_eq!(
            serde_json::to_value(RiskLevel::High).unwrap(),
            serde_json::json!("high")
        );
    }
}
