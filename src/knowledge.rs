//! Static command knowledge base
//!
//! Embedded documentation for common commands (descriptions, flag
//! explanations, examples, expected output, side effects), the
//! alternative-tool substitution table, and the command-to-package map used
//! for install suggestions. Deployments can layer extra documentation from
//! YAML files.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Documentation for one base command
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandDoc {
    pub description: String,
    /// Flag (dashed form) or subcommand to its explanation
    pub flags: IndexMap<String, String>,
    pub examples: Vec<String>,
    /// What output to expect on success
    pub output: String,
    pub side_effects: Vec<String>,
}

/// YAML document entry: a named `CommandDoc` with optional fields
#[derive(Debug, Deserialize)]
struct DocEntry {
    name: String,
    description: String,
    #[serde(default)]
    flags: IndexMap<String, String>,
    #[serde(default)]
    examples: Vec<String>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    side_effects: Vec<String>,
}

impl DocEntry {
    fn into_doc(self) -> CommandDoc {
        CommandDoc {
            description: self.description,
            flags: self.flags,
            examples: self.examples,
            output: self.output.unwrap_or_else(|| "Unknown".to_string()),
            side_effects: self.side_effects,
        }
    }
}

/// Built-in command knowledge plus any YAML-loaded extensions
pub struct KnowledgeBase {
    docs: IndexMap<String, CommandDoc>,
    alternatives: IndexMap<String, Vec<String>>,
    packages: IndexMap<String, String>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KnowledgeBase {
    /// The embedded knowledge shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            docs: builtin_docs(),
            alternatives: builtin_alternatives(),
            packages: builtin_packages(),
        }
    }

    /// Documentation for a base command, if any.
    pub fn doc(&self, command: &str) -> Option<&CommandDoc> {
        self.docs.get(command)
    }

    /// Alternative tools for a base command; empty when none are known.
    pub fn alternatives(&self, command: &str) -> &[String] {
        self.alternatives
            .get(command)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The package providing a command, if known.
    pub fn package_for(&self, command: &str) -> Option<&str> {
        self.packages.get(command).map(String::as_str)
    }

    /// Every command name the package map knows about.
    pub fn package_commands(&self) -> impl Iterator<Item = &str> + '_ {
        self.packages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Merge documentation entries from one YAML file. Returns the number of
    /// entries loaded; an entry with an existing name replaces it.
    pub fn load_from_yaml<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let text = fs::read_to_string(path)?;
        let entries: Vec<DocEntry> = serde_yaml::from_str(&text)?;
        let count = entries.len();
        for entry in entries {
            let name = entry.name.clone();
            self.docs.insert(name, entry.into_doc());
        }
        Ok(count)
    }

    /// Load every `.yaml`/`.yml` file in a directory (sorted by path, so
    /// later names override earlier ones deterministically). Returns the
    /// total number of entries loaded.
    pub fn load_from_directory<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            match path.extension().and_then(|e| e.to_str()) {
                Some("yaml") | Some("yml") => paths.push(path),
                _ => {}
            }
        }
        paths.sort();

        let mut total = 0;
        for path in paths {
            total += self.load_from_yaml(&path)?;
        }
        Ok(total)
    }
}

fn doc(
    description: &str,
    flags: &[(&str, &str)],
    examples: &[&str],
    output: &str,
    side_effects: &[&str],
) -> CommandDoc {
    CommandDoc {
        description: description.to_string(),
        flags: flags
            .iter()
            .map(|(flag, explanation)| (flag.to_string(), explanation.to_string()))
            .collect(),
        examples: examples.iter().map(|e| e.to_string()).collect(),
        output: output.to_string(),
        side_effects: side_effects.iter().map(|s| s.to_string()).collect(),
    }
}

fn builtin_docs() -> IndexMap<String, CommandDoc> {
    let mut docs = IndexMap::new();

    docs.insert(
        "ls".to_string(),
        doc(
            "List directory contents",
            &[
                ("-l", "Use a long listing format"),
                ("-a", "Show hidden files (starting with .)"),
                ("-h", "Show sizes in human readable format"),
                ("-r", "Reverse order while sorting"),
                ("-t", "Sort by modification time"),
                ("--color", "Colorize the output"),
            ],
            &["ls -l /home", "ls -la", "ls -lh"],
            "List of files and directories with requested details",
            &[],
        ),
    );

    docs.insert(
        "cd".to_string(),
        doc(
            "Change the current working directory",
            &[],
            &["cd /home", "cd ..", "cd ~"],
            "No output on success",
            &["Changes current working directory"],
        ),
    );

    docs.insert(
        "rm".to_string(),
        doc(
            "Delete files or directories permanently",
            &[
                ("-r", "Remove directories and their contents recursively"),
                ("-f", "Force removal without confirmation"),
                ("-i", "Prompt before every removal"),
            ],
            &["rm file.txt", "rm -r directory", "rm -rf directory"],
            "No output on success",
            &["Permanently deletes files/directories", "Cannot be undone"],
        ),
    );

    docs.insert(
        "git".to_string(),
        doc(
            "Version control system",
            &[
                ("status", "Show working tree status"),
                ("add", "Add file contents to the index"),
                ("commit", "Record changes to the repository"),
                ("push", "Update remote refs along with associated objects"),
                ("pull", "Fetch from and integrate with another repository"),
                ("-m", "Use the given message as the commit message"),
            ],
            &["git status", "git add .", "git commit -m \"message\""],
            "Repository state changes will be displayed",
            &["May modify repository state", "May modify working directory"],
        ),
    );

    docs.insert(
        "echo".to_string(),
        doc(
            "Display a line of text",
            &[
                ("-n", "Do not output trailing newline"),
                ("-e", "Enable interpretation of backslash escapes"),
            ],
            &["echo \"Hello\"", "echo -n \"No newline\"", "echo \"test\" > file.txt"],
            "Displays the provided text",
            &[],
        ),
    );

    docs.insert(
        "grep".to_string(),
        doc(
            "Print lines that match patterns",
            &[
                ("-i", "Ignore case distinctions"),
                ("-r", "Search directories recursively"),
                ("-n", "Show line numbers"),
                ("-v", "Invert the sense of matching"),
                ("-c", "Count matching lines"),
            ],
            &["grep error log.txt", "grep -r TODO src/", "grep -c failed build.log"],
            "Matching lines from the searched files",
            &[],
        ),
    );

    docs.insert(
        "tar".to_string(),
        doc(
            "Create and extract archive files",
            &[
                ("-c", "Create a new archive"),
                ("-x", "Extract files from an archive"),
                ("-z", "Filter the archive through gzip"),
                ("-f", "Use the given archive file"),
                ("-v", "Verbosely list files processed"),
            ],
            &["tar -czf backup.tar.gz /home", "tar -xzf archive.tar.gz", "tar -tvf archive.tar"],
            "No output on success unless verbose",
            &["Creates or extracts archive files"],
        ),
    );

    docs.insert(
        "docker".to_string(),
        doc(
            "Manage containers and images",
            &[
                ("ps", "List running containers"),
                ("run", "Run a command in a new container"),
                ("build", "Build an image from a Dockerfile"),
                ("exec", "Run a command in a running container"),
            ],
            &["docker ps", "docker run -it ubuntu bash", "docker build -t myimage ."],
            "Container or image state will be displayed",
            &["May start or stop containers", "May modify local images"],
        ),
    );

    docs.insert(
        "cp".to_string(),
        doc(
            "Copy files and directories",
            &[
                ("-r", "Copy directories recursively"),
                ("-i", "Prompt before overwrite"),
                ("-v", "Explain what is being done"),
                ("-p", "Preserve mode, ownership and timestamps"),
            ],
            &["cp file.txt backup.txt", "cp -r src dst", "cp -i notes.txt /tmp"],
            "No output on success",
            &["Overwrites existing destination files"],
        ),
    );

    docs.insert(
        "mv".to_string(),
        doc(
            "Move or rename files and directories",
            &[
                ("-i", "Prompt before overwrite"),
                ("-f", "Do not prompt before overwriting"),
                ("-n", "Do not overwrite an existing file"),
            ],
            &["mv old.txt new.txt", "mv file.txt /tmp/", "mv -i a.txt b.txt"],
            "No output on success",
            &["Removes the source file", "Overwrites existing destination files"],
        ),
    );

    docs
}

fn builtin_alternatives() -> IndexMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        ("rm", &["trash-put", "shred"]),
        ("cp", &["rsync"]),
        ("mv", &["rsync --remove-source-files"]),
        ("cat", &["less", "more", "bat"]),
        ("ls", &["exa", "tree"]),
        ("grep", &["rg", "ag"]),
        ("find", &["fd"]),
        ("top", &["htop", "btop"]),
        ("vim", &["nano", "emacs"]),
        ("wget", &["curl"]),
        ("netstat", &["ss"]),
    ];

    table
        .iter()
        .map(|(command, alts)| {
            (
                command.to_string(),
                alts.iter().map(|a| a.to_string()).collect(),
            )
        })
        .collect()
}

fn builtin_packages() -> IndexMap<String, String> {
    let table: &[(&str, &str)] = &[
        ("git", "git"),
        ("python3", "python3"),
        ("pip", "python3-pip"),
        ("node", "nodejs"),
        ("npm", "npm"),
        ("docker", "docker.io"),
        ("kubectl", "kubectl"),
        ("vim", "vim"),
        ("nano", "nano"),
        ("gcc", "build-essential"),
        ("make", "build-essential"),
        ("curl", "curl"),
        ("wget", "wget"),
        ("ssh", "openssh-client"),
        ("scp", "openssh-client"),
        ("rsync", "rsync"),
        ("tar", "tar"),
        ("zip", "zip"),
        ("unzip", "unzip"),
        ("htop", "htop"),
        ("top", "procps"),
        ("ps", "procps"),
        ("netstat", "net-tools"),
        ("ifconfig", "net-tools"),
        ("ping", "iputils-ping"),
    ];

    table
        .iter()
        .map(|(command, package)| (command.to_string(), package.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_docs_present() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.doc("ls").unwrap().description, "List directory contents");
        assert!(kb
            .doc("rm")
            .unwrap()
            .side_effects
            .contains(&"Cannot be undone".to_string()));
        assert!(kb.doc("frobnicate").is_none());
    }

    #[test]
    fn test_alternatives_table() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.alternatives("rm"), ["trash-put", "shred"]);
        assert!(kb.alternatives("frobnicate").is_empty());
    }

    #[test]
    fn test_package_lookup() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.package_for("pip"), Some("python3-pip"));
        assert_eq!(kb.package_for("gcc"), Some("build-essential"));
        assert_eq!(kb.package_for("frobnicate"), None);
        assert_eq!(kb.package_commands().count(), 25);
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.yaml");
        fs::write(
            &path,
            concat!(
                "- name: kubectl\n",
                "  description: Control the Kubernetes cluster manager\n",
                "- name: ls\n",
                "  description: Updated listing description\n",
                "  flags:\n",
                "    \"-S\": Sort by file size\n",
                "  examples:\n",
                "    - ls -S\n",
                "  output: Sorted listing\n",
            ),
        )
        .unwrap();

        let mut kb = KnowledgeBase::builtin();
        let loaded = kb.load_from_yaml(&path).unwrap();
        assert_eq!(loaded, 2);

        let kubectl = kb.doc("kubectl").unwrap();
        assert_eq!(kubectl.description, "Control the Kubernetes cluster manager");
        assert_eq!(kubectl.output, "Unknown");
        assert!(kubectl.flags.is_empty());

        let ls = kb.doc("ls").unwrap();
        assert_eq!(ls.description, "Updated listing description");
        assert_eq!(ls.flags.get("-S").map(String::as_str), Some("Sort by file size"));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.yaml"),
            "- name: jq\n  description: Command-line JSON processor\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.yml"),
            "- name: fd\n  description: Find entries in the filesystem\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not yaml").unwrap();

        let mut kb = KnowledgeBase::builtin();
        let loaded = kb.load_from_directory(dir.path()).unwrap();
        assert_eq!(loaded, 2);
        assert!(kb.doc("jq").is_some());
        assert!(kb.doc("fd").is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let mut kb = KnowledgeBase::builtin();
        assert!(matches!(
            kb.load_from_yaml("/nonexistent/sage-docs.yaml"),
            Err(crate::error::SageError::Io(_))
        ));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, ": not [ valid yaml").unwrap();

        let mut kb = KnowledgeBase::builtin();
        assert!(matches!(
            kb.load_from_yaml(&path),
            Err(crate::error::SageError::Yaml(_))
        ));
    }
}
