//! Driver for the static column checker.
//!
//! The analyzer itself is an external executable: it takes one Python file path
//! and prints a JSON array of `{"line": .., "col": .., "message": ..}` objects. This module
//! collects the files to check, runs the analyzer on each one and formats the
//! combined diagnostics.

use crate::error::{Result, TypedFramesError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::debug;

/// Environment variable naming the analyzer executable.
pub const CHECKER_ENV: &str = "TYPEDFRAMES_CHECKER";
pub const DEFAULT_CHECKER: &str = "typedframes-checker";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: usize,
    #[serde(default)]
    pub col: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Anything that can analyze a single Python file.
pub trait ColumnChecker {
    fn check(&self, path: &Path) -> Result<Vec<Diagnostic>>;
}

/// Runs the analyzer as a child process.
#[derive(Debug, Clone)]
pub struct ProcessChecker {
    program: PathBuf,
}

impl ProcessChecker {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Uses `TYPEDFRAMES_CHECKER` when set, else `typedframes-checker` from `PATH`.
    pub fn from_env() -> Self {
        let program = std::env::var(CHECKER_ENV).unwrap_or_else(|_| DEFAULT_CHECKER.to_string());
        Self::new(program)
    }
}

impl ColumnChecker for ProcessChecker {
    fn check(&self, path: &Path) -> Result<Vec<Diagnostic>> {
        let output = Command::new(&self.program).arg(path).output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                TypedFramesError::Checker(format!(
                    "analyzer '{}' not found; install typedframes-checker or set {}",
                    self.program.display(),
                    CHECKER_ENV
                ))
            } else {
                TypedFramesError::Io(e)
            }
        })?;

        if !output.status.success() {
            return Err(TypedFramesError::Checker(format!(
                "analyzer failed on {} ({}): {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

/// `.py` files under `path`. A file is returned as-is when it is a Python file;
/// directories are walked recursively and the result is sorted.
pub fn collect_python_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(if is_python(path) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    }
    let mut files = Vec::new();
    walk(path, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        // Symlinked directories are not followed.
        if entry.file_type()?.is_dir() {
            walk(&path, files)?;
        } else if is_python(&path) && path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

fn is_python(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "py")
}

/// Checks every file and tags each diagnostic with the file it came from.
pub fn check_files<C: ColumnChecker>(checker: &C, files: &[PathBuf]) -> Result<Vec<Diagnostic>> {
    let mut all = Vec::new();
    for file in files {
        let diagnostics = checker.check(file)?;
        debug!(file = %file.display(), diagnostics = diagnostics.len(), "Checked file");
        let label = file.display().to_string();
        all.extend(diagnostics.into_iter().map(|d| Diagnostic {
            file: Some(label.clone()),
            ..d
        }));
    }
    debug!(files = files.len(), diagnostics = all.len(), "Check complete");
    Ok(all)
}

/// One `✗ file:line - message` line per diagnostic.
pub fn format_human(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| {
            format!(
                "\u{2717} {}:{} - {}",
                d.file.as_deref().unwrap_or("<unknown>"),
                d.line,
                d.message
            )
        })
        .join("\n")
}

pub fn format_summary(diagnostics: usize, files: usize, elapsed: Duration) -> String {
    let file_label = if files == 1 { "file" } else { "files" };
    let secs = elapsed.as_secs_f64();
    if diagnostics == 0 {
        format!("\u{2713} Checked {} {} in {:.1}s", files, file_label, secs)
    } else {
        let error_label = if diagnostics == 1 { "error" } else { "errors" };
        format!(
            "\u{2717} Found {} {} in {} {} ({:.1}s)",
            diagnostics, error_label, files, file_label, secs
        )
    }
}
