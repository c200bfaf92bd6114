//! Architectural Enforcement
//!
//! Line-based source scanners shared by the enforcement tests in `tests/`.
//! They check workspace sources for patterns the mini-app must not contain:
//! - Blocking I/O inside async code
//! - Sleeping instead of waiting on I/O or channels
//!
//! The scanners are heuristics, not a Rust parser. A line is attributed to the
//! nearest function header above it, and everything from the first
//! `#[cfg(test)]` of a file onward counts as test code.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Source trees holding production code
pub const PRODUCTION_DIRS: &[&str] = &["miniapp/core/src", "miniapp/shell/src"];

/// Source trees holding integration tests
pub const TEST_DIRS: &[&str] = &["miniapp/core/tests"];

/// Files under production trees that only exist to support tests
pub const TEST_SUPPORT_FILES: &[&str] = &["test_utils.rs"];

/// Workspace root, two levels above this crate
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// A loaded source file
#[derive(Debug)]
pub struct SourceFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// File contents by line
    pub lines: Vec<String>,
}

impl SourceFile {
    /// Index of the first line of test code, or the line count
    #[must_use]
    pub fn test_section_start(&self) -> usize {
        self.lines
            .iter()
            .position(|l| l.trim_start().starts_with("#[cfg(test)]"))
            .unwrap_or(self.lines.len())
    }
}

/// Load every `.rs` file under `dirs` (relative to the workspace root)
#[must_use]
pub fn load_sources(dirs: &[&str], skip_files: &[&str]) -> Vec<SourceFile> {
    let root = workspace_root();
    let mut files = Vec::new();

    for dir in dirs {
        let path = root.join(dir);
        if !path.exists() {
            continue;
        }
        for entry in walkdir::WalkDir::new(&path)
            .into_iter()
            .filter_map(Result::ok)
        {
            let file = entry.path();
            if file.extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            let name = file.file_name().and_then(|s| s.to_str()).unwrap_or("");
            if skip_files.contains(&name) {
                continue;
            }
            let Ok(content) = fs::read_to_string(file) else {
                continue;
            };
            files.push(SourceFile {
                path: file.strip_prefix(&root).unwrap_or(file).to_path_buf(),
                lines: content.lines().map(str::to_string).collect(),
            });
        }
    }
    files
}

/// Function a line belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FnContext {
    /// Inside an `async fn`
    Async,
    /// Inside a plain `fn`
    Sync,
    /// Module level (imports, items)
    Module,
}

/// Whether `line` opens a function; `Some(true)` for `async fn`
#[must_use]
pub fn fn_header(line: &str) -> Option<bool> {
    let mut rest = line.trim_start();
    for prefix in ["pub(crate) ", "pub(super) ", "pub ", "const ", "unsafe "] {
        rest = rest.strip_prefix(prefix).unwrap_or(rest);
    }
    if rest.starts_with("async fn ") {
        Some(true)
    } else if rest.starts_with("fn ") {
        Some(false)
    } else {
        None
    }
}

/// Context of line `idx`, found by scanning upward for a function header
#[must_use]
pub fn enclosing_fn(lines: &[String], idx: usize) -> FnContext {
    for line in lines[..=idx].iter().rev() {
        match fn_header(line) {
            Some(true) => return FnContext::Async,
            Some(false) => return FnContext::Sync,
            None => {}
        }
        let trimmed = line.trim_start();
        if trimmed.starts_with("mod ") || (trimmed.starts_with("impl") && trimmed.contains('{')) {
            return FnContext::Module;
        }
    }
    FnContext::Module
}

/// Code before any line comment
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// A rule hit
#[derive(Debug)]
pub struct Violation {
    /// File containing it
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// What the rule found
    pub reason: &'static str,
    /// The offending line
    pub text: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.reason,
            self.text.trim()
        )
    }
}

/// Apply `rule` to each line of `files`
///
/// With `production_only`, lines from the first `#[cfg(test)]` on are
/// skipped. The rule sees comment-stripped code and the line's context.
pub fn scan<R>(files: &[SourceFile], production_only: bool, rule: R) -> Vec<Violation>
where
    R: Fn(&str, FnContext) -> Option<&'static str>,
{
    let mut violations = Vec::new();
    for file in files {
        let end = if production_only {
            file.test_section_start()
        } else {
            file.lines.len()
        };
        for (idx, line) in file.lines[..end].iter().enumerate() {
            let code = code_part(line);
            if code.trim().is_empty() {
                continue;
            }
            if let Some(reason) = rule(code, enclosing_fn(&file.lines, idx)) {
                violations.push(Violation {
                    path: file.path.clone(),
                    line: idx + 1,
                    reason,
                    text: line.clone(),
                });
            }
        }
    }
    violations
}

/// Print violations and panic if there are any
///
/// # Panics
///
/// Panics when `violations` is non-empty.
pub fn report(title: &str, violations: &[Violation], advice: &[&str]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!();
    for line in advice {
        eprintln!("  {line}");
    }
    panic!("\nFound {} violation(s). Fix these before merging!", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_fn_header_variants() {
        assert_eq!(fn_header("    pub async fn load(&self) {"), Some(true));
        assert_eq!(fn_header("pub(crate) fn helper() {"), Some(false));
        assert_eq!(fn_header("fn main() {"), Some(false));
        assert_eq!(fn_header("let f = fn_pointer;"), None);
    }

    #[test]
    fn test_enclosing_async() {
        let src = lines(&[
            "impl Loader {",
            "    pub async fn load(&self) {",
            "        let raw = std::fs::read_to_string(path);",
            "    }",
        ]);
        assert_eq!(enclosing_fn(&src, 2), FnContext::Async);
    }

    #[test]
    fn test_enclosing_module_level() {
        let src = lines(&["use std::fs;", "", "pub fn load() {}"]);
        assert_eq!(enclosing_fn(&src, 0), FnContext::Module);
    }

    #[test]
    fn test_code_part_strips_comment() {
        assert_eq!(code_part("let x = 1; // std::fs::read"), "let x = 1; ");
    }
}
