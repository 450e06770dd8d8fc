//! New-file verification: exists, non-empty, not a stub.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::plan::FileEntry;

/// Stub keywords matched on a line after string and regex literals are removed.
static KEYWORD_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("TODO", r"(?i)\bTODO\b"),
        ("FIXME", r"(?i)\bFIXME\b"),
        ("PLACEHOLDER", r"(?i)\bPLACEHOLDER\b"),
        ("unimplemented!", r"\bunimplemented!\s*\("),
        ("raise NotImplementedError", r"\braise\s+NotImplementedError\b"),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, Regex::new(pattern).expect("static regex")))
    .collect()
});

/// Not-implemented throws, matched on the raw line since they live in literals.
static THROW_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            "throw not-implemented",
            r#"(?i)throw\s+new\s+Error\(\s*["']not implemented["']\s*\)"#,
        ),
        ("throw TODO", r#"(?i)throw\s+new\s+Error\(\s*["']TODO["']\s*\)"#),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, Regex::new(pattern).expect("static regex")))
    .collect()
});

static LITERALS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"/[^/\n]+/[gimsuy]*",
        r#""[^"]*""#,
        r"'[^']*'",
        r"`[^`]*`",
    ]
    .map(|pattern| Regex::new(pattern).expect("static regex"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Missing,
    Empty,
    Stub,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCheck {
    pub path: String,
    pub status: FileStatus,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub total_files: usize,
    pub passed: usize,
    pub failed: usize,
    pub files: Vec<FileCheck>,
}

/// Check every declared new file under `root`.
pub fn verify_new_files(entries: &[FileEntry], root: &Path, min_meaningful_lines: usize) -> BuildReport {
    let files: Vec<FileCheck> = entries
        .iter()
        .map(|entry| check_file(entry, root, min_meaningful_lines))
        .collect();
    let passed = files.iter().filter(|f| f.status == FileStatus::Ok).count();

    BuildReport {
        total_files: entries.len(),
        passed,
        failed: files.len() - passed,
        files,
    }
}

fn check_file(entry: &FileEntry, root: &Path, min_meaningful_lines: usize) -> FileCheck {
    let path = root.join(&entry.path);
    let mut check = FileCheck {
        path: entry.path.clone(),
        status: FileStatus::Ok,
        description: entry.description.clone(),
        indicators: Vec::new(),
    };

    let Ok(metadata) = fs::metadata(&path) else {
        check.status = FileStatus::Missing;
        return check;
    };
    if metadata.len() == 0 {
        check.status = FileStatus::Empty;
        return check;
    }

    match fs::read_to_string(&path) {
        Ok(content) => {
            check.indicators = stub_indicators(&content, &path, min_meaningful_lines);
            if !check.indicators.is_empty() {
                check.status = FileStatus::Stub;
            }
        }
        Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping stub scan"),
    }
    check
}

/// Reasons a file looks like a placeholder, one entry per finding.
///
/// Markdown files are exempt from keyword checks since they legitimately
/// mention TODO and FIXME in prose.
pub fn stub_indicators(content: &str, path: &Path, min_meaningful_lines: usize) -> Vec<String> {
    let mut indicators = Vec::new();
    let lines: Vec<&str> = content.split('\n').collect();

    if !is_markdown(path) {
        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;
            let cleaned = strip_literals(line);
            for (label, re) in KEYWORD_PATTERNS.iter() {
                if re.is_match(&cleaned) {
                    indicators.push(format!("{label} found on line {line_no}"));
                }
            }
            for (label, re) in THROW_PATTERNS.iter() {
                if re.is_match(line) {
                    indicators.push(format!("{label} found on line {line_no}"));
                }
            }
        }
    }

    let meaningful = lines.iter().filter(|l| is_meaningful(l)).count();
    if meaningful < min_meaningful_lines {
        indicators.push(format!(
            "Only {meaningful} non-empty, non-comment lines (likely placeholder)"
        ));
    }

    indicators
}

fn strip_literals(line: &str) -> String {
    LITERALS
        .iter()
        .fold(line.to_string(), |acc, re| re.replace_all(&acc, "").into_owned())
}

fn is_meaningful(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && !trimmed.starts_with("//")
        && !trimmed.starts_with("/*")
        && !trimmed.starts_with('*')
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_ascii_lowercase();
        ext == "md" || ext == "mdx" || ext == "markdown"
    })
}
