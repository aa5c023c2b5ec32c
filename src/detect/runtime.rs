//! Runtime-safety scans: code that parses and builds but throws on the
//! first page load.
//!
//! Two patterns account for nearly all of these in generated apps:
//! `JSON.parse` fed straight from `localStorage` (null on first visit)
//! and `.map` over a nested property nothing guarantees is an array.
//! Whether these block the build is the caller's call, via
//! `strict_types`.

use regex::Regex;

use crate::project::files::SourceFile;

use super::issue::{Issue, IssueCategory, Severity};

/// `JSON.parse(localStorage.getItem(...))` with no fallback operand.
pub(crate) const UNGUARDED_PARSE_PATTERN: &str =
    r"JSON\.parse\(\s*localStorage\.getItem\(([^)]*)\)\s*\)";

/// `.map(` on a property chain with no guard in front.
pub(crate) const UNGUARDED_MAP_PATTERN: &str =
    r"\b((?:[A-Za-z_]\w*\.)+[A-Za-z_]\w*)\.map\(";

pub(crate) const SLUG_UNGUARDED_PARSE: &str = "unguarded-json-parse";
pub(crate) const SLUG_UNGUARDED_MAP: &str = "unguarded-map";

pub(crate) fn unguarded_parse_count(content: &str) -> usize {
    let re = Regex::new(UNGUARDED_PARSE_PATTERN).expect("valid regex");
    re.find_iter(content).count()
}

pub(crate) fn unguarded_map_count(content: &str) -> usize {
    let re = Regex::new(UNGUARDED_MAP_PATTERN).expect("valid regex");
    re.find_iter(content).count()
}

pub(crate) fn scan(file: &SourceFile, strict_types: bool) -> Vec<Issue> {
    let severity = if strict_types {
        Severity::Error
    } else {
        Severity::Warning
    };
    let build = |message: String, slug: &str| Issue {
        category: IssueCategory::RuntimeSafety,
        file: file.path.clone(),
        message,
        severity,
        subject: Some(slug.to_string()),
        auto_fixable: true,
    };

    let mut issues = Vec::new();
    let parses = unguarded_parse_count(&file.content);
    if parses > 0 {
        issues.push(build(
            format!("{} JSON.parse call(s) on raw localStorage reads", parses),
            SLUG_UNGUARDED_PARSE,
        ));
    }
    let maps = unguarded_map_count(&file.content);
    if maps > 0 {
        issues.push(build(
            format!("{} .map call(s) on unguarded property chains", maps),
            SLUG_UNGUARDED_MAP,
        ));
    }
    issues
}
