//! Stylesheet scans and the line-level repairs that go with them.
//!
//! The semicolon walk is shared between detection and repair so the
//! two can never disagree about which lines are broken. A declaration
//! missing its terminator is only a defect mid-block; CSS allows the
//! final declaration before `}` to omit it.

use regex::Regex;

use crate::project::files::SourceFile;

use super::issue::{Issue, IssueCategory};

pub(crate) const SLUG_UNTERMINATED_DECL: &str = "unterminated-declaration";
pub(crate) const SLUG_UNBALANCED_BRACES: &str = "unbalanced-braces";

/// Zero-based indexes of declaration lines missing their `;`.
pub(crate) fn missing_semicolon_lines(content: &str) -> Vec<usize> {
    let prop_re =
        Regex::new(r"^\s*[A-Za-z-]+\s*:\s*[^;{}]*[^;,{}\s]\s*$").expect("valid regex");
    let lines: Vec<&str> = content.lines().collect();
    let mut hits = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !prop_re.is_match(line) {
            continue;
        }
        let next = lines[i + 1..].iter().find(|l| !l.trim().is_empty());
        if let Some(next) = next {
            if !next.trim_start().starts_with('}') {
                hits.push(i);
            }
        }
    }
    hits
}

/// Appends the missing terminators. Returns the rewritten content and
/// how many lines were touched.
pub(crate) fn terminate_declarations(content: &str) -> (String, usize) {
    let broken = missing_semicolon_lines(content);
    if broken.is_empty() {
        return (content.to_string(), 0);
    }
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    for &index in &broken {
        let line = &mut lines[index];
        let trimmed_len = line.trim_end().len();
        line.insert(trimmed_len, ';');
    }
    let mut rebuilt = lines.join("\n");
    if content.ends_with('\n') {
        rebuilt.push('\n');
    }
    (rebuilt, broken.len())
}

/// Net `{` minus `}` over the whole sheet.
pub(crate) fn brace_balance(content: &str) -> i64 {
    content.chars().fold(0i64, |net, ch| match ch {
        '{' => net + 1,
        '}' => net - 1,
        _ => net,
    })
}

/// Closes unclosed blocks at the end of the sheet, or drops stray
/// trailing closers. Returns the rewritten content and the balance
/// that was corrected.
pub(crate) fn close_unbalanced_blocks(content: &str) -> (String, i64) {
    let net = brace_balance(content);
    if net == 0 {
        return (content.to_string(), 0);
    }
    if net > 0 {
        let mut rebuilt = content.to_string();
        if !rebuilt.ends_with('\n') {
            rebuilt.push('\n');
        }
        for _ in 0..net {
            rebuilt.push_str("}\n");
        }
        return (rebuilt, net);
    }
    // Extra closers: drop lone `}` lines from the end while they last.
    let mut lines: Vec<&str> = content.lines().collect();
    let mut remaining = net;
    while remaining < 0 {
        match lines.last() {
            Some(last) if last.trim() == "}" => {
                lines.pop();
                remaining += 1;
            }
            _ => break,
        }
    }
    let mut rebuilt = lines.join("\n");
    if content.ends_with('\n') && !rebuilt.is_empty() {
        rebuilt.push('\n');
    }
    (rebuilt, net - remaining)
}

pub(crate) fn scan(file: &SourceFile) -> Vec<Issue> {
    let mut issues = Vec::new();

    let broken = missing_semicolon_lines(&file.content);
    if !broken.is_empty() {
        issues.push(
            Issue::error(
                IssueCategory::Syntax,
                &file.path,
                format!("{} declaration(s) missing the ';' terminator", broken.len()),
            )
            .with_subject(SLUG_UNTERMINATED_DECL),
        );
    }

    let net = brace_balance(&file.content);
    if net != 0 {
        issues.push(
            Issue::error(
                IssueCategory::Syntax,
                &file.path,
                format!("stylesheet blocks unbalanced ({:+})", net),
            )
            .with_subject(SLUG_UNBALANCED_BRACES),
        );
    }

    issues
}
