//! File-level damage scans: markdown fences around whole files, merge
//! conflict markers, and unbalanced braces in script sources.
//!
//! The brace counter skips string literals, template literals and
//! comments so data like `"{}"` never skews the balance. Repair
//! helpers live next to the scans for the same reason as in the style
//! module: detection and repair must agree.

use crate::project::files::{FileCategory, SourceFile};

use super::issue::{Issue, IssueCategory};

pub(crate) const SLUG_CODE_FENCE: &str = "code-fence";
pub(crate) const SLUG_CONFLICT_MARKERS: &str = "conflict-markers";
pub(crate) const SLUG_BRACE_BALANCE: &str = "brace-balance";

/// True when the file body is wrapped in a markdown code fence.
pub(crate) fn has_code_fence(content: &str) -> bool {
    content
        .lines()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim_start().starts_with("```"))
        .unwrap_or(false)
}

/// Removes a leading fence line and, if present, a trailing one.
pub(crate) fn strip_code_fences(content: &str) -> (String, bool) {
    if !has_code_fence(content) {
        return (content.to_string(), false);
    }
    let mut lines: Vec<&str> = content.lines().collect();
    while let Some(first) = lines.first() {
        if first.trim().is_empty() {
            lines.remove(0);
        } else {
            break;
        }
    }
    lines.remove(0);
    while let Some(last) = lines.last() {
        if last.trim().is_empty() {
            lines.pop();
        } else {
            break;
        }
    }
    if let Some(last) = lines.last() {
        if last.trim_start().starts_with("```") {
            lines.pop();
        }
    }
    let mut rebuilt = lines.join("\n");
    rebuilt.push('\n');
    (rebuilt, true)
}

pub(crate) fn has_conflict_markers(content: &str) -> bool {
    content
        .lines()
        .any(|l| l.starts_with("<<<<<<<") || l.starts_with(">>>>>>>"))
}

/// Resolves merge conflicts by keeping the first (ours) section of
/// each block. Returns the rewritten content and the block count.
pub(crate) fn resolve_conflict_markers(content: &str) -> (String, usize) {
    #[derive(PartialEq)]
    enum State {
        Outside,
        Ours,
        Theirs,
    }
    let mut state = State::Outside;
    let mut blocks = 0;
    let mut kept = Vec::new();
    for line in content.lines() {
        if line.starts_with("<<<<<<<") {
            state = State::Ours;
            blocks += 1;
        } else if line.starts_with("=======") && state == State::Ours {
            state = State::Theirs;
        } else if line.starts_with(">>>>>>>") && state != State::Outside {
            state = State::Outside;
        } else if state != State::Theirs {
            kept.push(line);
        }
    }
    let mut rebuilt = kept.join("\n");
    if content.ends_with('\n') {
        rebuilt.push('\n');
    }
    (rebuilt, blocks)
}

/// Net `{` minus `}` outside strings, template literals and comments.
pub(crate) fn code_brace_balance(content: &str) -> i64 {
    #[derive(PartialEq)]
    enum Ctx {
        Code,
        Single,
        Double,
        Template,
        LineComment,
        BlockComment,
    }
    let mut ctx = Ctx::Code;
    let mut net = 0i64;
    let mut chars = content.chars().peekable();
    while let Some(ch) = chars.next() {
        match ctx {
            Ctx::Code => match ch {
                '{' => net += 1,
                '}' => net -= 1,
                '\'' => ctx = Ctx::Single,
                '"' => ctx = Ctx::Double,
                '`' => ctx = Ctx::Template,
                '/' => match chars.peek() {
                    Some('/') => {
                        chars.next();
                        ctx = Ctx::LineComment;
                    }
                    Some('*') => {
                        chars.next();
                        ctx = Ctx::BlockComment;
                    }
                    _ => {}
                },
                _ => {}
            },
            Ctx::Single => match ch {
                '\\' => {
                    chars.next();
                }
                '\'' | '\n' => ctx = Ctx::Code,
                _ => {}
            },
            Ctx::Double => match ch {
                '\\' => {
                    chars.next();
                }
                '"' | '\n' => ctx = Ctx::Code,
                _ => {}
            },
            Ctx::Template => match ch {
                '\\' => {
                    chars.next();
                }
                '`' => ctx = Ctx::Code,
                _ => {}
            },
            Ctx::LineComment => {
                if ch == '\n' {
                    ctx = Ctx::Code;
                }
            }
            Ctx::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    ctx = Ctx::Code;
                }
            }
        }
    }
    net
}

/// Closes unclosed blocks at the end of a script, or drops stray
/// trailing closers.
pub(crate) fn close_code_blocks(content: &str) -> (String, i64) {
    let net = code_brace_balance(content);
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
    let mut lines: Vec<&str> = content.lines().collect();
    let mut remaining = net;
    while remaining < 0 {
        match lines.last().map(|l| l.trim()) {
            Some("}") | Some("};") => {
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

    // Manifest damage surfaces as a parse failure in the manifest scan,
    // and the manifest chain owns unfencing and conflict resolution.
    if file.category == FileCategory::Manifest {
        return issues;
    }

    // A readme legitimately contains fences; everything else does not.
    if file.category != FileCategory::Document && has_code_fence(&file.content) {
        issues.push(
            Issue::error(
                IssueCategory::Structural,
                &file.path,
                "file body is wrapped in a markdown code fence",
            )
            .with_subject(SLUG_CODE_FENCE),
        );
    }

    if has_conflict_markers(&file.content) {
        issues.push(
            Issue::error(
                IssueCategory::Structural,
                &file.path,
                "file contains merge conflict markers",
            )
            .with_subject(SLUG_CONFLICT_MARKERS),
        );
    }

    if file.category.is_script() && !has_code_fence(&file.content) {
        let net = code_brace_balance(&file.content);
        if net != 0 {
            issues.push(
                Issue::error(
                    IssueCategory::Structural,
                    &file.path,
                    format!("braces unbalanced ({:+})", net),
                )
                .with_subject(SLUG_BRACE_BALANCE),
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::files::SourceFile;

    #[test]
    fn test_fence_detected_and_stripped() {
        let content = "```jsx\nimport React from 'react';\nexport default () => null;\n```\n";
        assert!(has_code_fence(content));
        let (stripped, changed) = strip_code_fences(content);
        assert!(changed);
        assert!(stripped.starts_with("import React"));
        assert!(!stripped.contains("```"));
    }

    #[test]
    fn test_fence_without_closing_line() {
        let content = "```json\n{\n  \"name\": \"demo\"\n}\n";
        let (stripped, changed) = strip_code_fences(content);
        assert!(changed);
        assert!(stripped.starts_with('{'));
        assert!(stripped.ends_with("}\n"));
    }

    #[test]
    fn test_unfenced_content_untouched() {
        let content = "const x = 1;\n";
        let (same, changed) = strip_code_fences(content);
        assert!(!changed);
        assert_eq!(same, content);
    }

    #[test]
    fn test_conflict_resolution_keeps_ours() {
        let content = "header\n<<<<<<< HEAD\nours line\n=======\ntheirs line\n>>>>>>> branch\nfooter\n";
        let (resolved, blocks) = resolve_conflict_markers(content);
        assert_eq!(blocks, 1);
        assert_eq!(resolved, "header\nours line\nfooter\n");
    }

    #[test]
    fn test_brace_balance_ignores_strings_and_comments() {
        let content = "const a = \"{\";\nconst b = '}';\n// {\n/* } */\nconst t = `{{`;\nfunction f() { return a; }\n";
        assert_eq!(code_brace_balance(content), 0);
    }

    #[test]
    fn test_brace_balance_counts_real_imbalance() {
        let content = "export default function App() {\n  return null;\n";
        assert_eq!(code_brace_balance(content), 1);
        let (fixed, corrected) = close_code_blocks(content);
        assert_eq!(corrected, 1);
        assert_eq!(code_brace_balance(&fixed), 0);
    }

    #[test]
    fn test_scan_flags_fenced_module() {
        let file = SourceFile::new("src/api.js", "```js\nexport const api = {};\n```\n");
        let issues = scan(&file);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].subject.as_deref(), Some(SLUG_CODE_FENCE));
    }

    #[test]
    fn test_scan_skips_readme_fences() {
        let file = SourceFile::new("README.md", "```bash\nnpm run dev\n```\n");
        assert!(scan(&file).is_empty());
    }

    #[test]
    fn test_scan_leaves_manifest_damage_to_the_manifest_scan() {
        let file = SourceFile::new("package.json", "```json\n{\n  \"name\": \"demo\"\n}\n```\n");
        assert!(scan(&file).is_empty());
    }

    #[test]
    fn test_scan_skips_brace_check_inside_fence() {
        // The fence hides real structure; balance is re-checked after
        // the fence repair lands.
        let file = SourceFile::new("src/api.js", "```js\nexport const api = {\n```\n");
        let issues = scan(&file);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].subject.as_deref(), Some(SLUG_CODE_FENCE));
    }
}
