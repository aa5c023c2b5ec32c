//! Markup (JSX) scans.
//!
//! Everything here is line-oriented regex work over generated component
//! files. Generated markup is formatted predictably, so a small set of
//! targeted patterns catches the defect classes that actually occur;
//! none of this attempts to be a JSX parser.

use std::collections::BTreeMap;

use regex::Regex;

use crate::project::framework::FrameworkId;
use crate::project::files::SourceFile;

use super::issue::{Issue, IssueCategory};

/// Attribute assignments whose value is neither quoted nor braced.
/// Restricted to the attribute vocabulary generators emit so plain
/// JavaScript assignments never match.
pub(crate) const UNQUOTED_ATTR_PATTERN: &str = r"\b(id|className|class|href|src|alt|type|name|value|placeholder|rel|target|to|key|htmlFor|role)=([A-Za-z0-9_./#][\w./#-]*)";

/// Void elements written with attributes but no self-closing slash.
pub(crate) const VOID_WITH_ATTRS_PATTERN: &str =
    r"<(img|br|hr|input|meta|link|source)(\s[^>]*[^/>])>";

/// Void elements written entirely bare, `<br>` style.
pub(crate) const BARE_VOID_PATTERN: &str = r"<(img|br|hr|input|meta|link|source)>";

/// Elements that never take children and never need a closing tag.
const VOID_ELEMENTS: &[&str] = &["img", "br", "hr", "input", "meta", "link", "source"];

/// Defect slugs carried in [`Issue::subject`] so the syntax strategy
/// knows which rule group to apply.
pub(crate) const SLUG_UNQUOTED_ATTR: &str = "unquoted-attr";
pub(crate) const SLUG_VOID_ELEMENT: &str = "void-element";
pub(crate) const SLUG_MISSING_IMPORT: &str = "missing-import";
pub(crate) const SLUG_UNBALANCED_TAGS: &str = "unbalanced-tags";

pub(crate) fn unquoted_attribute_count(content: &str) -> usize {
    let re = Regex::new(UNQUOTED_ATTR_PATTERN).expect("valid regex");
    re.find_iter(content).count()
}

pub(crate) fn open_void_count(content: &str) -> usize {
    let with_attrs = Regex::new(VOID_WITH_ATTRS_PATTERN).expect("valid regex");
    let bare = Regex::new(BARE_VOID_PATTERN).expect("valid regex");
    with_attrs.find_iter(content).count() + bare.find_iter(content).count()
}

/// Net open count per tag name, skipping void and self-closed tags.
/// A positive count means the tag is opened more often than closed.
pub(crate) fn tag_balance(content: &str) -> Vec<(String, i64)> {
    let tag_re = Regex::new(r"</?([A-Za-z][\w.-]*)([^>]*?)>").expect("valid regex");
    let mut balance: BTreeMap<String, i64> = BTreeMap::new();
    for caps in tag_re.captures_iter(content) {
        let whole = &caps[0];
        let name = caps[1].to_string();
        if whole.starts_with("</") {
            *balance.entry(name).or_insert(0) -= 1;
        } else if whole.ends_with("/>") || VOID_ELEMENTS.contains(&name.as_str()) {
            continue;
        } else {
            *balance.entry(name).or_insert(0) += 1;
        }
    }
    balance.retain(|_, net| *net != 0);
    balance.into_iter().collect()
}

pub(crate) fn needs_jsx_import(content: &str, framework: FrameworkId) -> bool {
    !content.contains(framework.jsx_import_probe())
}

/// Scans one component file and reports a syntax issue per defect
/// class present, not per occurrence; the matching strategy repairs a
/// whole class in one application.
pub(crate) fn scan(file: &SourceFile, framework: FrameworkId) -> Vec<Issue> {
    let mut issues = Vec::new();

    let unquoted = unquoted_attribute_count(&file.content);
    if unquoted > 0 {
        issues.push(
            Issue::error(
                IssueCategory::Syntax,
                &file.path,
                format!("{} unquoted attribute value(s)", unquoted),
            )
            .with_subject(SLUG_UNQUOTED_ATTR),
        );
    }

    let open_voids = open_void_count(&file.content);
    if open_voids > 0 {
        issues.push(
            Issue::error(
                IssueCategory::Syntax,
                &file.path,
                format!("{} void element(s) missing the self-closing slash", open_voids),
            )
            .with_subject(SLUG_VOID_ELEMENT),
        );
    }

    if needs_jsx_import(&file.content, framework) {
        issues.push(
            Issue::error(
                IssueCategory::Syntax,
                &file.path,
                format!(
                    "component file lacks the {} runtime import",
                    framework.display_name()
                ),
            )
            .with_subject(SLUG_MISSING_IMPORT),
        );
    }

    let unbalanced = tag_balance(&file.content);
    if !unbalanced.is_empty() {
        let detail = unbalanced
            .iter()
            .map(|(name, net)| format!("<{}> {:+}", name, net))
            .collect::<Vec<_>>()
            .join(", ");
        issues.push(
            Issue::error(
                IssueCategory::Syntax,
                &file.path,
                format!("unbalanced tags: {}", detail),
            )
            .with_subject(SLUG_UNBALANCED_TAGS),
        );
    }

    issues
}
