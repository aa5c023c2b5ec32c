//! Import extraction and module path resolution.
//!
//! Resolution mirrors what the bundler will do, as pure string work
//! against the in-memory file set: exact path, then the extension
//! candidates in order, then a directory index.

use regex::Regex;

use crate::project::files::FileSet;

use super::issue::{Issue, IssueCategory};

/// Extensions tried, in order, when an import omits one.
pub(crate) const EXTENSION_CANDIDATES: &[&str] = &["jsx", "js", "tsx", "ts", "css", "json"];

/// Directory index files tried when the specifier names a directory.
pub(crate) const INDEX_CANDIDATES: &[&str] = &["index.jsx", "index.js"];

/// Extracts every import specifier from a module: static imports,
/// re-exports, `require` calls and dynamic imports. Order of first
/// appearance, deduplicated.
pub(crate) fn extract_imports(content: &str) -> Vec<String> {
    let static_re = Regex::new(r#"(?m)^\s*import\s+(?:[^'";]*?\s+from\s+)?['"]([^'"]+)['"]"#)
        .expect("valid regex");
    let reexport_re = Regex::new(r#"(?m)^\s*export\s+[^'";]*?\s+from\s+['"]([^'"]+)['"]"#)
        .expect("valid regex");
    let require_re =
        Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid regex");
    let dynamic_re =
        Regex::new(r#"import\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid regex");

    let mut seen = Vec::new();
    for re in [&static_re, &reexport_re, &require_re, &dynamic_re] {
        for caps in re.captures_iter(content) {
            let spec = caps[1].to_string();
            if !seen.contains(&spec) {
                seen.push(spec);
            }
        }
    }
    seen
}

pub(crate) fn is_relative(spec: &str) -> bool {
    spec.starts_with("./") || spec.starts_with("../")
}

/// Root package name for a bare specifier: `axios/lib/x` is `axios`,
/// `@scope/pkg/sub` is `@scope/pkg`. `None` for relative specifiers,
/// URLs and node builtins.
pub(crate) fn package_root(spec: &str) -> Option<&str> {
    if is_relative(spec) || spec.starts_with('/') {
        return None;
    }
    if spec.starts_with("node:") || spec.contains("://") {
        return None;
    }
    let mut segments = spec.splitn(3, '/');
    let first = segments.next()?;
    if first.is_empty() {
        return None;
    }
    if let Some(stripped) = first.strip_prefix('@') {
        if stripped.is_empty() {
            return None;
        }
        let second = segments.next()?;
        let scoped_len = first.len() + 1 + second.len();
        return Some(&spec[..scoped_len]);
    }
    Some(first)
}

/// Joins a relative specifier onto the importer's directory and
/// normalizes `.` and `..` segments. `None` when the path escapes the
/// project root.
pub(crate) fn join_relative(importer: &str, spec: &str) -> Option<String> {
    let mut segments: Vec<&str> = importer.split('/').collect();
    segments.pop();
    for part in spec.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            name => segments.push(name),
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// Resolves a relative specifier against the file set the way the
/// bundler would.
pub(crate) fn resolve(files: &FileSet, importer: &str, spec: &str) -> Option<String> {
    let joined = join_relative(importer, spec)?;
    if files.contains(&joined) {
        return Some(joined);
    }
    for ext in EXTENSION_CANDIDATES {
        let candidate = format!("{}.{}", joined, ext);
        if files.contains(&candidate) {
            return Some(candidate);
        }
    }
    for index in INDEX_CANDIDATES {
        let candidate = format!("{}/{}", joined, index);
        if files.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Path a synthesized file should get for an unresolved specifier. A
/// specifier with a known extension keeps it; a capitalized stem is
/// assumed to be a component, anything else a plain module.
pub(crate) fn synthesis_target(importer: &str, spec: &str) -> Option<String> {
    let joined = join_relative(importer, spec)?;
    let stem = joined.rsplit('/').next().unwrap_or(&joined);
    if let Some((_, ext)) = stem.rsplit_once('.') {
        if EXTENSION_CANDIDATES.contains(&ext) {
            return Some(joined);
        }
    }
    let component = stem.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false);
    if component {
        Some(format!("{}.jsx", joined))
    } else {
        Some(format!("{}.js", joined))
    }
}

/// One missing-reference issue per unresolved relative import across
/// every script file in the set.
pub(crate) fn scan(files: &FileSet) -> Vec<Issue> {
    let mut issues = Vec::new();
    for file in files.iter() {
        if !file.category.is_script() {
            continue;
        }
        for spec in extract_imports(&file.content) {
            if !is_relative(&spec) {
                continue;
            }
            if resolve(files, &file.path, &spec).is_none() {
                issues.push(
                    Issue::error(
                        IssueCategory::MissingReference,
                        &file.path,
                        format!("'{}' does not resolve to a file in the project", spec),
                    )
                    .with_subject(&spec),
                );
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::files::SourceFile;

    fn set(paths: &[(&str, &str)]) -> FileSet {
        FileSet::from_files(
            paths
                .iter()
                .map(|(p, c)| SourceFile::new(*p, *c))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_extract_imports_covers_all_forms() {
        let content = r#"import React from 'react';
import { useState } from 'react';
import './App.css';
export { default } from './Button';
const api = require('axios');
const page = import('./pages/Home');
"#;
        let imports = extract_imports(content);
        assert_eq!(
            imports,
            vec!["react", "./App.css", "./Button", "axios", "./pages/Home"]
        );
    }

    #[test]
    fn test_extract_imports_handles_multiline_braces() {
        let content = "import {\n  Routes,\n  Route,\n} from 'react-router-dom';\n";
        assert_eq!(extract_imports(content), vec!["react-router-dom"]);
    }

    #[test]
    fn test_package_root_for_scoped_and_deep_specifiers() {
        assert_eq!(package_root("axios"), Some("axios"));
        assert_eq!(package_root("date-fns/format"), Some("date-fns"));
        assert_eq!(package_root("@vitejs/plugin-react"), Some("@vitejs/plugin-react"));
        assert_eq!(package_root("@scope/pkg/deep/path"), Some("@scope/pkg"));
        assert_eq!(package_root("./local"), None);
        assert_eq!(package_root("node:path"), None);
    }

    #[test]
    fn test_join_relative_normalizes_segments() {
        assert_eq!(
            join_relative("src/pages/Home.jsx", "./sections/Hero"),
            Some("src/pages/sections/Hero".to_string())
        );
        assert_eq!(
            join_relative("src/pages/Home.jsx", "../components/Nav"),
            Some("src/components/Nav".to_string())
        );
        assert_eq!(join_relative("src/App.jsx", "../../escape"), None);
    }

    #[test]
    fn test_resolve_tries_extensions_then_index() {
        let files = set(&[
            ("src/App.jsx", ""),
            ("src/components/Nav.jsx", ""),
            ("src/utils/index.js", ""),
            ("src/theme.css", ""),
        ]);
        assert_eq!(
            resolve(&files, "src/App.jsx", "./components/Nav"),
            Some("src/components/Nav.jsx".to_string())
        );
        assert_eq!(
            resolve(&files, "src/App.jsx", "./utils"),
            Some("src/utils/index.js".to_string())
        );
        assert_eq!(
            resolve(&files, "src/App.jsx", "./theme.css"),
            Some("src/theme.css".to_string())
        );
        assert_eq!(resolve(&files, "src/App.jsx", "./Missing"), None);
    }

    #[test]
    fn test_synthesis_target_picks_extension_by_case() {
        assert_eq!(
            synthesis_target("src/App.jsx", "./components/Card"),
            Some("src/components/Card.jsx".to_string())
        );
        assert_eq!(
            synthesis_target("src/App.jsx", "./utils/format"),
            Some("src/utils/format.js".to_string())
        );
        assert_eq!(
            synthesis_target("src/App.jsx", "./styles/theme.css"),
            Some("src/styles/theme.css".to_string())
        );
    }

    #[test]
    fn test_scan_reports_unresolved_relative_imports() {
        let files = set(&[
            (
                "src/App.jsx",
                "import React from 'react';\nimport Nav from './components/Nav';\n",
            ),
            ("src/index.css", ".a { color: red; }"),
        ]);
        let issues = scan(&files);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::MissingReference);
        assert_eq!(issues[0].file, "src/App.jsx");
        assert_eq!(issues[0].subject.as_deref(), Some("./components/Nav"));
    }

    #[test]
    fn test_scan_ignores_package_imports() {
        let files = set(&[(
            "src/App.jsx",
            "import React from 'react';\nimport axios from 'axios';\n",
        )]);
        assert!(scan(&files).is_empty());
    }
}
