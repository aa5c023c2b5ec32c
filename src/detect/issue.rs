//! Issue taxonomy shared by the detector, the strategy registry and the
//! build simulator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a single detected defect.
///
/// The category is the dispatch key for repair: each category has its
/// own ordered list of strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    /// Malformed markup or style source (unquoted attributes, missing
    /// terminators, unbalanced blocks).
    Syntax,
    /// A package is imported or required by the configuration but not
    /// declared in the manifest.
    MissingDependency,
    /// A relative import that resolves to no file in the set.
    MissingReference,
    /// A file the framework cannot build without is absent.
    MissingFile,
    /// The manifest exists but is not parseable JSON.
    ManifestInvalid,
    /// File-level damage: markdown fences, conflict markers, unbalanced
    /// braces.
    Structural,
    /// Code that parses but throws at runtime (unguarded parses,
    /// iteration over possibly-undefined values).
    RuntimeSafety,
}

impl IssueCategory {
    pub fn all_variants() -> Vec<IssueCategory> {
        vec![
            IssueCategory::Syntax,
            IssueCategory::MissingDependency,
            IssueCategory::MissingReference,
            IssueCategory::MissingFile,
            IssueCategory::ManifestInvalid,
            IssueCategory::Structural,
            IssueCategory::RuntimeSafety,
        ]
    }

    /// Position in the repair ordering; lower repairs first.
    ///
    /// Dependencies come first so later file rewrites see a settled
    /// manifest, then source-level syntax, then the reference/file
    /// tier that may grow the file set, and structural cleanups last.
    pub fn fix_priority(&self) -> u8 {
        match self {
            IssueCategory::MissingDependency => 0,
            IssueCategory::Syntax => 1,
            IssueCategory::MissingReference => 2,
            IssueCategory::MissingFile => 3,
            IssueCategory::ManifestInvalid => 4,
            IssueCategory::RuntimeSafety => 5,
            IssueCategory::Structural => 6,
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueCategory::Syntax => "syntax",
            IssueCategory::MissingDependency => "missing-dependency",
            IssueCategory::MissingReference => "missing-reference",
            IssueCategory::MissingFile => "missing-file",
            IssueCategory::ManifestInvalid => "manifest-invalid",
            IssueCategory::Structural => "structural",
            IssueCategory::RuntimeSafety => "runtime-safety",
        };
        write!(f, "{}", name)
    }
}

/// How bad a finding is for the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The build or first page load fails.
    Error,
    /// Worth fixing, but the project builds without it.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One defect found in one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub category: IssueCategory,
    /// Path of the file the issue lives in. For a missing file this is
    /// the path that should exist.
    pub file: String,
    pub message: String,
    pub severity: Severity,
    /// Machine-readable subject: package name for missing-dependency,
    /// import specifier for missing-reference, nothing for findings
    /// that are fully described by the file itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Whether a repair strategy can be dispatched for this finding.
    /// The detector only emits fixable findings today; the orchestrator
    /// still checks and routes anything unfixable straight to the
    /// unresolved list.
    pub auto_fixable: bool,
}

impl Issue {
    pub fn error(category: IssueCategory, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category,
            file: file.into(),
            message: message.into(),
            severity: Severity::Error,
            subject: None,
            auto_fixable: true,
        }
    }

    pub fn warning(
        category: IssueCategory,
        file: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            file: file.into(),
            message: message.into(),
            severity: Severity::Warning,
            subject: None,
            auto_fixable: true,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Whether this finding on its own stops the project from building
    /// or from surviving its first page load.
    ///
    /// The detector encodes buildability in the severity it assigns
    /// (runtime-safety is an error only under strict types), so
    /// criticality reduces to the severity.
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Key for the repair ordering: category tier first, errors before
    /// warnings inside a tier, then path for determinism.
    pub fn sort_key(&self) -> (u8, Severity, String) {
        (self.category.fix_priority(), self.severity, self.file.clone())
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} in {}: {}",
            self.severity, self.category, self.file, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_follows_severity() {
        let error = Issue::error(IssueCategory::Syntax, "src/App.jsx", "unquoted attribute");
        let warning = Issue::warning(
            IssueCategory::RuntimeSafety,
            "src/App.jsx",
            "unguarded JSON.parse",
        );
        assert!(error.is_critical());
        assert!(!warning.is_critical());
    }

    #[test]
    fn test_fix_priority_orders_dependencies_first() {
        assert!(
            IssueCategory::MissingDependency.fix_priority()
                < IssueCategory::Syntax.fix_priority()
        );
        assert!(
            IssueCategory::Syntax.fix_priority() < IssueCategory::MissingReference.fix_priority()
        );
        assert!(
            IssueCategory::RuntimeSafety.fix_priority() < IssueCategory::Structural.fix_priority()
        );
    }

    #[test]
    fn test_sort_key_puts_errors_before_warnings() {
        let error = Issue::error(IssueCategory::Syntax, "b.jsx", "x");
        let warning = Issue::warning(IssueCategory::Syntax, "a.jsx", "x");
        assert!(error.sort_key() < warning.sort_key());
    }

    #[test]
    fn test_category_display_kebab_case() {
        assert_eq!(IssueCategory::MissingDependency.to_string(), "missing-dependency");
        assert_eq!(IssueCategory::RuntimeSafety.to_string(), "runtime-safety");
    }

    #[test]
    fn test_issue_serde_includes_subject_when_set() {
        let issue = Issue::error(IssueCategory::MissingDependency, "package.json", "axios missing")
            .with_subject("axios");
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("\"subject\":\"axios\""));
        assert!(json.contains("\"missing-dependency\""));
    }
}
