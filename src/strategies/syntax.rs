//! Rule-based syntax repair.
//!
//! Dispatches on the defect slug the scans attach to syntax issues.
//! Markup defects go through the pattern library, stylesheet defects
//! through the dedicated rewrite helpers, and a missing runtime import
//! is prepended verbatim. Unbalanced tags are declined here; closing
//! them blind loses structure, so that defect is left for the AI rung
//! or the emergency tail.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::detect::issue::Issue;
use crate::detect::{markup, style};
use crate::patterns::PatternLibrary;
use crate::project::files::FileSet;
use crate::project::framework::FrameworkId;

use super::{FixMethod, RepairStrategy, StrategyOutcome};

pub struct SyntaxRuleStrategy {
    framework: FrameworkId,
    patterns: Arc<PatternLibrary>,
}

impl SyntaxRuleStrategy {
    pub fn new(framework: FrameworkId, patterns: Arc<PatternLibrary>) -> Self {
        Self {
            framework,
            patterns,
        }
    }

    fn apply_patterns(
        &self,
        files: &mut FileSet,
        issue: &Issue,
        defect: &str,
    ) -> StrategyOutcome {
        let file = match files.get(&issue.file) {
            Some(file) => file,
            None => return StrategyOutcome::Declined,
        };
        let application = self
            .patterns
            .apply_defect(&file.content, defect, file.category);
        if !application.changed() {
            return StrategyOutcome::Declined;
        }
        let description = format!(
            "applied {} ({} replacement(s))",
            application.rules.join(", "),
            application.replacements
        );
        let confidence = application.confidence;
        if let Some(file) = files.get_mut(&issue.file) {
            file.content = application.content;
        }
        StrategyOutcome::applied(&issue.file, description, confidence, FixMethod::Deterministic)
    }
}

#[async_trait]
impl RepairStrategy for SyntaxRuleStrategy {
    fn name(&self) -> &'static str {
        "syntax-rules"
    }

    async fn attempt(&self, files: &mut FileSet, issue: &Issue) -> Result<StrategyOutcome> {
        let defect = match issue.subject.as_deref() {
            Some(defect) => defect,
            None => return Ok(StrategyOutcome::Declined),
        };

        let outcome = match defect {
            markup::SLUG_UNQUOTED_ATTR | markup::SLUG_VOID_ELEMENT => {
                self.apply_patterns(files, issue, defect)
            }
            markup::SLUG_MISSING_IMPORT => {
                let line = self.framework.jsx_import_line();
                match files.get_mut(&issue.file) {
                    Some(file) if !file.content.contains(self.framework.jsx_import_probe()) => {
                        file.content = format!("{}\n{}", line, file.content);
                        StrategyOutcome::applied(
                            &issue.file,
                            format!("prepended `{}`", line),
                            0.97,
                            FixMethod::Deterministic,
                        )
                    }
                    _ => StrategyOutcome::Declined,
                }
            }
            style::SLUG_UNTERMINATED_DECL => match files.get_mut(&issue.file) {
                Some(file) => {
                    let (content, terminated) = style::terminate_declarations(&file.content);
                    if terminated == 0 {
                        StrategyOutcome::Declined
                    } else {
                        file.content = content;
                        StrategyOutcome::applied(
                            &issue.file,
                            format!("terminated {} declaration(s) with ';'", terminated),
                            0.9,
                            FixMethod::Deterministic,
                        )
                    }
                }
                None => StrategyOutcome::Declined,
            },
            style::SLUG_UNBALANCED_BRACES => match files.get_mut(&issue.file) {
                Some(file) => {
                    let (content, net) = style::close_unbalanced_blocks(&file.content);
                    if content == file.content {
                        StrategyOutcome::Declined
                    } else {
                        file.content = content;
                        StrategyOutcome::applied(
                            &issue.file,
                            format!("rebalanced stylesheet blocks ({:+})", net),
                            0.75,
                            FixMethod::Deterministic,
                        )
                    }
                }
                None => StrategyOutcome::Declined,
            },
            markup::SLUG_UNBALANCED_TAGS => StrategyOutcome::Declined,
            other => {
                debug!(defect = other, "no syntax rule for defect");
                StrategyOutcome::Declined
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::issue::IssueCategory;
    use crate::project::files::SourceFile;

    fn strategy() -> SyntaxRuleStrategy {
        SyntaxRuleStrategy::new(
            FrameworkId::React,
            Arc::new(PatternLibrary::with_defaults()),
        )
    }

    fn issue_for(file: &str, defect: &str) -> Issue {
        Issue::error(IssueCategory::Syntax, file, "scan finding").with_subject(defect)
    }

    #[tokio::test]
    async fn test_unquoted_attributes_get_quoted() {
        let mut files = FileSet::from_files(vec![SourceFile::new(
            "src/App.jsx",
            "import React from 'react';\nconst a = <div id=main className=card>x</div>;\n",
        )]);
        let outcome = strategy()
            .attempt(&mut files, &issue_for("src/App.jsx", markup::SLUG_UNQUOTED_ATTR))
            .await
            .unwrap();
        assert!(outcome.is_applied());
        let content = &files.get("src/App.jsx").unwrap().content;
        assert!(content.contains("id=\"main\""));
        assert!(content.contains("className=\"card\""));
    }

    #[tokio::test]
    async fn test_missing_import_prepended_once() {
        let mut files = FileSet::from_files(vec![SourceFile::new(
            "src/App.jsx",
            "export default function App() {\n  return <div className=\"app\" />;\n}\n",
        )]);
        let outcome = strategy()
            .attempt(&mut files, &issue_for("src/App.jsx", markup::SLUG_MISSING_IMPORT))
            .await
            .unwrap();
        assert!(outcome.is_applied());
        assert!(files
            .get("src/App.jsx")
            .unwrap()
            .content
            .starts_with("import React from 'react';\n"));

        let again = strategy()
            .attempt(&mut files, &issue_for("src/App.jsx", markup::SLUG_MISSING_IMPORT))
            .await
            .unwrap();
        assert_eq!(again, StrategyOutcome::Declined);
    }

    #[tokio::test]
    async fn test_stylesheet_declarations_terminated() {
        let mut files = FileSet::from_files(vec![SourceFile::new(
            "src/index.css",
            ".card {\n  color: red\n  margin: 0;\n}\n",
        )]);
        let outcome = strategy()
            .attempt(
                &mut files,
                &issue_for("src/index.css", style::SLUG_UNTERMINATED_DECL),
            )
            .await
            .unwrap();
        assert!(outcome.is_applied());
        assert!(files
            .get("src/index.css")
            .unwrap()
            .content
            .contains("color: red;"));
    }

    #[tokio::test]
    async fn test_unbalanced_tags_declined() {
        let mut files = FileSet::from_files(vec![SourceFile::new(
            "src/App.jsx",
            "import React from 'react';\nconst a = <div><span>x</div>;\n",
        )]);
        let outcome = strategy()
            .attempt(
                &mut files,
                &issue_for("src/App.jsx", markup::SLUG_UNBALANCED_TAGS),
            )
            .await
            .unwrap();
        assert_eq!(outcome, StrategyOutcome::Declined);
    }

    #[tokio::test]
    async fn test_unknown_file_declines() {
        let mut files = FileSet::new();
        let outcome = strategy()
            .attempt(&mut files, &issue_for("src/Gone.jsx", markup::SLUG_UNQUOTED_ATTR))
            .await
            .unwrap();
        assert_eq!(outcome, StrategyOutcome::Declined);
    }
}
