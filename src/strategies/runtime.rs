//! Guard insertion for crash-prone runtime expressions.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::detect::issue::Issue;
use crate::detect::runtime;
use crate::patterns::PatternLibrary;
use crate::project::files::FileSet;

use super::{FixMethod, RepairStrategy, StrategyOutcome};

/// Wraps unguarded `JSON.parse(localStorage.getItem(..))` calls and
/// `.map` calls on possibly-undefined collections in null-safe forms.
pub struct RuntimeGuardStrategy {
    patterns: Arc<PatternLibrary>,
}

impl RuntimeGuardStrategy {
    pub fn new(patterns: Arc<PatternLibrary>) -> Self {
        Self { patterns }
    }
}

#[async_trait]
impl RepairStrategy for RuntimeGuardStrategy {
    fn name(&self) -> &'static str {
        "runtime-guards"
    }

    async fn attempt(&self, files: &mut FileSet, issue: &Issue) -> Result<StrategyOutcome> {
        let defect = match issue.subject.as_deref() {
            Some(defect @ (runtime::SLUG_UNGUARDED_PARSE | runtime::SLUG_UNGUARDED_MAP)) => defect,
            _ => return Ok(StrategyOutcome::Declined),
        };
        let file = match files.get(&issue.file) {
            Some(file) => file,
            None => return Ok(StrategyOutcome::Declined),
        };

        let application = self
            .patterns
            .apply_defect(&file.content, defect, file.category);
        if !application.changed() {
            return Ok(StrategyOutcome::Declined);
        }
        let description = format!(
            "guarded {} expression(s) via {}",
            application.replacements,
            application.rules.join(", ")
        );
        let confidence = application.confidence;
        if let Some(file) = files.get_mut(&issue.file) {
            file.content = application.content;
        }
        Ok(StrategyOutcome::applied(
            &issue.file,
            description,
            confidence,
            FixMethod::Deterministic,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::issue::IssueCategory;
    use crate::project::files::SourceFile;

    fn strategy() -> RuntimeGuardStrategy {
        RuntimeGuardStrategy::new(Arc::new(PatternLibrary::with_defaults()))
    }

    #[tokio::test]
    async fn test_localstorage_parse_guarded() {
        let mut files = FileSet::from_files(vec![SourceFile::new(
            "src/store.js",
            "const cart = JSON.parse(localStorage.getItem('cart'));\n",
        )]);
        let issue = Issue::warning(IssueCategory::RuntimeSafety, "src/store.js", "finding")
            .with_subject(runtime::SLUG_UNGUARDED_PARSE);
        let outcome = strategy().attempt(&mut files, &issue).await.unwrap();
        assert!(outcome.is_applied());
        assert!(files
            .get("src/store.js")
            .unwrap()
            .content
            .contains("localStorage.getItem('cart') || 'null'"));
    }

    #[tokio::test]
    async fn test_property_chain_map_guarded() {
        let mut files = FileSet::from_files(vec![SourceFile::new(
            "src/List.jsx",
            "import React from 'react';\nconst rows = props.data.items.map((i) => i.id);\n",
        )]);
        let issue = Issue::warning(IssueCategory::RuntimeSafety, "src/List.jsx", "finding")
            .with_subject(runtime::SLUG_UNGUARDED_MAP);
        let outcome = strategy().attempt(&mut files, &issue).await.unwrap();
        assert!(outcome.is_applied());
        assert!(files
            .get("src/List.jsx")
            .unwrap()
            .content
            .contains("(props.data.items || []).map("));
    }

    #[tokio::test]
    async fn test_other_subjects_declined() {
        let mut files = FileSet::from_files(vec![SourceFile::new("src/a.js", "let x = 1;\n")]);
        let issue = Issue::warning(IssueCategory::RuntimeSafety, "src/a.js", "finding")
            .with_subject("something-else");
        let outcome = strategy().attempt(&mut files, &issue).await.unwrap();
        assert_eq!(outcome, StrategyOutcome::Declined);
    }
}
