//! Creates files the project structure requires but the generator
//! never emitted.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::detect::issue::Issue;
use crate::project::files::FileSet;
use crate::templates::TemplateRegistry;

use super::{FixMethod, RepairStrategy, StrategyOutcome};

pub struct FileSynthesisStrategy {
    templates: Arc<TemplateRegistry>,
}

impl FileSynthesisStrategy {
    pub fn new(templates: Arc<TemplateRegistry>) -> Self {
        Self { templates }
    }
}

#[async_trait]
impl RepairStrategy for FileSynthesisStrategy {
    fn name(&self) -> &'static str {
        "file-synthesis"
    }

    async fn attempt(&self, files: &mut FileSet, issue: &Issue) -> Result<StrategyOutcome> {
        if files.contains(&issue.file) {
            return Ok(StrategyOutcome::Declined);
        }
        let synthesized = self.templates.synthesize(&issue.file);
        files.insert(synthesized);
        Ok(StrategyOutcome::applied(
            &issue.file,
            format!("synthesized {} from its template", issue.file),
            0.85,
            FixMethod::Synthesized,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::issue::IssueCategory;
    use crate::project::manifest::DependencyManifest;
    use crate::project::ProjectConfig;

    fn strategy() -> FileSynthesisStrategy {
        FileSynthesisStrategy::new(Arc::new(TemplateRegistry::new(&ProjectConfig::new(
            "Corner Cafe",
        ))))
    }

    fn missing(path: &str) -> Issue {
        Issue::error(IssueCategory::MissingFile, path, "required file is missing")
    }

    #[tokio::test]
    async fn test_missing_entry_point_synthesized() {
        let mut files = FileSet::new();
        let outcome = strategy()
            .attempt(&mut files, &missing("src/main.jsx"))
            .await
            .unwrap();
        assert!(outcome.is_applied());
        let entry = files.get("src/main.jsx").unwrap();
        assert!(entry.content.contains("createRoot"));
    }

    #[tokio::test]
    async fn test_missing_manifest_gets_the_baseline() {
        let mut files = FileSet::new();
        strategy()
            .attempt(&mut files, &missing("package.json"))
            .await
            .unwrap();
        let manifest =
            DependencyManifest::parse(&files.get("package.json").unwrap().content).unwrap();
        assert_eq!(manifest.name, "corner-cafe");
        assert!(manifest.has_dependency("react"));
    }

    #[tokio::test]
    async fn test_existing_file_declines() {
        let mut files = FileSet::from_files(vec![crate::project::files::SourceFile::new(
            "src/main.jsx",
            "already here",
        )]);
        let outcome = strategy()
            .attempt(&mut files, &missing("src/main.jsx"))
            .await
            .unwrap();
        assert_eq!(outcome, StrategyOutcome::Declined);
    }
}
