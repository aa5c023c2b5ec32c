//! Declares packages the project imports or requires but never listed.

use anyhow::Result;
use async_trait::async_trait;

use crate::detect::issue::Issue;
use crate::project::features;
use crate::project::files::FileSet;
use crate::project::manifest::DependencyManifest;
use crate::project::{FrameworkId, ProjectConfig};

use super::{FixMethod, RepairStrategy, StrategyOutcome};

/// Adds the missing package to the manifest at the best-known version.
///
/// Framework build tooling lands in `devDependencies`; everything else
/// is a runtime dependency. Packages with no pinned version anywhere
/// are recorded at the registry fallback, with lower confidence.
pub struct DependencyStrategy {
    framework: FrameworkId,
}

impl DependencyStrategy {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            framework: config.framework,
        }
    }

    fn resolve_version(&self, package: &str) -> (&'static str, bool) {
        for (name, version) in self.framework.baseline_dependencies() {
            if *name == package {
                return (version, true);
            }
        }
        for (name, version) in self.framework.baseline_dev_dependencies() {
            if *name == package {
                return (version, true);
            }
        }
        match features::pinned_version(package) {
            Some(version) => (version, true),
            None => (features::FALLBACK_VERSION, false),
        }
    }

    fn is_build_tooling(&self, package: &str) -> bool {
        self.framework
            .baseline_dev_dependencies()
            .iter()
            .any(|(name, _)| *name == package)
    }
}

#[async_trait]
impl RepairStrategy for DependencyStrategy {
    fn name(&self) -> &'static str {
        "dependency-resolution"
    }

    async fn attempt(&self, files: &mut FileSet, issue: &Issue) -> Result<StrategyOutcome> {
        let package = match issue.subject.as_deref() {
            Some(package) => package,
            None => return Ok(StrategyOutcome::Declined),
        };
        let manifest_file = match files.get(&issue.file) {
            Some(file) => file,
            None => return Ok(StrategyOutcome::Declined),
        };
        // An unparseable manifest is its own issue with its own chain.
        let mut manifest = match DependencyManifest::parse(&manifest_file.content) {
            Ok(manifest) => manifest,
            Err(_) => return Ok(StrategyOutcome::Declined),
        };

        let (version, pinned) = self.resolve_version(package);
        let added = if self.is_build_tooling(package) {
            manifest.add_dev_dependency(package, version)
        } else {
            manifest.add_dependency(package, version)
        };
        if !added {
            return Ok(StrategyOutcome::Declined);
        }

        let rendered = manifest.render();
        if let Some(file) = files.get_mut(&issue.file) {
            file.content = rendered;
        }
        let description = if pinned {
            format!("declared '{}' at {}", package, version)
        } else {
            format!("declared '{}' at the '{}' fallback", package, version)
        };
        let confidence = if pinned { 0.95 } else { 0.6 };
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

    fn missing(package: &str) -> Issue {
        Issue::error(
            IssueCategory::MissingDependency,
            "package.json",
            format!("'{}' is not declared", package),
        )
        .with_subject(package)
    }

    fn files_with_manifest(body: &str) -> FileSet {
        FileSet::from_files(vec![SourceFile::new("package.json", body)])
    }

    #[tokio::test]
    async fn test_feature_package_added_at_pinned_version() {
        let mut files =
            files_with_manifest("{\n  \"name\": \"demo\",\n  \"dependencies\": {}\n}\n");
        let strategy = DependencyStrategy::new(&ProjectConfig::default());
        let outcome = strategy
            .attempt(&mut files, &missing("react-router-dom"))
            .await
            .unwrap();
        assert!(outcome.is_applied());
        let manifest =
            DependencyManifest::parse(&files.get("package.json").unwrap().content).unwrap();
        assert_eq!(
            manifest.dependency_version("react-router-dom"),
            Some("^6.21.1")
        );
    }

    #[tokio::test]
    async fn test_build_tooling_lands_in_dev_dependencies() {
        let mut files = files_with_manifest("{\n  \"name\": \"demo\"\n}\n");
        let strategy = DependencyStrategy::new(&ProjectConfig::default());
        let outcome = strategy.attempt(&mut files, &missing("vite")).await.unwrap();
        assert!(outcome.is_applied());
        let manifest =
            DependencyManifest::parse(&files.get("package.json").unwrap().content).unwrap();
        assert_eq!(manifest.dev_dependencies.get("vite").map(String::as_str), Some("^5.0.12"));
        assert!(!manifest.dependencies.contains_key("vite"));
    }

    #[tokio::test]
    async fn test_unknown_package_uses_fallback_version() {
        let mut files = files_with_manifest("{\n  \"name\": \"demo\"\n}\n");
        let strategy = DependencyStrategy::new(&ProjectConfig::default());
        let outcome = strategy
            .attempt(&mut files, &missing("left-pad"))
            .await
            .unwrap();
        match outcome {
            StrategyOutcome::Applied(fix) => {
                assert!(fix.confidence < 0.7);
                assert!(fix.description.contains("fallback"));
            }
            StrategyOutcome::Declined => panic!("expected an applied fix"),
        }
        let manifest =
            DependencyManifest::parse(&files.get("package.json").unwrap().content).unwrap();
        assert_eq!(manifest.dependency_version("left-pad"), Some("latest"));
    }

    #[tokio::test]
    async fn test_already_declared_package_declines() {
        let mut files = files_with_manifest(
            "{\n  \"name\": \"demo\",\n  \"dependencies\": {\n    \"axios\": \"^1.6.5\"\n  }\n}\n",
        );
        let strategy = DependencyStrategy::new(&ProjectConfig::default());
        let outcome = strategy.attempt(&mut files, &missing("axios")).await.unwrap();
        assert_eq!(outcome, StrategyOutcome::Declined);
    }
}
