//! Manifest recovery and last-resort rebuild.
//!
//! Generators wrap manifests in markdown fences or emit them with
//! gaps more often than they emit broken JSON proper. Recovery strips
//! fences and merge-conflict leftovers, reparses and patches the gaps
//! in place, keeping every declaration the generator made. Only when
//! nothing parseable is left does the rebuild strategy replace the
//! manifest with the framework baseline.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::detect::issue::{Issue, Severity};
use crate::detect::structural;
use crate::project::files::FileSet;
use crate::project::manifest::DependencyManifest;
use crate::project::ProjectConfig;

use super::{FixMethod, RepairStrategy, StrategyOutcome};

pub struct ManifestRecoveryStrategy {
    config: ProjectConfig,
}

impl ManifestRecoveryStrategy {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Fills everything a parseable manifest can be missing: identity
    /// fields, the script table and the framework baseline packages.
    /// Returns what was filled.
    fn patch_gaps(&self, manifest: &mut DependencyManifest) -> Vec<String> {
        let mut patched = Vec::new();
        if manifest.name.is_empty() {
            manifest.name = self.config.project_slug.clone();
            patched.push("name".to_string());
        }
        if manifest.version.is_empty() {
            manifest.version = "0.1.0".to_string();
            patched.push("version".to_string());
        }
        for script in manifest.ensure_scripts() {
            patched.push(format!("scripts.{}", script));
        }
        patched.extend(manifest.merge_dependencies(self.config.framework.baseline_dependencies()));
        patched.extend(
            manifest.merge_dev_dependencies(self.config.framework.baseline_dev_dependencies()),
        );
        patched
    }
}

#[async_trait]
impl RepairStrategy for ManifestRecoveryStrategy {
    fn name(&self) -> &'static str {
        "manifest-recovery"
    }

    async fn attempt(&self, files: &mut FileSet, issue: &Issue) -> Result<StrategyOutcome> {
        let file = match files.get(&issue.file) {
            Some(file) => file,
            None => return Ok(StrategyOutcome::Declined),
        };

        let outcome = match DependencyManifest::parse(&file.content) {
            // Not parseable as written. Strip generation artifacts and
            // retry before anyone considers throwing the content away.
            Err(_) => {
                let (unfenced, stripped) = structural::strip_code_fences(&file.content);
                let (cleaned, conflicts) = structural::resolve_conflict_markers(&unfenced);
                if !stripped && conflicts == 0 {
                    return Ok(StrategyOutcome::Declined);
                }
                match DependencyManifest::parse(&cleaned) {
                    Ok(mut manifest) => {
                        let patched = self.patch_gaps(&mut manifest);
                        let rendered = manifest.render();
                        if let Some(file) = files.get_mut(&issue.file) {
                            file.content = rendered;
                        }
                        let description = if patched.is_empty() {
                            "recovered the manifest from generation artifacts".to_string()
                        } else {
                            format!(
                                "recovered the manifest from generation artifacts and filled {}",
                                patched.join(", ")
                            )
                        };
                        StrategyOutcome::applied(
                            &issue.file,
                            description,
                            0.85,
                            FixMethod::Deterministic,
                        )
                    }
                    Err(err) => {
                        debug!(error = %err, "artifact strip did not yield a parseable manifest");
                        StrategyOutcome::Declined
                    }
                }
            }
            // Parseable with gaps; fill them and keep every declaration
            // the generator made.
            Ok(mut manifest) => {
                let patched = self.patch_gaps(&mut manifest);
                if patched.is_empty() {
                    StrategyOutcome::Declined
                } else {
                    let rendered = manifest.render();
                    if let Some(file) = files.get_mut(&issue.file) {
                        file.content = rendered;
                    }
                    StrategyOutcome::applied(
                        &issue.file,
                        format!("filled manifest {}", patched.join(", ")),
                        0.9,
                        FixMethod::Deterministic,
                    )
                }
            }
        };
        Ok(outcome)
    }
}

/// Replaces an unrecoverable manifest with the framework baseline for
/// the configured project. Declarations that were in the broken file
/// are lost; the result is guaranteed to install and build.
pub struct ManifestRebuildStrategy {
    config: ProjectConfig,
}

impl ManifestRebuildStrategy {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl RepairStrategy for ManifestRebuildStrategy {
    fn name(&self) -> &'static str {
        "manifest-rebuild"
    }

    async fn attempt(&self, files: &mut FileSet, issue: &Issue) -> Result<StrategyOutcome> {
        if issue.severity != Severity::Error {
            return Ok(StrategyOutcome::Declined);
        }
        let file = match files.get(&issue.file) {
            Some(file) => file,
            None => return Ok(StrategyOutcome::Declined),
        };
        if DependencyManifest::parse(&file.content).is_ok() {
            return Ok(StrategyOutcome::Declined);
        }

        let rendered = DependencyManifest::baseline(&self.config).render();
        if let Some(file) = files.get_mut(&issue.file) {
            file.content = rendered;
        }
        Ok(StrategyOutcome::applied(
            &issue.file,
            format!(
                "rebuilt the manifest from the {} baseline",
                self.config.framework.display_name()
            ),
            0.7,
            FixMethod::Synthesized,
        ))
    }
}
