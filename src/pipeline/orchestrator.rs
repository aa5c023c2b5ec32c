//! The repair pipeline: prevent, detect, fix, verify.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::detect::{Issue, IssueCategory, IssueDetector};
use crate::llm::LLMClient;
use crate::project::files::{FileSet, SourceFile};
use crate::project::manifest::DependencyManifest;
use crate::project::ProjectConfig;
use crate::rollback::{BatchId, RollbackLedger};
use crate::simulator::BuildSimulator;
use crate::strategies::{FixMethod, StrategyFix, StrategyOutcome, StrategyRegistry};
use crate::templates::TemplateRegistry;

use super::report::{AppliedFix, PipelineResult, Readiness};

/// The one unrecoverable condition. Everything else degrades to an
/// unresolved issue inside a normal result.
#[derive(Debug, Error)]
pub enum RepairError {
    #[error("no input files; nothing to repair or synthesize from")]
    EmptyProject,
}

/// Orchestrates a full repair run.
///
/// Holds only the optional AI client; every call builds its own
/// registry, detector and rollback history, so concurrent calls share
/// nothing mutable.
pub struct RepairPipeline {
    client: Option<Arc<dyn LLMClient>>,
}

impl RepairPipeline {
    /// A pipeline with the AI rung disabled.
    pub fn new() -> Self {
        Self { client: None }
    }

    pub fn with_client(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Reads provider settings from the environment and wires the AI
    /// rung only when one is configured.
    pub fn from_environment() -> Result<Self, crate::config::ConfigError> {
        let config = crate::config::ScaffixConfig::default();
        config.validate()?;
        Ok(Self {
            client: config.create_client()?,
        })
    }

    /// Runs the four phases over a generated project and returns the
    /// repaired set with its audit trail. Per-issue failures never
    /// surface here; only an empty input does.
    pub async fn repair_project(
        &self,
        files: Vec<SourceFile>,
        config: &ProjectConfig,
    ) -> Result<PipelineResult, RepairError> {
        if files.is_empty() {
            return Err(RepairError::EmptyProject);
        }

        let start = Instant::now();
        let mut files = FileSet::from_files(files);
        let registry = StrategyRegistry::with_defaults(config, self.client.clone());
        let detector = IssueDetector::new(config);
        let templates = TemplateRegistry::new(config);
        let mut ledger = RollbackLedger::new();
        let batch_id = ledger.snapshot(&files);

        info!(
            files = files.len(),
            framework = %config.framework,
            ai = self.client.is_some(),
            "starting repair run"
        );

        let mut fixes: Vec<AppliedFix> = Vec::new();
        self.prevent(&mut files, config, &templates, &mut ledger, batch_id, &mut fixes);
        let prevented = fixes.len();

        let issues = detector.critical_issues(&files);
        debug!(count = issues.len(), "critical issues queued for repair");

        let mut unresolved: Vec<Issue> = Vec::new();
        for issue in &issues {
            match self.fix_issue(&mut files, issue, &registry).await {
                Some(fix) => {
                    ledger.record_fix(batch_id, &fix);
                    fixes.push(fix);
                }
                None => {
                    warn!(issue = %issue, "no strategy resolved the issue");
                    unresolved.push(issue.clone());
                }
            }
        }
        let fixed = fixes.len() - prevented;

        let report = BuildSimulator::new(config).simulate(&files);
        let status = if report.success && unresolved.is_empty() {
            Readiness::ReadyToUse
        } else {
            Readiness::NeedsAttention
        };
        for error in &report.errors {
            debug!(error = error.as_str(), "simulation error after repair");
        }

        let rollback = ledger
            .batch(batch_id)
            .cloned()
            .expect("batch opened at run start");
        let result = PipelineResult {
            files,
            fixes,
            unresolved,
            status,
            prevented,
            fixed,
            rollback,
            build_errors: report.errors,
            warnings: report.warnings,
        };
        info!(
            summary = result.summary().as_str(),
            duration_ms = start.elapsed().as_millis() as u64,
            "repair run finished"
        );
        Ok(result)
    }

    /// Phase 1: inject what the framework unconditionally requires, so
    /// detection runs against a structurally complete project. Feature
    /// dependencies are left to detect-then-fix so the audit trail
    /// separates provisioning from repair.
    fn prevent(
        &self,
        files: &mut FileSet,
        config: &ProjectConfig,
        templates: &TemplateRegistry,
        ledger: &mut RollbackLedger,
        batch_id: BatchId,
        fixes: &mut Vec<AppliedFix>,
    ) {
        for path in config.framework.core_files() {
            if files.contains(path) {
                continue;
            }
            let synthesized = templates.synthesize(path);
            let after = synthesized.content.clone();
            files.insert(synthesized);
            let fix = AppliedFix::from_strategy(
                "prevention",
                IssueCategory::MissingFile,
                StrategyFix {
                    file: path.to_string(),
                    description: format!("provisioned missing {}", path),
                    confidence: 0.9,
                    method: FixMethod::Synthesized,
                },
                None,
                Some(after),
            );
            ledger.record_fix(batch_id, &fix);
            fixes.push(fix);
        }

        self.merge_baseline_dependencies(files, config, ledger, batch_id, fixes);
    }

    fn merge_baseline_dependencies(
        &self,
        files: &mut FileSet,
        config: &ProjectConfig,
        ledger: &mut RollbackLedger,
        batch_id: BatchId,
        fixes: &mut Vec<AppliedFix>,
    ) {
        let manifest_file = match files.manifest() {
            Some(file) => file,
            None => return,
        };
        let path = manifest_file.path.clone();
        let before = manifest_file.content.clone();
        // An unparseable manifest goes through detect and the manifest
        // chain instead.
        let mut manifest = match DependencyManifest::parse(&before) {
            Ok(manifest) => manifest,
            Err(_) => return,
        };

        let mut merged = manifest.merge_dependencies(config.framework.baseline_dependencies());
        merged.extend(manifest.merge_dev_dependencies(config.framework.baseline_dev_dependencies()));
        if merged.is_empty() {
            return;
        }

        let after = manifest.render();
        if let Some(file) = files.get_mut(&path) {
            file.content = after.clone();
        }
        let fix = AppliedFix::from_strategy(
            "prevention",
            IssueCategory::MissingDependency,
            StrategyFix {
                file: path,
                description: format!("provisioned baseline dependencies: {}", merged.join(", ")),
                confidence: 0.95,
                method: FixMethod::Deterministic,
            },
            Some(before),
            Some(after),
        );
        ledger.record_fix(batch_id, &fix);
        fixes.push(fix);
    }

    /// Phase 3, one issue: walk the category chain, then the emergency
    /// tail. Strategy errors and no-op applications count as
    /// declinations. Returns the recorded fix of the first strategy
    /// that actually changed something.
    async fn fix_issue(
        &self,
        files: &mut FileSet,
        issue: &Issue,
        registry: &StrategyRegistry,
    ) -> Option<AppliedFix> {
        if !issue.auto_fixable {
            return None;
        }

        let chain = registry.chain(issue.category);
        for strategy in chain.iter().chain(registry.emergency_chain()) {
            let before = files.get(&issue.file).map(|f| f.content.clone());
            let outcome = match strategy.attempt(files, issue).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(
                        strategy = strategy.name(),
                        issue = %issue,
                        error = %err,
                        "strategy errored, treating as declined"
                    );
                    continue;
                }
            };
            let fix = match outcome {
                StrategyOutcome::Applied(fix) => fix,
                StrategyOutcome::Declined => continue,
            };

            // The fix writes either the issue's file or a new one.
            let before = if fix.file == issue.file { before } else { None };
            let after = files.get(&fix.file).map(|f| f.content.clone());
            if before.is_some() && before == after {
                debug!(
                    strategy = strategy.name(),
                    file = fix.file.as_str(),
                    "no-op application discarded"
                );
                continue;
            }

            info!(
                strategy = strategy.name(),
                issue = %issue,
                description = fix.description.as_str(),
                "issue fixed"
            );
            return Some(AppliedFix::from_strategy(
                strategy.name(),
                issue.category,
                fix,
                before,
                after,
            ));
        }
        None
    }
}

impl Default for RepairPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience for callers that do not hold a pipeline.
pub async fn repair_project(
    files: Vec<SourceFile>,
    config: &ProjectConfig,
) -> Result<PipelineResult, RepairError> {
    RepairPipeline::new().repair_project(files, config).await
}
