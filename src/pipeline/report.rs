//! The audit trail a repair run leaves behind.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::detect::{Issue, IssueCategory};
use crate::project::files::FileSet;
use crate::rollback::RollbackBatch;
use crate::strategies::{FixMethod, StrategyFix};

/// One recorded change, traceable to the strategy that made it and to
/// the rollback batch that can undo it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedFix {
    pub id: Uuid,
    pub category: IssueCategory,
    /// Path of the file the fix wrote or created.
    pub file: String,
    pub description: String,
    /// Content before the fix; `None` when the file did not exist.
    pub before: Option<String>,
    /// Content after the fix; `None` is reserved for deletions, which
    /// no current strategy performs.
    pub after: Option<String>,
    pub strategy: String,
    pub confidence: f32,
    pub method: FixMethod,
}

impl AppliedFix {
    pub(crate) fn from_strategy(
        strategy: &str,
        category: IssueCategory,
        fix: StrategyFix,
        before: Option<String>,
        after: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            file: fix.file,
            description: fix.description,
            before,
            after,
            strategy: strategy.to_string(),
            confidence: fix.confidence,
            method: fix.method,
        }
    }

    /// True when the fix created the file rather than changing it.
    pub fn created_file(&self) -> bool {
        self.before.is_none()
    }
}

impl std::fmt::Display for AppliedFix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} on {}: {} (confidence {:.2})",
            self.method, self.strategy, self.file, self.description, self.confidence
        )
    }
}

/// Final verdict over a repaired project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Readiness {
    /// Installs and builds as far as static checking can tell.
    ReadyToUse,
    /// Something survived repair; the audit trail says what and why.
    NeedsAttention,
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Readiness::ReadyToUse => write!(f, "ready-to-use"),
            Readiness::NeedsAttention => write!(f, "needs-attention"),
        }
    }
}

/// Everything a repair run produced, owned by the caller.
#[derive(Debug)]
pub struct PipelineResult {
    /// The repaired project.
    pub files: FileSet,
    /// Every change, prevention and repair alike, in application order.
    pub fixes: Vec<AppliedFix>,
    /// Issues no strategy could resolve.
    pub unresolved: Vec<Issue>,
    pub status: Readiness,
    /// Fixes applied before detection (missing core artifacts).
    pub prevented: usize,
    /// Fixes applied to detected issues.
    pub fixed: usize,
    /// Undo point covering the whole run.
    pub rollback: RollbackBatch,
    /// Blocking findings from the final simulation pass; what
    /// `NeedsAttention` asks a human to look at.
    pub build_errors: Vec<String>,
    /// Non-blocking findings from the final simulation pass.
    pub warnings: Vec<String>,
}

impl PipelineResult {
    pub fn is_ready(&self) -> bool {
        self.status == Readiness::ReadyToUse
    }

    /// One-line summary suitable for a log record.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} prevented, {} fixed, {} unresolved, {} build error(s), {} warning(s)",
            self.status,
            self.prevented,
            self.fixed,
            self.unresolved.len(),
            self.build_errors.len(),
            self.warnings.len()
        )
    }
}
