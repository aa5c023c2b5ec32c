//! Strips generation artifacts that make a file unreadable as code.

use anyhow::Result;
use async_trait::async_trait;

use crate::detect::issue::Issue;
use crate::detect::structural;
use crate::project::files::FileSet;

use super::{FixMethod, RepairStrategy, StrategyOutcome};

/// Handles markdown fences around whole files, leftover merge-style
/// conflict markers, and code with an unbalanced brace count.
pub struct StructuralStrategy;

impl StructuralStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StructuralStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepairStrategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        "structural-recovery"
    }

    async fn attempt(&self, files: &mut FileSet, issue: &Issue) -> Result<StrategyOutcome> {
        let defect = match issue.subject.as_deref() {
            Some(defect) => defect,
            None => return Ok(StrategyOutcome::Declined),
        };
        let file = match files.get_mut(&issue.file) {
            Some(file) => file,
            None => return Ok(StrategyOutcome::Declined),
        };

        let outcome = match defect {
            structural::SLUG_CODE_FENCE => {
                let (content, stripped) = structural::strip_code_fences(&file.content);
                if !stripped {
                    StrategyOutcome::Declined
                } else {
                    file.content = content;
                    StrategyOutcome::applied(
                        &issue.file,
                        "stripped the surrounding markdown fence",
                        0.9,
                        FixMethod::Deterministic,
                    )
                }
            }
            structural::SLUG_CONFLICT_MARKERS => {
                let (content, resolved) = structural::resolve_conflict_markers(&file.content);
                if resolved == 0 {
                    StrategyOutcome::Declined
                } else {
                    file.content = content;
                    StrategyOutcome::applied(
                        &issue.file,
                        format!("resolved {} conflict section(s), keeping the first variant", resolved),
                        0.8,
                        FixMethod::Deterministic,
                    )
                }
            }
            structural::SLUG_BRACE_BALANCE => {
                let (content, net) = structural::close_code_blocks(&file.content);
                if content == file.content {
                    StrategyOutcome::Declined
                } else {
                    file.content = content;
                    StrategyOutcome::applied(
                        &issue.file,
                        format!("rebalanced code blocks ({:+})", net),
                        0.65,
                        FixMethod::Deterministic,
                    )
                }
            }
            _ => StrategyOutcome::Declined,
        };
        Ok(outcome)
    }
}
