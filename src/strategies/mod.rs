//! Repair strategies and the registry that orders them.
//!
//! Each issue category has an ordered chain of strategies. The
//! orchestrator walks the chain until one applies; strategies that do
//! not recognise an issue decline instead of erroring, so a chain can
//! always fall through to the next entry. A separate emergency tail
//! runs only when a critical issue survives its whole chain.

pub mod ai;
pub mod dependency;
pub mod emergency;
pub mod manifest;
pub mod reference;
pub mod runtime;
pub mod structural;
pub mod synthesis;
pub mod syntax;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::detect::{Issue, IssueCategory};
use crate::llm::LLMClient;
use crate::patterns::PatternLibrary;
use crate::project::ProjectConfig;
use crate::project::files::FileSet;
use crate::templates::TemplateRegistry;

pub use ai::AiRewriteStrategy;
pub use dependency::DependencyStrategy;
pub use emergency::EmergencyStrategy;
pub use manifest::{ManifestRebuildStrategy, ManifestRecoveryStrategy};
pub use reference::ReferenceStrategy;
pub use runtime::RuntimeGuardStrategy;
pub use structural::StructuralStrategy;
pub use synthesis::FileSynthesisStrategy;
pub use syntax::SyntaxRuleStrategy;

/// How a fix was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixMethod {
    /// Rule-based rewrite with a known outcome.
    Deterministic,
    /// Content generated from a template.
    Synthesized,
    /// Content rewritten by a language model.
    AiAssisted,
    /// Last-resort recovery, possibly lossy.
    Emergency,
}

impl std::fmt::Display for FixMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FixMethod::Deterministic => "deterministic",
            FixMethod::Synthesized => "synthesized",
            FixMethod::AiAssisted => "ai-assisted",
            FixMethod::Emergency => "emergency",
        };
        write!(f, "{}", label)
    }
}

/// What a strategy did to the file set.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyFix {
    /// Path of the file the strategy wrote or created.
    pub file: String,
    pub description: String,
    pub confidence: f32,
    pub method: FixMethod,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    Applied(StrategyFix),
    /// The strategy does not handle this issue; the chain moves on.
    Declined,
}

impl StrategyOutcome {
    pub fn applied(
        file: impl Into<String>,
        description: impl Into<String>,
        confidence: f32,
        method: FixMethod,
    ) -> Self {
        Self::Applied(StrategyFix {
            file: file.into(),
            description: description.into(),
            confidence,
            method,
        })
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// A single way of repairing one class of issue.
///
/// `attempt` mutates the file set directly and reports what it wrote.
/// Strategies must never fail the run for an issue they cannot fix;
/// they decline and let the chain continue. An `Err` is reserved for
/// genuinely unexpected conditions and is logged, not propagated.
#[async_trait]
pub trait RepairStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, files: &mut FileSet, issue: &Issue) -> Result<StrategyOutcome>;
}

/// Ordered strategy chains per issue category plus the emergency tail.
pub struct StrategyRegistry {
    chains: HashMap<IssueCategory, Vec<Arc<dyn RepairStrategy>>>,
    emergency: Vec<Arc<dyn RepairStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            chains: HashMap::new(),
            emergency: Vec::new(),
        }
    }

    /// The stock wiring. The AI rewrite rung is present only when a
    /// client was configured; every chain works without one.
    pub fn with_defaults(config: &ProjectConfig, client: Option<Arc<dyn LLMClient>>) -> Self {
        let patterns = Arc::new(PatternLibrary::with_defaults());
        let templates = Arc::new(TemplateRegistry::new(config));

        let mut registry = Self::new();
        registry.register(
            IssueCategory::Syntax,
            Arc::new(SyntaxRuleStrategy::new(config.framework, patterns.clone())),
        );
        registry.register(
            IssueCategory::MissingDependency,
            Arc::new(DependencyStrategy::new(config)),
        );
        registry.register(
            IssueCategory::MissingReference,
            Arc::new(ReferenceStrategy::new(templates.clone())),
        );
        registry.register(
            IssueCategory::MissingFile,
            Arc::new(FileSynthesisStrategy::new(templates.clone())),
        );
        registry.register(
            IssueCategory::ManifestInvalid,
            Arc::new(ManifestRecoveryStrategy::new(config)),
        );
        registry.register(
            IssueCategory::ManifestInvalid,
            Arc::new(ManifestRebuildStrategy::new(config)),
        );
        registry.register(
            IssueCategory::RuntimeSafety,
            Arc::new(RuntimeGuardStrategy::new(patterns.clone())),
        );
        registry.register(
            IssueCategory::Structural,
            Arc::new(StructuralStrategy::new()),
        );

        if let Some(client) = client {
            let ai = Arc::new(AiRewriteStrategy::new(client, config));
            registry.register(IssueCategory::Syntax, ai.clone());
            registry.register(IssueCategory::Structural, ai.clone());
            registry.register(IssueCategory::RuntimeSafety, ai);
        }

        registry
            .emergency
            .push(Arc::new(EmergencyStrategy::new(patterns, templates)));
        debug_assert!(
            IssueCategory::all_variants()
                .into_iter()
                .all(|category| !registry.chain(category).is_empty()),
            "every issue category needs a repair chain"
        );
        registry
    }

    pub fn register(&mut self, category: IssueCategory, strategy: Arc<dyn RepairStrategy>) {
        self.chains.entry(category).or_default().push(strategy);
    }

    pub fn register_emergency(&mut self, strategy: Arc<dyn RepairStrategy>) {
        self.emergency.push(strategy);
    }

    /// The chain for a category, in attempt order. Empty when nothing
    /// is registered.
    pub fn chain(&self, category: IssueCategory) -> &[Arc<dyn RepairStrategy>] {
        self.chains.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn emergency_chain(&self) -> &[Arc<dyn RepairStrategy>] {
        &self.emergency
    }

    pub fn chain_len(&self, category: IssueCategory) -> usize {
        self.chain(category).len()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
