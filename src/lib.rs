//! scaffix - repair pipeline for AI-generated web application projects
//!
//! This library takes the file set an LLM produced for a small web
//! application, finds the defects that would stop it from building or
//! rendering, and repairs them. Deterministic strategies do almost all
//! of the work; an optional AI-assisted strategy handles the leftovers
//! when a provider is configured.
//!
//! # Core Concepts
//!
//! - **Prevention**: missing framework core files and baseline
//!   dependencies are provisioned before detection runs
//! - **Detection**: static scans classify defects into categories
//!   (syntax, references, manifest, runtime safety, structure)
//! - **Strategy chains**: each category has an ordered chain of repair
//!   strategies, with an emergency tail for anything that survives
//! - **Audit trail**: every applied fix is recorded with before/after
//!   content in a rollback batch, so a run can be undone byte-exactly
//!
//! # Example Usage
//!
//! ```ignore
//! use scaffix::{ProjectConfig, RepairPipeline, SourceFile};
//!
//! async fn repair(files: Vec<SourceFile>) -> anyhow::Result<()> {
//!     let config = ProjectConfig::new("Fresh Bakes Bakery").with_feature("routing");
//!     let pipeline = RepairPipeline::from_environment()?;
//!     let result = pipeline.repair_project(files, &config).await?;
//!
//!     println!("{}", result.summary());
//!     for fix in &result.fixes {
//!         println!("  {}", fix);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`project`]: file sets, frameworks, features, the manifest model
//! - [`detect`]: issue model and the static detectors
//! - [`strategies`]: the repair strategies and their registry
//! - [`pipeline`]: the orchestrator tying the phases together
//! - [`templates`]: file synthesis for missing or hopeless files
//! - [`rollback`]: the ledger of applied fixes and snapshots
//! - [`simulator`]: static build verification of the repaired set
//! - [`llm`]: the optional AI client seam
//!
//! # Features
//!
//! - Deterministic-first repair; runs fully offline by default
//! - Optional AI-assisted rewriting through any `genai` provider
//! - Byte-exact rollback of every run
//! - Static build simulation as the final verification gate

// Public modules
pub mod config;
pub mod detect;
pub mod llm;
pub mod patterns;
pub mod pipeline;
pub mod project;
pub mod rollback;
pub mod simulator;
pub mod strategies;
pub mod templates;
pub mod util;

// Re-export key types for convenient access
pub use config::{ConfigError, ScaffixConfig};
pub use detect::{Issue, IssueCategory, IssueDetector, Severity};
pub use llm::{BackendError, LLMClient};
pub use pipeline::{
    repair_project, AppliedFix, PipelineResult, Readiness, RepairError, RepairPipeline,
};
pub use project::{FileSet, FrameworkId, ProjectConfig, SourceFile};
pub use rollback::{RollbackBatch, RollbackLedger};
pub use simulator::{BuildSimulator, SimulationReport};
pub use strategies::{FixMethod, RepairStrategy, StrategyRegistry};
pub use templates::TemplateRegistry;
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
