//! Domain model shared by every stage of the pipeline: the in-memory
//! file set, the caller-supplied project configuration, the framework
//! profiles and the typed npm manifest.

pub mod config;
pub mod features;
pub mod files;
pub mod framework;
pub mod manifest;

pub use config::ProjectConfig;
pub use features::{FeatureSpec, FEATURES};
pub use files::{FileCategory, FileSet, SourceFile};
pub use framework::FrameworkId;
pub use manifest::DependencyManifest;
