//! Static build simulation.
//!
//! Answers "would `npm install && npm run build` get past the cheap
//! failures" without running anything: mandatory files present, the
//! manifest parseable with its required fields and baseline
//! dependencies, and a quick syntax probe over markup and style files.
//! Module-reference resolution is deliberately left to the detector;
//! the simulator stays allocation-light and is also run standalone.

use serde::Serialize;
use tracing::debug;

use crate::detect::{markup, style};
use crate::project::files::{FileCategory, FileSet};
use crate::project::manifest::DependencyManifest;
use crate::project::ProjectConfig;

/// Outcome of one simulation pass.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// True when nothing build-blocking was found.
    pub success: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl SimulationReport {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

pub struct BuildSimulator {
    config: ProjectConfig,
}

impl BuildSimulator {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn simulate(&self, files: &FileSet) -> SimulationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for path in self.config.framework.core_files() {
            if !files.contains(path) {
                errors.push(format!("{}: required file is missing", path));
            }
        }

        if let Some(manifest_file) = files.manifest() {
            self.check_manifest(
                &manifest_file.path,
                &manifest_file.content,
                &mut errors,
                &mut warnings,
            );
        }

        for file in files.iter() {
            let findings = match file.category {
                FileCategory::Markup => markup::scan(file, self.config.framework),
                FileCategory::Style => style::scan(file),
                _ => continue,
            };
            for finding in findings {
                if finding.is_critical() {
                    errors.push(format!("{}: {}", finding.file, finding.message));
                } else {
                    warnings.push(format!("{}: {}", finding.file, finding.message));
                }
            }
        }

        let success = errors.is_empty();
        debug!(
            success,
            errors = errors.len(),
            warnings = warnings.len(),
            "simulation pass complete"
        );
        SimulationReport {
            success,
            errors,
            warnings,
        }
    }

    fn check_manifest(
        &self,
        path: &str,
        content: &str,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) {
        let manifest = match DependencyManifest::parse(content) {
            Ok(manifest) => manifest,
            Err(err) => {
                errors.push(format!("{}: not parseable JSON: {}", path, err));
                return;
            }
        };

        if manifest.name.is_empty() {
            errors.push(format!("{}: package name is required", path));
        }
        if manifest.version.is_empty() {
            errors.push(format!("{}: package version is required", path));
        }
        for (package, _) in self.config.framework.baseline_dependencies() {
            if !manifest.has_dependency(package) {
                errors.push(format!("{}: baseline dependency '{}' is missing", path, package));
            }
        }
        for (package, _) in self.config.framework.baseline_dev_dependencies() {
            if !manifest.has_dependency(package) {
                errors.push(format!("{}: build tool '{}' is missing", path, package));
            }
        }
        if !manifest.scripts.contains_key("dev") || !manifest.scripts.contains_key("build") {
            warnings.push(format!("{}: dev/build scripts are not declared", path));
        }
    }
}
