//! Typed model of the npm manifest (`package.json`).
//!
//! Parsing is strict JSON but lenient on shape: every field is optional
//! and anything the model does not know about is kept in `extra` so a
//! rewrite never drops caller data. Rendering always produces 2-space
//! pretty JSON with a trailing newline, matching what scaffolding tools
//! emit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::ProjectConfig;
use super::features;

/// Scripts every buildable Vite project carries.
const BASELINE_SCRIPTS: &[(&str, &str)] = &[
    ("dev", "vite"),
    ("build", "vite build"),
    ("preview", "vite preview"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyManifest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scripts: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl DependencyManifest {
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Renders 2-space pretty JSON with a trailing newline.
    pub fn render(&self) -> String {
        let mut body =
            serde_json::to_string_pretty(self).expect("manifest serializes to JSON");
        body.push('\n');
        body
    }

    /// True when the package appears in either dependency table.
    pub fn has_dependency(&self, package: &str) -> bool {
        self.dependencies.contains_key(package) || self.dev_dependencies.contains_key(package)
    }

    pub fn dependency_version(&self, package: &str) -> Option<&str> {
        self.dependencies
            .get(package)
            .or_else(|| self.dev_dependencies.get(package))
            .map(String::as_str)
    }

    /// Adds a runtime dependency unless the package is already declared
    /// somewhere. Returns whether an entry was written.
    pub fn add_dependency(&mut self, package: &str, version: &str) -> bool {
        if self.has_dependency(package) {
            return false;
        }
        self.dependencies
            .insert(package.to_string(), version.to_string());
        true
    }

    pub fn add_dev_dependency(&mut self, package: &str, version: &str) -> bool {
        if self.has_dependency(package) {
            return false;
        }
        self.dev_dependencies
            .insert(package.to_string(), version.to_string());
        true
    }

    /// Adds every missing entry, returning the package names written.
    pub fn merge_dependencies(&mut self, entries: &[(&str, &str)]) -> Vec<String> {
        let mut added = Vec::new();
        for (package, version) in entries {
            if self.add_dependency(package, version) {
                added.push((*package).to_string());
            }
        }
        added
    }

    pub fn merge_dev_dependencies(&mut self, entries: &[(&str, &str)]) -> Vec<String> {
        let mut added = Vec::new();
        for (package, version) in entries {
            if self.add_dev_dependency(package, version) {
                added.push((*package).to_string());
            }
        }
        added
    }

    /// Fills in the scripts a Vite project needs to build and run.
    pub fn ensure_scripts(&mut self) -> Vec<String> {
        let mut added = Vec::new();
        for (script, command) in BASELINE_SCRIPTS {
            if !self.scripts.contains_key(*script) {
                self.scripts
                    .insert((*script).to_string(), (*command).to_string());
                added.push((*script).to_string());
            }
        }
        added
    }

    /// Builds the complete manifest a freshly generated project should
    /// have carried: framework baseline plus every selected feature.
    pub fn baseline(config: &ProjectConfig) -> Self {
        let mut manifest = Self {
            name: config.project_slug.clone(),
            version: "0.1.0".to_string(),
            private: Some(true),
            package_type: Some("module".to_string()),
            ..Self::default()
        };
        manifest.ensure_scripts();
        manifest.merge_dependencies(config.framework.baseline_dependencies());
        manifest.merge_dev_dependencies(config.framework.baseline_dev_dependencies());
        for feature in &config.features {
            manifest.merge_dependencies(features::dependencies_for(feature));
        }
        manifest
    }
}
