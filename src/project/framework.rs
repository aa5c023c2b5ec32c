//! Target framework profiles.
//!
//! A profile pins down everything framework-specific the pipeline needs:
//! which packages a buildable project must declare, which files must
//! exist, and which top-level import a component file cannot do without.
//! Both supported targets compile JSX through Vite, so file handling is
//! shared and only the profile data differs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the framework a scaffold targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameworkId {
    #[default]
    React,
    Preact,
}

impl FrameworkId {
    pub fn all_variants() -> Vec<FrameworkId> {
        vec![FrameworkId::React, FrameworkId::Preact]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FrameworkId::React => "React",
            FrameworkId::Preact => "Preact",
        }
    }

    /// Runtime packages every project for this framework must declare.
    pub fn baseline_dependencies(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            FrameworkId::React => &[("react", "^18.2.0"), ("react-dom", "^18.2.0")],
            FrameworkId::Preact => &[("preact", "^10.19.3")],
        }
    }

    /// Build tooling every project for this framework must declare.
    pub fn baseline_dev_dependencies(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            FrameworkId::React => &[("vite", "^5.0.12"), ("@vitejs/plugin-react", "^4.2.1")],
            FrameworkId::Preact => &[("vite", "^5.0.12"), ("@preact/preset-vite", "^2.8.1")],
        }
    }

    /// Files a project cannot build without, manifest included.
    pub fn core_files(&self) -> &'static [&'static str] {
        &[
            "package.json",
            "index.html",
            "vite.config.js",
            "src/main.jsx",
            "src/App.jsx",
            "src/index.css",
        ]
    }

    /// Module that boots the app; referenced from `index.html`.
    pub fn entry_point(&self) -> &'static str {
        "src/main.jsx"
    }

    /// Top-level component the entry point renders.
    pub fn root_component(&self) -> &'static str {
        "src/App.jsx"
    }

    /// Substring whose absence from a component file means the runtime
    /// import was dropped by the generator.
    pub fn jsx_import_probe(&self) -> &'static str {
        match self {
            FrameworkId::React => "import React",
            FrameworkId::Preact => "from 'preact'",
        }
    }

    /// Import statement to prepend when the probe is missing.
    pub fn jsx_import_line(&self) -> &'static str {
        match self {
            FrameworkId::React => "import React from 'react';",
            FrameworkId::Preact => "import { h } from 'preact';",
        }
    }

    /// Vite plugin import used when regenerating `vite.config.js`.
    pub fn vite_plugin(&self) -> (&'static str, &'static str) {
        match self {
            FrameworkId::React => ("react", "@vitejs/plugin-react"),
            FrameworkId::Preact => ("preact", "@preact/preset-vite"),
        }
    }
}

impl fmt::Display for FrameworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameworkId::React => write!(f, "react"),
            FrameworkId::Preact => write!(f, "preact"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_react_baseline_packages() {
        let deps = FrameworkId::React.baseline_dependencies();
        assert!(deps.iter().any(|(name, _)| *name == "react"));
        assert!(deps.iter().any(|(name, _)| *name == "react-dom"));
    }

    #[test]
    fn test_core_files_include_manifest_and_entry() {
        for framework in FrameworkId::all_variants() {
            let core = framework.core_files();
            assert!(core.contains(&"package.json"));
            assert!(core.contains(&framework.entry_point()));
            assert!(core.contains(&framework.root_component()));
        }
    }

    #[test]
    fn test_import_probe_matches_its_own_line() {
        for framework in FrameworkId::all_variants() {
            assert!(framework
                .jsx_import_line()
                .contains(framework.jsx_import_probe()));
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&FrameworkId::Preact).unwrap();
        assert_eq!(json, "\"preact\"");
        let back: FrameworkId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FrameworkId::Preact);
    }
}
