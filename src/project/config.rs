//! Project-level configuration supplied by the caller alongside the
//! generated files.
//!
//! The configuration describes what the scaffold was *supposed* to be:
//! the business it was generated for, the target framework and the
//! feature set the generator was asked to include. Repair decisions
//! (baseline dependencies, template contents, strictness of runtime
//! checks) are derived from it.

use serde::{Deserialize, Serialize};

use super::framework::FrameworkId;

/// Describes the intended shape of a generated project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Human-readable name of the business or product the app is for.
    pub business_name: String,
    /// Kebab-case identifier used as the package name in the manifest.
    pub project_slug: String,
    /// Framework the generator targeted.
    pub framework: FrameworkId,
    /// Feature slugs the generator was asked to include (e.g. "routing").
    pub features: Vec<String>,
    /// Treat runtime-safety findings as build-blocking errors.
    pub strict_types: bool,
}

impl ProjectConfig {
    pub fn new(business_name: impl Into<String>) -> Self {
        let business_name = business_name.into();
        let project_slug = slugify(&business_name);
        Self {
            business_name,
            project_slug,
            framework: FrameworkId::default(),
            features: Vec::new(),
            strict_types: false,
        }
    }

    pub fn with_framework(mut self, framework: FrameworkId) -> Self {
        self.framework = framework;
        self
    }

    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.features = features;
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.project_slug = slugify(&slug.into());
        self
    }

    pub fn with_strict_types(mut self, strict: bool) -> Self {
        self.strict_types = strict;
        self
    }

    pub fn has_feature(&self, slug: &str) -> bool {
        self.features.iter().any(|f| f == slug)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::new("Generated App")
    }
}

/// Lowercases and collapses a display name into a package-safe slug.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "app".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_derived_from_business_name() {
        let config = ProjectConfig::new("Blue Bottle Coffee");
        assert_eq!(config.project_slug, "blue-bottle-coffee");
    }

    #[test]
    fn test_slug_collapses_punctuation() {
        assert_eq!(slugify("Joe's  Diner & Grill"), "joe-s-diner-grill");
        assert_eq!(slugify("---"), "app");
        assert_eq!(slugify("  Cafe  "), "cafe");
    }

    #[test]
    fn test_builder_methods() {
        let config = ProjectConfig::new("Acme")
            .with_framework(FrameworkId::Preact)
            .with_feature("routing")
            .with_feature("state")
            .with_strict_types(true);
        assert_eq!(config.framework, FrameworkId::Preact);
        assert!(config.has_feature("routing"));
        assert!(config.has_feature("state"));
        assert!(!config.has_feature("charts"));
        assert!(config.strict_types);
    }

    #[test]
    fn test_default_targets_react() {
        let config = ProjectConfig::default();
        assert_eq!(config.framework, FrameworkId::React);
        assert!(config.features.is_empty());
        assert!(!config.strict_types);
    }
}
