//! Manifest and dependency scans.
//!
//! An unparseable manifest short-circuits everything else: no
//! dependency conclusions can be drawn from a file that does not
//! parse, so the only finding is the parse failure itself and repair
//! falls to a full rebuild.

use std::collections::{BTreeMap, BTreeSet};

use crate::project::config::ProjectConfig;
use crate::project::features;
use crate::project::files::FileSet;
use crate::project::manifest::DependencyManifest;

use super::issue::{Issue, IssueCategory};
use super::modules;

pub(crate) fn scan(files: &FileSet, config: &ProjectConfig) -> Vec<Issue> {
    let manifest_file = match files.manifest() {
        Some(file) => file,
        // Presence of core files is checked separately.
        None => return Vec::new(),
    };

    let manifest = match DependencyManifest::parse(&manifest_file.content) {
        Ok(manifest) => manifest,
        Err(err) => {
            return vec![Issue::error(
                IssueCategory::ManifestInvalid,
                &manifest_file.path,
                format!("manifest is not parseable JSON: {}", err),
            )];
        }
    };

    let mut issues = Vec::new();
    let mut reported: BTreeSet<String> = BTreeSet::new();

    for (package, _) in config.framework.baseline_dependencies() {
        if !manifest.has_dependency(package) && reported.insert((*package).to_string()) {
            issues.push(
                Issue::error(
                    IssueCategory::MissingDependency,
                    &manifest_file.path,
                    format!(
                        "'{}' is required by the {} baseline but not declared",
                        package,
                        config.framework.display_name()
                    ),
                )
                .with_subject(*package),
            );
        }
    }
    for (package, _) in config.framework.baseline_dev_dependencies() {
        if !manifest.has_dependency(package) && reported.insert((*package).to_string()) {
            issues.push(
                Issue::error(
                    IssueCategory::MissingDependency,
                    &manifest_file.path,
                    format!("'{}' is required to build but not declared", package),
                )
                .with_subject(*package),
            );
        }
    }

    for feature in &config.features {
        for (package, _) in features::dependencies_for(feature) {
            if !manifest.has_dependency(package) && reported.insert((*package).to_string()) {
                issues.push(
                    Issue::error(
                        IssueCategory::MissingDependency,
                        &manifest_file.path,
                        format!(
                            "'{}' is required by the '{}' feature but not declared",
                            package, feature
                        ),
                    )
                    .with_subject(*package),
                );
            }
        }
    }

    // Bare imports across the source, first importer wins the message.
    let mut imported: BTreeMap<String, String> = BTreeMap::new();
    for file in files.iter() {
        if !file.category.is_script() {
            continue;
        }
        for spec in modules::extract_imports(&file.content) {
            if let Some(package) = modules::package_root(&spec) {
                imported
                    .entry(package.to_string())
                    .or_insert_with(|| file.path.clone());
            }
        }
    }
    for (package, importer) in imported {
        if !manifest.has_dependency(&package) && reported.insert(package.clone()) {
            issues.push(
                Issue::error(
                    IssueCategory::MissingDependency,
                    &manifest_file.path,
                    format!("'{}' is imported by {} but not declared", package, importer),
                )
                .with_subject(package),
            );
        }
    }

    // Gaps a parseable manifest can still have. Identity fields break
    // the install, so they are one critical finding; absent scripts
    // merely degrade the developer loop.
    let mut missing_fields = Vec::new();
    if manifest.name.is_empty() {
        missing_fields.push("name");
    }
    if manifest.version.is_empty() {
        missing_fields.push("version");
    }
    if !missing_fields.is_empty() {
        issues.push(
            Issue::error(
                IssueCategory::ManifestInvalid,
                &manifest_file.path,
                format!("manifest lacks {}", missing_fields.join(" and ")),
            )
            .with_subject(missing_fields.join(",")),
        );
    }
    if !manifest.scripts.contains_key("build") || !manifest.scripts.contains_key("dev") {
        issues.push(
            Issue::warning(
                IssueCategory::ManifestInvalid,
                &manifest_file.path,
                "manifest lacks the dev/build scripts",
            )
            .with_subject("scripts"),
        );
    }

    issues
}
