//! The issue detector: one pass over the file set, every scan, sorted
//! findings out.

use tracing::debug;

use crate::project::config::ProjectConfig;
use crate::project::files::{FileCategory, FileSet};

use super::issue::{Issue, IssueCategory};
use super::{manifest, markup, modules, runtime, structural, style};

/// Runs every scan against a file set and returns the findings in
/// repair order.
///
/// Detection is read-only and deterministic: the same file set and
/// configuration always produce the same issue list. The build
/// simulator runs the same scans, which is what keeps "what we fix"
/// and "what we verify" from drifting apart.
pub struct IssueDetector {
    config: ProjectConfig,
}

impl IssueDetector {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn detect(&self, files: &FileSet) -> Vec<Issue> {
        let mut issues = Vec::new();

        for path in self.config.framework.core_files() {
            if !files.contains(path) {
                issues.push(Issue::error(
                    IssueCategory::MissingFile,
                    *path,
                    "required file is missing",
                ));
            }
        }

        let entry = self.config.framework.entry_point();
        if let Some(html) = files.get("index.html") {
            if !html.content.contains(entry) {
                issues.push(
                    Issue::error(
                        IssueCategory::MissingReference,
                        &html.path,
                        format!("no script tag loads the entry module {}", entry),
                    )
                    .with_subject(format!("/{}", entry)),
                );
            }
        }

        for file in files.iter() {
            match file.category {
                FileCategory::Markup => {
                    issues.extend(markup::scan(file, self.config.framework));
                    issues.extend(runtime::scan(file, self.config.strict_types));
                }
                FileCategory::Module => {
                    issues.extend(runtime::scan(file, self.config.strict_types));
                }
                FileCategory::Style => {
                    issues.extend(style::scan(file));
                }
                FileCategory::Manifest | FileCategory::Document => {}
            }
            issues.extend(structural::scan(file));
        }

        issues.extend(manifest::scan(files, &self.config));
        issues.extend(modules::scan(files));

        issues.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        debug!(count = issues.len(), "detection pass complete");
        issues
    }

    /// Findings that on their own stop a build or the first page load.
    pub fn critical_issues(&self, files: &FileSet) -> Vec<Issue> {
        self.detect(files)
            .into_iter()
            .filter(Issue::is_critical)
            .collect()
    }
}
