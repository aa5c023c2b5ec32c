//! The tail that runs when a critical issue survives its whole chain.
//!
//! Three escalating moves: scrub generation artifacts line by line,
//! force tag counts to balance by appending closers, and finally
//! replace the file with a template stub. All lossy to some degree,
//! which is why nothing reaches this strategy while a chain still has
//! cleaner options.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::detect::issue::Issue;
use crate::detect::{markup, structural};
use crate::patterns::PatternLibrary;
use crate::project::files::{FileCategory, FileSet};
use crate::project::manifest::DependencyManifest;
use crate::templates::TemplateRegistry;

use super::{FixMethod, RepairStrategy, StrategyOutcome};

pub struct EmergencyStrategy {
    patterns: Arc<PatternLibrary>,
    templates: Arc<TemplateRegistry>,
}

impl EmergencyStrategy {
    pub fn new(patterns: Arc<PatternLibrary>, templates: Arc<TemplateRegistry>) -> Self {
        Self {
            patterns,
            templates,
        }
    }

    fn scrub(&self, files: &mut FileSet, issue: &Issue) -> Option<StrategyOutcome> {
        let file = files.get(&issue.file)?;
        let application = self.patterns.apply_emergency(&file.content, file.category);
        if !application.changed() {
            return None;
        }
        let description = format!(
            "scrubbed generation artifacts via {}",
            application.rules.join(", ")
        );
        let confidence = application.confidence;
        if let Some(file) = files.get_mut(&issue.file) {
            file.content = application.content;
        }
        Some(StrategyOutcome::applied(
            &issue.file,
            description,
            confidence,
            FixMethod::Emergency,
        ))
    }

    fn close_tags(&self, files: &mut FileSet, issue: &Issue) -> Option<StrategyOutcome> {
        let file = files.get_mut(&issue.file)?;
        let balance = markup::tag_balance(&file.content);
        if balance.is_empty() || balance.iter().any(|(_, net)| *net < 0) {
            // Stray closers cannot be repaired by appending more.
            return None;
        }

        let mut closers = String::new();
        for (name, net) in balance.iter().rev() {
            for _ in 0..*net {
                closers.push_str(&format!("</{}>", name));
            }
        }
        let mut content = file.content.trim_end().to_string();
        content.push_str(&closers);
        content.push('\n');
        file.content = content;

        Some(StrategyOutcome::applied(
            &issue.file,
            format!("appended {} to balance the markup", closers),
            0.4,
            FixMethod::Emergency,
        ))
    }

    fn stub(&self, files: &mut FileSet, issue: &Issue) -> StrategyOutcome {
        let stub = self.templates.synthesize(&issue.file);
        if files
            .get(&issue.file)
            .map_or(false, |existing| existing.content == stub.content)
        {
            return StrategyOutcome::Declined;
        }
        warn!(file = %issue.file, "replacing unrecoverable file with a stub");
        files.insert(stub);
        StrategyOutcome::applied(
            &issue.file,
            "replaced the file with a working stub",
            0.3,
            FixMethod::Emergency,
        )
    }
}

#[async_trait]
impl RepairStrategy for EmergencyStrategy {
    fn name(&self) -> &'static str {
        "emergency-recovery"
    }

    async fn attempt(&self, files: &mut FileSet, issue: &Issue) -> Result<StrategyOutcome> {
        if let Some(file) = files.get(&issue.file) {
            // A manifest that parses is never stub-worthy; replacing it
            // would throw away every declaration the generator made.
            if file.category == FileCategory::Manifest
                && DependencyManifest::parse(&file.content).is_ok()
            {
                return Ok(StrategyOutcome::Declined);
            }
        }

        let outcome = match issue.subject.as_deref() {
            Some(structural::SLUG_CODE_FENCE) | Some(structural::SLUG_CONFLICT_MARKERS) => {
                match self.scrub(files, issue) {
                    Some(outcome) => outcome,
                    None => self.stub(files, issue),
                }
            }
            Some(markup::SLUG_UNBALANCED_TAGS) => match self.close_tags(files, issue) {
                Some(outcome) => outcome,
                None => self.stub(files, issue),
            },
            _ => self.stub(files, issue),
        };
        Ok(outcome)
    }
}
