//! Repairs imports that point at nothing.
//!
//! Three moves, tried in order. A near-miss against an existing path
//! (a typo, a wrong directory, a renamed file) is relinked in the
//! importer. Otherwise the missing module is synthesized with stubs
//! for exactly the names the importer binds, so the project links.
//! The html shell's entry wiring is a special case handled by
//! injecting the module script rather than touching imports.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::detect::issue::Issue;
use crate::detect::modules;
use crate::project::files::FileSet;
use crate::templates::TemplateRegistry;

use super::{FixMethod, RepairStrategy, StrategyOutcome};

/// Paths at least this similar count as the same intended file.
const RELINK_THRESHOLD: f64 = 0.8;

const STRIPPABLE_EXTENSIONS: &[&str] = &["jsx", "tsx", "js", "ts"];

pub struct ReferenceStrategy {
    templates: Arc<TemplateRegistry>,
}

impl ReferenceStrategy {
    pub fn new(templates: Arc<TemplateRegistry>) -> Self {
        Self { templates }
    }

    fn wire_entry_script(
        &self,
        files: &mut FileSet,
        issue: &Issue,
        entry: &str,
    ) -> StrategyOutcome {
        let file = match files.get_mut(&issue.file) {
            Some(file) => file,
            None => return StrategyOutcome::Declined,
        };
        let tag = format!("<script type=\"module\" src=\"{}\"></script>", entry);
        if file.content.contains(&tag) {
            return StrategyOutcome::Declined;
        }
        match file.content.find("</body>") {
            Some(at) => {
                file.content.insert_str(at, &format!("    {}\n  ", tag));
            }
            None => {
                file.content.push_str(&tag);
                file.content.push('\n');
            }
        }
        StrategyOutcome::applied(
            &issue.file,
            format!("wired {} into the html shell", entry),
            0.9,
            FixMethod::Deterministic,
        )
    }

    fn relink(&self, files: &mut FileSet, issue: &Issue, spec: &str) -> Option<StrategyOutcome> {
        let desired = modules::join_relative(&issue.file, spec)?;
        let desired_key = comparison_key(&desired);

        let mut best: Option<(String, f64)> = None;
        for path in files.paths() {
            if path == issue.file {
                continue;
            }
            let score = strsim::normalized_levenshtein(desired_key, comparison_key(path));
            if score >= RELINK_THRESHOLD && best.as_ref().map_or(true, |(_, b)| score > *b) {
                best = Some((path.to_string(), score));
            }
        }
        let (target, score) = best?;

        let new_spec = relative_spec(&issue.file, &target);
        let importer = files.get_mut(&issue.file)?;
        let rewritten = importer
            .content
            .replace(&format!("'{}'", spec), &format!("'{}'", new_spec))
            .replace(&format!("\"{}\"", spec), &format!("\"{}\"", new_spec));
        if rewritten == importer.content {
            return None;
        }
        importer.content = rewritten;
        debug!(from = spec, to = new_spec.as_str(), score, "relinked import");
        Some(StrategyOutcome::applied(
            &issue.file,
            format!("relinked '{}' to '{}'", spec, new_spec),
            score as f32,
            FixMethod::Deterministic,
        ))
    }

    fn synthesize(&self, files: &mut FileSet, issue: &Issue, spec: &str) -> Option<StrategyOutcome> {
        let target = modules::synthesis_target(&issue.file, spec)?;
        let names = files
            .get(&issue.file)
            .map(|importer| named_bindings(&importer.content, spec))
            .unwrap_or_default();
        let stub = self.templates.synthesize_with_exports(&target, &names);
        files.insert(stub);

        let description = if names.is_empty() {
            format!("synthesized {} for the '{}' import", target, spec)
        } else {
            format!(
                "synthesized {} exporting {} for the '{}' import",
                target,
                names.join(", "),
                spec
            )
        };
        Some(StrategyOutcome::applied(
            target,
            description,
            0.75,
            FixMethod::Synthesized,
        ))
    }
}

#[async_trait]
impl RepairStrategy for ReferenceStrategy {
    fn name(&self) -> &'static str {
        "reference-repair"
    }

    async fn attempt(&self, files: &mut FileSet, issue: &Issue) -> Result<StrategyOutcome> {
        let spec = match issue.subject.as_deref() {
            Some(spec) => spec,
            None => return Ok(StrategyOutcome::Declined),
        };

        if spec.starts_with('/') {
            return Ok(self.wire_entry_script(files, issue, spec));
        }
        if !modules::is_relative(spec) {
            return Ok(StrategyOutcome::Declined);
        }
        // A previous fix may already have satisfied the import.
        if modules::resolve(files, &issue.file, spec).is_some() {
            return Ok(StrategyOutcome::Declined);
        }

        if let Some(outcome) = self.relink(files, issue, spec) {
            return Ok(outcome);
        }
        match self.synthesize(files, issue, spec) {
            Some(outcome) => Ok(outcome),
            None => Ok(StrategyOutcome::Declined),
        }
    }
}

/// Path with any script extension removed, for similarity comparison.
fn comparison_key(path: &str) -> &str {
    for extension in STRIPPABLE_EXTENSIONS {
        if let Some(stripped) = path.strip_suffix(extension) {
            if let Some(stripped) = stripped.strip_suffix('.') {
                return stripped;
            }
        }
    }
    path
}

/// Import specifier that reaches `target` from `importer`'s directory.
fn relative_spec(importer: &str, target: &str) -> String {
    let importer_dir: Vec<&str> = match importer.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target_parts: Vec<&str> = target.split('/').collect();

    let mut common = 0;
    while common < importer_dir.len()
        && common + 1 < target_parts.len()
        && importer_dir[common] == target_parts[common]
    {
        common += 1;
    }

    let ups = importer_dir.len() - common;
    let mut spec = if ups == 0 {
        "./".to_string()
    } else {
        "../".repeat(ups)
    };
    spec.push_str(&target_parts[common..].join("/"));

    for extension in STRIPPABLE_EXTENSIONS {
        let suffix = format!(".{}", extension);
        if let Some(stripped) = spec.strip_suffix(&suffix) {
            return stripped.to_string();
        }
    }
    spec
}

/// Names the importer binds from `spec` inside `{ .. }` clauses.
fn named_bindings(content: &str, spec: &str) -> Vec<String> {
    let pattern = format!(
        r#"import\s+([^'";]+?)\s+from\s+['"]{}['"]"#,
        regex::escape(spec)
    );
    let re = Regex::new(&pattern).expect("valid regex");

    let mut names = Vec::new();
    for capture in re.captures_iter(content) {
        let clause = &capture[1];
        let Some(open) = clause.find('{') else {
            continue;
        };
        let Some(close) = clause.rfind('}') else {
            continue;
        };
        for binding in clause[open + 1..close].split(',') {
            let name = binding
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}
