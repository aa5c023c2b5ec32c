//! Whole-file rewrite through a language model.
//!
//! The rung of last resort before emergency recovery: the broken file
//! and its finding go out, a complete corrected file comes back. The
//! reply is only accepted when the original finding no longer scans in
//! it, so a model that returns prose, apologies or the same bug leaves
//! the file untouched.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::detect::issue::{Issue, IssueCategory};
use crate::detect::{markup, runtime, structural, style};
use crate::llm::{ChatMessage, LLMClient, LLMRequest};
use crate::project::files::{FileCategory, FileSet, SourceFile};
use crate::project::framework::FrameworkId;
use crate::project::ProjectConfig;

use super::{FixMethod, RepairStrategy, StrategyOutcome};

const SYSTEM_PROMPT: &str = r#"You repair individual files from generated web application projects.

You receive one broken file and a description of what is wrong with it. Reply with the complete corrected file and nothing else: no explanation, no surrounding prose. Wrap the file in a single fenced code block. Preserve everything that already works; change only what the problem description requires."#;

pub struct AiRewriteStrategy {
    client: Arc<dyn LLMClient>,
    framework: FrameworkId,
    strict_types: bool,
}

impl AiRewriteStrategy {
    pub fn new(client: Arc<dyn LLMClient>, config: &ProjectConfig) -> Self {
        Self {
            client,
            framework: config.framework,
            strict_types: config.strict_types,
        }
    }

    fn build_request(&self, issue: &Issue, file: &SourceFile) -> LLMRequest {
        let user = format!(
            "Project framework: {}\nFile: {}\nProblem: {}\n\n```\n{}```",
            self.framework.display_name(),
            file.path,
            issue.message,
            ensure_trailing_newline(&file.content),
        );
        LLMRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user),
        ])
        .with_temperature(0.1)
    }

    /// Re-scans the candidate for the finding that prompted the
    /// rewrite. True means the model did not actually fix it.
    fn still_present(&self, issue: &Issue, candidate: &SourceFile) -> bool {
        let findings = match issue.category {
            IssueCategory::Syntax => match candidate.category {
                FileCategory::Markup => markup::scan(candidate, self.framework),
                FileCategory::Style => style::scan(candidate),
                _ => Vec::new(),
            },
            IssueCategory::Structural => structural::scan(candidate),
            IssueCategory::RuntimeSafety => runtime::scan(candidate, self.strict_types),
            _ => Vec::new(),
        };
        findings
            .iter()
            .any(|f| f.category == issue.category && f.subject == issue.subject)
    }
}

#[async_trait]
impl RepairStrategy for AiRewriteStrategy {
    fn name(&self) -> &'static str {
        "ai-rewrite"
    }

    async fn attempt(&self, files: &mut FileSet, issue: &Issue) -> Result<StrategyOutcome> {
        let file = match files.get(&issue.file) {
            Some(file) => file.clone(),
            None => return Ok(StrategyOutcome::Declined),
        };

        let request = self.build_request(issue, &file);
        let response = match self.client.chat(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(file = %issue.file, error = %err, "model call failed, declining");
                return Ok(StrategyOutcome::Declined);
            }
        };

        let body = match extract_file_reply(&response.content) {
            Some(body) => ensure_trailing_newline(&body),
            None => {
                debug!(file = %issue.file, "model reply held no usable file body");
                return Ok(StrategyOutcome::Declined);
            }
        };
        if body == file.content {
            return Ok(StrategyOutcome::Declined);
        }

        let candidate = SourceFile::new(&issue.file, &body);
        if self.still_present(issue, &candidate) {
            debug!(file = %issue.file, "model reply still scans with the finding");
            return Ok(StrategyOutcome::Declined);
        }

        files.insert(candidate);
        Ok(StrategyOutcome::applied(
            &issue.file,
            format!("rewrote the file via {}", self.client.name()),
            0.6,
            FixMethod::AiAssisted,
        ))
    }
}

/// The file body of a model reply: the first fenced block when one is
/// present, the whole trimmed reply otherwise. None when empty.
fn extract_file_reply(reply: &str) -> Option<String> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(open) = trimmed.find("```") {
        let after_fence = &trimmed[open + 3..];
        let body_start = after_fence.find('\n').map(|i| i + 1)?;
        let body = &after_fence[body_start..];
        let body = match body.find("```") {
            Some(close) => &body[..close],
            None => body,
        };
        let body = body
            .trim_start_matches('\n')
            .trim_end_matches(|c| c == '\n' || c == ' ');
        if body.is_empty() {
            return None;
        }
        return Some(body.to_string());
    }

    Some(trimmed.to_string())
}

fn ensure_trailing_newline(content: &str) -> String {
    if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{}\n", content)
    }
}
