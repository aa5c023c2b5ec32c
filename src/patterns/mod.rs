//! The pattern library: named regex rewrites for the defect classes
//! that are regex-shaped.
//!
//! Rules compile from the same pattern constants the scans match on,
//! so a rule repairs exactly what detection flagged. Application is
//! single-pass: each rule runs once over the content, patterns are
//! written so their own output never rematches, and nothing loops to a
//! fixed point.
//!
//! Confidence is descriptive. It is reported on the applied fix for
//! the caller's benefit and never gates whether a rule runs.

use regex::Regex;

use crate::detect::issue::IssueCategory;
use crate::detect::{markup, runtime};
use crate::project::files::FileCategory;

/// A single named rewrite.
pub struct RewriteRule {
    pub name: &'static str,
    /// Defect slug this rule repairs, as carried in issue subjects.
    pub defect: &'static str,
    pub category: IssueCategory,
    /// File categories the rule may touch.
    pub applies_to: &'static [FileCategory],
    pattern: Regex,
    replacement: &'static str,
    pub confidence: f32,
}

impl RewriteRule {
    fn new(
        name: &'static str,
        defect: &'static str,
        category: IssueCategory,
        applies_to: &'static [FileCategory],
        pattern: &str,
        replacement: &'static str,
        confidence: f32,
    ) -> Self {
        Self {
            name,
            defect,
            category,
            applies_to,
            pattern: Regex::new(pattern).expect("valid regex"),
            replacement,
            confidence,
        }
    }

    /// Applies the rule once, returning the rewritten content and the
    /// number of replacements made.
    pub fn apply(&self, content: &str) -> (String, usize) {
        let hits = self.pattern.find_iter(content).count();
        if hits == 0 {
            return (content.to_string(), 0);
        }
        let rewritten = self.pattern.replace_all(content, self.replacement);
        (rewritten.into_owned(), hits)
    }

    pub fn allows(&self, file_category: FileCategory) -> bool {
        self.applies_to.contains(&file_category)
    }
}

/// Outcome of running a rule group over one file's content.
pub struct PatternApplication {
    pub content: String,
    /// Names of the rules that made at least one replacement.
    pub rules: Vec<&'static str>,
    pub replacements: usize,
    /// Lowest confidence among the rules that fired; 1.0 if none did.
    pub confidence: f32,
}

impl PatternApplication {
    fn untouched(content: &str) -> Self {
        Self {
            content: content.to_string(),
            rules: Vec::new(),
            replacements: 0,
            confidence: 1.0,
        }
    }

    pub fn changed(&self) -> bool {
        self.replacements > 0
    }
}

const SCRIPT: &[FileCategory] = &[FileCategory::Markup, FileCategory::Module];
const MARKUP_ONLY: &[FileCategory] = &[FileCategory::Markup];
const ANY_TEXT: &[FileCategory] = &[
    FileCategory::Markup,
    FileCategory::Module,
    FileCategory::Style,
    FileCategory::Manifest,
    FileCategory::Document,
];

pub struct PatternLibrary {
    rules: Vec<RewriteRule>,
    emergency: Vec<RewriteRule>,
}

impl PatternLibrary {
    /// The stock rule set.
    pub fn with_defaults() -> Self {
        let rules = vec![
            RewriteRule::new(
                "quote-attribute-values",
                markup::SLUG_UNQUOTED_ATTR,
                IssueCategory::Syntax,
                MARKUP_ONLY,
                markup::UNQUOTED_ATTR_PATTERN,
                "${1}=\"${2}\"",
                0.88,
            ),
            RewriteRule::new(
                "close-void-elements",
                markup::SLUG_VOID_ELEMENT,
                IssueCategory::Syntax,
                MARKUP_ONLY,
                markup::VOID_WITH_ATTRS_PATTERN,
                "<${1}${2} />",
                0.92,
            ),
            RewriteRule::new(
                "close-bare-void-elements",
                markup::SLUG_VOID_ELEMENT,
                IssueCategory::Syntax,
                MARKUP_ONLY,
                markup::BARE_VOID_PATTERN,
                "<${1} />",
                0.95,
            ),
            RewriteRule::new(
                "guard-localstorage-parse",
                runtime::SLUG_UNGUARDED_PARSE,
                IssueCategory::RuntimeSafety,
                SCRIPT,
                runtime::UNGUARDED_PARSE_PATTERN,
                "JSON.parse(localStorage.getItem(${1}) || 'null')",
                0.9,
            ),
            RewriteRule::new(
                "guard-collection-map",
                runtime::SLUG_UNGUARDED_MAP,
                IssueCategory::RuntimeSafety,
                SCRIPT,
                runtime::UNGUARDED_MAP_PATTERN,
                "(${1} || []).map(",
                0.8,
            ),
        ];
        let emergency = vec![
            RewriteRule::new(
                "strip-stray-fence-lines",
                "emergency",
                IssueCategory::Structural,
                ANY_TEXT,
                r"(?m)^\s*```.*\n?",
                "",
                0.35,
            ),
            RewriteRule::new(
                "drop-conflict-marker-lines",
                "emergency",
                IssueCategory::Structural,
                ANY_TEXT,
                r"(?m)^(?:<<<<<<<|=======|>>>>>>>).*\n?",
                "",
                0.3,
            ),
        ];
        Self { rules, emergency }
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    pub fn rules_for_defect(&self, defect: &str) -> Vec<&RewriteRule> {
        self.rules.iter().filter(|r| r.defect == defect).collect()
    }

    /// Runs every rule for one defect slug over the content, each rule
    /// once, in declaration order.
    pub fn apply_defect(
        &self,
        content: &str,
        defect: &str,
        file_category: FileCategory,
    ) -> PatternApplication {
        self.apply_rules(
            content,
            self.rules
                .iter()
                .filter(|r| r.defect == defect && r.allows(file_category)),
        )
    }

    /// Runs every rule for an issue category over the content.
    pub fn apply_category(
        &self,
        content: &str,
        category: IssueCategory,
        file_category: FileCategory,
    ) -> PatternApplication {
        self.apply_rules(
            content,
            self.rules
                .iter()
                .filter(|r| r.category == category && r.allows(file_category)),
        )
    }

    /// Last-resort rules, looser than the stock set and confident only
    /// that they cannot make a broken file worse.
    pub fn apply_emergency(&self, content: &str, file_category: FileCategory) -> PatternApplication {
        self.apply_rules(
            content,
            self.emergency.iter().filter(|r| r.allows(file_category)),
        )
    }

    fn apply_rules<'a>(
        &self,
        content: &str,
        rules: impl Iterator<Item = &'a RewriteRule>,
    ) -> PatternApplication {
        let mut result = PatternApplication::untouched(content);
        for rule in rules {
            let (next, hits) = rule.apply(&result.content);
            if hits > 0 {
                result.content = next;
                result.rules.push(rule.name);
                result.replacements += hits;
                result.confidence = result.confidence.min(rule.confidence);
            }
        }
        result
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_attributes_rule() {
        let library = PatternLibrary::with_defaults();
        let applied = library.apply_defect(
            "<div id=hero>\n  <a href=#about target=_blank>About</a>\n</div>",
            markup::SLUG_UNQUOTED_ATTR,
            FileCategory::Markup,
        );
        assert!(applied.changed());
        assert_eq!(applied.replacements, 3);
        assert!(applied.content.contains("id=\"hero\""));
        assert!(applied.content.contains("href=\"#about\""));
        assert!(applied.content.contains("target=\"_blank\""));
    }

    #[test]
    fn test_rule_application_is_single_pass_idempotent() {
        let library = PatternLibrary::with_defaults();
        let first = library.apply_defect(
            "<img src=/logo.png>",
            markup::SLUG_UNQUOTED_ATTR,
            FileCategory::Markup,
        );
        let second = library.apply_defect(
            &first.content,
            markup::SLUG_UNQUOTED_ATTR,
            FileCategory::Markup,
        );
        assert!(!second.changed());
        assert_eq!(second.content, first.content);
    }

    #[test]
    fn test_void_element_rules_cover_bare_and_attributed() {
        let library = PatternLibrary::with_defaults();
        let applied = library.apply_defect(
            "<img src=\"/logo.png\" alt=\"logo\">\n<br>\n",
            markup::SLUG_VOID_ELEMENT,
            FileCategory::Markup,
        );
        assert_eq!(applied.replacements, 2);
        assert!(applied.content.contains("<img src=\"/logo.png\" alt=\"logo\" />"));
        assert!(applied.content.contains("<br />"));
    }

    #[test]
    fn test_localstorage_guard() {
        let library = PatternLibrary::with_defaults();
        let applied = library.apply_defect(
            "const cart = JSON.parse(localStorage.getItem('cart'));",
            runtime::SLUG_UNGUARDED_PARSE,
            FileCategory::Module,
        );
        assert_eq!(
            applied.content,
            "const cart = JSON.parse(localStorage.getItem('cart') || 'null');"
        );
        let again = library.apply_defect(
            &applied.content,
            runtime::SLUG_UNGUARDED_PARSE,
            FileCategory::Module,
        );
        assert!(!again.changed());
    }

    #[test]
    fn test_map_guard_keeps_full_chain() {
        let library = PatternLibrary::with_defaults();
        let applied = library.apply_defect(
            "return this.state.items.map(i => i.name);",
            runtime::SLUG_UNGUARDED_MAP,
            FileCategory::Markup,
        );
        assert_eq!(
            applied.content,
            "return (this.state.items || []).map(i => i.name);"
        );
    }

    #[test]
    fn test_rules_respect_file_category() {
        let library = PatternLibrary::with_defaults();
        let applied = library.apply_defect(
            "<div id=hero>",
            markup::SLUG_UNQUOTED_ATTR,
            FileCategory::Module,
        );
        assert!(!applied.changed());
    }

    #[test]
    fn test_confidence_is_minimum_of_applied_rules() {
        let library = PatternLibrary::with_defaults();
        let applied = library.apply_defect(
            "<img src=\"a.png\">\n<br>\n",
            markup::SLUG_VOID_ELEMENT,
            FileCategory::Markup,
        );
        assert_eq!(applied.rules.len(), 2);
        assert!((applied.confidence - 0.92).abs() < f32::EPSILON);
    }

    #[test]
    fn test_emergency_rules_strip_fences_and_markers() {
        let library = PatternLibrary::with_defaults();
        let content = "```jsx\nexport default App;\n<<<<<<< HEAD\n```\n";
        let applied = library.apply_emergency(content, FileCategory::Markup);
        assert!(applied.changed());
        assert!(!applied.content.contains("```"));
        assert!(!applied.content.contains("<<<<<<<"));
        assert!(applied.confidence <= 0.35);
    }
}
