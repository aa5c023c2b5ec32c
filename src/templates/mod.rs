//! Template synthesis for missing files.
//!
//! Synthesis never fails: every path classifies to some template, and
//! the fallback tiers bottom out in a stub that is always importable.
//! Callers that know which names the importer expects pass them in so
//! the stub exports match; a missing named export is a build error,
//! a null-returning stub is not.

use tracing::debug;

use crate::project::config::ProjectConfig;
use crate::project::files::{FileCategory, SourceFile};
use crate::project::framework::FrameworkId;
use crate::project::manifest::DependencyManifest;

/// What kind of file a path calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemplateKind {
    Manifest,
    Html,
    ViteConfig,
    EntryPoint,
    RootComponent,
    CoreStylesheet,
    Stylesheet,
    Page,
    Component,
    Module,
    Document,
}

/// Synthesizes file content from the project configuration.
pub struct TemplateRegistry {
    config: ProjectConfig,
}

impl TemplateRegistry {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Builds a complete file for the path. Always succeeds.
    pub fn synthesize(&self, path: &str) -> SourceFile {
        self.synthesize_with_exports(path, &[])
    }

    /// Builds a file whose exports cover `names` in addition to the
    /// default export.
    pub fn synthesize_with_exports(&self, path: &str, names: &[String]) -> SourceFile {
        let kind = self.classify(path);
        debug!(path, ?kind, "synthesizing file");
        let content = match kind {
            TemplateKind::Manifest => DependencyManifest::baseline(&self.config).render(),
            TemplateKind::Html => self.html(),
            TemplateKind::ViteConfig => self.vite_config(),
            TemplateKind::EntryPoint => self.entry_point(),
            TemplateKind::RootComponent => self.root_component(),
            TemplateKind::CoreStylesheet => self.core_stylesheet(),
            TemplateKind::Stylesheet => stylesheet(path),
            TemplateKind::Page => self.page(path, names),
            TemplateKind::Component => self.component(path, names),
            TemplateKind::Module => module(names),
            TemplateKind::Document => self.document(path),
        };
        SourceFile::new(path, content)
    }

    fn classify(&self, path: &str) -> TemplateKind {
        let framework = self.config.framework;
        let filename = path.rsplit('/').next().unwrap_or(path);
        if filename == "package.json" {
            return TemplateKind::Manifest;
        }
        if filename == "index.html" {
            return TemplateKind::Html;
        }
        if filename == "vite.config.js" {
            return TemplateKind::ViteConfig;
        }
        if path == framework.entry_point() {
            return TemplateKind::EntryPoint;
        }
        if path == framework.root_component() {
            return TemplateKind::RootComponent;
        }
        if framework.core_files().contains(&path) && FileCategory::from_path(path) == FileCategory::Style {
            return TemplateKind::CoreStylesheet;
        }
        match FileCategory::from_path(path) {
            FileCategory::Style => TemplateKind::Stylesheet,
            FileCategory::Markup if in_pages_dir(path) => TemplateKind::Page,
            FileCategory::Markup => TemplateKind::Component,
            FileCategory::Module => TemplateKind::Module,
            _ => TemplateKind::Document,
        }
    }

    fn html(&self) -> String {
        format!(
            "<!doctype html>\n<html lang=\"en\">\n  <head>\n    <meta charset=\"UTF-8\" />\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n    <title>{}</title>\n  </head>\n  <body>\n    <div id=\"root\"></div>\n    <script type=\"module\" src=\"/{}\"></script>\n  </body>\n</html>\n",
            self.config.business_name,
            self.config.framework.entry_point()
        )
    }

    fn vite_config(&self) -> String {
        let (local, package) = self.config.framework.vite_plugin();
        format!(
            "import {{ defineConfig }} from 'vite';\nimport {} from '{}';\n\nexport default defineConfig({{\n  plugins: [{}()],\n}});\n",
            local, package, local
        )
    }

    fn entry_point(&self) -> String {
        match self.config.framework {
            FrameworkId::React => "import React from 'react';\nimport ReactDOM from 'react-dom/client';\nimport App from './App.jsx';\nimport './index.css';\n\nReactDOM.createRoot(document.getElementById('root')).render(\n  <React.StrictMode>\n    <App />\n  </React.StrictMode>\n);\n"
                .to_string(),
            FrameworkId::Preact => "import { h, render } from 'preact';\nimport App from './App.jsx';\nimport './index.css';\n\nrender(<App />, document.getElementById('root'));\n"
                .to_string(),
        }
    }

    fn root_component(&self) -> String {
        format!(
            "{}\n\nexport default function App() {{\n  return (\n    <div className=\"app\">\n      <header className=\"app-header\">\n        <h1>{}</h1>\n      </header>\n      <main>\n        <p>Welcome to {}.</p>\n      </main>\n    </div>\n  );\n}}\n",
            self.config.framework.jsx_import_line(),
            self.config.business_name,
            self.config.business_name
        )
    }

    fn core_stylesheet(&self) -> String {
        ":root {\n  --accent: #2563eb;\n}\n\n* {\n  box-sizing: border-box;\n}\n\nbody {\n  margin: 0;\n  font-family: system-ui, sans-serif;\n  color: #1f2937;\n  background: #ffffff;\n}\n\n.app {\n  min-height: 100vh;\n}\n"
            .to_string()
    }

    /// A page component. With the routing feature selected it comes
    /// wired for react-router-dom so the synthesized file matches the
    /// navigation the rest of the project expects.
    fn page(&self, path: &str, names: &[String]) -> String {
        if !self.config.has_feature("routing") {
            return self.component(path, names);
        }
        let stem = file_stem(path);
        let name = component_name(stem);
        let mut body = format!(
            "{}\nimport {{ Link }} from 'react-router-dom';\n\nexport default function {}() {{\n  return (\n    <div className=\"page {}\">\n      <h1>{}</h1>\n      <p>{} page for {}.</p>\n      <Link to=\"/\">Back home</Link>\n    </div>\n  );\n}}\n",
            self.config.framework.jsx_import_line(),
            name,
            kebab(stem),
            name,
            name,
            self.config.business_name
        );
        for extra in names {
            if extra == &name || !is_identifier(extra) {
                continue;
            }
            body.push_str(&format!("\nexport const {} = () => null;\n", extra));
        }
        body
    }

    fn component(&self, path: &str, names: &[String]) -> String {
        let stem = file_stem(path);
        let name = component_name(stem);
        let mut body = format!(
            "{}\n\nexport default function {}() {{\n  return <div className=\"{}\">{}</div>;\n}}\n",
            self.config.framework.jsx_import_line(),
            name,
            kebab(stem),
            name
        );
        for extra in names {
            if extra == &name || !is_identifier(extra) {
                continue;
            }
            body.push_str(&format!("\nexport const {} = () => null;\n", extra));
        }
        body
    }

    fn document(&self, path: &str) -> String {
        if file_stem(path).eq_ignore_ascii_case("readme") {
            return format!(
                "# {}\n\nGenerated single-page app for {}.\n\n## Getting started\n\nInstall dependencies with `npm install`, then run `npm run dev`.\n",
                self.config.business_name, self.config.business_name
            );
        }
        format!("{}\n", file_stem(path))
    }
}

fn stylesheet(path: &str) -> String {
    format!(".{} {{\n  display: block;\n}}\n", kebab(file_stem(path)))
}

fn in_pages_dir(path: &str) -> bool {
    path.starts_with("pages/") || path.contains("/pages/")
}

/// A plain module stub. Named exports become null-returning functions,
/// except SCREAMING_CASE names, which read as data and become empty
/// arrays.
fn module(names: &[String]) -> String {
    let exports: Vec<&String> = names.iter().filter(|n| is_identifier(n)).collect();
    if exports.is_empty() {
        return "export default {};\n".to_string();
    }
    let mut body = String::new();
    for name in &exports {
        if is_screaming_case(name) {
            body.push_str(&format!("export const {} = [];\n", name));
        } else {
            body.push_str(&format!("export const {} = () => null;\n", name));
        }
    }
    let list = exports
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    body.push_str(&format!("\nexport default {{ {} }};\n", list));
    body
}

fn file_stem(path: &str) -> &str {
    let filename = path.rsplit('/').next().unwrap_or(path);
    match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[..idx],
        _ => filename,
    }
}

/// Upper-camel identifier from an arbitrary stem.
fn component_name(stem: &str) -> String {
    let mut name = String::new();
    let mut upper_next = true;
    for ch in stem.chars() {
        if ch.is_ascii_alphanumeric() {
            if upper_next {
                name.extend(ch.to_uppercase());
                upper_next = false;
            } else {
                name.push(ch);
            }
        } else {
            upper_next = true;
        }
    }
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        return "Component".to_string();
    }
    name
}

fn kebab(stem: &str) -> String {
    let mut out = String::new();
    for (i, ch) in stem.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else {
            out.push('-');
        }
    }
    if out.is_empty() {
        "component".to_string()
    } else {
        out
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_screaming_case(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
