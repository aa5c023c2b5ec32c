//! Assisted repair through the scripted model client.
//!
//! Exercises the full pipeline with an `Arc<MockLLMClient>`: a good
//! reply lands as an AI-assisted fix, a backend failure or a useless
//! reply drops through to emergency recovery without failing the run.

use std::sync::Arc;

use scaffix::llm::{BackendError, MockLLMClient, MockReply};
use scaffix::project::DependencyManifest;
use scaffix::{FixMethod, ProjectConfig, Readiness, RepairPipeline, SourceFile};

const INDEX_HTML: &str = "<!doctype html>\n<html lang=\"en\">\n  <head>\n    <title>App</title>\n  </head>\n  <body>\n    <div id=\"root\"></div>\n    <script type=\"module\" src=\"/src/main.jsx\"></script>\n  </body>\n</html>\n";

const VITE_CONFIG: &str = "import { defineConfig } from 'vite';\nimport react from '@vitejs/plugin-react';\n\nexport default defineConfig({\n  plugins: [react()],\n});\n";

const MAIN_JSX: &str = "import React from 'react';\nimport ReactDOM from 'react-dom/client';\nimport App from './App.jsx';\nimport './index.css';\n\nReactDOM.createRoot(document.getElementById('root')).render(\n  <React.StrictMode>\n    <App />\n  </React.StrictMode>\n);\n";

const APP_JSX: &str = "import React from 'react';\nimport Promo from './components/Promo.jsx';\n\nexport default function App() {\n  return (\n    <div className=\"app\">\n      <Promo />\n    </div>\n  );\n}\n";

const INDEX_CSS: &str = "body {\n  margin: 0;\n}\n";

/// Unclosed `<span>`; everything else about the file is fine, so the
/// only critical issue is the tag imbalance and the deterministic
/// syntax rules have nothing to offer.
const BROKEN_PROMO: &str = "import React from 'react';\n\nexport default function Promo() {\n  return (\n    <div className=\"promo\">\n      <span>50% off all drinks tonight\n    </div>\n  );\n}\n";

const FIXED_PROMO_BODY: &str = "import React from 'react';\n\nexport default function Promo() {\n  return (\n    <div className=\"promo\">\n      <span>50% off all drinks tonight</span>\n    </div>\n  );\n}";

fn night_owl_files() -> Vec<SourceFile> {
    let manifest = DependencyManifest::baseline(&ProjectConfig::new("Night Owl Cafe")).render();
    vec![
        SourceFile::new("package.json", manifest),
        SourceFile::new("index.html", INDEX_HTML),
        SourceFile::new("vite.config.js", VITE_CONFIG),
        SourceFile::new("src/main.jsx", MAIN_JSX),
        SourceFile::new("src/App.jsx", APP_JSX),
        SourceFile::new("src/index.css", INDEX_CSS),
        SourceFile::new("src/components/Promo.jsx", BROKEN_PROMO),
    ]
}

#[tokio::test]
async fn test_model_reply_lands_as_assisted_fix() {
    let client = Arc::new(MockLLMClient::new());
    client.add_reply(MockReply::fenced("jsx", FIXED_PROMO_BODY));

    let config = ProjectConfig::new("Night Owl Cafe");
    let result = RepairPipeline::with_client(client.clone())
        .repair_project(night_owl_files(), &config)
        .await
        .unwrap();

    let promo = &result.files.get("src/components/Promo.jsx").unwrap().content;
    assert!(promo.contains("<span>50% off all drinks tonight</span>"));

    assert_eq!(result.fixes.len(), 1);
    let fix = &result.fixes[0];
    assert_eq!(fix.strategy, "ai-rewrite");
    assert_eq!(fix.method, FixMethod::AiAssisted);
    assert!((fix.confidence - 0.6).abs() < 1e-6);
    assert_eq!(fix.before.as_deref(), Some(BROKEN_PROMO));
    assert_eq!(result.status, Readiness::ReadyToUse);

    // Exactly one call went out, with the file and framework named.
    let prompts = client.recorded_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("File: src/components/Promo.jsx"));
    assert!(prompts[0].contains("Project framework: React"));
}

#[tokio::test]
async fn test_backend_failure_falls_through_to_emergency() {
    let client = Arc::new(MockLLMClient::new());
    client.add_reply(MockReply::error(BackendError::api("model unavailable")));

    let config = ProjectConfig::new("Night Owl Cafe");
    let result = RepairPipeline::with_client(client)
        .repair_project(night_owl_files(), &config)
        .await
        .unwrap();

    // Emergency recovery closed the tag instead.
    let promo = &result.files.get("src/components/Promo.jsx").unwrap().content;
    assert!(promo.ends_with("</span>\n"));

    assert_eq!(result.fixes.len(), 1);
    let fix = &result.fixes[0];
    assert_eq!(fix.strategy, "emergency-recovery");
    assert_eq!(fix.method, FixMethod::Emergency);
    assert!((fix.confidence - 0.4).abs() < 1e-6);
    assert!(result.unresolved.is_empty());
    assert_eq!(result.status, Readiness::ReadyToUse);
}

#[tokio::test]
async fn test_unhelpful_reply_does_not_stall_the_chain() {
    // The model echoes the broken file back; the rewrite is discarded
    // and the chain keeps going.
    let client = Arc::new(MockLLMClient::new());
    client.add_reply(MockReply::fenced("jsx", BROKEN_PROMO));

    let config = ProjectConfig::new("Night Owl Cafe");
    let result = RepairPipeline::with_client(client.clone())
        .repair_project(night_owl_files(), &config)
        .await
        .unwrap();

    assert_eq!(client.remaining_replies(), 0);
    assert_eq!(result.fixes.len(), 1);
    assert_eq!(result.fixes[0].strategy, "emergency-recovery");
    assert_eq!(result.status, Readiness::ReadyToUse);
}
