//! In-memory project file set
//!
//! The generator hands the pipeline a flat set of files keyed by
//! project-relative path. Everything downstream (detection, strategies,
//! synthesis, rollback) operates on this set; the pipeline never touches the
//! filesystem.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category of a generated file, derived from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// Component sources containing JSX markup (`.jsx`, `.tsx`)
    Markup,
    /// Stylesheets (`.css`, `.scss`)
    Style,
    /// The dependency manifest (`package.json`)
    Manifest,
    /// Plain script modules (`.js`, `.ts`, `.mjs`)
    Module,
    /// Everything else: HTML shell, readme, assets
    Document,
}

impl FileCategory {
    /// True for files the bundler treats as modules: components and
    /// plain scripts.
    pub fn is_script(&self) -> bool {
        matches!(self, FileCategory::Markup | FileCategory::Module)
    }

    /// Classifies a project-relative path by filename and extension.
    pub fn from_path(path: &str) -> Self {
        let filename = path.rsplit('/').next().unwrap_or(path);
        if filename == "package.json" {
            return FileCategory::Manifest;
        }
        match filename.rsplit('.').next() {
            Some("jsx") | Some("tsx") => FileCategory::Markup,
            Some("css") | Some("scss") => FileCategory::Style,
            Some("js") | Some("ts") | Some("mjs") => FileCategory::Module,
            _ => FileCategory::Document,
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileCategory::Markup => "markup",
            FileCategory::Style => "style",
            FileCategory::Manifest => "manifest",
            FileCategory::Module => "module",
            FileCategory::Document => "document",
        };
        write!(f, "{}", name)
    }
}

/// A single generated source file.
///
/// Paths use forward slashes and are project-relative (`src/App.jsx`). The
/// path is the unique key within a [`FileSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
    pub category: FileCategory,
}

impl SourceFile {
    /// Creates a file, deriving the category from the path.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = normalize_path(&path.into());
        let category = FileCategory::from_path(&path);
        Self {
            path,
            content: content.into(),
            category,
        }
    }

    /// Creates a file with an explicit category override.
    pub fn with_category(
        path: impl Into<String>,
        content: impl Into<String>,
        category: FileCategory,
    ) -> Self {
        Self {
            path: normalize_path(&path.into()),
            content: content.into(),
            category,
        }
    }

    /// Filename portion of the path.
    pub fn filename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Filename without its final extension.
    pub fn stem(&self) -> &str {
        let name = self.filename();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }
}

/// Strips a leading `./` so generator-emitted paths and synthesized paths key
/// identically.
pub(crate) fn normalize_path(path: &str) -> String {
    path.strip_prefix("./").unwrap_or(path).to_string()
}

/// The project file set, keyed by path.
///
/// Backed by a `BTreeMap` so iteration order (and therefore detection and
/// repair order) is deterministic across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSet {
    files: BTreeMap<String, SourceFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from generator output. Later duplicates of a path win.
    pub fn from_files(files: Vec<SourceFile>) -> Self {
        let mut set = Self::new();
        for file in files {
            set.insert(file);
        }
        set
    }

    /// Inserts or replaces a file, returning the previous entry if any.
    pub fn insert(&mut self, file: SourceFile) -> Option<SourceFile> {
        self.files.insert(file.path.clone(), file)
    }

    pub fn get(&self, path: &str) -> Option<&SourceFile> {
        self.files.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut SourceFile> {
        self.files.get_mut(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<SourceFile> {
        self.files.remove(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn by_category(&self, category: FileCategory) -> impl Iterator<Item = &SourceFile> {
        self.files.values().filter(move |f| f.category == category)
    }

    /// The dependency manifest, if the set contains one.
    pub fn manifest(&self) -> Option<&SourceFile> {
        self.by_category(FileCategory::Manifest).next()
    }

    /// Deep-copies the current files, in path order. Used for rollback
    /// snapshots and for handing the repaired set back to the caller.
    pub fn snapshot(&self) -> Vec<SourceFile> {
        self.files.values().cloned().collect()
    }

    pub fn into_files(self) -> Vec<SourceFile> {
        self.files.into_values().collect()
    }
}

impl fmt::Display for FileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} file(s)", self.files.len())?;
        if let Some(manifest) = self.manifest() {
            write!(f, ", manifest: {}", manifest.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_path() {
        assert_eq!(FileCategory::from_path("src/App.jsx"), FileCategory::Markup);
        assert_eq!(
            FileCategory::from_path("src/pages/Home.tsx"),
            FileCategory::Markup
        );
        assert_eq!(FileCategory::from_path("src/index.css"), FileCategory::Style);
        assert_eq!(FileCategory::from_path("package.json"), FileCategory::Manifest);
        assert_eq!(
            FileCategory::from_path("src/utils/format.js"),
            FileCategory::Module
        );
        assert_eq!(FileCategory::from_path("index.html"), FileCategory::Document);
        assert_eq!(FileCategory::from_path("README.md"), FileCategory::Document);
    }

    #[test]
    fn test_nested_manifest_is_manifest() {
        assert_eq!(
            FileCategory::from_path("app/package.json"),
            FileCategory::Manifest
        );
    }

    #[test]
    fn test_source_file_normalizes_leading_dot_slash() {
        let file = SourceFile::new("./src/App.jsx", "export default () => null;");
        assert_eq!(file.path, "src/App.jsx");
        assert_eq!(file.category, FileCategory::Markup);
    }

    #[test]
    fn test_stem_and_filename() {
        let file = SourceFile::new("src/components/NavBar.jsx", "");
        assert_eq!(file.filename(), "NavBar.jsx");
        assert_eq!(file.stem(), "NavBar");

        let dotless = SourceFile::new("LICENSE", "");
        assert_eq!(dotless.stem(), "LICENSE");
    }

    #[test]
    fn test_file_set_insert_and_lookup() {
        let mut set = FileSet::new();
        set.insert(SourceFile::new("src/App.jsx", "one"));
        set.insert(SourceFile::new("src/index.css", "body {}"));

        assert_eq!(set.len(), 2);
        assert!(set.contains("src/App.jsx"));
        assert_eq!(set.get("src/App.jsx").unwrap().content, "one");

        let replaced = set.insert(SourceFile::new("src/App.jsx", "two"));
        assert_eq!(replaced.unwrap().content, "one");
        assert_eq!(set.get("src/App.jsx").unwrap().content, "two");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_file_set_deterministic_order() {
        let set = FileSet::from_files(vec![
            SourceFile::new("src/b.js", ""),
            SourceFile::new("src/a.js", ""),
            SourceFile::new("package.json", "{}"),
        ]);

        let paths: Vec<_> = set.paths().collect();
        assert_eq!(paths, vec!["package.json", "src/a.js", "src/b.js"]);
    }

    #[test]
    fn test_manifest_lookup() {
        let set = FileSet::from_files(vec![
            SourceFile::new("src/App.jsx", ""),
            SourceFile::new("package.json", "{}"),
        ]);
        assert_eq!(set.manifest().unwrap().path, "package.json");

        let empty = FileSet::new();
        assert!(empty.manifest().is_none());
    }

    #[test]
    fn test_snapshot_is_deep_copy() {
        let mut set = FileSet::from_files(vec![SourceFile::new("src/a.js", "before")]);
        let snapshot = set.snapshot();

        set.get_mut("src/a.js").unwrap().content = "after".to_string();

        assert_eq!(snapshot[0].content, "before");
        assert_eq!(set.get("src/a.js").unwrap().content, "after");
    }
}
