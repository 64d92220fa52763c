//! On-disk layout of a store directory.
//!
//! ```text
//! <root>/
//!   knowledge.jsonl   one KnowledgeUnit per line
//!   recipes.jsonl     one Recipe per line
//!   sequence.jsonl    highest ids ever assigned; deleted ids are never reused
//!   store.lock        present only while a mutation holds the store
//! ```

use std::path::{Path, PathBuf};

pub const DEFAULT_STORE_DIR: &str = ".gradus";
pub const KNOWLEDGE_FILE: &str = "knowledge.jsonl";
pub const RECIPES_FILE: &str = "recipes.jsonl";
pub const SEQUENCE_FILE: &str = "sequence.jsonl";
pub const LOCK_FILE: &str = "store.lock";

/// Paths of one store directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn knowledge_path(&self) -> PathBuf {
        self.root.join(KNOWLEDGE_FILE)
    }

    pub fn recipes_path(&self) -> PathBuf {
        self.root.join(RECIPES_FILE)
    }

    pub fn sequence_path(&self) -> PathBuf {
        self.root.join(SEQUENCE_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// Whether the store has been initialized.
    pub fn exists(&self) -> bool {
        self.root.is_dir() && self.knowledge_path().is_file()
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_root() {
        let layout = StoreLayout::new("/tmp/gradus-root");
        assert_eq!(
            layout.knowledge_path(),
            PathBuf::from("/tmp/gradus-root/knowledge.jsonl")
        );
        assert_eq!(
            layout.recipes_path(),
            PathBuf::from("/tmp/gradus-root/recipes.jsonl")
        );
        assert_eq!(
            layout.sequence_path(),
            PathBuf::from("/tmp/gradus-root/sequence.jsonl")
        );
        assert_eq!(
            layout.lock_path(),
            PathBuf::from("/tmp/gradus-root/store.lock")
        );
        assert_eq!(StoreLayout::default().root(), Path::new(".gradus"));
    }
}
