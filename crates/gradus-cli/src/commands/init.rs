use crate::support::{print_json, yes_no};
use gradus_store::{MemoryStore, StoreLayout};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub store_root: PathBuf,
    pub created_store_root: bool,
    pub created_knowledge_file: bool,
    pub created_recipes_file: bool,
}

/// Create the store directory and any missing record files.
///
/// Existing records are loaded and written back unchanged, so running
/// init twice is harmless.
pub fn init_layout(layout: &StoreLayout) -> Result<InitOutcome, String> {
    let root = layout.root().to_path_buf();

    let mut created_store_root = false;
    if !root.exists() {
        fs::create_dir_all(&root)
            .map_err(|e| format!("failed to create store {}: {e}", root.display()))?;
        created_store_root = true;
    }
    if !root.is_dir() {
        return Err(format!("store path is not a directory: {}", root.display()));
    }

    for path in [layout.knowledge_path(), layout.recipes_path()] {
        if path.exists() && !path.is_file() {
            return Err(format!(
                "store file exists but is not a file: {}",
                path.display()
            ));
        }
    }

    let created_knowledge_file = !layout.knowledge_path().exists();
    let created_recipes_file = !layout.recipes_path().exists();
    if created_knowledge_file || created_recipes_file {
        let store = MemoryStore::load(layout)
            .map_err(|e| format!("failed to read {}: {e}", root.display()))?;
        store
            .save(layout)
            .map_err(|e| format!("failed to initialize {}: {e}", root.display()))?;
    }

    Ok(InitOutcome {
        store_root: root,
        created_store_root,
        created_knowledge_file,
        created_recipes_file,
    })
}

pub fn run(layout: &StoreLayout, json_output: bool) {
    let outcome = init_layout(layout).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    tracing::info!(store = %outcome.store_root.display(), "initialized store");

    if json_output {
        print_json(&json!({
            "action": "init",
            "storePath": outcome.store_root.display().to_string(),
            "createdStoreRoot": outcome.created_store_root,
            "createdKnowledgeFile": outcome.created_knowledge_file,
            "createdRecipesFile": outcome.created_recipes_file
        }));
    } else {
        println!("gradus init");
        println!();
        println!("  store: {}", outcome.store_root.display());
        println!(
            "  created store dir: {}",
            yes_no(outcome.created_store_root)
        );
        println!(
            "  created knowledge file: {}",
            yes_no(outcome.created_knowledge_file)
        );
        println!(
            "  created recipes file: {}",
            yes_no(outcome.created_recipes_file)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "gradus-cli-init-{prefix}-{}-{unique}",
            std::process::id()
        ))
    }

    #[test]
    fn init_layout_creates_store_files() {
        let root = temp_dir("create");
        let layout = StoreLayout::new(&root);
        let outcome = init_layout(&layout).expect("init should succeed");
        assert!(outcome.created_store_root);
        assert!(outcome.created_knowledge_file);
        assert!(layout.exists());
        assert!(layout.recipes_path().is_file());

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn init_layout_is_idempotent_and_keeps_records() {
        let root = temp_dir("idempotent");
        let layout = StoreLayout::new(&root);
        init_layout(&layout).expect("first init should succeed");
        fs::write(
            layout.knowledge_path(),
            "{\"id\":1,\"content\":\"Ritornello\",\"level\":\"work\",\"category\":\"form\"}\n",
        )
        .expect("fixture should write");

        let outcome = init_layout(&layout).expect("second init should succeed");
        assert!(!outcome.created_store_root);
        assert!(!outcome.created_knowledge_file);
        let contents = fs::read_to_string(layout.knowledge_path()).expect("file should exist");
        assert!(contents.contains("Ritornello"));

        let _ = fs::remove_dir_all(root);
    }
}
