use gradus_kernel::{
    Category, CompositionError, CompositionValidator, KnowledgeId, Level, RecipeId,
};
use gradus_store::{AtomicStoreMutationError, MemoryStore, StoreError, StoreLayout, mutate_store};
use serde_json::{Value, json};
use std::fmt::Display;
use std::str::FromStr;

pub fn parse_or_exit<T>(raw: &str) -> T
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn parse_level_or_exit(raw: &str) -> Level {
    parse_or_exit(raw)
}

pub fn parse_category_or_exit(raw: &str) -> Category {
    parse_or_exit(raw)
}

pub fn parse_knowledge_id_or_exit(raw: &str) -> KnowledgeId {
    parse_or_exit(raw)
}

pub fn parse_recipe_id_or_exit(raw: &str) -> RecipeId {
    parse_or_exit(raw)
}

pub fn parse_knowledge_ids_or_exit(raw: &[String]) -> Vec<KnowledgeId> {
    raw.iter().map(|s| parse_knowledge_id_or_exit(s)).collect()
}

/// The validator every command checks recipes with.
pub fn validator() -> CompositionValidator {
    CompositionValidator::default()
}

pub fn load_store_or_exit(layout: &StoreLayout) -> MemoryStore {
    if !layout.exists() {
        eprintln!(
            "error: store not found: {} (run `gradus init` first)",
            layout.root().display()
        );
        std::process::exit(1);
    }
    MemoryStore::load(layout).unwrap_or_else(|e| {
        eprintln!("error: failed to load {}: {e}", layout.root().display());
        std::process::exit(1);
    })
}

/// Run one lock-scoped mutation, exiting on any failure.
///
/// With `json_output` the failure is printed to stdout as an error object
/// carrying the offending ids.
pub fn mutate_store_or_exit<T, F>(layout: &StoreLayout, json_output: bool, mutator: F) -> T
where
    F: FnOnce(&mut MemoryStore) -> Result<(T, bool), StoreError>,
{
    if !layout.exists() {
        eprintln!(
            "error: store not found: {} (run `gradus init` first)",
            layout.root().display()
        );
        std::process::exit(1);
    }
    mutate_store(layout, mutator).unwrap_or_else(|e| {
        if json_output {
            print_json(&mutation_error_json(&e));
        } else {
            match &e {
                AtomicStoreMutationError::LockBusy { .. } => {
                    eprintln!("error: {e} (another gradus command is writing)");
                }
                _ => eprintln!("error: {e}"),
            }
        }
        std::process::exit(1);
    })
}

fn mutation_error_json(err: &AtomicStoreMutationError<StoreError>) -> Value {
    let mut payload = json!({
        "error": "store",
        "message": err.to_string()
    });
    let store_err = match err {
        AtomicStoreMutationError::LockBusy { .. } => {
            payload["error"] = json!("lock_busy");
            return payload;
        }
        AtomicStoreMutationError::LockIo { .. } => return payload,
        AtomicStoreMutationError::Store(e) | AtomicStoreMutationError::Mutation(e) => e,
    };

    match store_err {
        StoreError::Composition(composition) => {
            payload["error"] = json!(composition.class());
            match composition {
                CompositionError::EmptyReferences => {}
                CompositionError::MissingKnowledge { ids } => payload["missingIds"] = json!(ids),
                CompositionError::UnusableAtLevel { level, ids } => {
                    payload["level"] = json!(level);
                    payload["unusableIds"] = json!(ids);
                }
            }
        }
        StoreError::KnowledgeReferenced { id, recipe_ids } => {
            payload["error"] = json!("knowledge_referenced");
            payload["knowledgeId"] = json!(id);
            payload["recipeIds"] = json!(recipe_ids);
        }
        StoreError::KnowledgeNotFound(_) | StoreError::RecipeNotFound(_) => {
            payload["error"] = json!("not_found");
        }
        StoreError::EmptyField(_) | StoreError::EmptyUpdate(_) => {
            payload["error"] = json!("invalid_input");
        }
        StoreError::IdSpaceExhausted(_) => {
            payload["error"] = json!("id_space_exhausted");
        }
        StoreError::Jsonl(_) => {}
    }
    payload
}

pub fn print_json(payload: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(payload).expect("json serialization")
    );
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}
