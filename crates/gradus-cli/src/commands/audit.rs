use crate::support::{load_store_or_exit, print_json, validator};
use gradus_store::StoreLayout;
use serde_json::json;

/// Re-validate every stored recipe. Exit status 1 if any recipe fails.
pub fn run(layout: &StoreLayout, json_output: bool) {
    let store = load_store_or_exit(layout);
    let audits = store.audit(&validator());
    let failing = audits.iter().filter(|a| !a.is_valid()).collect::<Vec<_>>();
    tracing::info!(
        recipes = audits.len(),
        failing = failing.len(),
        "audited recipes"
    );

    if json_output {
        let items = failing
            .iter()
            .map(|audit| {
                let error = audit.report.clone().into_result().err();
                json!({
                    "recipeId": audit.recipe_id,
                    "error": error.as_ref().map(|e| e.class()),
                    "message": error.as_ref().map(ToString::to_string),
                    "report": audit.report
                })
            })
            .collect::<Vec<_>>();
        print_json(&json!({
            "action": "audit",
            "storePath": layout.root().display().to_string(),
            "checked": audits.len(),
            "failing": items.len(),
            "items": items
        }));
    } else {
        println!(
            "gradus audit\n  Checked: {}\n  Failing: {}",
            audits.len(),
            failing.len()
        );
        for audit in &failing {
            if let Err(e) = audit.report.clone().into_result() {
                println!("  - recipe {}: {e}", audit.recipe_id);
            }
        }
    }

    if !failing.is_empty() {
        std::process::exit(1);
    }
}
