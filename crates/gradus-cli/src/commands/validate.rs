use crate::support::{
    load_store_or_exit, parse_knowledge_ids_or_exit, parse_level_or_exit, print_json, validator,
};
use gradus_store::StoreLayout;
use serde_json::json;

/// Dry-run a reference set. Nothing is written; exit status 1 on rejection.
pub fn run(layout: &StoreLayout, level: String, ids: Vec<String>, json_output: bool) {
    let target = parse_level_or_exit(&level);
    let ids = parse_knowledge_ids_or_exit(&ids);
    let store = load_store_or_exit(layout);

    let report = validator().validate(&store, target, &ids);
    let verdict = report.clone().into_result();

    if json_output {
        let (error, message) = match &verdict {
            Ok(_) => (None, None),
            Err(e) => (Some(e.class()), Some(e.to_string())),
        };
        print_json(&json!({
            "action": "validate",
            "accepted": verdict.is_ok(),
            "error": error,
            "message": message,
            "report": report
        }));
    } else {
        println!(
            "gradus validate\n  Level: {}\n  References: {}",
            report.target_level, report.requested
        );
        for reference in &report.accepted {
            println!(
                "    - {} {} -> {} ({})",
                reference.id, reference.placement, reference.effective_category, reference.relation
            );
        }
        for unusable in &report.unusable {
            println!(
                "    - {} {} UNUSABLE: {}",
                unusable.id, unusable.placement, unusable.reason
            );
        }
        match &verdict {
            Ok(_) => println!("  Result: accepted"),
            Err(e) => println!("  Result: rejected ({}): {e}", e.class()),
        }
    }

    if verdict.is_err() {
        std::process::exit(1);
    }
}
