use crate::support::{
    load_store_or_exit, parse_knowledge_id_or_exit, parse_level_or_exit, print_json, validator,
};
use gradus_kernel::{PreviewError, resolve_usability};
use gradus_store::StoreLayout;
use serde_json::json;

pub fn run(layout: &StoreLayout, id: String, level: String, json_output: bool) {
    let id = parse_knowledge_id_or_exit(&id);
    let target = parse_level_or_exit(&level);
    let store = load_store_or_exit(layout);
    let validator = validator();

    match resolve_usability(validator.resolver(), &store, id, target) {
        Ok(preview) => {
            if json_output {
                print_json(&json!({
                    "action": "resolve",
                    "usable": true,
                    "preview": preview
                }));
            } else {
                println!(
                    "gradus resolve\n  Knowledge: {} [{}/{}]\n  Target: {}\n  Usable: yes, as {} ({})",
                    preview.unit_id,
                    preview.source_level,
                    preview.source_category,
                    preview.target_level,
                    preview.effective_category,
                    preview.relation
                );
            }
        }
        Err(err) => {
            tracing::debug!(%id, level = %target, error = %err, "usability preview rejected");
            if json_output {
                let reason = match &err {
                    PreviewError::NotFound(_) => json!({ "kind": "not_found" }),
                    PreviewError::NotUsable { reason, .. } => json!(reason),
                };
                print_json(&json!({
                    "action": "resolve",
                    "usable": false,
                    "knowledgeId": id,
                    "targetLevel": target,
                    "reason": reason,
                    "message": err.to_string()
                }));
            } else {
                eprintln!("error: {err}");
            }
            std::process::exit(1);
        }
    }
}
