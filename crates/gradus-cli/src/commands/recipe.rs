use crate::cli::RecipeCommands;
use crate::support::{
    load_store_or_exit, mutate_store_or_exit, parse_knowledge_id_or_exit,
    parse_knowledge_ids_or_exit, parse_level_or_exit, parse_recipe_id_or_exit, print_json,
    validator, yes_no,
};
use gradus_kernel::ValidationReport;
use gradus_store::{Recipe, RecipeDraft, RecipeFilter, RecipePatch, StoreLayout};
use serde_json::{Value, json};

pub fn run(layout: &StoreLayout, command: RecipeCommands) {
    match command {
        RecipeCommands::Add {
            level,
            knowledge,
            procedure,
            description,
            json,
        } => run_add(layout, level, knowledge, procedure, description, json),

        RecipeCommands::Update {
            id,
            level,
            knowledge,
            procedure,
            description,
            json,
        } => run_update(layout, id, level, knowledge, procedure, description, json),

        RecipeCommands::List { level, uses, json } => run_list(layout, level, uses, json),

        RecipeCommands::Show { id, json } => run_show(layout, id, json),

        RecipeCommands::Remove { id, json } => run_remove(layout, id, json),
    }
}

fn run_add(
    layout: &StoreLayout,
    level: String,
    knowledge: Vec<String>,
    procedure: String,
    description: String,
    json_output: bool,
) {
    let draft = RecipeDraft {
        knowledge_point_ids: parse_knowledge_ids_or_exit(&knowledge),
        level: parse_level_or_exit(&level),
        procedure,
        description,
    };
    let validator = validator();

    let recipe = mutate_store_or_exit(layout, json_output, |store| {
        let recipe = store.add_recipe(&validator, draft)?;
        Ok((recipe, true))
    });

    if json_output {
        print_json(&json!({
            "action": "recipe.add",
            "storePath": layout.root().display().to_string(),
            "recipe": recipe_json(&recipe)
        }));
    } else {
        println!(
            "gradus recipe add\n  Added: {} [{}] {} reference(s)\n  Path: {}",
            recipe.id,
            recipe.level,
            recipe.knowledge_point_ids.len(),
            layout.recipes_path().display()
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn run_update(
    layout: &StoreLayout,
    id: String,
    level: Option<String>,
    knowledge: Vec<String>,
    procedure: Option<String>,
    description: Option<String>,
    json_output: bool,
) {
    let id = parse_recipe_id_or_exit(&id);
    let patch = RecipePatch {
        knowledge_point_ids: if knowledge.is_empty() {
            None
        } else {
            Some(parse_knowledge_ids_or_exit(&knowledge))
        },
        level: level.as_deref().map(parse_level_or_exit),
        procedure,
        description,
    };
    let revalidated = patch.touches_references();
    let validator = validator();

    let recipe = mutate_store_or_exit(layout, json_output, |store| {
        let recipe = store.update_recipe(&validator, id, patch)?;
        Ok((recipe, true))
    });

    if json_output {
        print_json(&json!({
            "action": "recipe.update",
            "storePath": layout.root().display().to_string(),
            "revalidated": revalidated,
            "recipe": recipe_json(&recipe)
        }));
    } else {
        println!(
            "gradus recipe update\n  Updated: {} [{}]\n  Revalidated: {}",
            recipe.id,
            recipe.level,
            yes_no(revalidated)
        );
    }
}

fn run_list(layout: &StoreLayout, level: Option<String>, uses: Option<String>, json_output: bool) {
    let filter = RecipeFilter {
        level: level.as_deref().map(parse_level_or_exit),
        uses: uses.as_deref().map(parse_knowledge_id_or_exit),
    };
    let store = load_store_or_exit(layout);
    let rows = store.recipes(filter).collect::<Vec<_>>();

    if json_output {
        let items = rows.iter().map(|r| recipe_json(r)).collect::<Vec<_>>();
        print_json(&json!({
            "action": "recipe.list",
            "storePath": layout.root().display().to_string(),
            "count": items.len(),
            "items": items
        }));
    } else {
        println!(
            "gradus recipe list\n  Path: {}\n  Count: {}",
            layout.recipes_path().display(),
            rows.len()
        );
        for recipe in rows {
            println!(
                "  - {} [{}] {} (uses {})",
                recipe.id,
                recipe.level,
                recipe.description,
                join_ids(&recipe.knowledge_point_ids)
            );
        }
    }
}

fn run_show(layout: &StoreLayout, id: String, json_output: bool) {
    let id = parse_recipe_id_or_exit(&id);
    let store = load_store_or_exit(layout);
    let Some(recipe) = store.recipe(id) else {
        eprintln!("error: recipe not found: {id}");
        std::process::exit(1);
    };

    // Effective categories are derived, never stored: recompute them.
    let report = validator().validate(&store, recipe.level, &recipe.knowledge_point_ids);

    if json_output {
        print_json(&json!({
            "action": "recipe.show",
            "recipe": recipe_json(recipe),
            "valid": report.is_accepted(),
            "report": report
        }));
    } else {
        println!("gradus recipe show");
        println!("  ID: {}", recipe.id);
        println!("  Level: {}", recipe.level);
        println!("  Description: {}", recipe.description);
        println!("  Procedure: {}", recipe.procedure);
        println!("  References:");
        print_references(&report);
    }
}

fn run_remove(layout: &StoreLayout, id: String, json_output: bool) {
    let id = parse_recipe_id_or_exit(&id);

    let recipe = mutate_store_or_exit(layout, json_output, |store| {
        let recipe = store.remove_recipe(id)?;
        Ok((recipe, true))
    });

    if json_output {
        print_json(&json!({
            "action": "recipe.remove",
            "storePath": layout.root().display().to_string(),
            "recipe": recipe_json(&recipe)
        }));
    } else {
        println!(
            "gradus recipe remove\n  Removed: {} [{}]",
            recipe.id, recipe.level
        );
    }
}

fn print_references(report: &ValidationReport) {
    for reference in &report.accepted {
        println!(
            "    - {} {} -> {} ({})",
            reference.id, reference.placement, reference.effective_category, reference.relation
        );
    }
    for id in &report.missing_ids {
        println!("    - {id} MISSING");
    }
    for unusable in &report.unusable {
        println!(
            "    - {} {} UNUSABLE: {}",
            unusable.id, unusable.placement, unusable.reason
        );
    }
}

fn recipe_json(recipe: &Recipe) -> Value {
    json!({
        "id": recipe.id,
        "level": recipe.level,
        "knowledgePointIds": recipe.knowledge_point_ids,
        "procedure": recipe.procedure,
        "description": recipe.description,
        "createdAt": recipe.created_at.to_rfc3339(),
        "updatedAt": recipe.updated_at.to_rfc3339()
    })
}

fn join_ids<T: ToString>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
