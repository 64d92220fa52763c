use crate::cli::KnowledgeCommands;
use crate::support::{
    load_store_or_exit, mutate_store_or_exit, parse_category_or_exit,
    parse_knowledge_id_or_exit, parse_level_or_exit, print_json, validator,
};
use gradus_store::{KnowledgeFilter, KnowledgeUnit, StoreLayout};
use serde_json::{Value, json};

pub fn run(layout: &StoreLayout, command: KnowledgeCommands) {
    match command {
        KnowledgeCommands::Add {
            level,
            category,
            content,
            source,
            json,
        } => run_add(layout, level, category, content, source, json),

        KnowledgeCommands::List {
            level,
            category,
            json,
        } => run_list(layout, level, category, json),

        KnowledgeCommands::Show { id, json } => run_show(layout, id, json),

        KnowledgeCommands::Remove { id, force, json } => run_remove(layout, id, force, json),
    }
}

fn run_add(
    layout: &StoreLayout,
    level: String,
    category: String,
    content: String,
    source: Option<String>,
    json_output: bool,
) {
    let level = parse_level_or_exit(&level);
    let category = parse_category_or_exit(&category);

    let unit = mutate_store_or_exit(layout, json_output, |store| {
        let unit = store.add_knowledge(&content, level, category, source)?;
        Ok((unit, true))
    });

    if json_output {
        print_json(&json!({
            "action": "knowledge.add",
            "storePath": layout.root().display().to_string(),
            "knowledge": unit_json(&unit)
        }));
    } else {
        println!(
            "gradus knowledge add\n  Added: {} [{}/{}]\n  Path: {}",
            unit.id,
            unit.level,
            unit.category,
            layout.knowledge_path().display()
        );
    }
}

fn run_list(
    layout: &StoreLayout,
    level: Option<String>,
    category: Option<String>,
    json_output: bool,
) {
    let filter = KnowledgeFilter {
        level: level.as_deref().map(parse_level_or_exit),
        category: category.as_deref().map(parse_category_or_exit),
    };
    let store = load_store_or_exit(layout);
    let rows = store.knowledge_units(filter).collect::<Vec<_>>();

    if json_output {
        let items = rows.iter().map(|unit| unit_json(unit)).collect::<Vec<_>>();
        print_json(&json!({
            "action": "knowledge.list",
            "storePath": layout.root().display().to_string(),
            "count": items.len(),
            "items": items
        }));
    } else {
        println!(
            "gradus knowledge list\n  Path: {}\n  Count: {}",
            layout.knowledge_path().display(),
            rows.len()
        );
        for unit in rows {
            println!(
                "  - {} [{}/{}] {}",
                unit.id, unit.level, unit.category, unit.content
            );
        }
    }
}

fn run_show(layout: &StoreLayout, id: String, json_output: bool) {
    let id = parse_knowledge_id_or_exit(&id);
    let store = load_store_or_exit(layout);
    let Some(unit) = store.knowledge(id) else {
        eprintln!("error: knowledge point not found: {id}");
        std::process::exit(1);
    };

    let validator = validator();
    let usable = validator.resolver().usable_levels(unit.placement());
    let cited_by = store.recipes_citing(id);

    if json_output {
        print_json(&json!({
            "action": "knowledge.show",
            "knowledge": unit_json(unit),
            "usableAt": usable
                .iter()
                .map(|(level, effective)| json!({ "level": level, "effectiveCategory": effective }))
                .collect::<Vec<_>>(),
            "citedBy": cited_by
        }));
    } else {
        println!("gradus knowledge show");
        println!("  ID: {}", unit.id);
        println!("  Placement: {}", unit.placement());
        println!("  Content: {}", unit.content);
        if let Some(source) = &unit.source {
            println!("  Source: {source}");
        }
        println!("  Usable at:");
        for (level, effective) in usable {
            println!("    - {level} as {effective}");
        }
        if cited_by.is_empty() {
            println!("  Cited by: (none)");
        } else {
            let ids = cited_by
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            println!("  Cited by: {ids}");
        }
    }
}

fn run_remove(layout: &StoreLayout, id: String, force: bool, json_output: bool) {
    let id = parse_knowledge_id_or_exit(&id);

    let (unit, dangling) = mutate_store_or_exit(layout, json_output, |store| {
        let dangling = store.recipes_citing(id);
        let unit = store.remove_knowledge(id, force)?;
        Ok(((unit, dangling), true))
    });

    if json_output {
        print_json(&json!({
            "action": "knowledge.remove",
            "storePath": layout.root().display().to_string(),
            "knowledge": unit_json(&unit),
            "forced": force,
            "danglingRecipeIds": dangling
        }));
    } else {
        println!(
            "gradus knowledge remove\n  Removed: {} [{}/{}]",
            unit.id, unit.level, unit.category
        );
        if !dangling.is_empty() {
            let ids = dangling
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            println!("  Warning: recipes still cite it: {ids} (see `gradus audit`)");
        }
    }
}

fn unit_json(unit: &KnowledgeUnit) -> Value {
    json!({
        "id": unit.id,
        "content": unit.content,
        "level": unit.level,
        "category": unit.category,
        "source": unit.source,
        "createdAt": unit.created_at.to_rfc3339()
    })
}
