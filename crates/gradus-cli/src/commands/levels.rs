use crate::support::{print_json, validator};
use gradus_kernel::{Category, Placement};
use serde_json::json;

pub fn run(json_output: bool) {
    let validator = validator();
    let resolver = validator.resolver();
    let scale = resolver.scale();

    let rows = scale
        .levels()
        .enumerate()
        .map(|(rank, level)| {
            let reach = Category::ALL
                .iter()
                .map(|category| {
                    let usable = resolver.usable_levels(Placement::new(level, *category));
                    (*category, usable)
                })
                .collect::<Vec<_>>();
            (rank, level, reach)
        })
        .collect::<Vec<_>>();

    if json_output {
        let items = rows
            .iter()
            .map(|(rank, level, reach)| {
                json!({
                    "rank": rank,
                    "level": level,
                    "parent": scale.parent(*level),
                    "child": scale.child(*level),
                    "usableAt": reach.iter().map(|(category, usable)| {
                        json!({
                            "category": category,
                            "levels": usable.iter().map(|(l, effective)| {
                                json!({ "level": l, "effectiveCategory": effective })
                            }).collect::<Vec<_>>()
                        })
                    }).collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();
        print_json(&json!({
            "action": "levels",
            "count": items.len(),
            "items": items
        }));
    } else {
        println!("gradus levels (coarsest first)");
        for (rank, level, reach) in rows {
            println!("  {rank}. {level}");
            for (category, usable) in reach {
                let targets = usable
                    .iter()
                    .map(|(l, effective)| format!("{l} as {effective}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("     {category}: {targets}");
            }
        }
    }
}
