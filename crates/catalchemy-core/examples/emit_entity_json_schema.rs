use catalchemy_core::{EntityKind, entity_json_schema};

fn main() {
    let kind = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<EntityKind>().ok())
        .unwrap_or(EntityKind::Product);
    let schema = entity_json_schema(kind);
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
