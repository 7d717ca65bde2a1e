use catalchemy_core::{EntityKind, entity_json_schema};

fn required_fields(kind: EntityKind) -> Vec<String> {
    let schema = serde_json::to_value(entity_json_schema(kind)).expect("serialize schema");
    schema
        .get("required")
        .and_then(|value| value.as_array())
        .expect("required array")
        .iter()
        .filter_map(|value| value.as_str().map(str::to_string))
        .collect()
}

#[test]
fn review_optional_fields_are_not_required() {
    let required = required_fields(EntityKind::Review);
    assert!(required.contains(&"rating".to_string()));
    assert!(required.contains(&"review_date".to_string()));
    assert!(!required.contains(&"size_worn".to_string()));
    assert!(!required.contains(&"color_purchased".to_string()));
}

#[test]
fn product_schema_requires_references() {
    let required = required_fields(EntityKind::Product);
    for field in ["id", "name", "collection_id", "brand_id", "price", "colors"] {
        assert!(required.contains(&field.to_string()), "missing {field}");
    }
}

#[test]
fn review_rating_is_bounded() {
    let schema = serde_json::to_value(entity_json_schema(EntityKind::Review)).expect("serialize");
    let rating = &schema["properties"]["rating"];
    assert_eq!(rating["minimum"].as_f64(), Some(1.0));
    assert_eq!(rating["maximum"].as_f64(), Some(5.0));
}
