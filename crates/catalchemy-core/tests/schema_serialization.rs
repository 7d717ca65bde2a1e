use catalchemy_core::{Brand, Catalog, EntityKind};

#[test]
fn serializes_brand_deterministically() {
    let brand = Brand {
        id: "brand_0a1b2c3d".to_string(),
        name: "Tidewater".to_string(),
        description: "Rain-ready basics.".to_string(),
        story: "Started in a garage.".to_string(),
        values: vec!["Repair".to_string(), "Inclusivity".to_string()],
        target_audience: "Commuters".to_string(),
    };

    let json = serde_json::to_string_pretty(&brand).expect("serialize brand");
    let expected = r#"{
  "id": "brand_0a1b2c3d",
  "name": "Tidewater",
  "description": "Rain-ready basics.",
  "story": "Started in a garage.",
  "values": [
    "Repair",
    "Inclusivity"
  ],
  "target_audience": "Commuters"
}"#;
    assert_eq!(json, expected);

    let catalog = Catalog {
        brands: vec![brand],
        ..Catalog::default()
    };
    let rows = catalog.table_rows(EntityKind::Brand);
    assert_eq!(rows.columns[4], "values");
    assert_eq!(rows.rows[0][4], "Repair|Inclusivity");
}
