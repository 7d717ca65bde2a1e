mod common;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use catalchemy_core::{EntityKind, normalize_name, validate_catalog};
use catalchemy_generate::{
    BrandGuide, CatalogPipeline, CsvExporter, GenerationError, PipelineOptions, PipelineStage,
    StaticContext, TextGenerator,
};

use common::{ScriptedGenerator, element, payload, temp_out_dir};

fn options() -> PipelineOptions {
    PipelineOptions {
        seed: 7,
        product_batch_size: 20,
        review_batch_size: 20,
        ..PipelineOptions::default()
    }
}

fn pipeline(generator: Arc<ScriptedGenerator>, label: &str) -> CatalogPipeline {
    let generator: Arc<dyn TextGenerator> = generator;
    CatalogPipeline::new(
        generator,
        Arc::new(StaticContext("Pacific Northwest apparel.".to_string())),
        Arc::new(CsvExporter::new(temp_out_dir(label))),
        options(),
    )
}

fn assert_unique<'a>(values: impl IntoIterator<Item = &'a str>, what: &str) {
    let mut seen = HashSet::new();
    for value in values {
        assert!(seen.insert(value.to_string()), "duplicate {what}: {value}");
    }
}

#[tokio::test]
async fn run_produces_consistent_catalog() {
    // Every brand and product comes back with the same name.
    let generator = Arc::new(ScriptedGenerator::new(|prompt, _| {
        Ok(payload(prompt, |index, id| match prompt.kind {
            Some(EntityKind::Brand) => "Cedar Row".to_string(),
            Some(EntityKind::Product) => "Evergreen Relaxed Tee".to_string(),
            _ => format!("Collection {index} {id}"),
        }))
    }));
    let result = pipeline(generator.clone(), "consistent")
        .run(100)
        .await
        .expect("run pipeline");

    let catalog = &result.catalog;
    assert_eq!(result.stage, PipelineStage::Exported);
    assert_eq!(catalog.brands.len(), 2);
    assert_eq!(catalog.collections.len(), 4);
    assert_eq!(catalog.products.len(), 100);
    assert_eq!(catalog.reviews.len(), 500);

    for kind in EntityKind::ALL {
        assert_unique(catalog.ids_of(kind), "id");
    }
    let brand_names: Vec<String> = catalog.brands.iter().map(|b| normalize_name(&b.name)).collect();
    assert_unique(brand_names.iter().map(String::as_str), "brand name");
    let product_names: Vec<String> =
        catalog.products.iter().map(|p| normalize_name(&p.name)).collect();
    assert_unique(product_names.iter().map(String::as_str), "product name");

    let collection_brand: HashMap<&str, &str> = catalog
        .collections
        .iter()
        .map(|c| (c.id.as_str(), c.brand_id.as_str()))
        .collect();
    for product in &catalog.products {
        let brand = collection_brand
            .get(product.collection_id.as_str())
            .expect("product collection resolves");
        assert_eq!(*brand, product.brand_id);
    }
    let product_ids: HashSet<&str> = catalog.products.iter().map(|p| p.id.as_str()).collect();
    assert!(catalog.reviews.iter().all(|r| product_ids.contains(r.product_id.as_str())));

    // Round-robin spreads collections evenly over brands.
    for brand in &catalog.brands {
        let owned = catalog
            .collections
            .iter()
            .filter(|c| c.brand_id == brand.id)
            .count();
        assert_eq!(owned, 2);
    }

    assert!(validate_catalog(catalog).is_ok());
    let report = &result.report;
    assert!(report.stages.iter().all(|stage| stage.is_balanced()));
    assert!(report.renames_total >= 99);
    assert_eq!(report.outputs.len(), 4);
    assert!(report.bytes_written > 0);

    let products_csv =
        std::fs::read_to_string(&report.outputs["products"]).expect("read products.csv");
    assert_eq!(products_csv.lines().count(), 101);

    assert_eq!(generator.calls_for(EntityKind::Brand), 2);
    assert_eq!(generator.calls_for(EntityKind::Collection), 4);
    assert_eq!(generator.calls_for(EntityKind::Product), 5);
    assert_eq!(generator.calls_for(EntityKind::Review), 100);
}

#[tokio::test]
async fn exhausted_products_degrade_downstream_stages() {
    let generator = Arc::new(ScriptedGenerator::new(|prompt, _| match prompt.kind {
        Some(EntityKind::Product) => Ok("I'm sorry, I can't produce JSON today.".to_string()),
        _ => Ok(payload(prompt, |index, id| format!("Name {index} {id}"))),
    }));
    let result = pipeline(generator.clone(), "exhausted")
        .run(100)
        .await
        .expect("exhaustion is not fatal");

    assert!(result.catalog.products.is_empty());
    assert!(result.catalog.reviews.is_empty());
    assert_eq!(result.catalog.brands.len(), 2);

    let products = result.report.stage(EntityKind::Product).expect("product stage");
    assert_eq!(products.requested, 100);
    assert_eq!(products.generated, 0);
    assert_eq!(products.lost, 100);
    assert_eq!(products.batches_exhausted, 5);
    assert!(products.is_balanced());
    assert_eq!(generator.calls_for(EntityKind::Product), 5 * 3);

    assert_eq!(result.report.warnings_by_code["batch_exhausted"], 5);
    assert_eq!(result.report.warnings_by_code["batch_skipped"], 1);
    assert_eq!(generator.calls_for(EntityKind::Review), 0);
}

#[tokio::test]
async fn retries_recover_and_invalid_elements_are_dropped() {
    let generator = Arc::new(ScriptedGenerator::new(|prompt, seen| match prompt.kind {
        // First attempt of every product batch is truncated JSON.
        Some(EntityKind::Product) if seen == 0 => Ok("[{\"id\": ".to_string()),
        Some(EntityKind::Product) => {
            let mut elements: Vec<serde_json::Value> = prompt
                .ids
                .iter()
                .map(|id| element(EntityKind::Product, id, &format!("Tee {id}")))
                .collect();
            elements[0]["price"] = serde_json::json!(-5.0);
            elements.pop();
            Ok(serde_json::Value::Array(elements).to_string())
        }
        Some(EntityKind::Brand) if seen == 0 => {
            Err(GenerationError::Capability("connection reset".to_string()))
        }
        _ => Ok(payload(prompt, |index, id| format!("Name {index} {id}"))),
    }));
    let result = pipeline(generator.clone(), "retries")
        .run(100)
        .await
        .expect("run pipeline");

    let brands = result.report.stage(EntityKind::Brand).expect("brand stage");
    assert_eq!(brands.generated, 2);
    assert_eq!(brands.retries, 2);

    let products = result.report.stage(EntityKind::Product).expect("product stage");
    assert_eq!(products.retries, 5);
    assert_eq!(products.dropped, 5);
    assert_eq!(products.missing, 5);
    assert_eq!(products.generated, 90);
    assert!(products.is_balanced());
    assert_eq!(result.catalog.products.len(), 90);
    assert_eq!(result.catalog.reviews.len(), 90 * 5);
}

#[tokio::test]
async fn missing_brand_guide_aborts_before_generation() {
    let generator = Arc::new(ScriptedGenerator::well_behaved());
    let dyn_generator: Arc<dyn TextGenerator> = generator.clone();
    let pipeline = CatalogPipeline::new(
        dyn_generator,
        Arc::new(BrandGuide::new("/nonexistent/catalchemy/brand_guide.md")),
        Arc::new(CsvExporter::new(temp_out_dir("no_guide"))),
        options(),
    );

    let err = pipeline.run(10).await.unwrap_err();
    assert!(matches!(err, GenerationError::Configuration(_)));
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn zero_products_is_rejected() {
    let generator = Arc::new(ScriptedGenerator::well_behaved());
    let err = pipeline(generator.clone(), "zero").run(0).await.unwrap_err();
    assert!(matches!(err, GenerationError::InvalidPlan(_)));
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn seeded_runs_reuse_identifiers() {
    let first = pipeline(Arc::new(ScriptedGenerator::well_behaved()), "seed_a")
        .run(30)
        .await
        .expect("first run");
    let second = pipeline(Arc::new(ScriptedGenerator::well_behaved()), "seed_b")
        .run(30)
        .await
        .expect("second run");

    assert_eq!(
        first.catalog.ids_of(EntityKind::Product),
        second.catalog.ids_of(EntityKind::Product)
    );
    assert_eq!(
        first.catalog.ids_of(EntityKind::Review),
        second.catalog.ids_of(EntityKind::Review)
    );
}
