use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use catalchemy_core::{
    Brand, Catalog, CatalogIssue, Collection, EntityKind, Product, Review, validate_catalog,
};

use crate::batch::{BatchOrchestrator, BatchPlan, GeneratedEntity};
use crate::capability::TextGenerator;
use crate::context::ContextSource;
use crate::errors::GenerationError;
use crate::ids::{IdAllocator, hash_seed};
use crate::model::{GenerationIssue, GenerationReport, PipelineOptions};
use crate::output::csv::CatalogExporter;
use crate::planner::{CatalogPlan, plan_catalog};
use crate::prompts::{
    PRODUCT_CATEGORIES, brand_prompt, collection_prompt, product_prompt, review_prompt,
};
use crate::references::ParentPool;

/// Pipeline progress. Stages only move forward, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    BrandsGenerated,
    CollectionsGenerated,
    ProductsGenerated,
    ReviewsGenerated,
    Exported,
}

impl PipelineStage {
    pub fn next(self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Idle => Some(PipelineStage::BrandsGenerated),
            PipelineStage::BrandsGenerated => Some(PipelineStage::CollectionsGenerated),
            PipelineStage::CollectionsGenerated => Some(PipelineStage::ProductsGenerated),
            PipelineStage::ProductsGenerated => Some(PipelineStage::ReviewsGenerated),
            PipelineStage::ReviewsGenerated => Some(PipelineStage::Exported),
            PipelineStage::Exported => None,
        }
    }

    /// Move to `to`, which must be the immediate successor.
    pub fn advance(&mut self, to: PipelineStage) -> Result<(), GenerationError> {
        if self.next() != Some(to) {
            return Err(GenerationError::StageTransition {
                from: self.to_string(),
                to: to.to_string(),
            });
        }
        *self = to;
        Ok(())
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::BrandsGenerated => "brands_generated",
            PipelineStage::CollectionsGenerated => "collections_generated",
            PipelineStage::ProductsGenerated => "products_generated",
            PipelineStage::ReviewsGenerated => "reviews_generated",
            PipelineStage::Exported => "exported",
        };
        f.write_str(label)
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub catalog: Catalog,
    pub report: GenerationReport,
    pub stage: PipelineStage,
}

/// Sequences brand, collection, product and review generation, then export.
pub struct CatalogPipeline {
    generator: Arc<dyn TextGenerator>,
    context: Arc<dyn ContextSource>,
    exporter: Arc<dyn CatalogExporter>,
    options: PipelineOptions,
    run_id: Option<String>,
}

impl CatalogPipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        context: Arc<dyn ContextSource>,
        exporter: Arc<dyn CatalogExporter>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            generator,
            context,
            exporter,
            options,
            run_id: None,
        }
    }

    /// Use a caller-provided run id instead of a fresh one.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Generate and export a catalog sized from `total_products`.
    ///
    /// Only configuration problems (bad plan, unreadable context) and export
    /// I/O fail the run. A stage that yields nothing leaves later stages to
    /// skip their batches.
    pub async fn run(&self, total_products: u64) -> Result<PipelineResult, GenerationError> {
        let start = Instant::now();
        let run_id = self
            .run_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let plan = plan_catalog(total_products)?;
        let context = self.context.get_context().await?;

        let mut report = GenerationReport::new(run_id.clone());
        report.plan = Some(plan);
        let mut stage = PipelineStage::Idle;

        info!(
            run_id = %run_id,
            brands = plan.brand_count,
            collections = plan.collection_count,
            products = plan.product_count,
            reviews = plan.total_reviews,
            seed = self.options.seed,
            "generation started"
        );

        let brands = self.generate_brands(&context, &plan, &mut report).await?;
        stage.advance(PipelineStage::BrandsGenerated)?;

        let collections = self
            .generate_collections(&context, &plan, &brands, &mut report)
            .await?;
        stage.advance(PipelineStage::CollectionsGenerated)?;

        let products = self
            .generate_products(&context, &plan, &collections, &mut report)
            .await?;
        stage.advance(PipelineStage::ProductsGenerated)?;

        let reviews = self
            .generate_reviews(&context, &plan, &products, &mut report)
            .await?;
        stage.advance(PipelineStage::ReviewsGenerated)?;

        let catalog = Catalog {
            brands,
            collections,
            products,
            reviews,
        };

        let validation = validate_catalog(&catalog);
        for issue in validation.errors.iter().chain(&validation.warnings) {
            record_catalog_issue(&mut report, issue);
        }

        for kind in EntityKind::ALL {
            let exported = self.exporter.export_rows(&catalog.table_rows(kind))?;
            info!(
                table = kind.table_name(),
                rows = exported.rows,
                bytes = exported.bytes,
                path = %exported.path.display(),
                "table exported"
            );
            report.bytes_written += exported.bytes;
            report
                .outputs
                .insert(kind.table_name().to_string(), exported.path);
        }
        stage.advance(PipelineStage::Exported)?;

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            brands = catalog.brands.len(),
            collections = catalog.collections.len(),
            products = catalog.products.len(),
            reviews = catalog.reviews.len(),
            warnings = report.warnings.len(),
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(PipelineResult {
            catalog,
            report,
            stage,
        })
    }

    async fn generate_brands(
        &self,
        context: &str,
        plan: &CatalogPlan,
        report: &mut GenerationReport,
    ) -> Result<Vec<Brand>, GenerationError> {
        let mut orchestrator = self.orchestrator::<Brand>(self.options.profile_batch_size)?;
        let temperature = self.options.product_temperature;

        let brands = orchestrator
            .generate(
                self.generator.as_ref(),
                plan.brand_count as usize,
                |slot| Ok(BatchPlan::new(brand_prompt(context, slot.ids, temperature))),
            )
            .await;

        finish_stage(report, orchestrator);
        Ok(brands)
    }

    async fn generate_collections(
        &self,
        context: &str,
        plan: &CatalogPlan,
        brands: &[Brand],
        report: &mut GenerationReport,
    ) -> Result<Vec<Collection>, GenerationError> {
        let mut orchestrator = self.orchestrator::<Collection>(self.options.profile_batch_size)?;
        let temperature = self.options.product_temperature;
        let mut pool = ParentPool::new(brands);

        let collections = orchestrator
            .generate(
                self.generator.as_ref(),
                plan.collection_count as usize,
                |slot| {
                    let brand = pool.next_round_robin()?;
                    let prompt = collection_prompt(context, slot.ids, &brand.id, temperature);
                    Ok(BatchPlan::new(prompt).pin("brand_id", brand.id.clone()))
                },
            )
            .await;

        finish_stage(report, orchestrator);
        Ok(collections)
    }

    async fn generate_products(
        &self,
        context: &str,
        plan: &CatalogPlan,
        collections: &[Collection],
        report: &mut GenerationReport,
    ) -> Result<Vec<Product>, GenerationError> {
        let mut orchestrator = self.orchestrator::<Product>(self.options.product_batch_size)?;
        let temperature = self.options.product_temperature;
        let pool = ParentPool::new(collections);
        let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(self.options.seed, "product.parents"));

        let products = orchestrator
            .generate(
                self.generator.as_ref(),
                plan.product_count as usize,
                |slot| {
                    let collection = pool.pick(&mut rng)?;
                    let categories: Vec<&str> = slot
                        .ids
                        .iter()
                        .map(|_| PRODUCT_CATEGORIES[rng.random_range(0..PRODUCT_CATEGORIES.len())].0)
                        .collect();
                    let prompt = product_prompt(
                        context,
                        slot.ids,
                        &collection.id,
                        &collection.brand_id,
                        &categories,
                        temperature,
                    );
                    Ok(BatchPlan::new(prompt)
                        .pin("collection_id", collection.id.clone())
                        .pin("brand_id", collection.brand_id.clone()))
                },
            )
            .await;

        finish_stage(report, orchestrator);
        Ok(products)
    }

    async fn generate_reviews(
        &self,
        context: &str,
        plan: &CatalogPlan,
        products: &[Product],
        report: &mut GenerationReport,
    ) -> Result<Vec<Review>, GenerationError> {
        let mut orchestrator = self.orchestrator::<Review>(self.options.review_batch_size)?;
        let temperature = self.options.review_temperature;
        let mut reviews = Vec::with_capacity(products.len() * plan.reviews_per_product as usize);

        if products.is_empty() {
            let issue = GenerationIssue::warning(
                "batch_skipped",
                Some(EntityKind::Review),
                GenerationError::ReferenceUnavailable(EntityKind::Product).to_string(),
            );
            warn!(kind = %EntityKind::Review, message = %issue.message, "review stage skipped");
            report.record_warning(issue);
        }

        for product in products {
            let generated = orchestrator
                .generate(
                    self.generator.as_ref(),
                    plan.reviews_per_product as usize,
                    |slot| {
                        let prompt = review_prompt(context, slot.ids, product, temperature);
                        Ok(BatchPlan::new(prompt).pin("product_id", product.id.clone()))
                    },
                )
                .await;
            reviews.extend(generated);
        }

        finish_stage(report, orchestrator);
        Ok(reviews)
    }

    fn orchestrator<E: GeneratedEntity>(
        &self,
        batch_size: usize,
    ) -> Result<BatchOrchestrator<E>, GenerationError> {
        BatchOrchestrator::new(
            IdAllocator::seeded(E::KIND, self.options.seed),
            batch_size,
            self.options.max_retries,
            self.options.seed,
        )
    }
}

fn finish_stage<E: GeneratedEntity>(
    report: &mut GenerationReport,
    orchestrator: BatchOrchestrator<E>,
) {
    let (stage, issues) = orchestrator.into_report();
    info!(
        kind = %stage.kind,
        requested = stage.requested,
        generated = stage.generated,
        dropped = stage.dropped,
        missing = stage.missing,
        lost = stage.lost,
        retries = stage.retries,
        renames = stage.renames.len(),
        duration_ms = stage.duration_ms,
        "stage completed"
    );
    report.record_stage(stage, issues);
}

fn record_catalog_issue(report: &mut GenerationReport, issue: &CatalogIssue) {
    warn!(
        code = %issue.code,
        kind = %issue.kind,
        id = issue.id.as_deref().unwrap_or(""),
        message = %issue.message,
        "catalog validation issue"
    );
    report.record_warning(GenerationIssue::from(issue));
}
