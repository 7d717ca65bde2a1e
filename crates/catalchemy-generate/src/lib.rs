//! Catalog generation engine for Catalchemy.
//!
//! Plans entity quantities from a product target, drives batched calls to a
//! text generation capability with bounded retries, keeps ids and names
//! unique per entity kind, and exports the resulting catalog as CSV.

pub mod batch;
pub mod capability;
pub mod context;
pub mod errors;
pub mod ids;
pub mod model;
pub mod names;
pub mod output;
pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod references;

pub use batch::{BatchOrchestrator, BatchOutcome, BatchPlan, BatchSlot, GeneratedEntity};
pub use capability::{Prompt, TextGenerator};
pub use context::{BrandGuide, ContextSource, DEFAULT_CONTEXT_TOKENS, StaticContext};
pub use errors::GenerationError;
pub use ids::IdAllocator;
pub use model::{GenerationIssue, GenerationReport, PipelineOptions, StageReport};
pub use names::{NameDeduplicator, Rename, deduplicate, deduplicate_against};
pub use output::csv::{CatalogExporter, CsvExporter, ExportedTable};
pub use pipeline::{CatalogPipeline, PipelineResult, PipelineStage};
pub use planner::{CatalogPlan, plan_catalog};
