use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use catalchemy_core::{CatalogIssue, EntityKind};

use crate::names::Rename;
use crate::planner::CatalogPlan;

/// Options for the catalog pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Seed for ids, parent selection and category draws.
    pub seed: u64,
    /// Brands or collections requested per capability call.
    pub profile_batch_size: usize,
    pub product_batch_size: usize,
    pub review_batch_size: usize,
    /// Attempts per batch before the batch is given up.
    pub max_retries: u32,
    /// Temperature for brands, collections and products.
    pub product_temperature: f32,
    pub review_temperature: f32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            profile_batch_size: 1,
            product_batch_size: 50,
            review_batch_size: 20,
            max_retries: 3,
            product_temperature: 0.7,
            review_temperature: 0.5,
        }
    }
}

/// Accounting for one entity kind.
///
/// `generated = requested - dropped - missing - lost` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub kind: EntityKind,
    pub requested: u64,
    pub generated: u64,
    pub batches: u64,
    pub batches_exhausted: u64,
    pub batches_skipped: u64,
    /// Elements that failed schema or field validation.
    pub dropped: u64,
    /// Id slots the response left without an element.
    pub missing: u64,
    /// Slots of exhausted or skipped batches.
    pub lost: u64,
    /// Elements beyond the allocated ids, discarded.
    pub surplus: u64,
    pub retries: u64,
    pub renames: Vec<Rename>,
    pub duration_ms: u64,
}

impl StageReport {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            requested: 0,
            generated: 0,
            batches: 0,
            batches_exhausted: 0,
            batches_skipped: 0,
            dropped: 0,
            missing: 0,
            lost: 0,
            surplus: 0,
            retries: 0,
            renames: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Whether the accounting identity holds.
    pub fn is_balanced(&self) -> bool {
        self.requested == self.generated + self.dropped + self.missing + self.lost
    }
}

/// Structured generation issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<u64>,
}

impl GenerationIssue {
    pub fn warning(code: &str, kind: Option<EntityKind>, message: impl Into<String>) -> Self {
        Self {
            level: "warning".to_string(),
            code: code.to_string(),
            message: message.into(),
            kind,
            id: None,
            batch: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_batch(mut self, batch: u64) -> Self {
        self.batch = Some(batch);
        self
    }
}

impl From<&CatalogIssue> for GenerationIssue {
    fn from(issue: &CatalogIssue) -> Self {
        let mut converted =
            GenerationIssue::warning(&issue.code, Some(issue.kind), issue.message.clone());
        converted.id = issue.id.clone();
        converted
    }
}

/// Report for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub plan: Option<CatalogPlan>,
    pub stages: Vec<StageReport>,
    pub retries_total: u64,
    pub renames_total: u64,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<GenerationIssue>,
    /// Exported table paths keyed by table name.
    pub outputs: BTreeMap<String, PathBuf>,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            plan: None,
            stages: Vec::new(),
            retries_total: 0,
            renames_total: 0,
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
            outputs: BTreeMap::new(),
            bytes_written: 0,
            duration_ms: 0,
        }
    }

    pub fn record_stage(&mut self, stage: StageReport, issues: Vec<GenerationIssue>) {
        self.retries_total += stage.retries;
        self.renames_total += stage.renames.len() as u64;
        for issue in issues {
            self.record_warning(issue);
        }
        self.stages.push(stage);
    }

    pub fn record_warning(&mut self, issue: GenerationIssue) {
        *self.warnings_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.warnings.push(issue);
    }

    pub fn stage(&self, kind: EntityKind) -> Option<&StageReport> {
        self.stages.iter().find(|stage| stage.kind == kind)
    }
}
