use thiserror::Error;

use catalchemy_core::EntityKind;

/// Errors emitted by the generation engine.
///
/// Only [`GenerationError::Configuration`] aborts a pipeline run. The
/// malformed-response, schema, reference and capability variants are
/// recovered inside the batch orchestrator and surface in the run report.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),
    #[error("no {0} ids available to reference")]
    ReferenceUnavailable(EntityKind),
    #[error("generation capability failed: {0}")]
    Capability(String),
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error("invalid stage transition: {from} -> {to}")]
    StageTransition { from: String, to: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Core(#[from] catalchemy_core::Error),
}

impl GenerationError {
    /// Stable code used in report issues and log fields.
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::Configuration(_) => "configuration",
            GenerationError::MalformedResponse(_) => "malformed_response",
            GenerationError::SchemaValidation(_) => "schema_validation",
            GenerationError::ReferenceUnavailable(_) => "reference_unavailable",
            GenerationError::Capability(_) => "capability_failed",
            GenerationError::InvalidPlan(_) => "invalid_plan",
            GenerationError::StageTransition { .. } => "stage_transition",
            GenerationError::Io(_) => "io",
            GenerationError::Json(_) => "json",
            GenerationError::Csv(_) => "csv",
            GenerationError::Core(_) => "invalid_entity",
        }
    }
}
