use std::marker::PhantomData;
use std::sync::LazyLock;
use std::time::Instant;

use chrono::{Duration, Utc};
use jsonschema::JSONSchema;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use regex::Regex;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use catalchemy_core::{Brand, CatalogEntity, Collection, DATE_FORMAT, Product, Review};

use crate::capability::{Prompt, TextGenerator};
use crate::errors::GenerationError;
use crate::ids::{IdAllocator, hash_seed};
use crate::model::{GenerationIssue, StageReport};
use crate::names::{NameDeduplicator, Rename, deduplicate, deduplicate_against};

/// Days back from today a filled-in review date may fall.
const REVIEW_DATE_WINDOW_DAYS: i64 = 730;
const PREVIEW_CHARS: usize = 200;

static CODE_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n(.*?)\s*```\s*$").ok());

/// Entity the capability can be asked to produce.
pub trait GeneratedEntity: CatalogEntity + DeserializeOwned + JsonSchema {
    /// Fill attributes the capability may leave out, before validation.
    fn fill_missing<R: Rng + ?Sized>(_object: &mut Map<String, Value>, _rng: &mut R) {}
}

impl GeneratedEntity for Brand {}
impl GeneratedEntity for Collection {}
impl GeneratedEntity for Product {}

impl GeneratedEntity for Review {
    fn fill_missing<R: Rng + ?Sized>(object: &mut Map<String, Value>, rng: &mut R) {
        let present = object
            .get("review_date")
            .and_then(Value::as_str)
            .is_some_and(|date| !date.trim().is_empty());
        if !present {
            let days_ago = rng.random_range(0..=REVIEW_DATE_WINDOW_DAYS);
            let date = Utc::now().date_naive() - Duration::days(days_ago);
            object.insert(
                "review_date".to_string(),
                Value::String(date.format(DATE_FORMAT).to_string()),
            );
        }
    }
}

/// Position of a batch and the ids allocated for it.
#[derive(Debug, Clone, Copy)]
pub struct BatchSlot<'a> {
    pub index: usize,
    pub ids: &'a [String],
}

/// Request for one batch: the prompt plus reference fields pinned onto
/// every element, like ids.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub prompt: Prompt,
    pub pins: Vec<(&'static str, String)>,
}

impl BatchPlan {
    pub fn new(prompt: Prompt) -> Self {
        Self {
            prompt,
            pins: Vec::new(),
        }
    }

    pub fn pin(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.pins.push((field, value.into()));
        self
    }
}

/// Result of one bounded-retry batch.
#[derive(Debug)]
pub enum BatchOutcome<E> {
    Generated {
        entities: Vec<E>,
        dropped: usize,
        missing: usize,
        attempts: u32,
    },
    Exhausted {
        attempts: u32,
        last_error: GenerationError,
    },
    Skipped {
        reason: GenerationError,
    },
}

/// Drives batched generation for one entity kind.
///
/// Owns the kind's id allocator and name registry, so ids and names stay
/// unique across every batch and every `generate` call made through the
/// same orchestrator.
pub struct BatchOrchestrator<E: GeneratedEntity> {
    allocator: IdAllocator,
    names: NameDeduplicator,
    validator: JSONSchema,
    batch_size: usize,
    max_retries: u32,
    rng: ChaCha8Rng,
    report: StageReport,
    issues: Vec<GenerationIssue>,
    elapsed_ms: u64,
    _entity: PhantomData<E>,
}

impl<E: GeneratedEntity> BatchOrchestrator<E> {
    pub fn new(
        allocator: IdAllocator,
        batch_size: usize,
        max_retries: u32,
        seed: u64,
    ) -> Result<Self, GenerationError> {
        let schema = serde_json::to_value(schemars::schema_for!(E))?;
        let validator = JSONSchema::compile(&schema)
            .map_err(|err| GenerationError::SchemaValidation(err.to_string()))?;

        Ok(Self {
            allocator,
            names: NameDeduplicator::new(E::KIND),
            validator,
            batch_size: batch_size.max(1),
            max_retries: max_retries.max(1),
            rng: ChaCha8Rng::seed_from_u64(hash_seed(seed, &format!("{}.fill", E::KIND))),
            report: StageReport::new(E::KIND),
            issues: Vec::new(),
            elapsed_ms: 0,
            _entity: PhantomData,
        })
    }

    pub fn report(&self) -> &StageReport {
        &self.report
    }

    /// Stage accounting and the issues recorded along the way.
    pub fn into_report(self) -> (StageReport, Vec<GenerationIssue>) {
        let mut report = self.report;
        report.duration_ms = self.elapsed_ms;
        (report, self.issues)
    }

    /// Generate up to `total` entities in batches of the configured size.
    ///
    /// `prepare` builds the request for each batch; returning an error
    /// skips the batch. Names are deduplicated within each batch, then once
    /// more over this call's result against every name kept by earlier
    /// calls.
    pub async fn generate<F>(
        &mut self,
        generator: &dyn TextGenerator,
        total: usize,
        mut prepare: F,
    ) -> Vec<E>
    where
        F: FnMut(BatchSlot<'_>) -> Result<BatchPlan, GenerationError>,
    {
        let start = Instant::now();
        let batches = total.div_ceil(self.batch_size);
        let mut remaining = total;
        let mut entities = Vec::with_capacity(total);
        self.report.requested += total as u64;

        for index in 0..batches {
            let count = remaining.min(self.batch_size);
            remaining -= count;
            let ids = self.allocator.allocate(count);

            let outcome = match prepare(BatchSlot { index, ids: &ids }) {
                Ok(plan) => self.run_batch(generator, &ids, plan).await,
                Err(reason) => BatchOutcome::Skipped { reason },
            };
            self.absorb(count, outcome, &mut entities);
        }

        if E::KIND.has_unique_names() {
            let renames = deduplicate_against(&mut self.names, &mut entities);
            self.record_renames(renames);
        }

        self.report.generated += entities.len() as u64;
        debug!(
            kind = %E::KIND,
            generated = entities.len(),
            ids_issued = self.allocator.issued(),
            "generate call finished"
        );
        self.elapsed_ms += start.elapsed().as_millis() as u64;
        entities
    }

    /// Run one batch with bounded retries.
    pub async fn run_batch(
        &mut self,
        generator: &dyn TextGenerator,
        ids: &[String],
        plan: BatchPlan,
    ) -> BatchOutcome<E> {
        let batch = self.report.batches + 1;
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            let parsed = match generator.invoke(&plan.prompt).await {
                Ok(raw) => {
                    debug!(
                        kind = %E::KIND,
                        batch,
                        attempt,
                        preview = %preview(&raw),
                        "raw response"
                    );
                    parse_elements(&raw)
                }
                Err(err) => Err(err),
            };

            match parsed {
                Ok(elements) => {
                    let (entities, dropped, missing) = self.materialize(batch, elements, ids, &plan);
                    return BatchOutcome::Generated {
                        entities,
                        dropped,
                        missing,
                        attempts: attempt,
                    };
                }
                Err(err) => {
                    warn!(
                        kind = %E::KIND,
                        batch,
                        attempt,
                        max_retries = self.max_retries,
                        error = %err,
                        "batch attempt failed"
                    );
                    last_error = Some(err);
                }
            }
        }

        BatchOutcome::Exhausted {
            attempts: self.max_retries,
            last_error: last_error.unwrap_or_else(|| {
                GenerationError::MalformedResponse("no attempt was made".to_string())
            }),
        }
    }

    fn absorb(&mut self, count: usize, outcome: BatchOutcome<E>, entities: &mut Vec<E>) {
        self.report.batches += 1;
        let batch = self.report.batches;

        match outcome {
            BatchOutcome::Generated {
                entities: mut generated,
                dropped,
                missing,
                attempts,
            } => {
                self.report.retries += u64::from(attempts - 1);
                self.report.dropped += dropped as u64;
                self.report.missing += missing as u64;
                if missing > 0 {
                    self.issue(
                        GenerationIssue::warning(
                            "elements_missing",
                            Some(E::KIND),
                            format!("response covered {} of {count} ids", count - missing),
                        )
                        .with_batch(batch),
                    );
                }

                if E::KIND.has_unique_names() {
                    let renames = deduplicate(&mut generated);
                    self.record_renames(renames);
                }

                info!(
                    kind = %E::KIND,
                    batch,
                    requested = count,
                    generated = generated.len(),
                    dropped,
                    missing,
                    attempts,
                    "batch generated"
                );
                entities.extend(generated);
            }
            BatchOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                self.report.retries += u64::from(attempts.saturating_sub(1));
                self.report.batches_exhausted += 1;
                self.report.lost += count as u64;
                self.issue(
                    GenerationIssue::warning(
                        "batch_exhausted",
                        Some(E::KIND),
                        format!("batch dropped after {attempts} attempts: {last_error}"),
                    )
                    .with_batch(batch),
                );
            }
            BatchOutcome::Skipped { reason } => {
                self.report.batches_skipped += 1;
                self.report.lost += count as u64;
                self.issue(
                    GenerationIssue::warning(
                        "batch_skipped",
                        Some(E::KIND),
                        format!("batch skipped: {reason}"),
                    )
                    .with_batch(batch),
                );
            }
        }
    }

    fn materialize(
        &mut self,
        batch: u64,
        elements: Vec<Value>,
        ids: &[String],
        plan: &BatchPlan,
    ) -> (Vec<E>, usize, usize) {
        let missing = ids.len().saturating_sub(elements.len());
        let surplus = elements.len().saturating_sub(ids.len());
        if surplus > 0 {
            debug!(kind = %E::KIND, batch, surplus, "discarding surplus elements");
            self.report.surplus += surplus as u64;
        }

        let mut entities = Vec::with_capacity(ids.len());
        let mut dropped = 0;
        for (element, id) in elements.into_iter().zip(ids) {
            match self.decode(element, id, &plan.pins) {
                Ok(entity) => entities.push(entity),
                Err(err) => {
                    dropped += 1;
                    self.issue(
                        GenerationIssue::warning("element_dropped", Some(E::KIND), err.to_string())
                            .with_id(id.clone())
                            .with_batch(batch),
                    );
                }
            }
        }

        (entities, dropped, missing)
    }

    /// Pin id and references, then check shape, types and field rules.
    fn decode(
        &mut self,
        element: Value,
        id: &str,
        pins: &[(&'static str, String)],
    ) -> Result<E, GenerationError> {
        let Value::Object(mut object) = element else {
            return Err(GenerationError::SchemaValidation(format!(
                "element for '{id}' is not an object"
            )));
        };

        object.insert("id".to_string(), Value::String(id.to_string()));
        for (field, value) in pins {
            object.insert((*field).to_string(), Value::String(value.clone()));
        }
        E::fill_missing(&mut object, &mut self.rng);

        let value = Value::Object(object);
        if let Err(errors) = self.validator.validate(&value) {
            let messages: Vec<String> = errors
                .map(|error| {
                    let path = error.instance_path.to_string();
                    if path.is_empty() {
                        error.to_string()
                    } else {
                        format!("{path}: {error}")
                    }
                })
                .collect();
            return Err(GenerationError::SchemaValidation(messages.join("; ")));
        }

        let entity: E = serde_json::from_value(value)
            .map_err(|err| GenerationError::SchemaValidation(err.to_string()))?;
        entity.validate()?;
        Ok(entity)
    }

    fn record_renames(&mut self, renames: Vec<Rename>) {
        for rename in renames {
            self.issue(
                GenerationIssue::warning(
                    "name_renamed",
                    Some(E::KIND),
                    format!("'{}' renamed to '{}'", rename.from, rename.to),
                )
                .with_id(rename.id.clone()),
            );
            self.report.renames.push(rename);
        }
    }

    fn issue(&mut self, issue: GenerationIssue) {
        warn!(
            code = %issue.code,
            kind = %E::KIND,
            id = issue.id.as_deref().unwrap_or(""),
            batch = issue.batch.unwrap_or(0),
            message = %issue.message
        );
        self.issues.push(issue);
    }
}

/// Parse a capability response into a list of JSON elements.
///
/// Accepts a Markdown code fence around the payload, a bare object in place
/// of a one-element list, and an object wrapping a single list.
pub fn parse_elements(raw: &str) -> Result<Vec<Value>, GenerationError> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|err| GenerationError::MalformedResponse(err.to_string()))?;

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(object) => {
            if object.len() == 1 {
                if let Some(Value::Array(items)) = object.values().next() {
                    return Ok(items.clone());
                }
            }
            Ok(vec![Value::Object(object)])
        }
        other => Err(GenerationError::MalformedResponse(format!(
            "expected a JSON list, got {}",
            json_type(&other)
        ))),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    fenced_body(raw).unwrap_or_else(|| raw.trim())
}

fn fenced_body(raw: &str) -> Option<&str> {
    let captures = CODE_FENCE.as_ref()?.captures(raw)?;
    captures.get(1).map(|body| body.as_str())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn preview(raw: &str) -> String {
    raw.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_list() {
        let raw = "```json\n[{\"a\": 1}, {\"a\": 2}]\n```";
        let elements = parse_elements(raw).unwrap();
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn parses_single_object_and_wrapped_list() {
        let elements = parse_elements("{\"name\": \"x\"}").unwrap();
        assert_eq!(elements.len(), 1);

        let elements = parse_elements("{\"products\": [{\"a\": 1}, {\"a\": 2}]}").unwrap();
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn rejects_prose_and_scalars() {
        assert!(matches!(
            parse_elements("Sure! Here are your products."),
            Err(GenerationError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_elements("42"),
            Err(GenerationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn review_date_is_filled_when_absent() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut object = Map::new();
        object.insert("review_date".to_string(), Value::Null);
        Review::fill_missing(&mut object, &mut rng);

        let date = object["review_date"].as_str().unwrap();
        let parsed = chrono::NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap();
        let today = Utc::now().date_naive();
        assert!(parsed <= today);
        assert!(parsed >= today - Duration::days(REVIEW_DATE_WINDOW_DAYS));

        let mut object = Map::new();
        object.insert("review_date".to_string(), Value::String("2024-05-01".into()));
        Review::fill_missing(&mut object, &mut rng);
        assert_eq!(object["review_date"], "2024-05-01");
    }
}
