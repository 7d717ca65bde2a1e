#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use catalchemy_core::EntityKind;
use catalchemy_generate::{GenerationError, Prompt, TextGenerator};

type Script = dyn Fn(&Prompt, usize) -> Result<String, GenerationError> + Send + Sync;

/// Test double answering prompts from a closure.
///
/// The closure also receives how many times the same prompt was seen
/// before, so retries can be scripted.
pub struct ScriptedGenerator {
    script: Box<Script>,
    calls: Mutex<Vec<Prompt>>,
}

impl ScriptedGenerator {
    pub fn new(
        script: impl Fn(&Prompt, usize) -> Result<String, GenerationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every entity prompt with a full, valid payload.
    pub fn well_behaved() -> Self {
        Self::new(|prompt, _| Ok(payload(prompt, |index, id| default_name(prompt, index, id))))
    }

    pub fn calls(&self) -> Vec<Prompt> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_for(&self, kind: EntityKind) -> usize {
        self.calls()
            .iter()
            .filter(|prompt| prompt.kind == Some(kind))
            .count()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn invoke(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let seen = {
            let mut calls = self.calls.lock().expect("calls lock");
            let seen = calls.iter().filter(|call| call.user == prompt.user).count();
            calls.push(prompt.clone());
            seen
        };
        (self.script)(prompt, seen)
    }
}

/// Name derived from the id suffix, unique per id.
pub fn default_name(prompt: &Prompt, _index: usize, id: &str) -> String {
    let suffix = id.rsplit('_').next().unwrap_or(id);
    match prompt.kind {
        Some(EntityKind::Brand) => format!("Brand {suffix}"),
        Some(EntityKind::Collection) => format!("Collection {suffix}"),
        _ => format!("Evergreen Relaxed Tee {suffix}"),
    }
}

/// JSON list with one valid element per prompt id.
pub fn payload(prompt: &Prompt, name: impl Fn(usize, &str) -> String) -> String {
    let kind = prompt.kind.expect("entity prompt");
    let elements: Vec<Value> = prompt
        .ids
        .iter()
        .enumerate()
        .map(|(index, id)| element(kind, id, &name(index, id)))
        .collect();
    Value::Array(elements).to_string()
}

/// A valid element of `kind`. Reference fields hold placeholders that the
/// orchestrator is expected to overwrite.
pub fn element(kind: EntityKind, id: &str, name: &str) -> Value {
    match kind {
        EntityKind::Brand => json!({
            "id": id,
            "name": name,
            "description": "Weatherproof basics for city life.",
            "story": "Founded by two friends on a rainy ferry ride.",
            "values": ["Sustainability", "Inclusivity", "Repair"],
            "target_audience": "Urban commuters"
        }),
        EntityKind::Collection => json!({
            "id": id,
            "name": name,
            "description": "Layers built for drizzle.",
            "season": "Fall",
            "category": "Outdoor",
            "brand_id": "brand_placeholder",
            "launch_date": "2024-09-01",
            "theme": "Harbor fog"
        }),
        EntityKind::Product => json!({
            "id": id,
            "name": name,
            "description": "A soft everyday tee.",
            "category": "Everyday Apparel",
            "subcategory": "Essential Tees",
            "gender": "unisex",
            "collection_id": "collection_placeholder",
            "brand_id": "brand_placeholder",
            "price": 38.0,
            "colors": ["Sage", "Navy"],
            "sizes": ["S", "M", "L"],
            "materials": ["Organic cotton"],
            "fit": "relaxed",
            "sustainability_features": ["Low-impact dyes"],
            "care_instructions": "Machine wash cold",
            "features": ["Side seams"]
        }),
        EntityKind::Review => json!({
            "id": id,
            "product_id": "product_placeholder",
            "customer_name": "Jordan P.",
            "rating": 5,
            "title": "Lives in my closet",
            "content": "Soft and holds its shape.",
            "verified_purchase": true,
            "helpful_votes": 4,
            "review_date": "2025-03-14",
            "size_worn": "M",
            "color_purchased": null
        }),
    }
}

pub fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("catalchemy_generate_{label}_{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}
