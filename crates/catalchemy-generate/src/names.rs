use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use catalchemy_core::{CatalogEntity, EntityKind, NameHints, normalize_name};

const PRODUCT_MODIFIERS: &[&str] = &[
    "Classic",
    "Modern",
    "Premium",
    "Essential",
    "Signature",
    "Heritage",
    "Contemporary",
    "Refined",
    "Elegant",
    "Casual",
];

const STYLE_DESCRIPTORS: &[&str] = &[
    "Relaxed",
    "Slim",
    "Tailored",
    "Oversized",
    "Fitted",
    "Comfortable",
    "Structured",
    "Flexible",
    "Adaptive",
];

const BRAND_MODIFIERS: &[&str] = &[
    "Artisan",
    "Heritage",
    "Modern",
    "Eco",
    "Sustainable",
    "Natural",
    "Organic",
    "Handcrafted",
    "Bespoke",
    "Premium",
];

const BRAND_LOCATION_TERMS: &[&str] = &[
    "Pacific",
    "Coastal",
    "Mountain",
    "Valley",
    "Riverside",
    "Harbor",
    "Meadow",
    "Forest",
    "Canyon",
    "Summit",
];

const BRAND_NATURE_TERMS: &[&str] = &[
    "Wild", "Natural", "Earth", "Sky", "Ocean", "Mountain", "River", "Forest", "Meadow", "Valley",
];

const COLLECTION_MODIFIERS: &[&str] = &[
    "Signature",
    "Limited",
    "Premium",
    "Exclusive",
    "Heritage",
    "Modern",
    "Contemporary",
    "Classic",
    "Refined",
    "Elegant",
];

const CLASSIC: &[&str] = &["Classic"];

fn product_category_terms(category: &str) -> &'static [&'static str] {
    match category {
        "Everyday Apparel" => &["Daily", "Versatile", "Essential"],
        "Work & Evening Wear" => &["Professional", "Polished", "Sophisticated"],
        "Active & Outdoor Layers" => &["Performance", "Active", "Outdoor"],
        "Everyday Outerwear" => &["Layered", "Protective", "Comfortable"],
        "Accessories" => &["Stylish", "Functional", "Versatile"],
        "Footwear" => &["Comfortable", "Durable", "Stylish"],
        _ => CLASSIC,
    }
}

fn gender_terms(gender: &str) -> &'static [&'static str] {
    match gender {
        "men" => &["Men's", "Masculine", "Gentleman's"],
        "women" => &["Women's", "Feminine", "Lady's"],
        "unisex" => &["Unisex", "Universal", "Gender-neutral"],
        _ => &[],
    }
}

fn season_terms(season: &str) -> &'static [&'static str] {
    match season {
        "Spring" => &["Spring", "Bloom", "Renewal", "Awakening"],
        "Summer" => &["Summer", "Solstice", "Coastal", "Breeze"],
        "Fall" => &["Fall", "Autumn", "Harvest", "Golden"],
        "Winter" => &["Winter", "Frost", "Alpine", "Cozy"],
        "All-Season" => &["Year-Round", "Timeless", "Versatile", "Essential"],
        _ => CLASSIC,
    }
}

fn collection_category_terms(category: &str) -> &'static [&'static str] {
    match category {
        "Everyday" => &["Daily", "Essential", "Core", "Basic"],
        "Work" => &["Professional", "Office", "Business", "Corporate"],
        "Active" => &["Performance", "Athletic", "Sport", "Dynamic"],
        "Outdoor" => &["Adventure", "Exploration", "Wilderness", "Trail"],
        _ => CLASSIC,
    }
}

/// A name replaced during deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    pub kind: EntityKind,
    pub id: String,
    pub from: String,
    pub to: String,
}

/// Running set of names already taken within one entity kind.
///
/// Names compare trimmed and case-insensitive.
#[derive(Debug, Clone)]
pub struct NameDeduplicator {
    kind: EntityKind,
    used: HashSet<String>,
}

impl NameDeduplicator {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            used: HashSet::new(),
        }
    }

    pub fn is_unique(&self, name: &str) -> bool {
        !self.used.contains(&normalize_name(name))
    }

    /// Record `name` as taken. Returns false if it already was.
    pub fn register(&mut self, name: &str) -> bool {
        self.used.insert(normalize_name(name))
    }

    /// Return `name` if it is free, otherwise the first free alternative.
    /// The returned name is registered.
    pub fn resolve(&mut self, name: &str, hints: NameHints<'_>) -> String {
        if self.is_unique(name) {
            self.register(name);
            return name.to_string();
        }

        let chosen = self
            .candidates(name.trim(), hints)
            .into_iter()
            .find(|candidate| self.is_unique(candidate))
            .unwrap_or_else(|| self.fallback(name.trim()));
        self.register(&chosen);
        chosen
    }

    fn fallback(&self, base: &str) -> String {
        let label = match self.kind {
            EntityKind::Product => "Style",
            other => other.label(),
        };
        let mut number = self.used.len() + 1;
        loop {
            let candidate = format!("{base} ({label} {number})");
            if self.is_unique(&candidate) {
                return candidate;
            }
            number += 1;
        }
    }

    /// Alternative names in strategy order.
    fn candidates(&self, base: &str, hints: NameHints<'_>) -> Vec<String> {
        match self.kind {
            EntityKind::Product => product_candidates(base, hints),
            EntityKind::Brand => prefixed(
                base,
                BRAND_MODIFIERS
                    .iter()
                    .chain(BRAND_LOCATION_TERMS)
                    .chain(BRAND_NATURE_TERMS),
            ),
            EntityKind::Collection => {
                let season = season_terms(hints.season.unwrap_or_default());
                let category = collection_category_terms(hints.category.unwrap_or_default());
                prefixed(
                    base,
                    season.iter().chain(category).chain(COLLECTION_MODIFIERS),
                )
            }
            EntityKind::Review => Vec::new(),
        }
    }
}

fn prefixed<'a>(base: &str, terms: impl Iterator<Item = &'a &'a str>) -> Vec<String> {
    terms.map(|term| format!("{term} {base}")).collect()
}

fn product_candidates(base: &str, hints: NameHints<'_>) -> Vec<String> {
    let mut candidates = prefixed(base, PRODUCT_MODIFIERS.iter());

    // Color-led names reuse the item words after the first two tokens.
    let item_type = base.split_whitespace().skip(2).collect::<Vec<_>>().join(" ");
    let color = hints.color.map(str::trim).unwrap_or_default();
    if !color.is_empty() && !item_type.is_empty() {
        let category = product_category_terms(hints.category.unwrap_or_default());
        candidates.extend(
            STYLE_DESCRIPTORS
                .iter()
                .chain(category)
                .map(|term| format!("{color} {term} {item_type}")),
        );
    }

    candidates.extend(prefixed(
        base,
        gender_terms(hints.gender.unwrap_or_default()).iter(),
    ));
    candidates
}

/// Make names unique within `entities`, using a fresh scope.
pub fn deduplicate<E: CatalogEntity>(entities: &mut [E]) -> Vec<Rename> {
    deduplicate_against(&mut NameDeduplicator::new(E::KIND), entities)
}

/// Make names unique within `entities` and against every name `scope`
/// already holds. Kept names are registered in `scope`.
///
/// The batch pass uses a fresh scope, the final pass the run-wide one, so
/// both share the same strategy chain.
pub fn deduplicate_against<E: CatalogEntity>(
    scope: &mut NameDeduplicator,
    entities: &mut [E],
) -> Vec<Rename> {
    let mut renames = Vec::new();

    for entity in entities.iter_mut() {
        let Some(original) = entity.name().map(str::to_string) else {
            continue;
        };
        let resolved = scope.resolve(&original, entity.name_hints());
        if resolved != original {
            info!(
                kind = %E::KIND,
                id = entity.id(),
                from = %original,
                to = %resolved,
                "renamed duplicate"
            );
            renames.push(Rename {
                kind: E::KIND,
                id: entity.id().to_string(),
                from: original,
                to: resolved.clone(),
            });
            entity.set_name(resolved);
        }
    }

    renames
}
