use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::catalog::Catalog;
use crate::entities::CatalogEntity;
use crate::kind::EntityKind;

/// Structured catalog issue with a stable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogIssue {
    pub code: String,
    pub kind: EntityKind,
    pub id: Option<String>,
    pub message: String,
}

impl CatalogIssue {
    fn new(
        code: &str,
        kind: EntityKind,
        id: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.to_string(),
            kind,
            id: id.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Aggregated catalog validation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogReport {
    pub errors: Vec<CatalogIssue>,
    pub warnings: Vec<CatalogIssue>,
}

impl CatalogReport {
    /// Returns true when there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Comparison key for names: trimmed and case-insensitive.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Validate internal consistency of a generated catalog.
///
/// This checks:
/// - per-entity field rules
/// - duplicate ids and names within each kind
/// - foreign references resolve to ids of the referenced kind
///
/// Names shared across kinds are reported as warnings only.
pub fn validate_catalog(catalog: &Catalog) -> CatalogReport {
    let mut report = CatalogReport::default();

    let mut known: BTreeMap<EntityKind, BTreeSet<&str>> = BTreeMap::new();
    for kind in EntityKind::ALL {
        known.insert(kind, catalog.ids_of(kind).into_iter().collect());
    }

    let mut names: BTreeMap<String, BTreeSet<EntityKind>> = BTreeMap::new();
    check_entities(&catalog.brands, &known, &mut names, &mut report);
    check_entities(&catalog.collections, &known, &mut names, &mut report);
    check_entities(&catalog.products, &known, &mut names, &mut report);
    check_entities(&catalog.reviews, &known, &mut names, &mut report);

    for (name, kinds) in names {
        let Some(first) = kinds.first().copied() else {
            continue;
        };
        if kinds.len() > 1 {
            let labels: Vec<String> = kinds.iter().map(ToString::to_string).collect();
            report.warnings.push(CatalogIssue::new(
                "cross_type_name_collision",
                first,
                None,
                format!("name '{name}' is shared by {}", labels.join(", ")),
            ));
        }
    }

    report
}

fn check_entities<E: CatalogEntity>(
    entities: &[E],
    known: &BTreeMap<EntityKind, BTreeSet<&str>>,
    names: &mut BTreeMap<String, BTreeSet<EntityKind>>,
    report: &mut CatalogReport,
) {
    let kind = E::KIND;
    let mut seen_ids = BTreeSet::new();
    let mut seen_names = BTreeSet::new();
    let prefix = format!("{}_", kind.id_prefix());

    for entity in entities {
        let id = entity.id();

        if let Err(err) = entity.validate() {
            report.errors.push(CatalogIssue::new(
                "invalid_entity",
                kind,
                Some(id),
                err.to_string(),
            ));
        }

        if !seen_ids.insert(id) {
            report.errors.push(CatalogIssue::new(
                "duplicate_id",
                kind,
                Some(id),
                format!("duplicate {kind} id: {id}"),
            ));
        }

        if !id.starts_with(&prefix) {
            report.warnings.push(CatalogIssue::new(
                "id_prefix_mismatch",
                kind,
                Some(id),
                format!("{kind} id '{id}' does not start with '{prefix}'"),
            ));
        }

        if let Some(name) = entity.name() {
            let key = normalize_name(name);
            if !seen_names.insert(key.clone()) {
                report.errors.push(CatalogIssue::new(
                    "duplicate_name",
                    kind,
                    Some(id),
                    format!("duplicate {kind} name: {}", name.trim()),
                ));
            }
            names.entry(key).or_default().insert(kind);
        }

        for (target, reference) in entity.references() {
            let resolves = known
                .get(&target)
                .is_some_and(|ids| ids.contains(reference));
            if !resolves {
                report.errors.push(CatalogIssue::new(
                    "dangling_reference",
                    kind,
                    Some(id),
                    format!("{target} reference '{reference}' does not resolve"),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Brand, Collection};

    fn brand(id: &str, name: &str) -> Brand {
        Brand {
            id: id.to_string(),
            name: name.to_string(),
            description: "Outdoor basics.".to_string(),
            story: "Founded on a ferry.".to_string(),
            values: vec!["Sustainability".to_string()],
            target_audience: "Commuters".to_string(),
        }
    }

    fn collection(id: &str, name: &str, brand_id: &str) -> Collection {
        Collection {
            id: id.to_string(),
            name: name.to_string(),
            description: "Layers for rain.".to_string(),
            season: "Fall".to_string(),
            category: "Outdoor".to_string(),
            brand_id: brand_id.to_string(),
            launch_date: "2024-09-01".to_string(),
            theme: "Harbor fog".to_string(),
        }
    }

    #[test]
    fn accepts_consistent_catalog() {
        let catalog = Catalog {
            brands: vec![brand("brand_a", "Tidewater"), brand("brand_b", "Cedar Row")],
            collections: vec![collection("collection_a", "Fogline", "brand_a")],
            ..Catalog::default()
        };
        let report = validate_catalog(&catalog);
        assert!(report.is_ok(), "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn reports_duplicates_and_dangling_references() {
        let catalog = Catalog {
            brands: vec![brand("brand_a", "Tidewater"), brand("brand_a", " tidewater ")],
            collections: vec![collection("collection_a", "Fogline", "brand_missing")],
            ..Catalog::default()
        };
        let report = validate_catalog(&catalog);
        let codes: Vec<&str> = report.errors.iter().map(|e| e.code.as_str()).collect();
        assert!(codes.contains(&"duplicate_id"));
        assert!(codes.contains(&"duplicate_name"));
        assert!(codes.contains(&"dangling_reference"));
    }

    #[test]
    fn cross_type_name_collision_is_only_a_warning() {
        let catalog = Catalog {
            brands: vec![brand("brand_a", "Fogline")],
            collections: vec![collection("collection_a", "FOGLINE", "brand_a")],
            ..Catalog::default()
        };
        let report = validate_catalog(&catalog);
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, "cross_type_name_collision");
    }
}
