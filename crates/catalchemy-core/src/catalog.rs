use serde::{Deserialize, Serialize};

use crate::entities::{Brand, CatalogEntity, Collection, Product, Review};
use crate::kind::EntityKind;

/// In-memory result of a full generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub brands: Vec<Brand>,
    pub collections: Vec<Collection>,
    pub products: Vec<Product>,
    pub reviews: Vec<Review>,
}

impl Catalog {
    /// Identifiers of a given kind, in generation order.
    pub fn ids_of(&self, kind: EntityKind) -> Vec<&str> {
        match kind {
            EntityKind::Brand => self.brands.iter().map(CatalogEntity::id).collect(),
            EntityKind::Collection => self.collections.iter().map(CatalogEntity::id).collect(),
            EntityKind::Product => self.products.iter().map(CatalogEntity::id).collect(),
            EntityKind::Review => self.reviews.iter().map(CatalogEntity::id).collect(),
        }
    }

    /// Flat rows of a given kind, ready for tabular export.
    pub fn table_rows(&self, kind: EntityKind) -> TableRows {
        match kind {
            EntityKind::Brand => TableRows::from_entities(&self.brands),
            EntityKind::Collection => TableRows::from_entities(&self.collections),
            EntityKind::Product => TableRows::from_entities(&self.products),
            EntityKind::Review => TableRows::from_entities(&self.reviews),
        }
    }
}

/// Ordered flat rows for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRows {
    pub kind: EntityKind,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

impl TableRows {
    pub fn from_entities<E: CatalogEntity>(entities: &[E]) -> Self {
        Self {
            kind: E::KIND,
            columns: E::COLUMNS,
            rows: entities.iter().map(CatalogEntity::to_row).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
