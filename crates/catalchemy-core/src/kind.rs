use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The four entity types of a catalog, in generation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Brand,
    Collection,
    Product,
    Review,
}

impl EntityKind {
    /// All kinds in pipeline order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Brand,
        EntityKind::Collection,
        EntityKind::Product,
        EntityKind::Review,
    ];

    /// Prefix carried by every identifier of this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            EntityKind::Brand => "brand",
            EntityKind::Collection => "collection",
            EntityKind::Product => "product",
            EntityKind::Review => "review",
        }
    }

    /// Human readable label, also used in fallback names.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Brand => "Brand",
            EntityKind::Collection => "Collection",
            EntityKind::Product => "Product",
            EntityKind::Review => "Review",
        }
    }

    /// Name of the exported table (and CSV file stem).
    pub fn table_name(self) -> &'static str {
        match self {
            EntityKind::Brand => "brands",
            EntityKind::Collection => "collections",
            EntityKind::Product => "products",
            EntityKind::Review => "reviews",
        }
    }

    /// Whether entities of this kind carry a name that must be unique.
    pub fn has_unique_names(self) -> bool {
        !matches!(self, EntityKind::Review)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id_prefix())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "brand" | "brands" => Ok(EntityKind::Brand),
            "collection" | "collections" => Ok(EntityKind::Collection),
            "product" | "products" => Ok(EntityKind::Product),
            "review" | "reviews" => Ok(EntityKind::Review),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_singular_and_plural_names() {
        assert_eq!("Brand".parse::<EntityKind>().unwrap(), EntityKind::Brand);
        assert_eq!(
            " reviews ".parse::<EntityKind>().unwrap(),
            EntityKind::Review
        );
        assert!("sku".parse::<EntityKind>().is_err());
    }

    #[test]
    fn prefixes_are_distinct() {
        let mut prefixes: Vec<_> = EntityKind::ALL.iter().map(|k| k.id_prefix()).collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), EntityKind::ALL.len());
    }
}
