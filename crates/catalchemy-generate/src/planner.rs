use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// Products covered by one brand (and at most by one collection).
const PRODUCTS_PER_BRAND: u64 = 100;
/// Review density is tuned so small catalogs still get about this many reviews.
const REVIEW_TARGET: u64 = 10_000;

/// Entity quantities derived from a product target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPlan {
    pub brand_count: u64,
    pub collection_count: u64,
    pub product_count: u64,
    pub reviews_per_product: u64,
    pub total_reviews: u64,
}

/// Derive brand, collection and review quantities from `total_products`.
///
/// - brands: one per 100 products, at least two
/// - collections: at least two per brand, at most 100 products each
/// - reviews: 2 to 5 per product, fewer as the catalog grows
pub fn plan_catalog(total_products: u64) -> Result<CatalogPlan, GenerationError> {
    if total_products == 0 {
        return Err(GenerationError::InvalidPlan(
            "product count must be at least 1".to_string(),
        ));
    }

    let per_hundred = total_products.div_ceil(PRODUCTS_PER_BRAND);
    let brand_count = per_hundred.max(2);
    let min_collections = brand_count * 2;
    let collection_count = min_collections.max(per_hundred);
    let reviews_per_product = (REVIEW_TARGET / total_products).clamp(2, 5);

    Ok(CatalogPlan {
        brand_count,
        collection_count,
        product_count: total_products,
        reviews_per_product,
        total_reviews: total_products * reviews_per_product,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plans_small_catalog() {
        let plan = plan_catalog(100).unwrap();
        assert_eq!(plan.brand_count, 2);
        assert_eq!(plan.collection_count, 4);
        assert_eq!(plan.reviews_per_product, 5);
        assert_eq!(plan.total_reviews, 500);
    }

    #[test]
    fn plans_large_catalog() {
        let plan = plan_catalog(10_000).unwrap();
        assert_eq!(plan.brand_count, 100);
        assert_eq!(plan.collection_count, 200);
        assert_eq!(plan.reviews_per_product, 2);
        assert_eq!(plan.total_reviews, 20_000);
    }

    #[test]
    fn plans_single_product_and_rounds_up() {
        let plan = plan_catalog(1).unwrap();
        assert_eq!(plan.brand_count, 2);
        assert_eq!(plan.collection_count, 4);
        assert_eq!(plan.reviews_per_product, 5);

        let plan = plan_catalog(250).unwrap();
        assert_eq!(plan.brand_count, 3);
        assert_eq!(plan.collection_count, 6);
        assert_eq!(plan.reviews_per_product, 5);

        let plan = plan_catalog(4_000).unwrap();
        assert_eq!(plan.reviews_per_product, 2);
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(matches!(
            plan_catalog(0),
            Err(GenerationError::InvalidPlan(_))
        ));
    }
}
