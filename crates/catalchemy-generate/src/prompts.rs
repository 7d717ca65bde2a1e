//! Prompt templates and the fixed catalog vocabularies they draw on.

use std::collections::BTreeMap;

use catalchemy_core::{EntityKind, Product};

use crate::capability::Prompt;

/// Share of each gender in a product batch. Rounding remainder goes to women.
pub const GENDER_DISTRIBUTION: &[(&str, f64)] = &[("women", 0.45), ("men", 0.45), ("unisex", 0.10)];

/// Product categories and their subcategories.
pub const PRODUCT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Everyday Apparel",
        &[
            "Relaxed Denim",
            "Stretch Chinos",
            "Essential Tees",
            "Knit Polos",
            "Tunic Shirts",
            "Wrap Dresses",
        ],
    ),
    (
        "Work & Evening Wear",
        &[
            "Tailored Blazers",
            "Smart Joggers",
            "Polished Midi Dresses",
            "Stretch Dress Pants",
            "Button-Down Shirts",
        ],
    ),
    (
        "Everyday Outerwear",
        &[
            "City Trenches",
            "Commuter Rain Jackets",
            "Quilted Bombers",
            "Lightweight Jackets",
            "Cardigans",
        ],
    ),
    (
        "Active & Outdoor Layers",
        &[
            "Packable Anoraks",
            "Trail Leggings",
            "Merino Base Layers",
            "Brushed-Back Leggings",
            "Performance Tees",
        ],
    ),
    (
        "Accessories",
        &[
            "Beanies",
            "Crossbody Bags",
            "Scarves",
            "Sunglasses",
            "Belts",
            "Hats",
        ],
    ),
    (
        "Footwear",
        &[
            "Slip-On Sneakers",
            "Low Hikers",
            "Dressy Booties",
            "City Hikers",
            "Casual Loafers",
        ],
    ),
];

pub const BRAND_COLORS: &[&str] = &[
    "Evergreen",
    "Ocean Blue",
    "Urban Mist",
    "Rust Peak",
    "Charcoal",
    "Cream",
    "Navy",
    "Olive",
    "Burgundy",
    "Sage",
];

/// Product price range in USD (budget floor to luxury ceiling).
pub const PRICE_RANGE: (u32, u32) = (25, 500);

const JSON_ARRAY_ONLY: &str = "IMPORTANT: Return ONLY a valid JSON array. Do not include any explanatory text, markdown formatting, or code blocks.";

/// Split `count` products across genders.
pub fn gender_split(count: usize) -> BTreeMap<&'static str, usize> {
    let mut split: BTreeMap<&'static str, usize> = GENDER_DISTRIBUTION
        .iter()
        .map(|(gender, ratio)| (*gender, (count as f64 * ratio).floor() as usize))
        .collect();
    let assigned: usize = split.values().sum();
    if assigned < count {
        *split.entry("women").or_insert(0) += count - assigned;
    }
    split
}

pub fn brand_prompt(context: &str, ids: &[String], temperature: f32) -> Prompt {
    let system = format!(
        "You are a brand strategist creating partner brand profiles for an apparel catalog.\n\n\
         {context}\n\n\
         Generate brand profiles that complement this brand identity and its values."
    );
    let user = format!(
        "Create {count} COMPLETELY DIFFERENT brand profile(s), one per id in order: {ids}.\n\n\
         Each brand uses this structure:\n\
         {{\n  \"id\": \"<id>\",\n  \"name\": \"Unique brand name\",\n  \
         \"description\": \"2-3 sentence brand description\",\n  \
         \"story\": \"Brand founding story (2-3 sentences)\",\n  \
         \"values\": [\"value1\", \"value2\", \"value3\"],\n  \
         \"target_audience\": \"Target customer description\"\n}}\n\n\
         Each brand needs its own distinct name and story.\n{JSON_ARRAY_ONLY}",
        count = ids.len(),
        ids = ids.join(", "),
    );
    entity_prompt(EntityKind::Brand, system, user, ids, temperature)
}

pub fn collection_prompt(
    context: &str,
    ids: &[String],
    brand_id: &str,
    temperature: f32,
) -> Prompt {
    let system = format!(
        "You are a fashion collection designer for an apparel brand.\n\n\
         {context}\n\n\
         Create collections that embody sustainability, inclusivity and everyday versatility."
    );
    let user = format!(
        "Create {count} collection profile(s), one per id in order: {ids}.\n\n\
         Each collection uses this structure:\n\
         {{\n  \"id\": \"<id>\",\n  \"name\": \"Collection name\",\n  \
         \"description\": \"Collection description (2-3 sentences)\",\n  \
         \"season\": \"Spring|Summer|Fall|Winter|All-Season\",\n  \
         \"category\": \"Everyday|Work|Active|Outdoor\",\n  \
         \"brand_id\": \"{brand_id}\",\n  \"launch_date\": \"YYYY-MM-DD\",\n  \
         \"theme\": \"Collection theme or inspiration\"\n}}\n\n{JSON_ARRAY_ONLY}",
        count = ids.len(),
        ids = ids.join(", "),
    );
    entity_prompt(EntityKind::Collection, system, user, ids, temperature)
}

pub fn product_prompt(
    context: &str,
    ids: &[String],
    collection_id: &str,
    brand_id: &str,
    categories: &[&str],
    temperature: f32,
) -> Prompt {
    let system = format!(
        "You are a product designer for an apparel brand.\n\n\
         {context}\n\n\
         Create versatile, comfortable products that reflect sustainability, body positivity and timeless style."
    );
    let genders = gender_split(ids.len())
        .into_iter()
        .map(|(gender, count)| format!("{gender}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    let user = format!(
        "Generate {count} products.\n\n\
         Gender distribution: {genders}\n\
         Categories (one per product, in order): {categories}\n\
         Product IDs to use, in order: {ids}\n\n\
         Each product uses this structure:\n\
         {{\n  \"id\": \"<next id>\",\n  \"name\": \"Product name\",\n  \
         \"description\": \"Detailed product description\",\n  \
         \"category\": \"Product category\",\n  \"subcategory\": \"Product subcategory\",\n  \
         \"gender\": \"women|men|unisex\",\n  \"collection_id\": \"{collection_id}\",\n  \
         \"brand_id\": \"{brand_id}\",\n  \"price\": 0.0,\n  \
         \"colors\": [\"color1\", \"color2\"],\n  \"sizes\": [\"size1\", \"size2\"],\n  \
         \"materials\": [\"material1\", \"material2\"],\n  \"fit\": \"fit description\",\n  \
         \"sustainability_features\": [\"feature1\", \"feature2\"],\n  \
         \"care_instructions\": \"Care instructions\",\n  \
         \"features\": [\"feature1\", \"feature2\", \"feature3\"]\n}}\n\n\
         Guidelines:\n\
         - Use brand colors: {colors}\n\
         - Price range: ${min_price}-${max_price}\n\
         - Include sustainability features and inclusive sizing\n\
         - Use the provided product IDs in the exact order they appear\n\n{JSON_ARRAY_ONLY}",
        count = ids.len(),
        categories = categories.join(", "),
        ids = ids.join(", "),
        colors = BRAND_COLORS.join(", "),
        min_price = PRICE_RANGE.0,
        max_price = PRICE_RANGE.1,
    );
    entity_prompt(EntityKind::Product, system, user, ids, temperature)
}

pub fn review_prompt(context: &str, ids: &[String], product: &Product, temperature: f32) -> Prompt {
    let system = format!(
        "You are a customer review generator for an apparel brand.\n\n\
         {context}\n\n\
         Generate authentic, diverse reviews that vary in tone and rating and mention specific product features."
    );
    let user = format!(
        "Generate {count} customer reviews for the product:\n\n\
         Product: {name}\nCategory: {category}\nPrice: ${price:.2}\n\
         Review IDs to use, in order: {ids}\n\n\
         Each review uses this structure:\n\
         {{\n  \"id\": \"<next id>\",\n  \"product_id\": \"{product_id}\",\n  \
         \"customer_name\": \"Customer name\",\n  \"rating\": 5,\n  \
         \"title\": \"Review title\",\n  \"content\": \"Review content (2-3 sentences)\",\n  \
         \"verified_purchase\": true,\n  \"helpful_votes\": 0,\n  \
         \"review_date\": \"YYYY-MM-DD\",\n  \"size_worn\": \"size or null\",\n  \
         \"color_purchased\": \"color or null\"\n}}\n\n\
         Guidelines:\n\
         - Mostly 4-5 stars, some 3, few 1-2\n\
         - Mention fit, comfort and versatility\n\
         - Use realistic customer names\n\n{JSON_ARRAY_ONLY}",
        count = ids.len(),
        name = product.name,
        category = product.category,
        price = product.price,
        ids = ids.join(", "),
        product_id = product.id,
    );
    entity_prompt(EntityKind::Review, system, user, ids, temperature)
}

/// Prompt asking the capability to condense a long brand guide.
pub fn summary_prompt(content: &str, max_tokens: usize) -> Prompt {
    let system = format!(
        "You are a brand strategist summarizing a brand guide.\n\n\
         Capture the core identity and values, target audience, product focus, \
         personality and tone, and key differentiators.\n\
         The summary must be {max_tokens} tokens or less."
    );
    let user = format!("Summarize this brand guide to {max_tokens} tokens or less:\n\n{content}");
    Prompt {
        kind: None,
        system,
        user,
        temperature: 0.0,
        ids: Vec::new(),
    }
}

fn entity_prompt(
    kind: EntityKind,
    system: String,
    user: String,
    ids: &[String],
    temperature: f32,
) -> Prompt {
    Prompt {
        kind: Some(kind),
        system,
        user,
        temperature,
        ids: ids.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_split_assigns_remainder_to_women() {
        let split = gender_split(7);
        assert_eq!(split["men"], 3);
        assert_eq!(split["unisex"], 0);
        assert_eq!(split["women"], 4);
        assert_eq!(split.values().sum::<usize>(), 7);

        let split = gender_split(50);
        assert_eq!(split["women"], 23);
        assert_eq!(split["men"], 22);
        assert_eq!(split["unisex"], 5);
    }

    #[test]
    fn prompts_list_ids_in_order() {
        let ids = vec!["collection_a".to_string(), "collection_b".to_string()];
        let prompt = collection_prompt("Guide", &ids, "brand_x", 0.7);
        assert_eq!(prompt.kind, Some(EntityKind::Collection));
        assert_eq!(prompt.ids, ids);
        assert!(prompt.user.contains("collection_a, collection_b"));
        assert!(prompt.user.contains("\"brand_id\": \"brand_x\""));
        assert!(prompt.system.contains("Guide"));
    }
}
