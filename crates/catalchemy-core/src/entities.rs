use std::fmt;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::DATE_FORMAT;
use crate::error::{Error, Result};
use crate::kind::EntityKind;

/// Attributes of an entity that name deduplication can draw on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameHints<'a> {
    pub category: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub color: Option<&'a str>,
    pub season: Option<&'a str>,
}

/// Behaviour shared by every catalog entity.
pub trait CatalogEntity: Clone + fmt::Debug {
    const KIND: EntityKind;
    /// Column names of the flat row, in export order.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    /// Foreign references held by this entity.
    fn references(&self) -> Vec<(EntityKind, &str)> {
        Vec::new()
    }

    /// Human readable name, for kinds that carry one.
    fn name(&self) -> Option<&str> {
        None
    }

    fn set_name(&mut self, _name: String) {}

    fn name_hints(&self) -> NameHints<'_> {
        NameHints::default()
    }

    /// Required-field, type and range checks beyond the JSON shape.
    fn validate(&self) -> Result<()>;

    /// Flat row aligned with [`CatalogEntity::COLUMNS`].
    fn to_row(&self) -> Vec<String>;
}

/// Brand profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Brand {
    /// Unique brand identifier.
    pub id: String,
    /// Brand name.
    #[schemars(length(min = 1))]
    pub name: String,
    /// Two or three sentence brand description.
    pub description: String,
    /// Brand founding story.
    pub story: String,
    /// Core brand values.
    pub values: Vec<String>,
    /// Target customer description.
    pub target_audience: String,
}

/// Seasonal or thematic collection owned by a brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Collection {
    /// Unique collection identifier.
    pub id: String,
    #[schemars(length(min = 1))]
    pub name: String,
    pub description: String,
    /// Season (Spring, Summer, Fall, Winter, All-Season).
    pub season: String,
    /// Category (Everyday, Work, Active, Outdoor).
    pub category: String,
    /// Owning brand.
    pub brand_id: String,
    /// Launch date (YYYY-MM-DD).
    pub launch_date: String,
    /// Collection theme or inspiration.
    pub theme: String,
}

/// Sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    /// Unique product identifier (SKU).
    pub id: String,
    #[schemars(length(min = 1))]
    pub name: String,
    pub description: String,
    pub category: String,
    pub subcategory: String,
    /// Target gender (women, men, unisex).
    pub gender: String,
    pub collection_id: String,
    pub brand_id: String,
    /// Price in USD.
    pub price: f64,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub materials: Vec<String>,
    /// Fit description (relaxed, tailored, ...).
    pub fit: String,
    pub sustainability_features: Vec<String>,
    pub care_instructions: String,
    pub features: Vec<String>,
}

/// Customer review of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Review {
    /// Unique review identifier.
    pub id: String,
    /// Reviewed product.
    pub product_id: String,
    /// Customer name (anonymized).
    pub customer_name: String,
    /// Rating from 1 to 5 stars.
    #[schemars(range(min = 1, max = 5))]
    pub rating: u8,
    pub title: String,
    pub content: String,
    pub verified_purchase: bool,
    pub helpful_votes: u32,
    /// Review date (YYYY-MM-DD).
    pub review_date: String,
    #[serde(default)]
    pub size_worn: Option<String>,
    #[serde(default)]
    pub color_purchased: Option<String>,
}

impl CatalogEntity for Brand {
    const KIND: EntityKind = EntityKind::Brand;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "story",
        "values",
        "target_audience",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn validate(&self) -> Result<()> {
        let check = FieldCheck::new(Self::KIND, &self.id);
        check.text("id", &self.id)?;
        check.text("name", &self.name)?;
        check.text("description", &self.description)?;
        check.text("story", &self.story)?;
        check.text("target_audience", &self.target_audience)?;
        Ok(())
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.description.clone(),
            self.story.clone(),
            self.values.join("|"),
            self.target_audience.clone(),
        ]
    }
}

impl CatalogEntity for Collection {
    const KIND: EntityKind = EntityKind::Collection;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "season",
        "category",
        "brand_id",
        "launch_date",
        "theme",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn references(&self) -> Vec<(EntityKind, &str)> {
        vec![(EntityKind::Brand, self.brand_id.as_str())]
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn name_hints(&self) -> NameHints<'_> {
        NameHints {
            category: Some(&self.category),
            season: Some(&self.season),
            ..NameHints::default()
        }
    }

    fn validate(&self) -> Result<()> {
        let check = FieldCheck::new(Self::KIND, &self.id);
        check.text("id", &self.id)?;
        check.text("name", &self.name)?;
        check.text("description", &self.description)?;
        check.text("season", &self.season)?;
        check.text("category", &self.category)?;
        check.text("brand_id", &self.brand_id)?;
        check.date("launch_date", &self.launch_date)?;
        check.text("theme", &self.theme)?;
        Ok(())
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.description.clone(),
            self.season.clone(),
            self.category.clone(),
            self.brand_id.clone(),
            self.launch_date.clone(),
            self.theme.clone(),
        ]
    }
}

impl CatalogEntity for Product {
    const KIND: EntityKind = EntityKind::Product;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "category",
        "subcategory",
        "gender",
        "collection_id",
        "brand_id",
        "price",
        "colors",
        "sizes",
        "materials",
        "fit",
        "sustainability_features",
        "care_instructions",
        "features",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn references(&self) -> Vec<(EntityKind, &str)> {
        vec![
            (EntityKind::Collection, self.collection_id.as_str()),
            (EntityKind::Brand, self.brand_id.as_str()),
        ]
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn name_hints(&self) -> NameHints<'_> {
        NameHints {
            category: Some(&self.category),
            gender: Some(&self.gender),
            color: self.colors.first().map(String::as_str),
            season: None,
        }
    }

    fn validate(&self) -> Result<()> {
        let check = FieldCheck::new(Self::KIND, &self.id);
        check.text("id", &self.id)?;
        check.text("name", &self.name)?;
        check.text("description", &self.description)?;
        check.text("category", &self.category)?;
        check.text("subcategory", &self.subcategory)?;
        check.text("gender", &self.gender)?;
        check.text("collection_id", &self.collection_id)?;
        check.text("brand_id", &self.brand_id)?;
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(Error::invalid(
                Self::KIND,
                &self.id,
                format!("price must be positive, got {}", self.price),
            ));
        }
        Ok(())
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.description.clone(),
            self.category.clone(),
            self.subcategory.clone(),
            self.gender.clone(),
            self.collection_id.clone(),
            self.brand_id.clone(),
            format!("{:.2}", self.price),
            join_or(&self.colors, "N/A"),
            join_or(&self.sizes, "One Size"),
            join_or(&self.materials, "N/A"),
            text_or(&self.fit, "Standard"),
            join_or(&self.sustainability_features, "N/A"),
            text_or(&self.care_instructions, "N/A"),
            join_or(&self.features, "N/A"),
        ]
    }
}

impl CatalogEntity for Review {
    const KIND: EntityKind = EntityKind::Review;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "product_id",
        "customer_name",
        "rating",
        "title",
        "content",
        "verified_purchase",
        "helpful_votes",
        "review_date",
        "size_worn",
        "color_purchased",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn references(&self) -> Vec<(EntityKind, &str)> {
        vec![(EntityKind::Product, self.product_id.as_str())]
    }

    fn validate(&self) -> Result<()> {
        let check = FieldCheck::new(Self::KIND, &self.id);
        check.text("id", &self.id)?;
        check.text("product_id", &self.product_id)?;
        check.text("customer_name", &self.customer_name)?;
        if !(1..=5).contains(&self.rating) {
            return Err(Error::invalid(
                Self::KIND,
                &self.id,
                format!("rating must be within 1..=5, got {}", self.rating),
            ));
        }
        check.text("title", &self.title)?;
        check.text("content", &self.content)?;
        check.date("review_date", &self.review_date)?;
        Ok(())
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.product_id.clone(),
            self.customer_name.clone(),
            self.rating.to_string(),
            self.title.clone(),
            self.content.clone(),
            self.verified_purchase.to_string(),
            self.helpful_votes.to_string(),
            self.review_date.clone(),
            optional_or(self.size_worn.as_deref(), "N/A"),
            optional_or(self.color_purchased.as_deref(), "N/A"),
        ]
    }
}

struct FieldCheck<'a> {
    kind: EntityKind,
    id: &'a str,
}

impl<'a> FieldCheck<'a> {
    fn new(kind: EntityKind, id: &'a str) -> Self {
        Self { kind, id }
    }

    fn text(&self, field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(Error::invalid(
                self.kind,
                self.id,
                format!("{field} must not be blank"),
            ));
        }
        Ok(())
    }

    fn date(&self, field: &str, value: &str) -> Result<()> {
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
            .map(|_| ())
            .map_err(|err| {
                Error::invalid(
                    self.kind,
                    self.id,
                    format!("{field} '{value}' is not a YYYY-MM-DD date: {err}"),
                )
            })
    }
}

fn join_or(values: &[String], fallback: &str) -> String {
    let joined = values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join("|");
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

fn text_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn optional_or(value: Option<&str>, fallback: &str) -> String {
    value
        .map(|value| text_or(value, fallback))
        .unwrap_or_else(|| fallback.to_string())
}
