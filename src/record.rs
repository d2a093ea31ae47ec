// Product data model and the record view used by filtering

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::dates::DateDeriver;

/// Natural key of a product
pub type ProductId = u64;

/// Brand shown when the upstream record has none
pub const DEFAULT_BRAND: &str = "Generic";

/// Fields the filter engine reads from a listing
pub trait Record {
    /// Unique, stable identifier
    fn id(&self) -> ProductId;

    fn title(&self) -> &str;

    fn description(&self) -> &str;

    /// Category slug
    fn category(&self) -> &str;

    /// Calendar day the record was added, if known
    fn date_added(&self) -> Option<NaiveDate> {
        None
    }
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub stock: u64,
    #[serde(default = "default_brand", deserialize_with = "brand_or_default")]
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Derived at ingestion, never read from upstream
    #[serde(default, skip_deserializing)]
    pub date_added: Option<NaiveDate>,
}

fn default_brand() -> String {
    DEFAULT_BRAND.to_string()
}

fn brand_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let brand: Option<String> = Option::deserialize(deserializer)?;
    Ok(brand.filter(|b| !b.trim().is_empty()).unwrap_or_else(default_brand))
}

impl Product {
    /// Stamp the derived "date added" onto a freshly decoded product
    pub fn with_derived_date(mut self, deriver: &DateDeriver) -> Self {
        self.date_added = Some(deriver.derive(self.id));
        self
    }

    /// Price before the advertised discount was applied
    pub fn original_price(&self) -> f64 {
        if self.discount_percentage <= 0.0 || self.discount_percentage >= 100.0 {
            return self.price;
        }
        self.price / (1.0 - self.discount_percentage / 100.0)
    }
}

impl Record for Product {
    fn id(&self) -> ProductId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn date_added(&self) -> Option<NaiveDate> {
        self.date_added
    }
}

/// One page of the upstream product listing
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    #[serde(alias = "items")]
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

/// Upstream category entry: either a bare slug or an object carrying one
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryEntry {
    Slug(String),
    Object { slug: String },
}

impl CategoryEntry {
    pub fn slug(&self) -> &str {
        match self {
            CategoryEntry::Slug(s) => s,
            CategoryEntry::Object { slug } => slug,
        }
    }
}

/// Flatten category entries into unique slugs, keeping first-seen order
pub fn normalize_categories(entries: &[CategoryEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(CategoryEntry::slug)
        .filter(|slug| !slug.is_empty())
        .filter(|slug| seen.insert(slug.to_string()))
        .map(str::to_string)
        .collect()
}

/// Human-readable label for a category slug ("home-decoration" -> "home decoration")
pub fn category_label(slug: &str) -> String {
    slug.replace('-', " ")
}
