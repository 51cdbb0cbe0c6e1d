//! Product data model
//!
//! A [`Product`] starts life with only its code set, is filled in field by
//! field by the extraction engine, and is stamped with a creation time when
//! it is first persisted. [`ProductView`] is the shape handed back to callers.

pub mod timestamp;
mod view;

pub use view::{CategoryView, ProductView, RankView};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The canonical product entity
///
/// The serialized form uses `asin` for the code so cache snapshots match the
/// durable record's column names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product code, the storage key for both tiers
    #[serde(rename = "asin")]
    pub code: String,

    /// Display name; empty means nothing was extracted
    #[serde(default)]
    pub name: String,

    /// Breadcrumb trail, top-level category first
    #[serde(default)]
    pub categories: Vec<String>,

    /// Free-form "rank in category" entries in extraction order
    #[serde(default)]
    pub ranks: Vec<String>,

    /// One entry per dimension component
    #[serde(default)]
    pub dimensions: Vec<String>,

    /// When the product was first successfully extracted and persisted
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Creates an empty product carrying only its code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    /// Returns true when extraction found no name
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Whether this product may be written to storage
    ///
    /// A name alone can be a false positive on a malformed page, so a
    /// breadcrumb trail is required as well.
    pub fn is_storable(&self) -> bool {
        !self.code.is_empty() && !self.name.is_empty() && !self.categories.is_empty()
    }

    /// Sets the creation time unless one is already present
    pub fn mark_created(&mut self, at: DateTime<Utc>) {
        if self.created_at.is_none() {
            self.created_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Product {
        Product {
            code: "B07FSH5L52".to_string(),
            name: "Longwu Women's Loose Casual Front Tie Short Sleeve Bandage Party Dress"
                .to_string(),
            categories: vec!["Clothing, Shoes & Jewelry".to_string(), "Dresses".to_string()],
            ranks: vec!["#2,680 in Clothing, Shoes & Jewelry".to_string()],
            dimensions: vec![],
            created_at: Some(Utc.with_ymd_and_hms(2019, 4, 22, 1, 4, 16).unwrap()),
        }
    }

    #[test]
    fn test_new_only_sets_code() {
        let product = Product::new("B000TEST");
        assert_eq!(product.code, "B000TEST");
        assert!(product.is_empty());
        assert!(product.categories.is_empty());
        assert!(product.created_at.is_none());
    }

    #[test]
    fn test_storable_requires_name_and_categories() {
        let mut product = sample();
        assert!(product.is_storable());

        product.categories.clear();
        assert!(!product.is_storable());

        let mut product = sample();
        product.name.clear();
        assert!(!product.is_storable());

        let mut product = sample();
        product.code.clear();
        assert!(!product.is_storable());
    }

    #[test]
    fn test_mark_created_is_write_once() {
        let mut product = Product::new("B000TEST");
        let first = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();

        product.mark_created(first);
        product.mark_created(second);

        assert_eq!(product.created_at, Some(first));
    }

    #[test]
    fn test_json_uses_asin_key() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["asin"], "B07FSH5L52");
        assert!(json.get("code").is_none());
    }

    #[test]
    fn test_json_snapshot_roundtrip() {
        let product = sample();
        let json = serde_json::to_string(&product).unwrap();
        let restored: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, product);
    }

    #[test]
    fn test_json_missing_optional_fields() {
        let restored: Product = serde_json::from_str(r#"{"asin":"B1","name":"N"}"#).unwrap();
        assert_eq!(restored.code, "B1");
        assert!(restored.ranks.is_empty());
        assert!(restored.dimensions.is_empty());
        assert!(restored.created_at.is_none());
    }
}
