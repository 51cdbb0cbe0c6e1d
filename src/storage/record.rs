//! Flat durable representation of a product

use crate::product::{timestamp, Product};
use crate::storage::{StorageError, StorageResult};

/// Separator for multi-valued columns
pub const LIST_SEPARATOR: char = ';';

/// One durable row; multi-valued fields are `;`-joined
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRecord {
    pub asin: String,
    pub name: String,
    pub categories: String,
    pub ranks: String,
    pub dimensions: String,
    /// RFC 3339 with nanoseconds, empty when never stamped
    pub created_at: String,
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        Self {
            asin: product.code.clone(),
            name: product.name.clone(),
            categories: join_list(&product.categories),
            ranks: join_list(&product.ranks),
            dimensions: join_list(&product.dimensions),
            created_at: product
                .created_at
                .as_ref()
                .map(timestamp::format)
                .unwrap_or_default(),
        }
    }
}

impl ProductRecord {
    /// Rebuilds the product, re-splitting the joined columns
    pub fn into_product(self) -> StorageResult<Product> {
        let created_at =
            timestamp::parse(&self.created_at).map_err(|source| StorageError::InvalidTimestamp {
                value: self.created_at.clone(),
                source,
            })?;

        Ok(Product {
            code: self.asin,
            name: self.name,
            categories: split_list(&self.categories),
            ranks: split_list(&self.ranks),
            dimensions: split_list(&self.dimensions),
            created_at,
        })
    }
}

fn join_list(values: &[String]) -> String {
    values.join(&LIST_SEPARATOR.to_string())
}

/// An absent column yields an empty list, never a single empty entry
fn split_list(joined: &str) -> Vec<String> {
    joined
        .split(LIST_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_flatten_joins_lists() {
        let mut product = Product::new("B07FSH5L52");
        product.name = "Wrap Dress".to_string();
        product.categories = vec!["Clothing".to_string(), "Dresses".to_string()];
        product.dimensions = vec!["10 x 8 x 1 inches".to_string(), "8 ounces".to_string()];

        let record = ProductRecord::from(&product);
        assert_eq!(record.asin, "B07FSH5L52");
        assert_eq!(record.categories, "Clothing;Dresses");
        assert_eq!(record.ranks, "");
        assert_eq!(record.dimensions, "10 x 8 x 1 inches;8 ounces");
        assert_eq!(record.created_at, "");
    }

    #[test]
    fn test_absent_lists_read_back_empty() {
        let record = ProductRecord {
            asin: "B000".to_string(),
            name: "Lamp".to_string(),
            categories: "Home".to_string(),
            ..ProductRecord::default()
        };

        let product = record.into_product().unwrap();
        assert_eq!(product.categories, vec!["Home"]);
        assert!(product.ranks.is_empty());
        assert!(product.dimensions.is_empty());
        assert_eq!(product.created_at, None);
    }

    #[test]
    fn test_created_at_survives() {
        let mut product = Product::new("B000");
        product.name = "Lamp".to_string();
        product.mark_created(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());

        let record = ProductRecord::from(&product);
        assert_eq!(record.created_at, "2024-03-01T12:30:00.000000000Z");
        assert_eq!(record.into_product().unwrap().created_at, product.created_at);
    }

    #[test]
    fn test_bad_timestamp_is_an_error() {
        let record = ProductRecord {
            asin: "B000".to_string(),
            created_at: "yesterday".to_string(),
            ..ProductRecord::default()
        };
        assert!(matches!(
            record.into_product().unwrap_err(),
            StorageError::InvalidTimestamp { .. }
        ));
    }
}
