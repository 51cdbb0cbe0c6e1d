use crate::product::{timestamp, Product};
use serde::{Deserialize, Serialize};

/// A breadcrumb entry with its 1-based depth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryView {
    pub name: String,
    pub level: i64,
}

/// A rank entry with its 1-based position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankView {
    pub rank_info: String,
    pub level: i64,
}

/// Response shape returned by `GetProduct`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    pub asin: String,
    pub name: String,
    pub categories: Vec<CategoryView>,
    pub ranks: Vec<RankView>,
    pub dimensions: Vec<String>,
    pub created_at: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            asin: product.code.clone(),
            name: product.name.clone(),
            categories: product
                .categories
                .iter()
                .zip(1..)
                .map(|(name, level)| CategoryView {
                    name: name.clone(),
                    level,
                })
                .collect(),
            ranks: product
                .ranks
                .iter()
                .zip(1..)
                .map(|(rank, level)| RankView {
                    rank_info: rank.clone(),
                    level,
                })
                .collect(),
            dimensions: product.dimensions.clone(),
            created_at: product.created_at.as_ref().map(timestamp::format),
        }
    }
}
