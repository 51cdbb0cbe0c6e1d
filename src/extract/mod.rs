//! Field extraction engine
//!
//! This module turns a fetched product page into a [`Product`]:
//! - Entity normalization of every extracted string
//! - Layout strategies per field (see [`strategies`])
//! - A single document-order pass that applies every matching strategy and
//!   folds the results in according to each field's [`Policy`]
//!
//! No layout detection happens up front. A real page uses one layout, so
//! normally one strategy per field fires; when several fire, the policies
//! decide the outcome deterministically.

mod normalize;
pub mod strategies;
mod text;

pub use normalize::normalize;
pub use strategies::{Field, Policy, Strategy, Transform, BUILTIN_STRATEGIES};

use crate::product::Product;
use scraper::{ElementRef, Html, Selector};

/// A strategy whose locator has been compiled
struct CompiledStrategy {
    strategy: Strategy,
    selector: Selector,
}

/// Applies layout strategies to product pages
pub struct Extractor {
    strategies: Vec<CompiledStrategy>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("strategies", &self.strategies.len())
            .finish()
    }
}

impl Extractor {
    /// Creates an extractor with every built-in layout strategy
    pub fn new() -> Self {
        Self::with_strategies(BUILTIN_STRATEGIES)
    }

    /// Creates an extractor with a custom strategy list
    ///
    /// Strategies whose locator is not a valid CSS selector are skipped with
    /// a warning.
    pub fn with_strategies(strategies: &[Strategy]) -> Self {
        let strategies = strategies
            .iter()
            .filter_map(|strategy| match Selector::parse(strategy.locator) {
                Ok(selector) => Some(CompiledStrategy {
                    strategy: *strategy,
                    selector,
                }),
                Err(e) => {
                    tracing::warn!("Skipping strategy with invalid locator {}: {:?}", strategy.locator, e);
                    None
                }
            })
            .collect();

        Self { strategies }
    }

    /// Number of active strategies
    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    /// Extracts a product from raw page HTML
    ///
    /// The returned product always carries `code`. A page where nothing
    /// matches yields a product with every other field empty; that is a
    /// normal outcome, not an error.
    pub fn extract(&self, html: &str, code: &str) -> Product {
        let document = Html::parse_document(html);
        let mut product = Product::new(code);
        self.extract_into(&document, &mut product);
        product
    }

    /// Applies every strategy to a parsed document, updating `product`
    ///
    /// Elements are visited once, in document order. For each element every
    /// strategy whose locator matches it is applied in strategy-list order.
    pub fn extract_into(&self, document: &Html, product: &mut Product) {
        for node in document.root_element().descendants() {
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };

            for compiled in &self.strategies {
                if !compiled.selector.matches(&element) {
                    continue;
                }

                let strategy = &compiled.strategy;
                if let Some(value) = (strategy.transform)(element) {
                    tracing::trace!(
                        "Strategy {} matched for {:?}",
                        strategy.locator,
                        strategy.field
                    );
                    apply(product, strategy.field, &value);
                }
            }
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Folds one extracted value into the product using the field's policy
fn apply(product: &mut Product, field: Field, value: &str) {
    match field.policy() {
        Policy::Assign => {
            let value = normalize(value);
            if !value.is_empty() {
                product.name = value;
            }
        }
        Policy::Append => {
            let value = normalize(value);
            if value.is_empty() {
                return;
            }
            match field {
                Field::Categories => product.categories.push(value),
                Field::Ranks => product.ranks.push(value),
                Field::Name | Field::Dimensions => {}
            }
        }
        Policy::Replace => {
            let parts: Vec<String> = value
                .split(';')
                .map(|part| normalize(part.trim()))
                .filter(|part| !part.is_empty())
                .collect();
            if !parts.is_empty() {
                product.dimensions = parts;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_product(html: &str, code: &str) -> Product {
        Extractor::new().extract(html, code)
    }

    const TABLE_LAYOUT: &str = r#"
        <html><body>
        <div id="wayfinding-breadcrumbs_feature_div"><ul>
            <li><span class="a-list-item"><a class="a-link-normal" href="/c">Clothing, Shoes &amp;amp; Jewelry</a></span></li>
            <li><span class="a-list-item a-color-tertiary">&rsaquo;</span></li>
            <li><span class="a-list-item"><a class="a-link-normal" href="/d">Dresses</a></span></li>
        </ul></div>
        <div id="titleSection"><h1 id="title"><span id="productTitle">
            Longwu Women's Loose Casual Dress
        </span></h1></div>
        <div id="prodDetails"><div class="wrapper"><div class="col1"><div class="techD">
          <div class="content"><div class="attrG"><div class="pdTab"><table><tbody>
            <tr><td class="label">Product Dimensions</td><td class="value">10 x 8 x 1 inches ; 8 ounces</td></tr>
            <tr><td class="label">Item model number</td><td class="value">XY-1</td></tr>
          </tbody></table></div></div></div></div></div></div>
          <table><tbody>
            <tr id="SalesRank"><td class="label">Best Sellers Rank</td>
            <td class="value">#2,680 in Clothing, Shoes &amp; Jewelry (See Top 100)
              <ul class="zg_hrsr">
                <li class="zg_hrsr_item"><span class="zg_hrsr_rank">#9</span>
                  <span class="zg_hrsr_ladder">in Women's Novelty Dresses</span></li>
                <li class="zg_hrsr_item"><span class="zg_hrsr_rank">#166</span>
                  <span class="zg_hrsr_ladder">in Women's Dresses</span></li>
              </ul>
            </td></tr>
          </tbody></table>
        </div>
        </body></html>
    "#;

    const BULLET_LAYOUT: &str = r#"
        <html><body>
        <div id="titleSection"><h1 id="title"><span id="productTitle">Bullet Book</span></h1></div>
        <div id="wayfinding-breadcrumbs_feature_div"><ul>
            <li><span class="a-list-item"><a class="a-link-normal">Books</a></span></li>
        </ul></div>
        <div id="detailBullets_feature_div"><ul>
            <li><span><span class="a-text-bold">Product Dimensions:</span>
                <span>6 x 0.5 x 9 inches; 12 ounces</span></span></li>
        </ul></div>
        <div id="dpx-amazon-sales-rank_feature_div"><ul>
            <li id="SalesRank"><b>Amazon Best Sellers Rank:</b> #5,120 in Books (See Top 100 in Books)
              <ul class="zg_hrsr">
                <li class="zg_hrsr_item"><span class="zg_hrsr_rank">#12</span>
                  <span class="zg_hrsr_ladder">in Poetry</span></li>
              </ul>
            </li>
        </ul></div>
        </body></html>
    "#;

    #[test]
    fn test_table_layout() {
        let product = extract_product(TABLE_LAYOUT, "B07FSH5L52");

        assert_eq!(product.code, "B07FSH5L52");
        assert_eq!(product.name, "Longwu Women's Loose Casual Dress");
        assert_eq!(
            product.categories,
            vec!["Clothing, Shoes & Jewelry".to_string(), "Dresses".to_string()]
        );
        assert_eq!(
            product.ranks,
            vec![
                "#2,680 in Clothing, Shoes & Jewelry".to_string(),
                "#9 in Women's Novelty Dresses".to_string(),
                "#166 in Women's Dresses".to_string(),
            ]
        );
        assert_eq!(
            product.dimensions,
            vec!["10 x 8 x 1 inches".to_string(), "8 ounces".to_string()]
        );
        assert!(product.created_at.is_none());
    }

    #[test]
    fn test_bullet_layout() {
        let product = extract_product(BULLET_LAYOUT, "0140449132");

        assert_eq!(product.name, "Bullet Book");
        assert_eq!(product.categories, vec!["Books".to_string()]);
        assert_eq!(
            product.ranks,
            vec!["#5,120 in Books".to_string(), "#12 in Poetry".to_string()]
        );
        assert_eq!(
            product.dimensions,
            vec!["6 x 0.5 x 9 inches".to_string(), "12 ounces".to_string()]
        );
    }

    #[test]
    fn test_detail_bullets_layout() {
        let html = r#"
            <html><body>
            <div id="detail-bullets"><table><tbody><tr><td class="bucket"><div class="content"><ul>
              <li><b>Product Dimensions:</b> 10 x 8 x 1 inches ; 8 ounces</li>
              <li id="SalesRank"><b>Amazon Best Sellers Rank:</b> #2,680 in Clothing (See Top 100 in Clothing)
                <ul class="zg_hrsr"><li class="zg_hrsr_item"><span class="zg_hrsr_rank">#9</span> <span class="zg_hrsr_ladder">in Dresses</span></li></ul></li>
            </ul></div></td></tr></tbody></table></div>
            </body></html>
        "#;
        let product = extract_product(html, "B1");

        assert_eq!(
            product.ranks,
            vec!["#2,680 in Clothing".to_string(), "#9 in Dresses".to_string()]
        );
        assert_eq!(
            product.dimensions,
            vec!["10 x 8 x 1 inches".to_string(), "8 ounces".to_string()]
        );
    }

    #[test]
    fn test_unmatched_page_yields_code_only() {
        let product = extract_product("<html><body><p>Robot check</p></body></html>", "B1");
        assert_eq!(product, Product::new("B1"));
    }

    #[test]
    fn test_empty_breadcrumb_skipped() {
        let html = r#"<div id="wayfinding-breadcrumbs_feature_div"><ul>
            <li><span class="a-list-item"><a class="a-link-normal">  </a></span></li>
            <li><span class="a-list-item"><a class="a-link-normal">Toys</a></span></li>
        </ul></div>"#;
        let product = extract_product(html, "B1");
        assert_eq!(product.categories, vec!["Toys".to_string()]);
    }

    #[test]
    fn test_name_last_match_wins() {
        let html = r#"
            <div id="titleSection"><h1 id="title"><span id="productTitle">First</span></h1></div>
            <div id="titleSection"><h1 id="title"><span id="productTitle">Second</span></h1></div>"#;
        let product = extract_product(html, "B1");
        assert_eq!(product.name, "Second");
    }

    #[test]
    fn test_legacy_title_layout() {
        let html = r#"<h1 class="parseasinTitle"><span id="btAsinTitle">Old Layout Item</span></h1>"#;
        let product = extract_product(html, "B1");
        assert_eq!(product.name, "Old Layout Item");
    }

    #[test]
    fn test_dimensions_replace_not_append() {
        let html = r#"
            <div id="detailBullets_feature_div"><ul>
              <li><span><span class="a-text-bold">Product Dimensions:</span> 1 x 1 x 1 inches</span></li>
            </ul></div>
            <div id="detailBullets_feature_div"><ul>
              <li><span><span class="a-text-bold">Product Dimensions:</span> 2 x 2 x 2 inches; 3 pounds</span></li>
            </ul></div>"#;
        let product = extract_product(html, "B1");
        assert_eq!(
            product.dimensions,
            vec!["2 x 2 x 2 inches".to_string(), "3 pounds".to_string()]
        );
    }

    #[test]
    fn test_extracted_text_is_normalized() {
        let html = r#"<div id="titleSection"><h1 id="title"><span id="productTitle">Salt &amp;amp; Pepper</span></h1></div>"#;
        let product = extract_product(html, "B1");
        assert_eq!(product.name, "Salt & Pepper");
    }

    #[test]
    fn test_custom_strategy_list() {
        fn heading(element: ElementRef<'_>) -> Option<String> {
            Some(element.text().collect::<String>())
        }
        let strategies = [
            Strategy::new(Field::Name, "h2.custom", heading),
            Strategy::new(Field::Name, "h2[[invalid", heading),
        ];

        let extractor = Extractor::with_strategies(&strategies);
        assert_eq!(extractor.strategy_count(), 1);

        let product = extractor.extract(r#"<h2 class="custom">Custom</h2>"#, "B1");
        assert_eq!(product.name, "Custom");
    }
}
