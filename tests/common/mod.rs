//! Shared fixtures for integration tests

#![allow(dead_code)]

use dp_scraper::config::SourceConfig;
use dp_scraper::fetch::{FetchController, Throttle};
use dp_scraper::pipeline::{ProductScraper, ProductService};
use dp_scraper::storage::SqliteStore;
use std::sync::Arc;
use wiremock::MockServer;

pub const CODE: &str = "B07FSH5L52";

/// Table-layout product page with a breadcrumb, title, rank block and
/// dimensions block
pub const PRODUCT_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Amazon.com</title></head><body>
<div id="wayfinding-breadcrumbs_feature_div"><ul class="a-unordered-list">
  <li><span class="a-list-item"><a class="a-link-normal a-color-tertiary" href="/clothing">Clothing</a></span></li>
  <li class="a-breadcrumb-divider"><span class="a-list-item a-color-tertiary">&rsaquo;</span></li>
  <li><span class="a-list-item"><a class="a-link-normal a-color-tertiary" href="/dresses">Dresses</a></span></li>
</ul></div>
<div id="titleSection"><h1 id="title" class="a-size-large"><span id="productTitle" class="a-size-large">
    Longwu Women&#39;s Summer Casual Loose Dress
</span></h1></div>
<div id="prodDetails"><div class="techD"><div class="pdTab"><table><tbody>
  <tr><td class="label">Product Dimensions</td><td class="value">12 x 10 x 1 inches ; 7.2 ounces</td></tr>
  <tr><td class="label">Shipping Weight</td><td class="value">8 ounces</td></tr>
</tbody></table></div></div></div>
<table><tbody>
  <tr id="SalesRank"><td class="label">Best Sellers Rank</td>
  <td class="value">#1,024 in Clothing, Shoes &amp; Jewelry (See Top 100)
    <ul class="zg_hrsr">
      <li class="zg_hrsr_item"><span class="zg_hrsr_rank">#7</span>
        <span class="zg_hrsr_ladder">in Women&#39;s Casual Dresses</span></li>
    </ul>
  </td></tr>
</tbody></table>
</body></html>"#;

/// Page where only the title matches
pub const TITLE_ONLY_PAGE: &str = r#"<html><body>
<div id="titleSection"><h1 id="title"><span id="productTitle">Mystery Item</span></h1></div>
</body></html>"#;

pub fn source_config(server: &MockServer) -> SourceConfig {
    SourceConfig {
        base_url: server.uri(),
        user_agents: vec!["TestAgent/1.0".to_string()],
        ..SourceConfig::default()
    }
}

pub fn controller(server: &MockServer) -> Arc<FetchController> {
    Arc::new(
        FetchController::new(&source_config(server), Arc::new(Throttle::unthrottled()))
            .expect("controller should build"),
    )
}

pub fn service(server: &MockServer) -> ProductService<ProductScraper, SqliteStore> {
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    ProductService::new(ProductScraper::new(controller(server)), store)
}
