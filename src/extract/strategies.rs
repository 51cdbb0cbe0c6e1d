//! Layout strategies for each extracted field
//!
//! The source serves product pages in several layouts. Each layout presents
//! a field under a different structure, so every field has an ordered list
//! of strategies: a CSS locator naming the element that carries the value in
//! one layout, and a transform that turns a matched element into text.
//!
//! Transforms are pure. They never touch the product being built; the
//! engine owns how a produced value is folded into it (see [`Policy`]).

use crate::extract::text::{after_label, child_text, element_text, non_empty, strip_qualifier};
use scraper::ElementRef;

/// Fields filled in by the extraction engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Categories,
    Ranks,
    Dimensions,
}

/// How a value produced for a field is folded into the product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Overwrite the scalar; the last match in document order wins
    Assign,
    /// Push one entry per match in document order
    Append,
    /// Replace the whole sequence with the `;`-separated parts of the match
    Replace,
}

impl Field {
    /// Returns the accumulation policy for this field
    pub fn policy(self) -> Policy {
        match self {
            Self::Name => Policy::Assign,
            Self::Categories | Self::Ranks => Policy::Append,
            Self::Dimensions => Policy::Replace,
        }
    }
}

/// Turns a matched element into the raw value for a field
pub type Transform = fn(ElementRef<'_>) -> Option<String>;

/// One layout's way of presenting a field
#[derive(Clone, Copy)]
pub struct Strategy {
    /// Field this strategy fills
    pub field: Field,

    /// CSS selector for the element carrying the value
    pub locator: &'static str,

    /// Converts the matched element into text
    pub transform: Transform,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("field", &self.field)
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

impl Strategy {
    pub const fn new(field: Field, locator: &'static str, transform: Transform) -> Self {
        Self {
            field,
            locator,
            transform,
        }
    }
}

/// Every layout the extractor understands, grouped by field in preference order
pub const BUILTIN_STRATEGIES: &[Strategy] = &[
    // Name
    Strategy::new(Field::Name, "#titleSection h1#title", title_span),
    Strategy::new(Field::Name, "h1.parseasinTitle", legacy_title_span),
    // Categories
    Strategy::new(
        Field::Categories,
        "#wayfinding-breadcrumbs_feature_div ul li span.a-list-item",
        breadcrumb_link,
    ),
    // Ranks, table view
    Strategy::new(Field::Ranks, "#SalesRank td.value", table_main_rank),
    Strategy::new(
        Field::Ranks,
        "#SalesRank td.value ul.zg_hrsr li.zg_hrsr_item",
        sub_rank,
    ),
    // Ranks, bullet views
    Strategy::new(
        Field::Ranks,
        "#dpx-amazon-sales-rank_feature_div",
        bullet_main_rank,
    ),
    Strategy::new(
        Field::Ranks,
        "#detail-bullets table tbody tr .bucket .content ul",
        bullet_main_rank,
    ),
    Strategy::new(
        Field::Ranks,
        "li#SalesRank ul.zg_hrsr li.zg_hrsr_item",
        sub_rank,
    ),
    // Dimensions
    Strategy::new(
        Field::Dimensions,
        "#prodDetails .techD .pdTab table tbody tr",
        table_dimensions,
    ),
    Strategy::new(
        Field::Dimensions,
        "#detail-bullets table tbody tr td.bucket .content ul li",
        bold_label_dimensions,
    ),
    Strategy::new(
        Field::Dimensions,
        "#detailBullets_feature_div ul li span",
        bullet_span_dimensions,
    ),
];

const DIMENSIONS_LABEL: &str = "Product Dimensions";

fn title_span(element: ElementRef<'_>) -> Option<String> {
    non_empty(child_text(element, "span#productTitle"))
}

fn legacy_title_span(element: ElementRef<'_>) -> Option<String> {
    non_empty(child_text(element, "span#btAsinTitle"))
}

fn breadcrumb_link(element: ElementRef<'_>) -> Option<String> {
    non_empty(child_text(element, ".a-link-normal"))
}

fn table_main_rank(element: ElementRef<'_>) -> Option<String> {
    let text = element_text(element);
    non_empty(strip_qualifier(&text).to_string())
}

fn bullet_main_rank(element: ElementRef<'_>) -> Option<String> {
    let text = child_text(element, "li#SalesRank");
    let rank = strip_qualifier(after_label(&text)?);
    if rank.chars().count() > 1 {
        Some(rank.to_string())
    } else {
        None
    }
}

fn sub_rank(element: ElementRef<'_>) -> Option<String> {
    let rank = child_text(element, "span.zg_hrsr_rank");
    let ladder = child_text(element, "span.zg_hrsr_ladder");
    if rank.is_empty() || ladder.is_empty() {
        return None;
    }
    Some(format!("{} {}", rank, ladder))
}

fn table_dimensions(element: ElementRef<'_>) -> Option<String> {
    if child_text(element, "td.label") != DIMENSIONS_LABEL {
        return None;
    }
    non_empty(child_text(element, "td.value"))
}

fn bold_label_dimensions(element: ElementRef<'_>) -> Option<String> {
    labelled_dimensions(element, "b")
}

fn bullet_span_dimensions(element: ElementRef<'_>) -> Option<String> {
    labelled_dimensions(element, "span.a-text-bold")
}

fn labelled_dimensions(element: ElementRef<'_>, label_selector: &str) -> Option<String> {
    let label = child_text(element, label_selector);
    if label.trim_end_matches(':').trim() != DIMENSIONS_LABEL {
        return None;
    }
    let text = element_text(element);
    non_empty(after_label(&text)?.to_string())
}
