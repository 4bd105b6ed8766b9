//! Item extraction from validated responses.

use crate::amazon::document::{Document, Element};
use crate::amazon::models::NormalizedItem;
use tracing::{debug, trace};

/// Iterates over the `Items/Item` nodes of a document in document order.
pub fn items(doc: &Document) -> impl Iterator<Item = &Element> {
    doc.find(&["Items"]).into_iter().flat_map(|items| items.children_named("Item"))
}

/// Normalizes every item of a validated document.
///
/// Validation is the caller's job; a document without items yields an empty list.
pub fn extract_items(doc: &Document) -> Vec<NormalizedItem> {
    let extracted: Vec<NormalizedItem> = items(doc).map(normalize).collect();
    debug!("Extracted {} items", extracted.len());
    extracted
}

/// Reduces one `Item` node to a [`NormalizedItem`].
pub fn normalize(item: &Element) -> NormalizedItem {
    let text = |path: &[&str]| item.text_at(path).unwrap_or_default().trim().to_string();

    // Without an offer summary the lowest price is zero, not the list price.
    let lowest_offer_price = match item.child("OfferSummary") {
        Some(summary) => parse_amount(summary.text_at(&["LowestNewPrice", "Amount"])),
        None => 0.0,
    };

    let normalized = NormalizedItem {
        asin: text(&["ASIN"]),
        url: text(&["DetailPageURL"]),
        list_price: parse_amount(item.text_at(&["ItemAttributes", "ListPrice", "Amount"])),
        title: text(&["ItemAttributes", "Title"]),
        lowest_offer_price,
        large_image_url: text(&["LargeImage", "URL"]),
        medium_image_url: text(&["MediumImage", "URL"]),
        small_image_url: text(&["SmallImage", "URL"]),
    };

    trace!("Normalized item: {} - {}", normalized.asin, normalized.title);
    normalized
}

/// Converts an amount in minor units ("1999") to major units (19.99).
///
/// Missing or non-numeric amounts count as zero.
fn parse_amount(amount: Option<&str>) -> f64 {
    let Some(amount) = amount.map(str::trim).filter(|a| !a.is_empty()) else {
        return 0.0;
    };

    match amount.parse::<i64>() {
        Ok(minor) => minor as f64 / 100.0,
        Err(_) => {
            trace!("Ignoring non-numeric amount '{}'", amount);
            0.0
        }
    }
}
