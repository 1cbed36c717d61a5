//! # Catalog Queries
//!
//! Read-only lookups over a product snapshot list: the billing search box,
//! the low-stock alert list and the category filter.

use crate::types::Product;
use crate::QUICK_PICK_LIMIT;

/// Finds products for the billing search box.
///
/// ## Matching
/// - Blank query: the first [`QUICK_PICK_LIMIT`] products (quick-pick grid)
/// - Otherwise: case-insensitive substring of name or category, or a
///   substring of the barcode (barcodes are matched as typed)
///
/// ## Example
/// ```rust
/// use wt_core::catalog::search;
/// use wt_core::{Money, Product};
///
/// let products = vec![
///     Product::new("1", "Basmati Rice", Money::from_major(120), 10, "Grocery"),
///     Product::new("2", "Ball Pen", Money::from_major(10), 50, "Stationery"),
/// ];
/// let hits = search(&products, "rice");
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].id, "1");
/// ```
pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let query = query.trim();
    if query.is_empty() {
        return products.iter().take(QUICK_PICK_LIMIT).collect();
    }

    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|product| {
            product.name.to_lowercase().contains(&needle)
                || product.category.to_lowercase().contains(&needle)
                || product
                    .barcode
                    .as_deref()
                    .map_or(false, |barcode| barcode.contains(query))
        })
        .collect()
}

/// Looks a product up by backend id.
pub fn find_by_id<'a>(products: &'a [Product], id: &str) -> Option<&'a Product> {
    products.iter().find(|product| product.id == id)
}

/// Looks a product up by exact barcode (scanner input).
pub fn find_by_barcode<'a>(products: &'a [Product], barcode: &str) -> Option<&'a Product> {
    let barcode = barcode.trim();
    products
        .iter()
        .find(|product| product.barcode.as_deref() == Some(barcode))
}

/// Products at or below their low-stock threshold, lowest stock first.
pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    let mut low: Vec<&Product> = products.iter().filter(|p| p.is_low_stock()).collect();
    low.sort_by_key(|p| p.stock);
    low
}

/// Distinct categories, sorted.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}
