//! # Catalog State
//!
//! The product list fetched from the inventory backend, plus the ids shown
//! by the last listing so the operator can pick a product as `#n`.

use std::sync::{Arc, RwLock};

use wt_core::{catalog, Product};

#[derive(Debug, Default)]
struct Catalog {
    products: Vec<Product>,
    last_listing: Vec<String>,
}

/// Shared product catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    inner: Arc<RwLock<Catalog>>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the catalog. The previous listing no longer applies.
    pub fn replace(&self, products: Vec<Product>) {
        let mut catalog = self.inner.write().unwrap_or_else(|e| e.into_inner());
        catalog.products = products;
        catalog.last_listing.clear();
    }

    /// Copy of every product.
    pub fn products(&self) -> Vec<Product> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .products
            .clone()
    }

    /// Inserts a created product or replaces an edited one in place.
    pub fn upsert(&self, product: Product) {
        let mut catalog = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match catalog.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => catalog.products.push(product),
        }
    }

    /// Drops a deleted product. `#n` picks still pointing at it resolve to nothing.
    pub fn remove(&self, id: &str) -> Option<Product> {
        let mut catalog = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let position = catalog.products.iter().position(|p| p.id == id)?;
        Some(catalog.products.remove(position))
    }

    /// Distinct categories of the loaded products.
    pub fn categories(&self) -> Vec<String> {
        catalog::categories(&self.inner.read().unwrap_or_else(|e| e.into_inner()).products)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs a search and remembers the result order for `#n` picks.
    pub fn search(&self, query: &str) -> Vec<Product> {
        let mut catalog = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let found: Vec<Product> = catalog::search(&catalog.products, query)
            .into_iter()
            .cloned()
            .collect();
        catalog.last_listing = found.iter().map(|p| p.id.clone()).collect();
        found
    }

    /// Products at or below their alert level; also becomes the listing.
    pub fn low_stock(&self) -> Vec<Product> {
        let mut catalog = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let found: Vec<Product> = catalog::low_stock(&catalog.products)
            .into_iter()
            .cloned()
            .collect();
        catalog.last_listing = found.iter().map(|p| p.id.clone()).collect();
        found
    }

    /// Resolves a product reference.
    ///
    /// ## Accepted Forms
    /// - `#3`: third product of the last listing (1-based)
    /// - a product id
    /// - a barcode
    pub fn resolve(&self, reference: &str) -> Option<Product> {
        let catalog = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let reference = reference.trim();

        if let Some(pick) = reference.strip_prefix('#') {
            let position = pick.parse::<usize>().ok()?.checked_sub(1)?;
            let id = catalog.last_listing.get(position)?;
            return catalog::find_by_id(&catalog.products, id).cloned();
        }

        catalog::find_by_id(&catalog.products, reference)
            .or_else(|| catalog::find_by_barcode(&catalog.products, reference))
            .cloned()
    }
}
