//! # Catalog Commands
//!
//! Loading the product list from the inventory backend, looking products
//! up for the operator, and catalog edits (`product add|edit|rm`).

use serde::Serialize;
use tracing::{debug, info, warn};
use wt_core::cart::RefreshReport;
use wt_core::{Money, Product, ProductInput, DEFAULT_MIN_STOCK_ALERT};

use crate::context::AppContext;
use crate::error::CommandError;

/// Result of a catalog reload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogLoaded {
    pub products: usize,
    pub low_stock: usize,
    /// Present when the draft bill was editable and got re-priced.
    pub refresh: Option<RefreshReport>,
}

/// Fetches products and replaces the catalog.
///
/// ## Behavior
/// When the bill is editable, its lines pick up the fresh price and stock
/// snapshots. Lines whose product vanished or sold out are dropped, and
/// quantities above the new stock are lowered. A bill in checkout or
/// already confirmed is left alone.
pub async fn load_products(ctx: &AppContext) -> Result<CatalogLoaded, CommandError> {
    debug!("load_products command");

    let session = ctx.session.current()?;
    let products = ctx.services.inventory.list_products(&session).await?;

    let refresh = refresh_bill(ctx, &products);

    let low_stock = products.iter().filter(|p| p.is_low_stock()).count();
    let count = products.len();
    ctx.catalog.replace(products);

    info!(products = count, low_stock, "Catalog loaded");
    Ok(CatalogLoaded {
        products: count,
        low_stock,
        refresh,
    })
}

/// Pushes product snapshots into the bill if it is still editable.
fn refresh_bill(ctx: &AppContext, products: &[Product]) -> Option<RefreshReport> {
    let report = ctx.register.with_register_mut(|register| {
        register
            .cart_mut()
            .ok()
            .map(|cart| cart.refresh_products(products))
    });
    if let Some(report) = &report {
        if !report.clamped.is_empty() || !report.removed.is_empty() {
            warn!(
                clamped = ?report.clamped,
                removed = ?report.removed,
                "Bill adjusted to current stock"
            );
        }
    }
    report
}

/// Searches the loaded catalog. A blank query lists the quick-pick products.
pub fn search(ctx: &AppContext, query: &str) -> Vec<Product> {
    debug!(query = %query, "search command");
    ctx.catalog.search(query)
}

pub fn low_stock(ctx: &AppContext) -> Vec<Product> {
    ctx.catalog.low_stock()
}

/// Resolves `#n`, an id or a barcode to a product.
pub fn resolve(ctx: &AppContext, reference: &str) -> Result<Product, CommandError> {
    ctx.catalog
        .resolve(reference)
        .ok_or_else(|| CommandError::not_found("Product", reference))
}

/// Distinct categories of the loaded catalog, sorted.
pub fn categories(ctx: &AppContext) -> Vec<String> {
    ctx.catalog.categories()
}

/// Result of a catalog edit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanged {
    pub product: Product,
    pub refresh: Option<RefreshReport>,
}

/// Applies `key=value` pairs separated by `;` to a product payload.
///
/// ## Keys
/// `name`, `price`, `stock`, `category`, `barcode`, `description`, `cost`,
/// `min`. A blank value clears `barcode`, `description` and `cost`.
///
/// Returns the keys that were set.
pub fn apply_fields(input: &mut ProductInput, raw: &str) -> Result<Vec<String>, CommandError> {
    let mut keys = Vec::new();
    for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CommandError::validation(format!("Expected key=value, got '{}'", pair)))?;
        let key = key.trim().to_lowercase();
        let value = value.trim();
        let optional = || Some(value.to_string()).filter(|v| !v.is_empty());

        match key.as_str() {
            "name" => input.name = value.to_string(),
            "price" => input.price = parse_money("price", value)?,
            "stock" => input.stock = parse_count("stock", value)?,
            "category" => input.category = value.to_string(),
            "barcode" => input.barcode = optional(),
            "description" => input.description = optional(),
            "cost" => {
                input.cost_price = match optional() {
                    Some(v) => Some(parse_money("cost", &v)?),
                    None => None,
                }
            }
            "min" => input.min_stock_alert = parse_count("min", value)?,
            other => {
                return Err(CommandError::validation(format!("Unknown product field '{}'", other)))
            }
        }
        keys.push(key);
    }
    Ok(keys)
}

fn parse_money(field: &str, value: &str) -> Result<Money, CommandError> {
    value
        .parse::<Money>()
        .map_err(|_| CommandError::validation(format!("{} must be an amount, got '{}'", field, value)))
}

fn parse_count(field: &str, value: &str) -> Result<u32, CommandError> {
    value.parse::<u32>().map_err(|_| {
        CommandError::validation(format!("{} must be a whole number, got '{}'", field, value))
    })
}

/// Creates a product from `key=value` fields. `name`, `price` and
/// `category` are required.
pub async fn create_product(ctx: &AppContext, fields: &str) -> Result<ProductChanged, CommandError> {
    debug!("create_product command");
    let session = ctx.session.current()?;

    let mut input = ProductInput {
        name: String::new(),
        price: Money::zero(),
        stock: 0,
        category: String::new(),
        barcode: None,
        description: None,
        cost_price: None,
        min_stock_alert: DEFAULT_MIN_STOCK_ALERT,
    };
    let keys = apply_fields(&mut input, fields)?;
    if let Some(missing) = ["name", "price", "category"]
        .into_iter()
        .find(|required| !keys.iter().any(|k| k == required))
    {
        return Err(CommandError::validation(format!("{} is required", missing)));
    }
    input.validate()?;

    let product = ctx.services.inventory.create_product(&session, &input).await?;
    info!(product_id = %product.id, name = %product.name, "Product added to catalog");
    ctx.catalog.upsert(product.clone());

    Ok(ProductChanged {
        product,
        refresh: None,
    })
}

/// Edits the referenced product. Fields not named keep their current value.
pub async fn update_product(
    ctx: &AppContext,
    reference: &str,
    fields: &str,
) -> Result<ProductChanged, CommandError> {
    debug!(reference = %reference, "update_product command");
    let session = ctx.session.current()?;
    let current = resolve(ctx, reference)?;

    let mut input = ProductInput::from(&current);
    if apply_fields(&mut input, fields)?.is_empty() {
        return Err(CommandError::validation("Nothing to change"));
    }
    input.validate()?;

    let product = ctx
        .services
        .inventory
        .update_product(&session, &current.id, &input)
        .await?;
    info!(product_id = %product.id, stock = product.stock, "Catalog product updated");
    ctx.catalog.upsert(product.clone());
    let refresh = refresh_bill(ctx, &ctx.catalog.products());

    Ok(ProductChanged { product, refresh })
}

/// Deletes the referenced product. An editable bill loses its line for it.
pub async fn delete_product(
    ctx: &AppContext,
    reference: &str,
) -> Result<ProductChanged, CommandError> {
    debug!(reference = %reference, "delete_product command");
    let session = ctx.session.current()?;
    let product = resolve(ctx, reference)?;

    ctx.services
        .inventory
        .delete_product(&session, &product.id)
        .await?;
    info!(product_id = %product.id, "Catalog product deleted");
    ctx.catalog.remove(&product.id);
    let refresh = refresh_bill(ctx, &ctx.catalog.products());

    Ok(ProductChanged { product, refresh })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::harness;
    use wt_core::Money;

    #[tokio::test]
    async fn test_load_requires_login() {
        let h = harness();
        let err = load_products(&h.ctx).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_load_refreshes_editable_bill() {
        let h = harness();
        h.log_in();

        let rice = resolve(&h.ctx, "p1").unwrap();
        h.ctx.register.with_register_mut(|r| {
            let cart = r.cart_mut().unwrap();
            for _ in 0..4 {
                cart.add_item(&rice);
            }
        });

        {
            let mut products = h.inventory.products.lock().unwrap();
            products[0].stock = 2;
            products[0].price = Money::from_major(110);
        }

        let loaded = load_products(&h.ctx).await.unwrap();
        assert_eq!(loaded.products, 3);
        let refresh = loaded.refresh.unwrap();
        assert_eq!(refresh.clamped, vec!["Rice".to_string()]);

        h.ctx.register.with_register(|r| {
            let line = &r.cart().bill().items()[0];
            assert_eq!(line.quantity(), 2);
            assert_eq!(line.unit_price(), Money::from_major(110));
        });
    }

    #[test]
    fn test_search_then_pick() {
        let h = harness();
        let found = search(&h.ctx, "milk");
        assert_eq!(found.len(), 1);
        assert_eq!(resolve(&h.ctx, "#1").unwrap().id, "p2");

        let err = resolve(&h.ctx, "#7").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_categories_of_loaded_catalog() {
        let h = harness();
        assert_eq!(
            categories(&h.ctx),
            vec!["Bakery".to_string(), "Dairy".to_string(), "Grocery".to_string()]
        );
    }

    #[test]
    fn test_apply_fields() {
        let mut input = ProductInput::from(&crate::test_support::products()[0]);
        let keys = apply_fields(
            &mut input,
            "name = Basmati Rice; price=₹120.50; stock=9; barcode=; cost=90",
        )
        .unwrap();
        assert_eq!(keys, vec!["name", "price", "stock", "barcode", "cost"]);
        assert_eq!(input.name, "Basmati Rice");
        assert_eq!(input.price, Money::from_minor(12_050));
        assert_eq!(input.stock, 9);
        assert_eq!(input.barcode, None);
        assert_eq!(input.cost_price, Some(Money::from_major(90)));

        let err = apply_fields(&mut input, "colour=red").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(apply_fields(&mut input, "stock=-1").is_err());
        assert!(apply_fields(&mut input, "price").is_err());
    }

    #[tokio::test]
    async fn test_create_product() {
        let h = harness();
        h.log_in();

        let err = create_product(&h.ctx, "name=Tea; price=80").await.unwrap_err();
        assert_eq!(err.message, "category is required");

        let err = create_product(&h.ctx, "name= ; price=80; category=Beverages")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let created = create_product(&h.ctx, "name=Tea; price=80; stock=7; category=Beverages")
            .await
            .unwrap();
        assert_eq!(created.product.id, "p4");
        assert_eq!(h.inventory.products.lock().unwrap().len(), 4);
        assert_eq!(resolve(&h.ctx, "p4").unwrap().name, "Tea");
        assert!(categories(&h.ctx).contains(&"Beverages".to_string()));
    }

    #[tokio::test]
    async fn test_catalog_edits_require_login() {
        let h = harness();
        let err = create_product(&h.ctx, "name=Tea; price=80; category=Beverages")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        let err = delete_product(&h.ctx, "p1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_update_product_refreshes_bill() {
        let h = harness();
        h.log_in();
        let rice = resolve(&h.ctx, "p1").unwrap();
        h.ctx.register.with_register_mut(|r| {
            let cart = r.cart_mut().unwrap();
            for _ in 0..4 {
                cart.add_item(&rice);
            }
        });

        let changed = update_product(&h.ctx, "p1", "stock=3; price=110").await.unwrap();
        assert_eq!(changed.product.stock, 3);
        assert_eq!(changed.refresh.unwrap().clamped, vec!["Rice".to_string()]);
        assert_eq!(resolve(&h.ctx, "p1").unwrap().price, Money::from_major(110));
        h.ctx.register.with_register(|r| {
            let line = &r.cart().bill().items()[0];
            assert_eq!(line.quantity(), 3);
            assert_eq!(line.unit_price(), Money::from_major(110));
        });

        let err = update_product(&h.ctx, "p1", "").await.unwrap_err();
        assert_eq!(err.message, "Nothing to change");
        let err = update_product(&h.ctx, "p9", "stock=1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_delete_product_drops_bill_line() {
        let h = harness();
        h.log_in();
        let milk = resolve(&h.ctx, "p2").unwrap();
        h.ctx.register.with_register_mut(|r| {
            r.cart_mut().unwrap().add_item(&milk);
        });

        let changed = delete_product(&h.ctx, "8901234567890").await.unwrap();
        assert_eq!(changed.product.id, "p2");
        assert_eq!(changed.refresh.unwrap().removed, vec!["Milk".to_string()]);
        assert!(resolve(&h.ctx, "p2").is_err());
        assert_eq!(h.inventory.products.lock().unwrap().len(), 2);
        h.ctx.register.with_register(|r| assert!(r.cart().is_empty()));
    }

    #[test]
    fn test_low_stock_listing() {
        let h = harness();
        let low: Vec<String> = low_stock(&h.ctx).into_iter().map(|p| p.id).collect();
        assert_eq!(low, vec!["p2".to_string(), "p1".to_string()]);
    }
}
