//! # Inventory Collaborator
//!
//! Product catalog owned by the backend. The register only ever reads
//! snapshots; stock is decremented by the backend when a bill is saved.
//!
//! ## Endpoints
//! | Operation        | Request                                   |
//! |------------------|-------------------------------------------|
//! | `list_products`  | `GET    /api/inventory/products`          |
//! | `create_product` | `POST   /api/inventory/products`          |
//! | `update_product` | `PUT    /api/inventory/products/{id}`     |
//! | `delete_product` | `DELETE /api/inventory/products/{id}`     |

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info};
use wt_core::{Product, ProductInput};

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionContext;

pub const PRODUCTS_PATH: &str = "api/inventory/products";

/// Product catalog access.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn list_products(&self, session: &SessionContext) -> ClientResult<Vec<Product>>;

    async fn create_product(
        &self,
        session: &SessionContext,
        input: &ProductInput,
    ) -> ClientResult<Product>;

    async fn update_product(
        &self,
        session: &SessionContext,
        id: &str,
        input: &ProductInput,
    ) -> ClientResult<Product>;

    async fn delete_product(&self, session: &SessionContext, id: &str) -> ClientResult<()>;
}

/// [`Inventory`] backed by the REST API.
#[derive(Debug, Clone)]
pub struct HttpInventory {
    client: ApiClient,
}

impl HttpInventory {
    pub fn new(client: ApiClient) -> Self {
        HttpInventory { client }
    }

    fn product_path(id: &str) -> ClientResult<String> {
        let id = id.trim();
        if id.is_empty() || id.contains('/') {
            return Err(ClientError::InvalidInput(format!("invalid product id '{}'", id)));
        }
        Ok(format!("{}/{}", PRODUCTS_PATH, id))
    }
}

#[async_trait]
impl Inventory for HttpInventory {
    async fn list_products(&self, session: &SessionContext) -> ClientResult<Vec<Product>> {
        let request = self.client.request(Method::GET, PRODUCTS_PATH, Some(session))?;
        let products: Vec<Product> = self.client.send_json(request).await?;
        debug!(count = products.len(), "Loaded products");
        Ok(products)
    }

    async fn create_product(
        &self,
        session: &SessionContext,
        input: &ProductInput,
    ) -> ClientResult<Product> {
        input.validate()?;
        let request = self
            .client
            .request(Method::POST, PRODUCTS_PATH, Some(session))?
            .json(input);
        let product: Product = self.client.send_json(request).await?;
        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    async fn update_product(
        &self,
        session: &SessionContext,
        id: &str,
        input: &ProductInput,
    ) -> ClientResult<Product> {
        input.validate()?;
        let path = Self::product_path(id)?;
        let request = self
            .client
            .request(Method::PUT, &path, Some(session))?
            .json(input);
        let product: Product = self.client.send_json(request).await?;
        info!(product_id = %product.id, stock = product.stock, "Product updated");
        Ok(product)
    }

    async fn delete_product(&self, session: &SessionContext, id: &str) -> ClientResult<()> {
        let path = Self::product_path(id)?;
        let request = self.client.request(Method::DELETE, &path, Some(session))?;
        self.client.send_empty(request).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiSettings;
    use crate::session::SessionUser;
    use crate::test_support::spawn_backend;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use wt_core::Money;

    fn session() -> SessionContext {
        SessionContext::new(
            "test-token",
            SessionUser {
                id: "u1".into(),
                email: "cashier@example.com".into(),
                name: None,
            },
        )
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer test-token")
            && headers.contains_key("x-request-id")
    }

    async fn list(headers: HeaderMap) -> (StatusCode, Json<Value>) {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "No token" })));
        }
        (
            StatusCode::OK,
            Json(json!([
                { "_id": "p1", "name": "Rice", "price": 100.0, "stock": 5, "category": "Grocery" },
                { "_id": "p2", "name": "Pen", "price": 10.5, "stock": 0, "category": "Stationery",
                  "barcode": "8901234567890", "minStockAlert": 2 }
            ])),
        )
    }

    async fn create(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let mut product = body;
        product["_id"] = json!("p3");
        (StatusCode::CREATED, Json(product))
    }

    async fn update(Path(id): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if id != "p1" {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Product not found" })),
            );
        }
        let mut product = body;
        product["_id"] = json!(id);
        (StatusCode::OK, Json(product))
    }

    async fn remove(Path(id): Path<String>) -> StatusCode {
        if id == "p1" {
            StatusCode::NO_CONTENT
        } else {
            StatusCode::NOT_FOUND
        }
    }

    async fn inventory() -> HttpInventory {
        let router = Router::new()
            .route("/api/inventory/products", get(list).post(create))
            .route("/api/inventory/products/{id}", put(update).delete(remove));
        let base = spawn_backend(router).await;
        let settings = ApiSettings {
            base_url: base,
            ..ApiSettings::default()
        };
        HttpInventory::new(ApiClient::new(&settings).unwrap())
    }

    fn input(name: &str) -> ProductInput {
        ProductInput::from(&Product::new("", name, Money::from_major(40), 12, "Dairy"))
    }

    #[tokio::test]
    async fn test_list_products() {
        let inventory = inventory().await;
        let products = inventory.list_products(&session()).await.unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, "p1");
        assert_eq!(products[0].price, Money::from_major(100));
        assert_eq!(products[0].min_stock_alert, 5);
        assert_eq!(products[1].barcode.as_deref(), Some("8901234567890"));
        assert!(!products[1].is_in_stock());
    }

    #[tokio::test]
    async fn test_list_products_unauthorized() {
        let inventory = inventory().await;
        let other = SessionContext::new(
            "someone-else",
            SessionUser {
                id: "u2".into(),
                email: "x@example.com".into(),
                name: None,
            },
        );
        let err = inventory.list_products(&other).await.unwrap_err();
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_create_and_update_product() {
        let inventory = inventory().await;

        let created = inventory.create_product(&session(), &input("Milk")).await.unwrap();
        assert_eq!(created.id, "p3");
        assert_eq!(created.name, "Milk");
        assert_eq!(created.stock, 12);

        let updated = inventory
            .update_product(&session(), "p1", &input("Rice 5kg"))
            .await
            .unwrap();
        assert_eq!(updated.id, "p1");
        assert_eq!(updated.name, "Rice 5kg");

        let err = inventory
            .update_product(&session(), "missing", &input("Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Rejected { status: 404, ref message } if message == "Product not found"
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_sent() {
        let inventory = inventory().await;
        let err = inventory.create_product(&session(), &input("")).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));

        let err = inventory.delete_product(&session(), "a/b").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_delete_product() {
        let inventory = inventory().await;
        inventory.delete_product(&session(), "p1").await.unwrap();
        assert!(inventory.delete_product(&session(), "p9").await.is_err());
    }
}
