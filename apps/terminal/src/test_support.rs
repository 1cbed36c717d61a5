//! In-memory collaborators for command tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;
use wt_api::config::ApiSettings;
use wt_api::{
    ApiClient, AuthClient, BillStore, ClientError, ClientResult, ExportSink, Inventory,
    QrRenderer, SessionContext, SessionUser, StoredBill,
};
use wt_core::documents::StoreProfile;
use wt_core::{BillPayload, Money, Product, ProductInput, QrImage, UpiPayee, UpiUri};

use crate::context::{AppContext, Services};

pub struct FakeInventory {
    pub products: Mutex<Vec<Product>>,
}

#[async_trait]
impl Inventory for FakeInventory {
    async fn list_products(&self, _session: &SessionContext) -> ClientResult<Vec<Product>> {
        Ok(self.products.lock().unwrap().clone())
    }

    async fn create_product(
        &self,
        _session: &SessionContext,
        input: &ProductInput,
    ) -> ClientResult<Product> {
        let mut products = self.products.lock().unwrap();
        let product = Product::new(
            format!("p{}", products.len() + 1),
            input.name.clone(),
            input.price,
            input.stock,
            input.category.clone(),
        );
        products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        _session: &SessionContext,
        id: &str,
        input: &ProductInput,
    ) -> ClientResult<Product> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ClientError::Rejected {
                status: 404,
                message: "Product not found".into(),
            })?;
        product.name = input.name.clone();
        product.price = input.price;
        product.stock = input.stock;
        product.category = input.category.clone();
        product.barcode = input.barcode.clone();
        Ok(product.clone())
    }

    async fn delete_product(&self, _session: &SessionContext, id: &str) -> ClientResult<()> {
        self.products.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBillStore {
    pub saved: Mutex<Vec<BillPayload>>,
    pub offline: AtomicBool,
}

impl FakeBillStore {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn saved_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

#[async_trait]
impl BillStore for FakeBillStore {
    async fn save_bill(
        &self,
        _session: &SessionContext,
        payload: &BillPayload,
    ) -> ClientResult<StoredBill> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::ConnectionFailed("backend unreachable".into()));
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push(payload.clone());
        Ok(StoredBill {
            id: Some(format!("bill-{}", saved.len())),
            bill_number: payload.bill_number.to_string(),
            total: Some(payload.total.round_to_minor()),
            created_at: Some(payload.timestamp),
        })
    }
}

pub struct FakeQr {
    pub fail: AtomicBool,
}

#[async_trait]
impl QrRenderer for FakeQr {
    async fn render(&self, _uri: &UpiUri) -> ClientResult<QrImage> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ClientError::QrRender("service unavailable".into()));
        }
        Ok(QrImage::new("image/png", vec![0x89, 0x50, 0x4e, 0x47]))
    }
}

pub struct Harness {
    pub ctx: AppContext,
    pub inventory: Arc<FakeInventory>,
    pub bills: Arc<FakeBillStore>,
    pub qr: Arc<FakeQr>,
}

impl Harness {
    pub fn log_in(&self) {
        self.ctx.session.set(SessionContext::new(
            "test-token",
            SessionUser {
                id: "u1".into(),
                email: "cashier@example.com".into(),
                name: Some("Asha".into()),
            },
        ));
    }
}

pub fn products() -> Vec<Product> {
    let mut milk = Product::new("p2", "Milk", Money::from_major(60), 2, "Dairy");
    milk.barcode = Some("8901234567890".into());
    vec![
        Product::new("p1", "Rice", Money::from_major(100), 5, "Grocery"),
        milk,
        Product::new("p3", "Bread", Money::from_major(45), 12, "Bakery"),
    ]
}

/// Console wired to fakes, with the catalog already loaded.
pub fn harness() -> Harness {
    let inventory = Arc::new(FakeInventory {
        products: Mutex::new(products()),
    });
    let bills = Arc::new(FakeBillStore::default());
    let qr = Arc::new(FakeQr {
        fail: AtomicBool::new(false),
    });

    // Nothing listens on port 9; login is never exercised against it.
    let api = ApiClient::new(&ApiSettings {
        base_url: "http://127.0.0.1:9".into(),
        ..ApiSettings::default()
    })
    .unwrap();

    let services = Services {
        auth: AuthClient::new(api),
        inventory: inventory.clone(),
        bills: bills.clone(),
        qr: qr.clone(),
        export: ExportSink::new(
            std::env::temp_dir().join(format!("wt-terminal-{}", Uuid::new_v4())),
        ),
    };
    let payee = UpiPayee::new("shop@okicici", "WalletTracker").unwrap();
    let ctx = AppContext::new(services, payee, StoreProfile::default(), 255);
    ctx.catalog.replace(products());

    Harness {
        ctx,
        inventory,
        bills,
        qr,
    }
}
