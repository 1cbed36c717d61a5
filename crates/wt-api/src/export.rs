//! # Export Sinks
//!
//! Writes bill documents for a confirmed bill into the export directory.
//!
//! | Format  | File                         | Content                       |
//! |---------|------------------------------|-------------------------------|
//! | `txt`   | `bill_<number>.txt`          | plain-text receipt            |
//! | `json`  | `bill_<number>.json`         | `{products, total_amount}`    |
//! | `print` | `bill_<number>.layout.json`  | A4 page model for a renderer  |
//! |         | `bill_<number>_qr.<ext>`     | QR image, UPI bills only      |

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;
use wt_core::documents::{print, receipt, record, StoreProfile};
use wt_core::FinalizedBill;

use crate::error::{ClientError, ClientResult};

/// Export document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Json,
    Print,
}

impl FromStr for ExportFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "print" | "pdf" => Ok(ExportFormat::Print),
            other => Err(ClientError::InvalidInput(format!(
                "Unknown export format '{}'. Valid options: txt, json, print",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Text => write!(f, "txt"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Print => write!(f, "print"),
        }
    }
}

/// File sink rooted at the export directory.
#[derive(Debug, Clone)]
pub struct ExportSink {
    dir: PathBuf,
}

impl ExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ExportSink { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, finalized: &FinalizedBill, suffix: &str) -> PathBuf {
        self.dir
            .join(format!("bill_{}{}", finalized.bill_number(), suffix))
    }

    /// Writes the files for `format` and returns their paths.
    pub async fn export(
        &self,
        format: ExportFormat,
        finalized: &FinalizedBill,
        store: &StoreProfile,
    ) -> ClientResult<Vec<PathBuf>> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut written = Vec::new();
        match format {
            ExportFormat::Text => {
                let path = self.path_for(finalized, ".txt");
                tokio::fs::write(&path, receipt::render(finalized, store)).await?;
                written.push(path);
            }
            ExportFormat::Json => {
                let path = self.path_for(finalized, ".json");
                let json = record::to_json(&record::build(finalized.bill()))?;
                tokio::fs::write(&path, json).await?;
                written.push(path);
            }
            ExportFormat::Print => {
                let path = self.path_for(finalized, ".layout.json");
                let json = print::layout(finalized, store).to_json()?;
                tokio::fs::write(&path, json).await?;
                written.push(path);

                if let Some(image) = finalized.qr_image() {
                    let path = self.path_for(finalized, &format!("_qr.{}", image.extension()));
                    tokio::fs::write(&path, &image.bytes).await?;
                    written.push(path);
                }
            }
        }

        info!(
            bill_number = %finalized.bill_number(),
            format = %format,
            files = written.len(),
            "Bill exported"
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wt_core::{Money, PaymentMethod, Product, QrImage, QrOutcome, Register, UpiPayee};

    fn sink() -> ExportSink {
        ExportSink::new(std::env::temp_dir().join(format!("wt-export-{}", uuid::Uuid::new_v4())))
    }

    fn confirmed(method: PaymentMethod) -> FinalizedBill {
        let now = Utc.timestamp_millis_opt(1_735_689_601_234).unwrap();
        let payee = UpiPayee::new("shop@okicici", "WalletTracker").unwrap();
        let mut register = Register::new(payee, now);
        let cart = register.cart_mut().unwrap();
        cart.add_item(&Product::new("p1", "Rice", Money::from_major(100), 5, "Grocery"));
        cart.set_payment_method(Some(method));

        let session = register.begin_checkout().unwrap();
        let token = session.token();
        let upi_uri = session.upi().map(|upi| upi.uri.clone());
        if let Some(uri) = upi_uri {
            let image = QrImage::new("image/png", vec![1, 2, 3]);
            assert!(register.complete_qr(token, QrOutcome::Ready { uri, image }));
        }
        register.confirm_payment(now).unwrap().clone()
    }

    #[tokio::test]
    async fn test_text_export() {
        let sink = sink();
        let finalized = confirmed(PaymentMethod::Card);
        let store = StoreProfile::default();

        let paths = sink.export(ExportFormat::Text, &finalized, &store).await.unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("bill_WT202501011234.txt"));

        let written = tokio::fs::read_to_string(&paths[0]).await.unwrap();
        assert_eq!(written, receipt::render(&finalized, &store));

        tokio::fs::remove_dir_all(sink.dir()).await.ok();
    }

    #[tokio::test]
    async fn test_json_export_is_stable() {
        let sink = sink();
        let finalized = confirmed(PaymentMethod::Card);
        let store = StoreProfile::default();

        let first = sink.export(ExportFormat::Json, &finalized, &store).await.unwrap();
        let a = tokio::fs::read(&first[0]).await.unwrap();
        let second = sink.export(ExportFormat::Json, &finalized, &store).await.unwrap();
        let b = tokio::fs::read(&second[0]).await.unwrap();
        assert_eq!(a, b);
        assert!(String::from_utf8(a).unwrap().contains("\"total_amount\": 118.0"));

        tokio::fs::remove_dir_all(sink.dir()).await.ok();
    }

    #[tokio::test]
    async fn test_print_export_includes_qr_for_upi() {
        let sink = sink();
        let finalized = confirmed(PaymentMethod::Upi);
        let store = StoreProfile::default();

        let paths = sink.export(ExportFormat::Print, &finalized, &store).await.unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("bill_WT202501011234.layout.json"));
        assert!(paths[1].ends_with("bill_WT202501011234_qr.png"));
        assert_eq!(tokio::fs::read(&paths[1]).await.unwrap(), vec![1, 2, 3]);

        tokio::fs::remove_dir_all(sink.dir()).await.ok();
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Print);
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
