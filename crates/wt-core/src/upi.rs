//! # UPI URI Encoder
//!
//! Builds the `upi://pay` deep link a customer's payment app scans.
//!
//! ## Link Layout
//! ```text
//! upi://pay?pa=<payee vpa>&pn=<payee name>&am=<212.40>&cu=INR&tn=<note>&tr=<bill number>
//!             │             │               │          │        │         │
//!             │             │               │          │        │         └─ payment reference
//!             │             │               │          │        └─ compact bill note
//!             │             │               │          └─ currency
//!             │             │               └─ total, exactly 2 decimals
//!             └─────────────┴─ configured shop account
//! ```
//!
//! Every value is percent-encoded with the same unreserved set as
//! JavaScript's `encodeURIComponent`, which is what payment apps expect.
//! Turning the link into an image is a collaborator concern; this module
//! only owns the string and the outcome type that reports the render.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bill::Bill;
use crate::documents::note;
use crate::validation::{validate_upi_vpa, ValidationResult};

/// URI scheme and path of a UPI payment request.
pub const UPI_PAY_PREFIX: &str = "upi://pay";

/// Default currency code.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Characters left as-is: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

// =============================================================================
// Payee
// =============================================================================

/// The account that receives UPI payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpiPayee {
    /// Virtual payment address, e.g. `shop@okicici`.
    pub vpa: String,
    /// Name shown by the payer's app.
    pub name: String,
    pub currency: String,
}

impl UpiPayee {
    /// Creates a payee in the default currency after checking the VPA.
    pub fn new(vpa: impl Into<String>, name: impl Into<String>) -> ValidationResult<Self> {
        let vpa = vpa.into();
        validate_upi_vpa(&vpa)?;
        Ok(UpiPayee {
            vpa,
            name: name.into(),
            currency: DEFAULT_CURRENCY.to_string(),
        })
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// Decoded parameters of a payment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpiParams {
    /// Payee address (`pa`).
    pub payee_address: String,
    /// Payee name (`pn`).
    pub payee_name: String,
    /// Amount with two decimals (`am`).
    pub amount: String,
    /// Currency (`cu`).
    pub currency: String,
    /// Transaction note (`tn`).
    pub note: String,
    /// Transaction reference (`tr`).
    pub reference: String,
}

impl UpiParams {
    /// Parameters for a bill: rounded total, compact note, bill number as reference.
    pub fn for_bill(payee: &UpiPayee, bill: &Bill) -> Self {
        UpiParams {
            payee_address: payee.vpa.clone(),
            payee_name: payee.name.clone(),
            amount: bill.totals().total.to_fixed(),
            currency: payee.currency.clone(),
            note: note::compact(bill),
            reference: bill.bill_number().to_string(),
        }
    }

    /// Encodes the parameters into a deep link.
    pub fn to_uri(&self) -> UpiUri {
        let fields = [
            ("pa", &self.payee_address),
            ("pn", &self.payee_name),
            ("am", &self.amount),
            ("cu", &self.currency),
            ("tn", &self.note),
            ("tr", &self.reference),
        ];

        let query = fields
            .iter()
            .map(|(key, value)| format!("{}={}", key, encode_component(value)))
            .collect::<Vec<_>>()
            .join("&");

        UpiUri(format!("{}?{}", UPI_PAY_PREFIX, query))
    }
}

// =============================================================================
// URI
// =============================================================================

/// An encoded `upi://pay?...` link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UpiUri(String);

impl UpiUri {
    /// Builds the payment link for a bill.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use wt_core::{Bill, UpiPayee, UpiUri};
    ///
    /// let payee = UpiPayee::new("shop@okicici", "WalletTracker").unwrap();
    /// let uri = UpiUri::build(&payee, &Bill::new(Utc::now()));
    /// assert!(uri.as_str().starts_with("upi://pay?pa=shop%40okicici&pn=WalletTracker&am=0.00"));
    /// ```
    pub fn build(payee: &UpiPayee, bill: &Bill) -> Self {
        UpiParams::for_bill(payee, bill).to_uri()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw (still encoded) value of one query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        let (_, query) = self.0.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

impl fmt::Display for UpiUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// QR Outcome
// =============================================================================

/// A rendered QR code image.
#[derive(Clone, PartialEq, Eq)]
pub struct QrImage {
    /// MIME type reported by the renderer, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl QrImage {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        QrImage {
            content_type: content_type.into(),
            bytes,
        }
    }

    /// File extension matching the content type.
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/svg+xml" => "svg",
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

impl fmt::Debug for QrImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QrImage")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Result of turning a link into an image.
///
/// A failure keeps the link so the operator can retry rendering or have the
/// customer type it in. It is never reported as a blank success.
#[derive(Debug, Clone, PartialEq)]
pub enum QrOutcome {
    Ready { uri: UpiUri, image: QrImage },
    Failed { uri: UpiUri, reason: String },
}

impl QrOutcome {
    pub fn uri(&self) -> &UpiUri {
        match self {
            QrOutcome::Ready { uri, .. } | QrOutcome::Failed { uri, .. } => uri,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, QrOutcome::Ready { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(note: &str) -> UpiParams {
        UpiParams {
            payee_address: "sbragul26@okicici".to_string(),
            payee_name: "WalletTracker".to_string(),
            amount: "212.40".to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            note: note.to_string(),
            reference: "WT202501011234".to_string(),
        }
    }

    #[test]
    fn test_component_encoding_matches_browser() {
        assert_eq!(encode_component("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(encode_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_component("₹"), "%E2%82%B9");
        assert_eq!(encode_component("x@y:z,"), "x%40y%3Az%2C");
    }

    #[test]
    fn test_field_order_and_values() {
        let uri = params("Tea(1x10.00)").to_uri();
        assert_eq!(
            uri.as_str(),
            "upi://pay?pa=sbragul26%40okicici&pn=WalletTracker&am=212.40&cu=INR\
             &tn=Tea(1x10.00)&tr=WT202501011234"
        );
        assert_eq!(uri.param("am"), Some("212.40"));
        assert_eq!(uri.param("tr"), Some("WT202501011234"));
        assert_eq!(uri.param("missing"), None);
    }

    #[test]
    fn test_note_cannot_inject_parameters() {
        let uri = params("x&am=1.00").to_uri();
        assert_eq!(uri.param("am"), Some("212.40"));
        assert_eq!(uri.param("tn"), Some("x%26am%3D1.00"));
    }

    #[test]
    fn test_payee_rejects_bad_vpa() {
        assert!(UpiPayee::new("not-a-vpa", "Shop").is_err());
        let payee = UpiPayee::new("shop@okhdfc", "Shop").unwrap();
        assert_eq!(payee.currency, "INR");
    }

    #[test]
    fn test_qr_outcome_keeps_uri_on_failure() {
        let uri = params("n").to_uri();
        let failed = QrOutcome::Failed {
            uri: uri.clone(),
            reason: "renderer offline".to_string(),
        };
        assert!(!failed.is_ready());
        assert_eq!(failed.uri(), &uri);
    }
}
