//! # Register
//!
//! The checkout state machine. A `Register` owns the cart for the current
//! transaction and decides when it may be edited, checked out, confirmed
//! or reset.
//!
//! ## Who may touch the cart
//! ```text
//! ┌──────────────────────────┬────────────────┬──────────────────────────────┐
//! │ State                    │ cart_mut()     │ Typical next step            │
//! ├──────────────────────────┼────────────────┼──────────────────────────────┤
//! │ NoMethodSelected         │ Ok             │ begin_checkout               │
//! │ AwaitingConfirmation     │ CheckoutIn...  │ confirm_payment / cancel     │
//! │ Confirmed                │ BillFrozen     │ mark_saved / start_new_bill  │
//! │ Cancelled                │ Ok             │ begin_checkout again         │
//! └──────────────────────────┴────────────────┴──────────────────────────────┘
//! ```
//!
//! ## Late completions
//! QR rendering and bill saving finish asynchronously. Each carries the
//! [`SessionToken`] it was started with; completions for a session that
//! has since been cancelled or replaced are dropped.

use chrono::{DateTime, Utc};

use crate::bill::FinalizedBill;
use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::payment::{self, PaymentSession, PaymentState, QrStatus, SessionToken, UpiCheckout};
use crate::types::PaymentMethod;
use crate::upi::{QrOutcome, UpiPayee, UpiUri};
use crate::validation::validate_cash_received;

/// Checkout state machine over one cart.
#[derive(Debug, Clone)]
pub struct Register {
    cart: Cart,
    state: PaymentState,
    session: Option<PaymentSession>,
    finalized: Option<FinalizedBill>,
    saved: bool,
    next_token: u64,
    payee: UpiPayee,
}

impl Register {
    /// Opens the register with an empty bill.
    pub fn new(payee: UpiPayee, now: DateTime<Utc>) -> Self {
        Register {
            cart: Cart::new(now),
            state: PaymentState::NoMethodSelected,
            session: None,
            finalized: None,
            saved: false,
            next_token: 1,
            payee,
        }
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn payee(&self) -> &UpiPayee {
        &self.payee
    }

    /// Read access to the cart. Always allowed.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Write access to the cart while the bill is editable.
    ///
    /// ## Errors
    /// - [`CoreError::CheckoutInProgress`] while awaiting confirmation
    /// - [`CoreError::BillFrozen`] after confirmation
    pub fn cart_mut(&mut self) -> CoreResult<&mut Cart> {
        match self.state {
            PaymentState::AwaitingConfirmation => Err(CoreError::CheckoutInProgress),
            PaymentState::Confirmed => Err(self.frozen()),
            PaymentState::NoMethodSelected | PaymentState::Cancelled => Ok(&mut self.cart),
        }
    }

    /// The live checkout session, if any.
    pub fn session(&self) -> Option<&PaymentSession> {
        self.session.as_ref()
    }

    /// The confirmed bill, if payment went through.
    pub fn finalized(&self) -> Option<&FinalizedBill> {
        self.finalized.as_ref()
    }

    /// Whether the confirmed bill has been persisted.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Starts checkout for the current bill.
    ///
    /// For UPI the payment link is built right away and the QR image is
    /// marked pending; the caller renders it and reports back through
    /// [`Register::complete_qr`].
    pub fn begin_checkout(&mut self) -> CoreResult<&PaymentSession> {
        match self.state {
            PaymentState::NoMethodSelected | PaymentState::Cancelled => {}
            PaymentState::AwaitingConfirmation => {
                return Err(CoreError::InvalidTransition {
                    action: "begin checkout",
                    state: self.state,
                })
            }
            PaymentState::Confirmed => return Err(self.frozen()),
        }

        let bill = self.cart.bill();
        if bill.is_empty() {
            return Err(CoreError::EmptyBill);
        }
        let method = bill.payment_method().ok_or(CoreError::NoPaymentMethod)?;

        let upi = match method {
            PaymentMethod::Upi => Some(UpiCheckout {
                uri: UpiUri::build(&self.payee, bill),
                qr: QrStatus::Pending,
            }),
            PaymentMethod::Cash | PaymentMethod::Card => None,
        };

        let token = self.issue_token();
        self.state = PaymentState::AwaitingConfirmation;
        Ok(self.session.insert(PaymentSession::new(token, method, upi)))
    }

    /// Records the cash handed over by the customer.
    pub fn set_cash_received(&mut self, amount: Money) -> CoreResult<()> {
        validate_cash_received(amount)?;

        let session = self.awaiting_session_mut("enter cash")?;
        if session.method() != PaymentMethod::Cash {
            return Err(CoreError::InvalidTransition {
                action: "enter cash for a non-cash payment",
                state: PaymentState::AwaitingConfirmation,
            });
        }

        session.set_cash_received(amount);
        Ok(())
    }

    /// Applies a QR render result.
    ///
    /// Returns `false` when the result is stale: wrong token, the session
    /// was closed, or the link no longer matches.
    pub fn complete_qr(&mut self, token: SessionToken, outcome: QrOutcome) -> bool {
        if self.state != PaymentState::AwaitingConfirmation {
            return false;
        }

        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.token() != token {
            return false;
        }
        let Some(upi) = session.upi_mut() else {
            return false;
        };
        if &upi.uri != outcome.uri() {
            return false;
        }

        upi.qr = match outcome {
            QrOutcome::Ready { image, .. } => QrStatus::Ready(image),
            QrOutcome::Failed { reason, .. } => QrStatus::Failed(reason),
        };
        true
    }

    /// Puts a failed QR back to pending so it can be rendered again.
    ///
    /// Returns the token and link to render with.
    pub fn retry_qr(&mut self) -> CoreResult<(SessionToken, UpiUri)> {
        let session = self.awaiting_session_mut("retry QR")?;
        let token = session.token();
        let upi = session.upi_mut().ok_or(CoreError::InvalidTransition {
            action: "retry QR for a non-UPI payment",
            state: PaymentState::AwaitingConfirmation,
        })?;

        upi.qr = QrStatus::Pending;
        Ok((token, upi.uri.clone()))
    }

    /// Change owed for the live session (zero when not paying cash).
    pub fn change_amount(&self) -> Money {
        self.session
            .as_ref()
            .and_then(PaymentSession::cash_received)
            .map(|cash| payment::change_amount(cash, self.cart.bill().totals().total))
            .unwrap_or_else(Money::zero)
    }

    /// Validity predicate for the live session.
    pub fn is_payment_valid(&self) -> bool {
        match (&self.session, self.state) {
            (Some(session), PaymentState::AwaitingConfirmation) => payment::is_payment_valid(
                session.method(),
                session.cash_received(),
                self.cart.bill().totals().total,
            ),
            _ => false,
        }
    }

    /// Confirms the payment and freezes the bill.
    ///
    /// The returned snapshot is what gets persisted and exported. The
    /// register stays `Confirmed` until [`Register::start_new_bill`], whether
    /// or not saving succeeds.
    pub fn confirm_payment(&mut self, now: DateTime<Utc>) -> CoreResult<&FinalizedBill> {
        if self.state != PaymentState::AwaitingConfirmation {
            return Err(CoreError::InvalidTransition {
                action: "confirm payment",
                state: self.state,
            });
        }

        if !self.is_payment_valid() {
            let total = self.cart.bill().totals().total;
            let cash = self
                .session
                .as_ref()
                .and_then(PaymentSession::cash_received)
                .unwrap_or_default();
            return Err(CoreError::PaymentInvalid {
                reason: format!("cash received {} is less than total {}", cash, total),
            });
        }

        let session = self.session.take().ok_or(CoreError::InvalidTransition {
            action: "confirm payment",
            state: self.state,
        })?;
        let token = session.token();
        let method = session.method();
        let (cash_received, upi) = session.into_parts();
        let (upi_uri, qr_image) = match upi {
            Some(UpiCheckout { uri, qr }) => (Some(uri), qr.image().cloned()),
            None => (None, None),
        };

        let bill = self.cart.bill().clone();
        self.state = PaymentState::Confirmed;
        self.saved = false;
        Ok(self.finalized.insert(FinalizedBill::new(
            bill,
            method,
            cash_received,
            upi_uri,
            qr_image,
            token,
            now,
        )))
    }

    /// Closes checkout without payment. The bill becomes editable again.
    pub fn cancel_payment(&mut self) -> CoreResult<()> {
        if self.state != PaymentState::AwaitingConfirmation {
            return Err(CoreError::InvalidTransition {
                action: "cancel payment",
                state: self.state,
            });
        }

        self.session = None;
        self.state = PaymentState::Cancelled;
        Ok(())
    }

    /// Records that the confirmed bill started under `token` was persisted.
    ///
    /// Returns `false` if the register has moved on to another bill.
    pub fn mark_saved(&mut self, token: SessionToken) -> bool {
        match &self.finalized {
            Some(bill) if bill.session() == token => {
                self.saved = true;
                true
            }
            _ => false,
        }
    }

    /// Discards the current bill and starts a fresh draft.
    ///
    /// Allowed from every state except `AwaitingConfirmation`. A confirmed
    /// but unsaved bill is dropped; the caller warns the operator first.
    pub fn start_new_bill(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        if self.state == PaymentState::AwaitingConfirmation {
            return Err(CoreError::CheckoutInProgress);
        }

        self.cart = Cart::new(now);
        self.state = PaymentState::NoMethodSelected;
        self.session = None;
        self.finalized = None;
        self.saved = false;
        self.issue_token();
        Ok(())
    }

    /// Consumes the register, returning the draft bill's cart.
    pub fn into_cart(self) -> Cart {
        self.cart
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn issue_token(&mut self) -> SessionToken {
        let token = SessionToken::new(self.next_token);
        self.next_token += 1;
        token
    }

    fn frozen(&self) -> CoreError {
        CoreError::BillFrozen {
            bill_number: self.cart.bill().bill_number().to_string(),
        }
    }

    fn awaiting_session_mut(&mut self, action: &'static str) -> CoreResult<&mut PaymentSession> {
        let state = self.state;
        match (state, self.session.as_mut()) {
            (PaymentState::AwaitingConfirmation, Some(session)) => Ok(session),
            _ => Err(CoreError::InvalidTransition { action, state }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiscountPercent, Product};
    use crate::upi::QrImage;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_735_689_601_234).unwrap()
    }

    fn payee() -> UpiPayee {
        UpiPayee::new("shop@okicici", "WalletTracker").unwrap()
    }

    fn register_with_bill(method: PaymentMethod) -> Register {
        let mut register = Register::new(payee(), now());
        let rice = Product::new("p1", "Rice", Money::from_major(100), 5, "Grocery");
        let cart = register.cart_mut().unwrap();
        cart.add_item(&rice);
        cart.add_item(&rice);
        cart.set_discount_percent(DiscountPercent::from_whole(10));
        cart.set_payment_method(Some(method));
        register
    }

    #[test]
    fn test_checkout_requires_items_and_method() {
        let mut register = Register::new(payee(), now());
        assert_eq!(register.begin_checkout().unwrap_err(), CoreError::EmptyBill);

        let pen = Product::new("p2", "Pen", Money::from_major(10), 3, "Stationery");
        register.cart_mut().unwrap().add_item(&pen);
        assert_eq!(register.begin_checkout().unwrap_err(), CoreError::NoPaymentMethod);
    }

    #[test]
    fn test_cart_locked_during_checkout() {
        let mut register = register_with_bill(PaymentMethod::Card);
        register.begin_checkout().unwrap();

        assert_eq!(register.state(), PaymentState::AwaitingConfirmation);
        assert_eq!(register.cart_mut().unwrap_err(), CoreError::CheckoutInProgress);
        assert_eq!(
            register.start_new_bill(now()).unwrap_err(),
            CoreError::CheckoutInProgress
        );
    }

    #[test]
    fn test_cash_confirmation_flow() {
        let mut register = register_with_bill(PaymentMethod::Cash);
        register.begin_checkout().unwrap();

        register.set_cash_received(Money::from_major(200)).unwrap();
        assert!(!register.is_payment_valid());
        assert!(matches!(
            register.confirm_payment(now()),
            Err(CoreError::PaymentInvalid { .. })
        ));

        register.set_cash_received(Money::from_major(250)).unwrap();
        assert!(register.is_payment_valid());
        assert_eq!(register.change_amount().to_fixed(), "37.60");

        let finalized = register.confirm_payment(now()).unwrap();
        assert_eq!(finalized.totals().total.to_fixed(), "212.40");
        assert_eq!(finalized.change().unwrap().to_fixed(), "37.60");

        assert_eq!(register.state(), PaymentState::Confirmed);
        assert!(matches!(
            register.cart_mut().unwrap_err(),
            CoreError::BillFrozen { .. }
        ));
    }

    #[test]
    fn test_cash_only_for_cash_sessions() {
        let mut register = register_with_bill(PaymentMethod::Card);
        assert!(register.set_cash_received(Money::from_major(5)).is_err());
        register.begin_checkout().unwrap();
        assert!(register.set_cash_received(Money::from_major(5)).is_err());
        assert!(register.set_cash_received(Money::from_minor(-1)).is_err());
    }

    #[test]
    fn test_cancel_unlocks_cart_and_discards_cash() {
        let mut register = register_with_bill(PaymentMethod::Cash);
        register.begin_checkout().unwrap();
        register.set_cash_received(Money::from_major(500)).unwrap();

        register.cancel_payment().unwrap();
        assert_eq!(register.state(), PaymentState::Cancelled);
        assert!(register.session().is_none());
        assert!(register.change_amount().is_zero());
        assert!(register.cart_mut().is_ok());

        assert!(register.cancel_payment().is_err());
    }

    #[test]
    fn test_upi_checkout_and_stale_qr() {
        let mut register = register_with_bill(PaymentMethod::Upi);
        let session = register.begin_checkout().unwrap();
        let first_token = session.token();
        let first_uri = session.upi().unwrap().uri.clone();
        assert_eq!(session.upi().unwrap().qr, QrStatus::Pending);
        assert_eq!(first_uri.param("am"), Some("212.40"));

        register.cancel_payment().unwrap();
        let second_token = register.begin_checkout().unwrap().token();
        assert_ne!(first_token, second_token);

        let image = QrImage::new("image/png", vec![1, 2, 3]);
        let stale = QrOutcome::Ready {
            uri: first_uri.clone(),
            image: image.clone(),
        };
        assert!(!register.complete_qr(first_token, stale));

        let fresh = QrOutcome::Ready {
            uri: first_uri,
            image: image.clone(),
        };
        assert!(register.complete_qr(second_token, fresh));

        let finalized = register.confirm_payment(now()).unwrap();
        assert_eq!(finalized.qr_image(), Some(&image));
        assert!(finalized.upi_uri().is_some());
    }

    #[test]
    fn test_qr_failure_then_retry() {
        let mut register = register_with_bill(PaymentMethod::Upi);
        let session = register.begin_checkout().unwrap();
        let token = session.token();
        let uri = session.upi().unwrap().uri.clone();

        let failed = QrOutcome::Failed {
            uri: uri.clone(),
            reason: "timeout".to_string(),
        };
        assert!(register.complete_qr(token, failed));
        assert_eq!(
            register.session().unwrap().upi().unwrap().qr,
            QrStatus::Failed("timeout".to_string())
        );

        let (retry_token, retry_uri) = register.retry_qr().unwrap();
        assert_eq!(retry_token, token);
        assert_eq!(retry_uri, uri);
        assert_eq!(register.session().unwrap().upi().unwrap().qr, QrStatus::Pending);
    }

    #[test]
    fn test_save_bookkeeping_and_new_bill() {
        let mut register = register_with_bill(PaymentMethod::Card);
        register.begin_checkout().unwrap();
        let token = register.confirm_payment(now()).unwrap().session();
        assert!(!register.is_saved());

        assert!(!register.mark_saved(SessionToken::new(999)));
        assert!(register.mark_saved(token));
        assert!(register.is_saved());

        let later = Utc.timestamp_millis_opt(1_735_776_000_042).unwrap();
        register.start_new_bill(later).unwrap();
        assert_eq!(register.state(), PaymentState::NoMethodSelected);
        assert!(register.finalized().is_none());
        assert!(register.cart().is_empty());
        assert_eq!(register.cart().bill().bill_number().as_str(), "WT202501020042");
        assert!(!register.mark_saved(token));
    }

    #[test]
    fn test_cannot_checkout_twice() {
        let mut register = register_with_bill(PaymentMethod::Card);
        register.begin_checkout().unwrap();
        assert!(matches!(
            register.begin_checkout(),
            Err(CoreError::InvalidTransition { .. })
        ));
    }
}
