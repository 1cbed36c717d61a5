//! # Checkout Commands
//!
//! Payment flow for the current bill.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout ──► cash? ──► confirm ──► save ──► export ──► new             │
//! │      │                     │          │                                 │
//! │      │ UPI                 │          └── failed: retry (manual only)   │
//! │      ▼                     │                                            │
//! │  spawn QR render ──► complete_qr(token)                                 │
//! │      │                                                                  │
//! │      └── failed: retry re-renders                                       │
//! │                                                                         │
//! │  cancel ──► bill editable again                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The QR image is rendered on a spawned task. It reports back with the
//! session token it was started for; a result arriving after cancel or a
//! new bill is discarded by the register.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wt_api::{render_outcome, ExportFormat, QrRenderer, StoredBill};
use wt_core::documents::note;
use wt_core::validation::validate_note_length;
use wt_core::{
    BillPayload, Money, PaymentMethod, PaymentState, QrStatus, SessionToken, UpiUri,
};

use super::{catalog, BillView};
use crate::context::AppContext;
use crate::error::CommandError;
use crate::state::RegisterState;

/// Checkout opened.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStarted {
    pub bill_number: String,
    pub method: PaymentMethod,
    pub total: Money,
    /// UPI link, shown right away so the amount can be read out.
    pub upi_uri: Option<UpiUri>,
    /// Resolves to whether the rendered QR was applied.
    #[serde(skip)]
    pub qr_task: Option<JoinHandle<bool>>,
}

/// Cash tendered so far.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashStatus {
    pub cash_received: Money,
    pub total: Money,
    pub change: Money,
    pub valid: bool,
}

/// Payment confirmed; `saved` or `save_error` tells how persisting went.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub bill_number: String,
    pub method: PaymentMethod,
    pub total: Money,
    pub change: Option<Money>,
    pub saved: Option<StoredBill>,
    pub save_error: Option<CommandError>,
}

#[derive(Debug)]
pub enum RetryOutcome {
    /// The confirmed bill reached the backend.
    Saved(StoredBill),
    /// The QR image is being rendered again.
    QrRequested(JoinHandle<bool>),
}

/// QR state of the open UPI checkout, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QrView {
    Pending,
    Ready { bytes: usize, content_type: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    pub bill: BillView,
    /// Number of a confirmed bill that was dropped without being saved.
    pub discarded_unsaved: Option<String>,
}

/// Opens checkout for the current bill.
///
/// ## Errors
/// - `PAYMENT_ERROR` if the bill is empty, has no payment method, or is
///   already in checkout
/// - `CART_LOCKED` if the bill was confirmed
pub fn begin_checkout(ctx: &AppContext) -> Result<CheckoutStarted, CommandError> {
    debug!("begin_checkout command");

    let (mut started, render) = ctx.register.with_register_mut(
        |register| -> Result<(CheckoutStarted, Option<(SessionToken, UpiUri)>), CommandError> {
            let session = register.begin_checkout()?;
            let token = session.token();
            let method = session.method();
            let upi_uri = session.upi().map(|upi| upi.uri.clone());

            let bill = register.cart().bill();
            if upi_uri.is_some() {
                let compact = note::compact(bill);
                if let Err(e) = validate_note_length(&compact, ctx.note_limit) {
                    warn!(error = %e, length = compact.chars().count(), "UPI note may be truncated by payment apps");
                }
                debug!(note = %note::detailed(bill, &ctx.store), "UPI payment requested");
            }

            let started = CheckoutStarted {
                bill_number: bill.bill_number().to_string(),
                method,
                total: bill.totals().total,
                upi_uri: upi_uri.clone(),
                qr_task: None,
            };
            Ok((started, upi_uri.map(|uri| (token, uri))))
        },
    )?;

    info!(
        bill_number = %started.bill_number,
        method = %started.method,
        total = %started.total,
        "Checkout started"
    );

    if let Some((token, uri)) = render {
        started.qr_task = Some(spawn_qr_render(
            ctx.register.clone(),
            ctx.services.qr.clone(),
            token,
            uri,
        ));
    }
    Ok(started)
}

/// Renders the QR image in the background and hands it to the register.
pub fn spawn_qr_render(
    register: RegisterState,
    renderer: Arc<dyn QrRenderer>,
    token: SessionToken,
    uri: UpiUri,
) -> JoinHandle<bool> {
    tokio::spawn(async move {
        let outcome = render_outcome(renderer.as_ref(), uri).await;
        let applied = register.with_register_mut(|r| r.complete_qr(token, outcome));
        if !applied {
            debug!(%token, "Discarded QR result for a closed checkout");
        }
        applied
    })
}

/// QR state of the open checkout, if it is a UPI one.
pub fn qr_status(ctx: &AppContext) -> Option<QrView> {
    ctx.register.with_register(|register| -> Option<QrView> {
        let upi = register.session()?.upi()?;
        Some(match &upi.qr {
            QrStatus::Pending => QrView::Pending,
            QrStatus::Ready(image) => QrView::Ready {
                bytes: image.bytes.len(),
                content_type: image.content_type.clone(),
            },
            QrStatus::Failed(reason) => QrView::Failed {
                reason: reason.clone(),
            },
        })
    })
}

/// Records cash handed over, e.g. `500` or `₹250.50`.
pub fn enter_cash(ctx: &AppContext, input: &str) -> Result<CashStatus, CommandError> {
    let amount = Money::from_str(input)
        .map_err(|e| CommandError::validation(format!("Invalid amount '{}': {}", input.trim(), e)))?;

    ctx.register.with_register_mut(|register| -> Result<CashStatus, CommandError> {
        register.set_cash_received(amount)?;
        Ok(CashStatus {
            cash_received: amount,
            total: register.cart().bill().totals().total,
            change: register.change_amount(),
            valid: register.is_payment_valid(),
        })
    })
}

/// Confirms the payment, then saves the bill.
///
/// A failed save does not undo the confirmation. The bill stays frozen and
/// unsaved until `retry` succeeds or the operator starts a new bill.
pub async fn confirm(ctx: &AppContext) -> Result<Confirmation, CommandError> {
    debug!("confirm command");

    let (mut confirmation, payload, token) = ctx.register.with_register_mut(
        |register| -> Result<(Confirmation, BillPayload, SessionToken), CommandError> {
            let finalized = register.confirm_payment(Utc::now())?;
            let confirmation = Confirmation {
                bill_number: finalized.bill_number().to_string(),
                method: finalized.payment_method(),
                total: finalized.totals().total,
                change: finalized.change(),
                saved: None,
                save_error: None,
            };
            Ok((confirmation, finalized.to_payload(), finalized.session()))
        },
    )?;

    info!(
        bill_number = %confirmation.bill_number,
        method = %confirmation.method,
        total = %confirmation.total,
        "Payment confirmed"
    );

    match persist(ctx, &payload, token).await {
        Ok(stored) => confirmation.saved = Some(stored),
        Err(e) => {
            warn!(bill_number = %confirmation.bill_number, error = %e, "Bill not saved");
            confirmation.save_error = Some(e);
        }
    }
    Ok(confirmation)
}

async fn persist(
    ctx: &AppContext,
    payload: &BillPayload,
    token: SessionToken,
) -> Result<StoredBill, CommandError> {
    let session = ctx.session.current()?;
    let stored = ctx.services.bills.save_bill(&session, payload).await?;

    if !ctx.register.with_register_mut(|r| r.mark_saved(token)) {
        debug!(bill_number = %payload.bill_number, "Register moved on before the save finished");
    }
    Ok(stored)
}

/// Retries whatever failed last: saving a confirmed bill, or rendering the
/// QR image of an open UPI checkout.
pub fn plan_retry(ctx: &AppContext) -> Result<RetryTarget, CommandError> {
    ctx.register.with_register_mut(|register| -> Result<RetryTarget, CommandError> {
        match register.state() {
            PaymentState::Confirmed if !register.is_saved() => {
                let finalized = register
                    .finalized()
                    .ok_or_else(|| CommandError::payment("No confirmed bill to save"))?;
                Ok(RetryTarget::Save(finalized.to_payload(), finalized.session()))
            }
            PaymentState::Confirmed => Err(CommandError::payment("Bill is already saved")),
            PaymentState::AwaitingConfirmation => {
                let ready = register
                    .session()
                    .and_then(|s| s.upi())
                    .map_or(false, |upi| matches!(upi.qr, QrStatus::Ready(_)));
                if ready {
                    return Err(CommandError::payment("QR code is already shown"));
                }
                let (token, uri) = register.retry_qr()?;
                Ok(RetryTarget::Qr(token, uri))
            }
            PaymentState::NoMethodSelected | PaymentState::Cancelled => {
                Err(CommandError::payment("Nothing to retry"))
            }
        }
    })
}

/// What [`plan_retry`] decided to do, before any I/O.
#[derive(Debug)]
pub enum RetryTarget {
    Save(BillPayload, SessionToken),
    Qr(SessionToken, UpiUri),
}

/// Plans the retry and performs it.
pub async fn retry(ctx: &AppContext) -> Result<RetryOutcome, CommandError> {
    debug!("retry command");

    match plan_retry(ctx)? {
        RetryTarget::Save(payload, token) => {
            let stored = persist(ctx, &payload, token).await?;
            info!(bill_number = %payload.bill_number, "Bill saved on retry");
            Ok(RetryOutcome::Saved(stored))
        }
        RetryTarget::Qr(token, uri) => {
            info!(%token, "Rendering QR again");
            Ok(RetryOutcome::QrRequested(spawn_qr_render(
                ctx.register.clone(),
                ctx.services.qr.clone(),
                token,
                uri,
            )))
        }
    }
}

/// Closes checkout without payment.
pub fn cancel(ctx: &AppContext) -> Result<BillView, CommandError> {
    ctx.register.with_register_mut(|register| -> Result<BillView, CommandError> {
        register.cancel_payment()?;
        info!(bill_number = %register.cart().bill().bill_number(), "Payment cancelled");
        Ok(BillView::from(&*register))
    })
}

/// Writes the confirmed bill in `format` (`txt`, `json`, `print`).
pub async fn export(ctx: &AppContext, format: &str) -> Result<Vec<PathBuf>, CommandError> {
    let format = ExportFormat::from_str(format)?;
    let finalized = ctx
        .register
        .with_register(|register| register.finalized().cloned())
        .ok_or_else(|| CommandError::payment("Confirm the payment before exporting"))?;

    Ok(ctx.services.export.export(format, &finalized, &ctx.store).await?)
}

/// Starts a fresh bill, then reloads the catalog when logged in.
pub async fn new_bill(ctx: &AppContext) -> Result<NewBill, CommandError> {
    debug!("new_bill command");

    let discarded_unsaved = ctx.register.with_register_mut(
        |register| -> Result<Option<String>, CommandError> {
            let unsaved = register
                .finalized()
                .filter(|_| !register.is_saved())
                .map(|finalized| finalized.bill_number().to_string());
            register.start_new_bill(Utc::now())?;
            Ok(unsaved)
        },
    )?;

    if let Some(bill_number) = &discarded_unsaved {
        warn!(bill_number = %bill_number, "Confirmed bill was never saved");
    }

    if ctx.session.is_logged_in() {
        if let Err(e) = catalog::load_products(ctx).await {
            warn!(error = %e, "Catalog reload failed; keeping previous products");
        }
    }

    Ok(NewBill {
        bill: ctx.register.with_register(|register| BillView::from(register)),
        discarded_unsaved,
    })
}
