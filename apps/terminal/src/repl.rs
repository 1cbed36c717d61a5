//! # Operator Console
//!
//! Line-oriented front end. Each input line parses into a [`Command`],
//! runs its handler, and prints either the result or
//! `error [CODE]: message`. Errors never end the loop; only `quit` or end
//! of input do.

use std::fmt::Write as _;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;
use wt_core::{CartChange, IgnoreReason, Product};

use crate::commands::catalog::ProductChanged;
use crate::commands::checkout::{self, QrView, RetryOutcome};
use crate::commands::{auth, cart, catalog, BillView};
use crate::context::AppContext;
use crate::error::CommandError;

pub const PROMPT: &str = "wt> ";

pub const HELP: &str = "\
Commands:
  login <email> <password>   log in and load products
  logout                     forget the session
  products                   reload products from the backend
  search [query]             search products (blank: quick picks)
  lowstock                   products at or below their alert level
  categories                 categories of the loaded products
  product add <fields>       create a product, e.g. name=Tea; price=80; category=Beverages
  product edit <ref> <fields>  change fields of a product, e.g. stock=12; price=85
  product rm <ref>           delete a product
  add <productId|#n>         add one unit (#n = nth result of the last listing)
  qty <line> <n>             set a line's quantity (0 removes it)
  rm <line>                  remove a line
  clear                      empty the bill
  discount <percent>         bill discount, e.g. 10 or 12.5%
  phone [number]             customer phone (blank clears)
  method cash|upi|card       payment method
  show                       current bill
  checkout                   start payment
  cash <amount>              cash received
  qr                         UPI QR status
  confirm                    confirm payment and save the bill
  retry                      retry a failed save or QR render
  cancel                     cancel payment
  export txt|json|print      write the confirmed bill to the export directory
  new                        start the next bill
  help                       this list
  quit                       exit";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    Logout,
    Products,
    Search(String),
    LowStock,
    Categories,
    ProductAdd(String),
    ProductEdit { reference: String, fields: String },
    ProductRemove(String),
    Add(String),
    Qty { line: usize, quantity: i64 },
    Remove(usize),
    Clear,
    Discount(String),
    Phone(Option<String>),
    Method(String),
    Show,
    Checkout,
    Cash(String),
    Qr,
    Confirm,
    Retry,
    Cancel,
    Export(String),
    New,
    Help,
    Quit,
}

impl Command {
    /// Console verb, safe to log (no arguments).
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Products => "products",
            Command::Search(_) => "search",
            Command::LowStock => "lowstock",
            Command::Categories => "categories",
            Command::ProductAdd(_) => "product add",
            Command::ProductEdit { .. } => "product edit",
            Command::ProductRemove(_) => "product rm",
            Command::Add(_) => "add",
            Command::Qty { .. } => "qty",
            Command::Remove(_) => "rm",
            Command::Clear => "clear",
            Command::Discount(_) => "discount",
            Command::Phone(_) => "phone",
            Command::Method(_) => "method",
            Command::Show => "show",
            Command::Checkout => "checkout",
            Command::Cash(_) => "cash",
            Command::Qr => "qr",
            Command::Confirm => "confirm",
            Command::Retry => "retry",
            Command::Cancel => "cancel",
            Command::Export(_) => "export",
            Command::New => "new",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }
}

fn arg<'a>(rest: &'a str, usage: &str) -> Result<&'a str, CommandError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(CommandError::validation(format!("Usage: {}", usage)));
    }
    Ok(rest)
}

fn line_number(raw: &str, usage: &str) -> Result<usize, CommandError> {
    raw.parse::<usize>()
        .map_err(|_| CommandError::validation(format!("Usage: {}", usage)))
}

fn parse_product(rest: &str) -> Result<Command, CommandError> {
    let usage = "product add|edit|rm ...";
    let (action, rest) = arg(rest, usage)?
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    let rest = rest.trim();

    let command = match action.to_lowercase().as_str() {
        "add" => Command::ProductAdd(arg(rest, "product add <fields>")?.to_string()),
        "edit" => {
            let usage = "product edit <ref> <fields>";
            let (reference, fields) = arg(rest, usage)?
                .split_once(char::is_whitespace)
                .ok_or_else(|| CommandError::validation(format!("Usage: {}", usage)))?;
            Command::ProductEdit {
                reference: reference.to_string(),
                fields: fields.trim().to_string(),
            }
        }
        "rm" => Command::ProductRemove(arg(rest, "product rm <ref>")?.to_string()),
        _ => return Err(CommandError::validation(format!("Usage: {}", usage))),
    };
    Ok(command)
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (verb, rest) = input
            .split_once(char::is_whitespace)
            .unwrap_or((input, ""));
        let rest = rest.trim();

        let command = match verb.to_lowercase().as_str() {
            "login" => {
                let usage = "login <email> <password>";
                let (email, password) = arg(rest, usage)?
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| CommandError::validation(format!("Usage: {}", usage)))?;
                Command::Login {
                    email: email.to_string(),
                    password: password.trim().to_string(),
                }
            }
            "logout" => Command::Logout,
            "products" => Command::Products,
            "search" => Command::Search(rest.to_string()),
            "lowstock" => Command::LowStock,
            "categories" => Command::Categories,
            "product" => parse_product(rest)?,
            "add" => Command::Add(arg(rest, "add <productId|#n>")?.to_string()),
            "qty" => {
                let usage = "qty <line> <n>";
                let mut parts = rest.split_whitespace();
                let (Some(line), Some(quantity), None) = (parts.next(), parts.next(), parts.next())
                else {
                    return Err(CommandError::validation(format!("Usage: {}", usage)));
                };
                Command::Qty {
                    line: line_number(line, usage)?,
                    quantity: quantity
                        .parse()
                        .map_err(|_| CommandError::validation(format!("Usage: {}", usage)))?,
                }
            }
            "rm" => Command::Remove(line_number(arg(rest, "rm <line>")?, "rm <line>")?),
            "clear" => Command::Clear,
            "discount" => Command::Discount(arg(rest, "discount <percent>")?.to_string()),
            "phone" => Command::Phone(Some(rest.to_string()).filter(|p| !p.is_empty())),
            "method" => Command::Method(arg(rest, "method cash|upi|card")?.to_string()),
            "show" => Command::Show,
            "checkout" => Command::Checkout,
            "cash" => Command::Cash(arg(rest, "cash <amount>")?.to_string()),
            "qr" => Command::Qr,
            "confirm" => Command::Confirm,
            "retry" => Command::Retry,
            "cancel" => Command::Cancel,
            "export" => Command::Export(arg(rest, "export txt|json|print")?.to_string()),
            "new" => Command::New,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::unknown_command(verb)),
        };
        Ok(command)
    }
}

/// Runs the console until `quit` or end of input.
pub async fn run<R, W>(ctx: &AppContext, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output
        .write_all(format!("{}\n{}", ctx.store.title(), PROMPT).as_bytes())
        .await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;
            continue;
        }

        let reply = match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => execute(ctx, command).await,
            Err(e) => Err(e),
        };

        let text = match reply {
            Ok(text) => text,
            Err(e) => format!("error [{}]: {}", e.code.as_str(), e.message),
        };
        output.write_all(text.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;
    }

    output.write_all(b"bye\n").await?;
    output.flush().await?;
    Ok(())
}

/// Runs one command and formats its result.
pub async fn execute(ctx: &AppContext, command: Command) -> Result<String, CommandError> {
    debug!(command = command.name(), "console command");

    let text = match command {
        Command::Login { email, password } => {
            let login = auth::login(ctx, &email, &password).await?;
            let mut text = format!("Logged in as {}", login.user);
            match catalog::load_products(ctx).await {
                Ok(loaded) => {
                    let _ = write!(text, "\n{} products loaded", loaded.products);
                }
                Err(e) => {
                    let _ = write!(text, "\nerror [{}]: {}", e.code.as_str(), e.message);
                }
            }
            text
        }
        Command::Logout => {
            if auth::logout(ctx) {
                "Logged out".to_string()
            } else {
                "Not logged in".to_string()
            }
        }
        Command::Products => {
            let loaded = catalog::load_products(ctx).await?;
            let mut text = format!(
                "{} products loaded ({} low on stock)",
                loaded.products, loaded.low_stock
            );
            if let Some(refresh) = loaded.refresh {
                for name in refresh.clamped {
                    let _ = write!(text, "\nQuantity of {} lowered to current stock", name);
                }
                for name in refresh.removed {
                    let _ = write!(text, "\n{} removed from the bill (unavailable)", name);
                }
            }
            text
        }
        Command::Search(query) => format_products(&catalog::search(ctx, &query)),
        Command::LowStock => format_products(&catalog::low_stock(ctx)),
        Command::Categories => {
            let categories = catalog::categories(ctx);
            if categories.is_empty() {
                "No categories".to_string()
            } else {
                categories.join("\n")
            }
        }
        Command::ProductAdd(fields) => {
            let changed = catalog::create_product(ctx, &fields).await?;
            format!("Added {} ({})", changed.product.name, changed.product.id)
        }
        Command::ProductEdit { reference, fields } => {
            let changed = catalog::update_product(ctx, &reference, &fields).await?;
            format_product_change("Updated", &changed)
        }
        Command::ProductRemove(reference) => {
            let changed = catalog::delete_product(ctx, &reference).await?;
            format_product_change("Deleted", &changed)
        }
        Command::Add(reference) => {
            let response = cart::add_item(ctx, &reference)?;
            format_change(&response.change, &response.bill)
        }
        Command::Qty { line, quantity } => {
            let response = cart::update_quantity(ctx, line, quantity)?;
            format_change(&response.change, &response.bill)
        }
        Command::Remove(line) => {
            let response = cart::remove_item(ctx, line)?;
            format_change(&response.change, &response.bill)
        }
        Command::Clear => {
            let response = cart::clear(ctx)?;
            format_change(&response.change, &response.bill)
        }
        Command::Discount(percent) => format_bill(&cart::set_discount(ctx, &percent)?),
        Command::Phone(phone) => format_bill(&cart::set_phone(ctx, phone.as_deref())?),
        Command::Method(method) => format_bill(&cart::set_method(ctx, &method)?),
        Command::Show => format_bill(&cart::show(ctx)),
        Command::Checkout => {
            let started = checkout::begin_checkout(ctx)?;
            let mut text = format!(
                "Checkout {} by {}: total {}",
                started.bill_number,
                started.method.display_text(),
                started.total
            );
            if let Some(uri) = &started.upi_uri {
                let _ = write!(text, "\nUPI link: {}\nQR code is being prepared (type 'qr')", uri);
            }
            text
        }
        Command::Cash(amount) => {
            let status = checkout::enter_cash(ctx, &amount)?;
            if status.valid {
                format!(
                    "Cash {} for total {}; change {}",
                    status.cash_received, status.total, status.change
                )
            } else {
                format!(
                    "Cash {} is less than total {}",
                    status.cash_received, status.total
                )
            }
        }
        Command::Qr => match checkout::qr_status(ctx) {
            None => "No UPI payment in progress".to_string(),
            Some(QrView::Pending) => "QR code is being prepared".to_string(),
            Some(QrView::Ready {
                bytes,
                content_type,
            }) => format!("QR code ready ({}, {} bytes)", content_type, bytes),
            Some(QrView::Failed { reason }) => {
                format!("QR code failed: {}. Type 'retry' or read out the link.", reason)
            }
        },
        Command::Confirm => {
            let confirmation = checkout::confirm(ctx).await?;
            let mut text = format!(
                "Bill {} paid: {} by {}",
                confirmation.bill_number,
                confirmation.total,
                confirmation.method.display_text()
            );
            if let Some(change) = confirmation.change {
                let _ = write!(text, "\nChange: {}", change);
            }
            match (&confirmation.saved, &confirmation.save_error) {
                (Some(_), _) => text.push_str("\nSaved"),
                (None, Some(e)) => {
                    let _ = write!(
                        text,
                        "\nNot saved: {} [{}]. Type 'retry' to save again.",
                        e.message,
                        e.code.as_str()
                    );
                }
                (None, None) => {}
            }
            text
        }
        Command::Retry => match checkout::retry(ctx).await? {
            RetryOutcome::Saved(stored) => format!("Bill {} saved", stored.bill_number),
            RetryOutcome::QrRequested(_) => "QR code is being prepared again".to_string(),
        },
        Command::Cancel => {
            let bill = checkout::cancel(ctx)?;
            format!("Payment cancelled\n{}", format_bill(&bill))
        }
        Command::Export(format) => {
            let written = checkout::export(ctx, &format).await?;
            let mut text = String::from("Exported:");
            for path in written {
                let _ = write!(text, "\n  {}", path.display());
            }
            text
        }
        Command::New => {
            let fresh = checkout::new_bill(ctx).await?;
            let mut text = String::new();
            if let Some(bill_number) = fresh.discarded_unsaved {
                let _ = writeln!(text, "Warning: bill {} was never saved", bill_number);
            }
            let _ = write!(text, "New bill {}", fresh.bill.bill_number);
            text
        }
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(text)
}

fn format_product_change(verb: &str, changed: &ProductChanged) -> String {
    let mut text = format!("{} {} ({})", verb, changed.product.name, changed.product.id);
    if let Some(refresh) = &changed.refresh {
        for name in &refresh.clamped {
            let _ = write!(text, "\nQuantity of {} lowered to current stock", name);
        }
        for name in &refresh.removed {
            let _ = write!(text, "\n{} removed from the bill (unavailable)", name);
        }
    }
    text
}

fn format_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products".to_string();
    }
    let mut text = String::new();
    for (i, product) in products.iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        let _ = write!(
            text,
            "#{:<3} {:<24} {:>10}  stock {:<4} {}",
            i + 1,
            product.name,
            product.price.to_string(),
            product.stock,
            product.category
        );
        if product.is_low_stock() {
            text.push_str("  (low)");
        }
    }
    text
}

fn format_change(change: &CartChange, bill: &BillView) -> String {
    let note = match change {
        CartChange::Ignored(IgnoreReason::OutOfStock) => Some("Out of stock".to_string()),
        CartChange::Ignored(IgnoreReason::StockLimit { stock }) => {
            Some(format!("Only {} in stock", stock))
        }
        CartChange::Removed { product_name, .. } => Some(format!("Removed {}", product_name)),
        CartChange::Cleared => Some("Bill cleared".to_string()),
        CartChange::Clamped { quantity, .. } => {
            Some(format!("Stock changed, quantity lowered to {}", quantity))
        }
        CartChange::Added { .. } | CartChange::Incremented { .. } | CartChange::Updated { .. } => {
            None
        }
    };
    match note {
        Some(note) => format!("{}\n{}", note, format_bill(bill)),
        None => format_bill(bill),
    }
}

fn format_bill(bill: &BillView) -> String {
    let mut text = format!("Bill {} [{:?}]", bill.bill_number, bill.state);
    if bill.lines.is_empty() {
        text.push_str("\n  (no items)");
    }
    for line in &bill.lines {
        let _ = write!(
            text,
            "\n  {:>2}. {:<24} {:>3} x {:>10} = {:>10}",
            line.line,
            line.name,
            line.quantity,
            line.unit_price.to_string(),
            line.subtotal.to_string()
        );
    }

    let totals = &bill.totals;
    let _ = write!(text, "\n  Items: {}", bill.total_items);
    let _ = write!(text, "\n  Subtotal: {}", totals.subtotal);
    if totals.discount.is_positive() {
        let _ = write!(
            text,
            "\n  Discount ({}%): -{}",
            bill.discount_percent, totals.discount
        );
    }
    let _ = write!(text, "\n  GST ({}%): {}", bill.tax_label, totals.tax);
    let _ = write!(text, "\n  Total: {}", totals.total);
    if let Some(method) = bill.payment_method {
        let _ = write!(text, "\n  Payment: {}", method.display_text());
    }
    if let Some(phone) = &bill.customer_phone {
        let _ = write!(text, "\n  Phone: {}", phone);
    }
    text
}
