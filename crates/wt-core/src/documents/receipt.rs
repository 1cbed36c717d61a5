//! Plain-text receipt.
//!
//! ```text
//! ----------------------------------------
//!         WALLETTRACKER BILL
//! ----------------------------------------
//! Bill #: WT202501011234
//! Date: 01/01/2025, 05:30:01
//! ----------------------------------------
//! Items:
//! Rice (Grocery)
//!   Qty: 2 x ₹100.00
//!   Subtotal: ₹200.00
//! ----------------------------------------
//! Subtotal: ₹200.00
//! Discount (10%): ₹20.00
//! Tax (18% GST): ₹32.40
//! Total: ₹212.40
//! Payment Method: Cash Payment
//! Cash Received: ₹250.00
//! Change Given: ₹37.60
//! ----------------------------------------
//! Thank you for shopping with us!
//! ```

use super::{header_lines, item_lines, payment_lines, summary_lines, total_line, StoreProfile};
use crate::bill::FinalizedBill;

/// Width of the horizontal rules.
pub const RULE_WIDTH: usize = 40;

const TITLE_INDENT: &str = "        ";

/// Renders the receipt text. Every line ends with `\n`.
pub fn render(finalized: &FinalizedBill, store: &StoreProfile) -> String {
    let bill = finalized.bill();
    let rule = "-".repeat(RULE_WIDTH);
    let mut lines: Vec<String> = Vec::new();

    lines.push(rule.clone());
    lines.push(format!("{}{}", TITLE_INDENT, store.title()));
    lines.push(rule.clone());
    lines.extend(header_lines(bill, store));
    lines.push(rule.clone());

    lines.push("Items:".to_string());
    for line in bill.items() {
        let [name, qty, subtotal] = item_lines(line);
        lines.push(name);
        lines.push(format!("  {}", qty));
        lines.push(format!("  {}", subtotal));
    }
    lines.push(rule.clone());

    lines.extend(summary_lines(bill));
    lines.push(total_line(bill));
    lines.extend(payment_lines(finalized));
    lines.push(rule);
    lines.push(store.footer.clone());

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::register::Register;
    use crate::types::{DiscountPercent, PaymentMethod, Product};
    use crate::upi::UpiPayee;
    use chrono::{TimeZone, Utc};

    fn confirmed(method: PaymentMethod, discount: i64, cash: Option<i64>) -> FinalizedBill {
        let now = Utc.timestamp_millis_opt(1_735_689_601_234).unwrap();
        let payee = UpiPayee::new("shop@okicici", "WalletTracker").unwrap();
        let mut register = Register::new(payee, now);
        let rice = Product::new("p1", "Rice", Money::from_major(100), 5, "Grocery");

        let cart = register.cart_mut().unwrap();
        cart.add_item(&rice);
        cart.add_item(&rice);
        cart.set_discount_percent(DiscountPercent::from_whole(discount));
        cart.set_payment_method(Some(method));

        register.begin_checkout().unwrap();
        if let Some(cash) = cash {
            register.set_cash_received(Money::from_major(cash)).unwrap();
        }
        register.confirm_payment(now).unwrap().clone()
    }

    #[test]
    fn test_cash_receipt() {
        let text = render(
            &confirmed(PaymentMethod::Cash, 10, Some(250)),
            &StoreProfile::default(),
        );

        let expected = "\
----------------------------------------
        WALLETTRACKER BILL
----------------------------------------
Bill #: WT202501011234
Date: 01/01/2025, 05:30:01
----------------------------------------
Items:
Rice (Grocery)
  Qty: 2 x ₹100.00
  Subtotal: ₹200.00
----------------------------------------
Subtotal: ₹200.00
Discount (10%): ₹20.00
Tax (18% GST): ₹32.40
Total: ₹212.40
Payment Method: Cash Payment
Cash Received: ₹250.00
Change Given: ₹37.60
----------------------------------------
Thank you for shopping with us!
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_card_receipt_without_discount() {
        let text = render(&confirmed(PaymentMethod::Card, 0, None), &StoreProfile::default());
        assert!(!text.contains("Discount"));
        assert!(!text.contains("Cash Received"));
        assert!(text.contains("Tax (18% GST): ₹36.00\n"));
        assert!(text.contains("Payment Method: Card Payment\n"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let bill = confirmed(PaymentMethod::Cash, 5, Some(300));
        let store = StoreProfile::default();
        assert_eq!(render(&bill, &store), render(&bill, &store));
    }
}
