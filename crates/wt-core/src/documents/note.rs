//! Bill notes.
//!
//! The compact note rides in the UPI `tn` field, which most payment apps cap
//! at a few hundred characters, so it stays on one line and uses bare
//! two-decimal amounts for items. The detailed note is for the operator's
//! log only.

use super::StoreProfile;
use crate::bill::Bill;

/// Single-line note, e.g.
/// `Bill WT202501011234: Rice(2x100.00). Subtotal ₹200.00, Disc ₹20.00, Tax ₹32.40, Total ₹212.40`.
///
/// The discount clause is omitted when there is no discount.
pub fn compact(bill: &Bill) -> String {
    let items = bill
        .items()
        .iter()
        .map(|line| {
            format!(
                "{}({}x{})",
                line.product().name,
                line.quantity(),
                line.unit_price().to_fixed()
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let totals = bill.totals();
    let mut note = format!(
        "Bill {}: {}. Subtotal {}",
        bill.bill_number(),
        items,
        totals.subtotal
    );
    if totals.discount.is_positive() {
        note.push_str(&format!(", Disc {}", totals.discount));
    }
    note.push_str(&format!(", Tax {}, Total {}", totals.tax, totals.total));
    note
}

/// Multi-line note logged alongside a UPI request.
pub fn detailed(bill: &Bill, store: &StoreProfile) -> String {
    let totals = bill.totals();
    let mut lines = vec![
        store.name.clone(),
        format!("Bill: {}", bill.bill_number()),
        format!("Date: {}", store.format_date(bill.created_at())),
        "---".to_string(),
    ];

    for line in bill.items() {
        lines.push(line.product().name.clone());
        lines.push(format!(
            "{}x{} = {}",
            line.quantity(),
            line.unit_price(),
            line.subtotal()
        ));
    }

    lines.push("---".to_string());
    lines.push(format!("Subtotal: {}", totals.subtotal));
    if totals.discount.is_positive() {
        lines.push(format!("Discount: {}", totals.discount));
    }
    lines.push(format!(
        "GST({}%): {}",
        bill.tax_rate().percent_label(),
        totals.tax
    ));
    lines.push(format!("TOTAL: {}", totals.total));
    lines.push("Thank you!".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::BillNumber;
    use crate::cart::Cart;
    use crate::money::Money;
    use crate::types::{DiscountPercent, Product};
    use chrono::{TimeZone, Utc};

    fn cart(discount: i64) -> Cart {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap();
        let number = BillNumber::parse("WT202501011234").unwrap();
        let mut cart = Cart::from_bill(Bill::with_number(number, now));
        let rice = Product::new("p1", "Rice", Money::from_major(100), 5, "Grocery");
        let pen = Product::new("p2", "Pen", Money::from_minor(1_050), 9, "Stationery");
        cart.add_item(&rice);
        cart.add_item(&rice);
        cart.add_item(&pen);
        cart.set_discount_percent(DiscountPercent::from_whole(discount));
        cart
    }

    #[test]
    fn test_compact_note() {
        assert_eq!(
            compact(cart(10).bill()),
            "Bill WT202501011234: Rice(2x100.00), Pen(1x10.50). \
             Subtotal ₹210.50, Disc ₹21.05, Tax ₹34.10, Total ₹223.55"
        );
    }

    #[test]
    fn test_compact_note_without_discount() {
        let note = compact(cart(0).bill());
        assert!(!note.contains("Disc"));
        assert!(note.ends_with(", Tax ₹37.89, Total ₹248.39"));
    }

    #[test]
    fn test_detailed_note() {
        let note = detailed(cart(0).bill(), &StoreProfile::default());
        let lines: Vec<_> = note.lines().collect();
        assert_eq!(lines[0], "WALLETTRACKER");
        assert_eq!(lines[1], "Bill: WT202501011234");
        assert_eq!(lines[2], "Date: 01/01/2025");
        assert_eq!(lines[5], "2x₹100.00 = ₹200.00");
        assert_eq!(lines.last(), Some(&"Thank you!"));
        assert!(!note.contains("Discount"));
    }
}
