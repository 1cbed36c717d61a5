//! Property tests for cart invariants under random operation sequences.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use wt_core::totals::compute;
use wt_core::{Cart, DiscountPercent, Money, Product, TaxRate};

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Update(usize, i64),
    Remove(usize),
    Discount(i64),
    /// Catalog reload changes one product's stock and price, then the
    /// product is picked again.
    Restock(usize, u32, i64),
    /// Catalog reload pushed into the bill.
    Refresh,
}

fn catalog() -> impl Strategy<Value = Vec<Product>> {
    prop::collection::vec((0i64..100_000, 0u32..8), 1..6).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (price, stock))| {
                Product::new(
                    format!("p{}", i),
                    format!("Product {}", i),
                    Money::from_minor(price),
                    stock,
                    "Misc",
                )
            })
            .collect()
    })
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..6).prop_map(Op::Add),
        2 => (0usize..6, -2i64..12).prop_map(|(i, q)| Op::Update(i, q)),
        1 => (0usize..6).prop_map(Op::Remove),
        1 => (-20i64..130).prop_map(Op::Discount),
        2 => (0usize..6, 0u32..8, 0i64..100_000).prop_map(|(i, s, p)| Op::Restock(i, s, p)),
        1 => Just(Op::Refresh),
    ]
}

fn apply(cart: &mut Cart, products: &mut [Product], op: &Op) {
    match op {
        Op::Add(i) => {
            cart.add_item(&products[i % products.len()]);
        }
        Op::Update(i, q) => {
            let _ = cart.update_quantity(*i, *q);
        }
        Op::Remove(i) => {
            let _ = cart.remove_item(*i);
        }
        Op::Discount(p) => cart.set_discount_percent(DiscountPercent::from_whole(*p)),
        Op::Restock(i, stock, price) => {
            let len = products.len();
            let product = &mut products[i % len];
            product.stock = *stock;
            product.price = Money::from_minor(*price);
            cart.add_item(product);
        }
        Op::Refresh => {
            cart.refresh_products(products);
        }
    }
}

proptest! {
    #[test]
    fn prop_subtotal_matches_lines(mut products in catalog(), ops in prop::collection::vec(op(), 0..40)) {
        let mut cart = Cart::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        for op in &ops {
            apply(&mut cart, &mut products, op);

            let bill = cart.bill();
            let expected: Money = bill
                .items()
                .iter()
                .map(|line| line.product().price * line.quantity())
                .sum();
            prop_assert_eq!(bill.totals().subtotal, expected);
            for line in bill.items() {
                prop_assert_eq!(line.subtotal(), line.product().price * line.quantity());
            }
        }
    }

    #[test]
    fn prop_quantity_never_exceeds_stock(mut products in catalog(), ops in prop::collection::vec(op(), 0..40)) {
        let mut cart = Cart::new(Utc::now());
        for op in &ops {
            apply(&mut cart, &mut products, op);
            for line in cart.bill().items() {
                prop_assert!(line.quantity() >= 1);
                prop_assert!(line.quantity() <= line.product().stock);
            }
        }
    }

    #[test]
    fn prop_derived_totals_hold(mut products in catalog(), ops in prop::collection::vec(op(), 0..30)) {
        let mut cart = Cart::new(Utc::now());
        for op in &ops {
            apply(&mut cart, &mut products, op);

            let bill = cart.bill();
            let totals = bill.totals();
            let p = bill.discount_percent().value();
            prop_assert!(p >= Decimal::ZERO && p <= Decimal::ONE_HUNDRED);

            let discount = totals.subtotal.amount() * p / Decimal::ONE_HUNDRED;
            let tax = (totals.subtotal.amount() - discount) * Decimal::new(18, 2);
            prop_assert_eq!(totals.discount.amount(), discount);
            prop_assert_eq!(totals.tax.amount(), tax);
            prop_assert_eq!(totals.total, totals.subtotal - totals.discount + totals.tax);
            prop_assert_eq!(totals, compute(bill.items(), bill.discount_percent(), TaxRate::GST));
        }
    }

    #[test]
    fn prop_recompute_is_stable(mut products in catalog(), ops in prop::collection::vec(op(), 0..30)) {
        let mut cart = Cart::new(Utc::now());
        for op in &ops {
            apply(&mut cart, &mut products, op);
        }
        let before = cart.bill().totals();
        let percent = cart.bill().discount_percent();
        for _ in 0..10 {
            cart.set_discount_percent(percent);
        }
        prop_assert_eq!(cart.bill().totals(), before);
    }
}
