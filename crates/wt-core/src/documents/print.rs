//! Paginated print layout.
//!
//! Positions are millimetres on an A4 portrait page, origin top-left, `y`
//! growing downwards. A page renderer draws the elements as given; this
//! module only decides what goes where.
//!
//! ```text
//!  y=15   ┌──────── WALLETTRACKER BILL (18pt, centred) ────────┐
//!  y=30   │ Bill #: ...                                        │
//!  y=40   │ Date: ...                                          │
//!         │ Items:                                             │
//!         │ Rice (Grocery)                                     │
//!         │    Qty: 2 x ₹100.00            (+5)                │
//!         │    Subtotal: ₹200.00           (+10)               │
//!         │ Subtotal / Discount / Tax                          │
//!         │ Total (14pt)                                       │
//!         │ Payment Method                                     │
//!         │ [UPI QR 40x40]                                     │
//!         │            Thank you for shopping with us!         │
//!         └────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use super::{header_lines, item_lines, payment_lines, summary_lines, total_line, StoreProfile};
use crate::bill::FinalizedBill;
use crate::types::PaymentMethod;

pub const PAGE_WIDTH_MM: u32 = 210;
pub const PAGE_HEIGHT_MM: u32 = 297;
pub const TOP_MARGIN_MM: u32 = 15;
pub const BOTTOM_MARGIN_MM: u32 = 15;
pub const LEFT_MARGIN_MM: u32 = 20;
pub const INDENT_MM: u32 = 30;
pub const QR_SIZE_MM: u32 = 40;

const TITLE_FONT: u32 = 18;
const BODY_FONT: u32 = 12;
const TOTAL_FONT: u32 = 14;
const LINE_STEP: u32 = 10;
const ITEM_STEP: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
}

/// One drawable element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PrintElement {
    Text {
        x: u32,
        y: u32,
        font_size: u32,
        align: Align,
        text: String,
    },
    /// Square QR code encoding `data`.
    Qr { x: u32, y: u32, size: u32, data: String },
}

impl PrintElement {
    /// Vertical position of the element's top edge.
    pub fn y(&self) -> u32 {
        match self {
            PrintElement::Text { y, .. } | PrintElement::Qr { y, .. } => *y,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrintPage {
    pub elements: Vec<PrintElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintLayout {
    pub page_width_mm: u32,
    pub page_height_mm: u32,
    pub pages: Vec<PrintPage>,
}

impl PrintLayout {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// All text on all pages, top to bottom.
    pub fn text_lines(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(|element| match element {
                PrintElement::Text { text, .. } => Some(text.as_str()),
                PrintElement::Qr { .. } => None,
            })
            .collect()
    }
}

/// Cursor that starts a new page when a block would cross the bottom margin.
struct Cursor {
    pages: Vec<PrintPage>,
    y: u32,
}

impl Cursor {
    fn new() -> Self {
        Cursor {
            pages: vec![PrintPage::default()],
            y: TOP_MARGIN_MM,
        }
    }

    /// Ensures `height` mm fit below the cursor.
    fn reserve(&mut self, height: u32) {
        if self.y + height > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
            self.pages.push(PrintPage::default());
            self.y = TOP_MARGIN_MM;
        }
    }

    fn push(&mut self, element: PrintElement) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn text(&mut self, x: u32, dy: u32, font_size: u32, align: Align, text: String) {
        let y = self.y + dy;
        self.push(PrintElement::Text {
            x,
            y,
            font_size,
            align,
            text,
        });
    }

    fn line(&mut self, text: String) {
        self.reserve(0);
        self.text(LEFT_MARGIN_MM, 0, BODY_FONT, Align::Left, text);
        self.y += LINE_STEP;
    }
}

/// Lays out a confirmed bill for printing or PDF export.
pub fn layout(finalized: &FinalizedBill, store: &StoreProfile) -> PrintLayout {
    let bill = finalized.bill();
    let center = PAGE_WIDTH_MM / 2;
    let mut cursor = Cursor::new();

    cursor.text(center, 0, TITLE_FONT, Align::Center, store.title());
    cursor.y += 15;

    for text in header_lines(bill, store) {
        cursor.line(text);
    }
    cursor.line("Items:".to_string());

    for line in bill.items() {
        cursor.reserve(ITEM_STEP - LINE_STEP);
        let [name, qty, subtotal] = item_lines(line);
        cursor.text(LEFT_MARGIN_MM, 0, BODY_FONT, Align::Left, name);
        cursor.text(INDENT_MM, 5, BODY_FONT, Align::Left, qty);
        cursor.text(INDENT_MM, 10, BODY_FONT, Align::Left, subtotal);
        cursor.y += ITEM_STEP;
    }

    for text in summary_lines(bill) {
        cursor.line(text);
    }

    cursor.reserve(0);
    cursor.text(LEFT_MARGIN_MM, 0, TOTAL_FONT, Align::Left, total_line(bill));
    cursor.y += LINE_STEP;

    let mut payment = payment_lines(finalized).into_iter();
    if let Some(method) = payment.next() {
        cursor.reserve(0);
        cursor.text(LEFT_MARGIN_MM, 0, BODY_FONT, Align::Left, method);
    }
    for text in payment {
        cursor.y += LINE_STEP;
        cursor.reserve(0);
        cursor.text(LEFT_MARGIN_MM, 0, BODY_FONT, Align::Left, text);
    }

    if finalized.payment_method() == PaymentMethod::Upi {
        if let Some(uri) = finalized.upi_uri() {
            cursor.y += 15;
            cursor.reserve(5 + QR_SIZE_MM);
            cursor.text(
                LEFT_MARGIN_MM,
                0,
                BODY_FONT,
                Align::Left,
                "UPI Payment QR:".to_string(),
            );
            cursor.y += 5;
            cursor.push(PrintElement::Qr {
                x: LEFT_MARGIN_MM,
                y: cursor.y,
                size: QR_SIZE_MM,
                data: uri.to_string(),
            });
            cursor.y += QR_SIZE_MM + 5;
        }
    }

    cursor.y += 20;
    cursor.reserve(0);
    cursor.text(center, 0, BODY_FONT, Align::Center, store.footer.clone());

    PrintLayout {
        page_width_mm: PAGE_WIDTH_MM,
        page_height_mm: PAGE_HEIGHT_MM,
        pages: cursor.pages,
    }
}
