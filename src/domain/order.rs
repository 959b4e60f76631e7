use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status lifecycle of an order.
///
/// `Completed` and `Cancelled` are terminal. The valid transitions are
/// enforced by [`crate::lifecycle`], never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::New => "new",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// How a completed order was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Gpay,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Gpay => "gpay",
        };
        write!(f, "{}", s)
    }
}

/// One placed customer transaction.
///
/// `order_number` is a short human-facing label derived from a timestamp
/// fragment; only `order_id` is guaranteed unique. `total_amount` equals the
/// sum of line item subtotals at creation time and is not recomputed
/// afterwards, since items are immutable once the order is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub notes: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// One menu item quantity within an order.
///
/// `name` and `item_price` are value snapshots taken at placement time.
/// Menu edits after the fact must not alter historical orders, which is
/// exactly what this denormalization buys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_item_id: String,
    pub order_id: String,
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
    pub item_price: f64,
    pub subtotal: f64,
    pub special_instructions: Option<String>,
}

/// Placement input: what the caller selects before any pricing happens.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub lines: Vec<DraftLine>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DraftLine {
    pub item_id: String,
    pub quantity: u32,
    pub special_instructions: Option<String>,
}

impl DraftLine {
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            special_instructions: None,
        }
    }
}

impl OrderDraft {
    pub fn new(lines: Vec<DraftLine>) -> Self {
        Self { lines, notes: None }
    }
}

/// Short human-facing order number: the trailing digits of the creation
/// timestamp. Collisions across days are acceptable, uniqueness lives in
/// `order_id`.
pub fn order_number_for(created_at: DateTime<Utc>) -> String {
    format!("{:04}", created_at.timestamp_millis().rem_euclid(10_000))
}
