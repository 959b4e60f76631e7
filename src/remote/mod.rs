//! Seam to the hosted order service: row-level CRUD over four logical
//! relations plus a change-notification feed. The store treats whatever sits
//! behind this trait as the source of truth.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::domain::{MenuItem, Order, OrderItem, OrderStatus, PaymentMethod, User};
use crate::error::RemoteError;

/// The logical relations the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    MenuItems,
    Orders,
    OrderItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Insert,
    Update,
    Delete,
}

/// One row-level change notification, pushed for every mutation no matter
/// which client performed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: EventKind,
}

impl ChangeEvent {
    /// Whether this event should trigger an order reconciliation.
    pub fn concerns_orders(&self) -> bool {
        matches!(self.table, Table::Orders | Table::OrderItems)
    }
}

/// Remote order service collaborator.
///
/// Inserts return the stored row; order rows travel without their items
/// (those live in their own relation), while [`select_orders`] returns the
/// join, newest created first.
///
/// [`select_orders`]: RemoteBackend::select_orders
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    async fn insert_order(&self, order: &Order) -> Result<Order, RemoteError>;
    async fn insert_order_items(&self, items: &[OrderItem]) -> Result<(), RemoteError>;
    /// Deletes the order row and cascades to its line items.
    async fn delete_order(&self, order_id: &str) -> Result<(), RemoteError>;
    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RemoteError>;
    async fn select_orders(&self) -> Result<Vec<Order>, RemoteError>;

    async fn insert_menu_item(&self, item: &MenuItem) -> Result<MenuItem, RemoteError>;
    async fn update_menu_item(&self, item: &MenuItem) -> Result<MenuItem, RemoteError>;
    async fn delete_menu_item(&self, item_id: &str) -> Result<(), RemoteError>;
    async fn select_menu_items(&self) -> Result<Vec<MenuItem>, RemoteError>;

    async fn insert_user(&self, user: &User) -> Result<User, RemoteError>;
    async fn select_users(&self) -> Result<Vec<User>, RemoteError>;
    async fn find_user_by_auth(&self, auth_id: &str) -> Result<Option<User>, RemoteError>;

    /// Subscribes to the change feed. Dropping the receiver unsubscribes.
    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;
}
