//! In-process reference backend. Plain tables behind a mutex plus a
//! broadcast feed, close enough to the hosted service for the store and the
//! tests to exercise every contract, including cross-client change
//! notifications.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::domain::{MenuItem, Order, OrderItem, OrderStatus, PaymentMethod, User};
use crate::error::RemoteError;
use crate::remote::{ChangeEvent, EventKind, RemoteBackend, Table};

const FEED_CAPACITY: usize = 64;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    menu_items: Vec<MenuItem>,
    // Order rows are stored without their items; the join happens on select.
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
}

pub struct MemoryBackend {
    tables: Mutex<Tables>,
    feed: broadcast::Sender<ChangeEvent>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            tables: Mutex::new(Tables::default()),
            feed,
        }
    }

    fn emit(&self, table: Table, kind: EventKind) {
        // No subscribers is fine; the send result only reports that.
        let _ = self.feed.send(ChangeEvent { table, kind });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // Lock poisoning only happens if a panic occurred mid-mutation; the
        // tables are still structurally sound for reads, so recover.
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteBackend for MemoryBackend {
    async fn insert_order(&self, order: &Order) -> Result<Order, RemoteError> {
        let mut row = order.clone();
        row.items.clear();
        let stored = row.clone();
        self.lock().orders.push(row);
        self.emit(Table::Orders, EventKind::Insert);
        Ok(stored)
    }

    async fn insert_order_items(&self, items: &[OrderItem]) -> Result<(), RemoteError> {
        self.lock().order_items.extend_from_slice(items);
        self.emit(Table::OrderItems, EventKind::Insert);
        Ok(())
    }

    async fn delete_order(&self, order_id: &str) -> Result<(), RemoteError> {
        let mut tables = self.lock();
        tables.orders.retain(|o| o.order_id != order_id);
        tables.order_items.retain(|i| i.order_id != order_id);
        drop(tables);
        self.emit(Table::Orders, EventKind::Delete);
        Ok(())
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RemoteError> {
        {
            let mut tables = self.lock();
            let row = tables
                .orders
                .iter_mut()
                .find(|o| o.order_id == order_id)
                .ok_or_else(|| RemoteError::NotFound(format!("orders/{}", order_id)))?;
            row.status = status;
            row.payment_method = payment_method;
            row.updated_at = updated_at;
        }
        self.emit(Table::Orders, EventKind::Update);
        Ok(())
    }

    async fn select_orders(&self) -> Result<Vec<Order>, RemoteError> {
        let tables = self.lock();
        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .map(|row| {
                let mut order = row.clone();
                order.items = tables
                    .order_items
                    .iter()
                    .filter(|i| i.order_id == order.order_id)
                    .cloned()
                    .collect();
                order
            })
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn insert_menu_item(&self, item: &MenuItem) -> Result<MenuItem, RemoteError> {
        self.lock().menu_items.push(item.clone());
        self.emit(Table::MenuItems, EventKind::Insert);
        Ok(item.clone())
    }

    async fn update_menu_item(&self, item: &MenuItem) -> Result<MenuItem, RemoteError> {
        {
            let mut tables = self.lock();
            let row = tables
                .menu_items
                .iter_mut()
                .find(|m| m.item_id == item.item_id)
                .ok_or_else(|| RemoteError::NotFound(format!("menu_items/{}", item.item_id)))?;
            *row = item.clone();
        }
        self.emit(Table::MenuItems, EventKind::Update);
        Ok(item.clone())
    }

    async fn delete_menu_item(&self, item_id: &str) -> Result<(), RemoteError> {
        // Historical order items keep their denormalized name and price.
        self.lock().menu_items.retain(|m| m.item_id != item_id);
        self.emit(Table::MenuItems, EventKind::Delete);
        Ok(())
    }

    async fn select_menu_items(&self) -> Result<Vec<MenuItem>, RemoteError> {
        let mut items = self.lock().menu_items.clone();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn insert_user(&self, user: &User) -> Result<User, RemoteError> {
        self.lock().users.push(user.clone());
        self.emit(Table::Users, EventKind::Insert);
        Ok(user.clone())
    }

    async fn select_users(&self) -> Result<Vec<User>, RemoteError> {
        Ok(self.lock().users.clone())
    }

    async fn find_user_by_auth(&self, auth_id: &str) -> Result<Option<User>, RemoteError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.auth_id.as_deref() == Some(auth_id))
            .cloned())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.feed.subscribe()
    }
}
