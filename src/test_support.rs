//! # Test Support
//!
//! Recording doubles for the store's collaborators.
//!
//! [`RecordingBackend`] wraps the in-memory backend with an operation log
//! (the spy the no-remote-call assertions need) and injectable failures.
//! [`RecordingNotifier`] captures the human-readable strings the store
//! emits.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::{
    Category, MenuItem, Order, OrderItem, OrderStatus, PaymentMethod, Role, Size, User,
};
use crate::error::RemoteError;
use crate::notify::Notifier;
use crate::remote::memory::MemoryBackend;
use crate::remote::{ChangeEvent, RemoteBackend};
use crate::session::MemoryAuthenticator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOp {
    InsertOrder,
    InsertOrderItems,
    DeleteOrder,
    UpdateOrderStatus,
    SelectOrders,
    InsertMenuItem,
    UpdateMenuItem,
    DeleteMenuItem,
    SelectMenuItems,
    InsertUser,
    SelectUsers,
    FindUserByAuth,
}

/// Backend double: delegates to [`MemoryBackend`], logs every operation,
/// fails on demand, and can slow order reads down to widen race windows.
pub struct RecordingBackend {
    inner: MemoryBackend,
    ops: Mutex<Vec<RemoteOp>>,
    pub fail_insert_order: AtomicBool,
    pub fail_insert_order_items: AtomicBool,
    pub fail_update_order_status: AtomicBool,
    pub fail_select_orders: AtomicBool,
    pub fail_select_menu_items: AtomicBool,
    pub select_orders_delay_ms: AtomicU64,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryBackend::new(),
            ops: Mutex::new(Vec::new()),
            fail_insert_order: AtomicBool::new(false),
            fail_insert_order_items: AtomicBool::new(false),
            fail_update_order_status: AtomicBool::new(false),
            fail_select_orders: AtomicBool::new(false),
            fail_select_menu_items: AtomicBool::new(false),
            select_orders_delay_ms: AtomicU64::new(0),
        })
    }

    fn record(&self, op: RemoteOp) {
        self.ops.lock().unwrap().push(op);
    }

    fn injected(&self, flag: &AtomicBool) -> Result<(), RemoteError> {
        if flag.load(Ordering::SeqCst) {
            Err(RemoteError::WriteFailed("injected failure".to_string()))
        } else {
            Ok(())
        }
    }

    pub fn ops(&self) -> Vec<RemoteOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn count(&self, op: RemoteOp) -> usize {
        self.ops.lock().unwrap().iter().filter(|o| **o == op).count()
    }
}

#[async_trait]
impl RemoteBackend for RecordingBackend {
    async fn insert_order(&self, order: &Order) -> Result<Order, RemoteError> {
        self.record(RemoteOp::InsertOrder);
        self.injected(&self.fail_insert_order)?;
        self.inner.insert_order(order).await
    }

    async fn insert_order_items(&self, items: &[OrderItem]) -> Result<(), RemoteError> {
        self.record(RemoteOp::InsertOrderItems);
        self.injected(&self.fail_insert_order_items)?;
        self.inner.insert_order_items(items).await
    }

    async fn delete_order(&self, order_id: &str) -> Result<(), RemoteError> {
        self.record(RemoteOp::DeleteOrder);
        self.inner.delete_order(order_id).await
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RemoteError> {
        self.record(RemoteOp::UpdateOrderStatus);
        self.injected(&self.fail_update_order_status)?;
        self.inner
            .update_order_status(order_id, status, payment_method, updated_at)
            .await
    }

    async fn select_orders(&self) -> Result<Vec<Order>, RemoteError> {
        self.record(RemoteOp::SelectOrders);
        let delay = self.select_orders_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_select_orders.load(Ordering::SeqCst) {
            return Err(RemoteError::ReadFailed("injected failure".to_string()));
        }
        self.inner.select_orders().await
    }

    async fn insert_menu_item(&self, item: &MenuItem) -> Result<MenuItem, RemoteError> {
        self.record(RemoteOp::InsertMenuItem);
        self.inner.insert_menu_item(item).await
    }

    async fn update_menu_item(&self, item: &MenuItem) -> Result<MenuItem, RemoteError> {
        self.record(RemoteOp::UpdateMenuItem);
        self.inner.update_menu_item(item).await
    }

    async fn delete_menu_item(&self, item_id: &str) -> Result<(), RemoteError> {
        self.record(RemoteOp::DeleteMenuItem);
        self.inner.delete_menu_item(item_id).await
    }

    async fn select_menu_items(&self) -> Result<Vec<MenuItem>, RemoteError> {
        self.record(RemoteOp::SelectMenuItems);
        if self.fail_select_menu_items.load(Ordering::SeqCst) {
            return Err(RemoteError::ReadFailed("injected failure".to_string()));
        }
        self.inner.select_menu_items().await
    }

    async fn insert_user(&self, user: &User) -> Result<User, RemoteError> {
        self.record(RemoteOp::InsertUser);
        self.inner.insert_user(user).await
    }

    async fn select_users(&self) -> Result<Vec<User>, RemoteError> {
        self.record(RemoteOp::SelectUsers);
        self.inner.select_users().await
    }

    async fn find_user_by_auth(&self, auth_id: &str) -> Result<Option<User>, RemoteError> {
        self.record(RemoteOp::FindUserByAuth);
        self.inner.find_user_by_auth(auth_id).await
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.inner.changes()
    }
}

/// Captures every notification the store emits.
#[derive(Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

// --- Fixtures ---

pub fn menu_item(name: &str, price: f64, category: Category, size: Size) -> MenuItem {
    MenuItem {
        item_id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: format!("{} waffle", name),
        price,
        category,
        size,
        created_at: Utc::now(),
    }
}

/// Seeds a staff profile plus matching credentials, returning the profile.
pub async fn seed_user(
    backend: &dyn RemoteBackend,
    auth: &MemoryAuthenticator,
    username: &str,
    password: &str,
    role: Role,
) -> User {
    let auth_id = auth.register(username, password);
    let user = User {
        user_id: Uuid::new_v4().to_string(),
        auth_id: Some(auth_id),
        username: username.to_string(),
        role,
        phone: None,
        created_at: Utc::now(),
    };
    backend.insert_user(&user).await.unwrap()
}

/// Two menu items with the prices the pricing tests rely on.
pub async fn seed_menu(backend: &dyn RemoteBackend) -> (MenuItem, MenuItem) {
    let mini = backend
        .insert_menu_item(&menu_item(
            "Dark Choco Mini",
            50.0,
            Category::MiniWaffle,
            Size::Regular,
        ))
        .await
        .unwrap();
    let belgian = backend
        .insert_menu_item(&menu_item(
            "Dark Choco",
            80.0,
            Category::BelgianWaffle,
            Size::Semi,
        ))
        .await
        .unwrap();
    (mini, belgian)
}
