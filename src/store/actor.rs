use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    order_number_for, MenuItem, MenuItemCreate, Order, OrderDraft, OrderItem, OrderStatus,
    PaymentMethod, Role, User, UserCreate,
};
use crate::error::{AuthError, RemoteError, StoreError};
use crate::lifecycle;
use crate::notify::{self, Notifier};
use crate::remote::RemoteBackend;
use crate::session::Authenticator;
use crate::store::{ServiceResponse, StoreClient, StoreRequest};

/// Tracks one kind of reconciling fetch: the advisory in-flight guard, the
/// monotonic sequence tags, and the callers waiting on the in-flight result.
#[derive(Default)]
struct FetchState {
    loading: bool,
    issued_seq: u64,
    applied_seq: u64,
    waiters: Vec<ServiceResponse<()>>,
}

impl FetchState {
    /// Registers a waiter; returns the sequence tag for a new fetch, or
    /// `None` when one is already in flight and this call coalesces onto it.
    fn begin(&mut self, respond_to: ServiceResponse<()>) -> Option<u64> {
        self.waiters.push(respond_to);
        if self.loading {
            return None;
        }
        self.loading = true;
        self.issued_seq += 1;
        Some(self.issued_seq)
    }

    /// Issues a fresh tag when a fetch is in flight. Called after a mutation
    /// lands mid-fetch: the snapshot on the wire predates the mutation, so a
    /// newer fetch must outrank it.
    fn supersede(&mut self) -> Option<u64> {
        if !self.loading {
            return None;
        }
        self.issued_seq += 1;
        Some(self.issued_seq)
    }

    /// Whether a completed fetch tagged `seq` may still be applied. A result
    /// older than the last applied one is stale and must be discarded.
    fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied_seq {
            return false;
        }
        self.applied_seq = seq;
        self.loading = false;
        true
    }

    fn settle(&mut self, outcome: Result<(), StoreError>) {
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// The store actor. Owns the local order and menu collections, the staff
/// mirror, and the current session; every mutation goes remote-first and
/// patches the local view only after the backend acknowledged it.
pub struct OrderStore {
    receiver: mpsc::Receiver<StoreRequest>,
    self_sender: mpsc::Sender<StoreRequest>,
    backend: Arc<dyn RemoteBackend>,
    auth: Arc<dyn Authenticator>,
    notifier: Arc<dyn Notifier>,
    orders: Vec<Order>,
    menu_items: Vec<MenuItem>,
    users: Vec<User>,
    current_user: Option<User>,
    orders_fetch: FetchState,
    menu_fetch: FetchState,
}

impl OrderStore {
    pub fn new(
        buffer_size: usize,
        backend: Arc<dyn RemoteBackend>,
        auth: Arc<dyn Authenticator>,
        notifier: Arc<dyn Notifier>,
    ) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let store = Self {
            receiver,
            self_sender: sender.clone(),
            backend,
            auth,
            notifier,
            orders: Vec::new(),
            menu_items: Vec::new(),
            users: Vec::new(),
            current_user: None,
            orders_fetch: FetchState::default(),
            menu_fetch: FetchState::default(),
        };
        (store, StoreClient::new(sender))
    }

    #[instrument(name = "order_store", skip(self))]
    pub async fn run(mut self) {
        info!("OrderStore starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::PlaceOrder { draft, respond_to } => {
                    self.handle_place_order(draft, respond_to).await;
                }
                StoreRequest::AdvanceStatus {
                    order_id,
                    target,
                    payment,
                    respond_to,
                } => {
                    self.handle_advance_status(order_id, target, payment, respond_to)
                        .await;
                }
                StoreRequest::FetchOrders { respond_to } => {
                    self.handle_fetch_orders(respond_to);
                }
                StoreRequest::OrdersFetched { seq, result } => {
                    self.handle_orders_fetched(seq, result);
                }
                StoreRequest::FetchMenuItems { respond_to } => {
                    self.handle_fetch_menu_items(respond_to);
                }
                StoreRequest::MenuFetched { seq, result } => {
                    self.handle_menu_fetched(seq, result);
                }
                StoreRequest::Orders { respond_to } => {
                    let _ = respond_to.send(Ok(self.orders.clone()));
                }
                StoreRequest::MenuItems { respond_to } => {
                    let _ = respond_to.send(Ok(self.menu_items.clone()));
                }
                StoreRequest::AddMenuItem { create, respond_to } => {
                    let result = self.add_menu_item(create).await;
                    if result.is_ok() {
                        self.refresh_menu_if_fetching();
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::UpdateMenuItem { item, respond_to } => {
                    let result = self.update_menu_item(item).await;
                    if result.is_ok() {
                        self.refresh_menu_if_fetching();
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::DeleteMenuItem {
                    item_id,
                    respond_to,
                } => {
                    let result = self.delete_menu_item(item_id).await;
                    if result.is_ok() {
                        self.refresh_menu_if_fetching();
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::AddUser { create, respond_to } => {
                    let _ = respond_to.send(self.add_user(create).await);
                }
                StoreRequest::Users { respond_to } => {
                    let _ = respond_to.send(self.list_users().await);
                }
                StoreRequest::SignIn {
                    username,
                    password,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.sign_in(&username, &password).await);
                }
                StoreRequest::SignOut { respond_to } => {
                    info!("Signing out");
                    self.current_user = None;
                    let _ = respond_to.send(Ok(()));
                }
                StoreRequest::CurrentUser { respond_to } => {
                    let _ = respond_to.send(Ok(self.current_user.clone()));
                }
                StoreRequest::Shutdown => {
                    info!("OrderStore shutting down");
                    break;
                }
            }
        }

        info!("OrderStore stopped");
    }

    // --- Orders ---

    #[instrument(fields(lines = draft.lines.len()), skip(self, draft, respond_to))]
    async fn handle_place_order(&mut self, draft: OrderDraft, respond_to: ServiceResponse<Order>) {
        debug!("Processing place_order request");
        let result = self.place_order(draft).await;
        match &result {
            Ok(order) => {
                info!(order_id = %order.order_id, total = %order.total_amount, "Order placed");
                self.notifier.success(notify::ORDER_PLACED);
                self.refresh_orders_if_fetching();
            }
            Err(e @ (StoreError::RemoteWrite(_) | StoreError::PartialOrderWrite { .. })) => {
                warn!(error = %e, "Order placement failed at the backend");
                self.notifier.error(notify::ORDER_FAILED);
            }
            Err(e) => debug!(error = %e, "Order placement rejected"),
        }
        let _ = respond_to.send(result);
    }

    /// Order and line items are one logical unit: if the item write fails
    /// after the order row landed, the orphaned row is deleted and one
    /// consolidated error surfaces.
    async fn place_order(&mut self, draft: OrderDraft) -> Result<Order, StoreError> {
        let user = self.current_user.as_ref().ok_or(StoreError::AuthRequired)?;
        if draft.lines.is_empty() {
            return Err(StoreError::EmptyOrder);
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();
        let mut items = Vec::with_capacity(draft.lines.len());
        let mut total = 0.0;
        for line in &draft.lines {
            if line.quantity < 1 {
                return Err(StoreError::InvalidQuantity {
                    item_id: line.item_id.clone(),
                    quantity: line.quantity,
                });
            }
            let menu_item = self
                .menu_items
                .iter()
                .find(|m| m.item_id == line.item_id)
                .ok_or_else(|| StoreError::UnknownMenuItem(line.item_id.clone()))?;
            // Name and price are snapshotted here; later menu edits must not
            // reach into this order.
            let subtotal = menu_item.price * f64::from(line.quantity);
            total += subtotal;
            items.push(OrderItem {
                order_item_id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                item_id: menu_item.item_id.clone(),
                name: menu_item.name.clone(),
                quantity: line.quantity,
                item_price: menu_item.price,
                subtotal,
                special_instructions: line.special_instructions.clone(),
            });
        }

        let mut order = Order {
            order_id: order_id.clone(),
            order_number: order_number_for(now),
            status: OrderStatus::New,
            total_amount: total,
            notes: draft.notes,
            payment_method: None,
            created_by: user.user_id.clone(),
            created_at: now,
            updated_at: now,
            items: Vec::new(),
        };

        self.backend
            .insert_order(&order)
            .await
            .map_err(StoreError::RemoteWrite)?;
        if let Err(e) = self.backend.insert_order_items(&items).await {
            if let Err(del) = self.backend.delete_order(&order_id).await {
                warn!(error = %del, order_id = %order_id, "Rollback of orphaned order row failed");
            }
            return Err(StoreError::PartialOrderWrite {
                order_id,
                reason: e.to_string(),
            });
        }

        order.items = items;
        // Local view stays newest-first.
        self.orders.insert(0, order.clone());
        Ok(order)
    }

    #[instrument(fields(order_id = %order_id, target = %target), skip(self, respond_to))]
    async fn handle_advance_status(
        &mut self,
        order_id: String,
        target: OrderStatus,
        payment: Option<PaymentMethod>,
        respond_to: ServiceResponse<Order>,
    ) {
        debug!("Processing advance_status request");
        let result = self.advance_status(&order_id, target, payment).await;
        match &result {
            Ok((order, changed)) => {
                if *changed {
                    info!(status = %order.status, "Order status advanced");
                    match order.status {
                        OrderStatus::Processing => self.notifier.success(notify::ORDER_STARTED),
                        OrderStatus::Completed => self.notifier.success(notify::ORDER_COMPLETED),
                        OrderStatus::Cancelled => self.notifier.success(notify::ORDER_CANCELLED),
                        OrderStatus::New => {}
                    }
                    self.refresh_orders_if_fetching();
                } else {
                    debug!(status = %order.status, "Order already in target status");
                }
            }
            Err(e @ StoreError::RemoteWrite(_)) => {
                warn!(error = %e, "Order update failed at the backend");
                self.notifier.error(notify::UPDATE_FAILED);
            }
            Err(e) => debug!(error = %e, "Transition rejected"),
        }
        let _ = respond_to.send(result.map(|(order, _)| order));
    }

    /// Validates against the pure state machine before any remote call.
    /// Returns the order and whether anything actually changed; a retried
    /// advance to the state already reached is a visible no-op.
    async fn advance_status(
        &mut self,
        order_id: &str,
        target: OrderStatus,
        payment: Option<PaymentMethod>,
    ) -> Result<(Order, bool), StoreError> {
        if self.current_user.is_none() {
            return Err(StoreError::AuthRequired);
        }
        let idx = self
            .orders
            .iter()
            .position(|o| o.order_id == order_id)
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))?;
        let current = self.orders[idx].status;

        if current == target {
            return Ok((self.orders[idx].clone(), false));
        }
        lifecycle::validate_transition(current, target)?;
        let payment = lifecycle::payment_for(target, payment)?;

        let updated_at = Utc::now();
        self.backend
            .update_order_status(order_id, target, payment, updated_at)
            .await
            .map_err(StoreError::RemoteWrite)?;

        let order = &mut self.orders[idx];
        order.status = target;
        order.payment_method = payment;
        order.updated_at = updated_at;
        Ok((order.clone(), true))
    }

    // --- Reconciling fetches ---

    /// Spawns a full refetch unless one is already in flight, in which case
    /// the caller coalesces onto it. The actor keeps processing messages
    /// while the read runs; the result comes back through the mailbox.
    #[instrument(skip(self, respond_to))]
    fn handle_fetch_orders(&mut self, respond_to: ServiceResponse<()>) {
        let Some(seq) = self.orders_fetch.begin(respond_to) else {
            debug!("Order fetch already in flight, coalescing");
            return;
        };
        debug!(seq, "Starting order fetch");
        self.spawn_orders_fetch(seq);
    }

    fn spawn_orders_fetch(&self, seq: u64) {
        let backend = Arc::clone(&self.backend);
        let sender = self.self_sender.clone();
        tokio::spawn(async move {
            let result = backend.select_orders().await;
            let _ = sender.send(StoreRequest::OrdersFetched { seq, result }).await;
        });
    }

    /// A successful order mutation during an in-flight fetch would otherwise
    /// be wiped by that fetch's pre-mutation snapshot; outrank it.
    fn refresh_orders_if_fetching(&mut self) {
        if let Some(seq) = self.orders_fetch.supersede() {
            debug!(seq, "Order mutation landed mid-fetch, issuing a fresh one");
            self.spawn_orders_fetch(seq);
        }
    }

    fn handle_orders_fetched(&mut self, seq: u64, result: Result<Vec<Order>, RemoteError>) {
        if !self.orders_fetch.accept(seq) {
            debug!(seq, "Discarding stale order fetch result");
            return;
        }
        let outcome = match result {
            Ok(orders) => {
                debug!(seq, count = orders.len(), "Replacing local order collection");
                self.orders = orders;
                Ok(())
            }
            Err(e) => {
                // Stale-but-available: keep the last known collection.
                warn!(seq, error = %e, "Order fetch failed, keeping last known state");
                Err(StoreError::RemoteRead(e))
            }
        };
        self.orders_fetch.settle(outcome);
    }

    #[instrument(skip(self, respond_to))]
    fn handle_fetch_menu_items(&mut self, respond_to: ServiceResponse<()>) {
        let Some(seq) = self.menu_fetch.begin(respond_to) else {
            debug!("Menu fetch already in flight, coalescing");
            return;
        };
        debug!(seq, "Starting menu fetch");
        self.spawn_menu_fetch(seq);
    }

    fn spawn_menu_fetch(&self, seq: u64) {
        let backend = Arc::clone(&self.backend);
        let sender = self.self_sender.clone();
        tokio::spawn(async move {
            let result = backend.select_menu_items().await;
            let _ = sender.send(StoreRequest::MenuFetched { seq, result }).await;
        });
    }

    fn refresh_menu_if_fetching(&mut self) {
        if let Some(seq) = self.menu_fetch.supersede() {
            debug!(seq, "Menu mutation landed mid-fetch, issuing a fresh one");
            self.spawn_menu_fetch(seq);
        }
    }

    fn handle_menu_fetched(&mut self, seq: u64, result: Result<Vec<MenuItem>, RemoteError>) {
        if !self.menu_fetch.accept(seq) {
            debug!(seq, "Discarding stale menu fetch result");
            return;
        }
        let outcome = match result {
            Ok(items) => {
                debug!(seq, count = items.len(), "Replacing local menu collection");
                self.menu_items = items;
                Ok(())
            }
            Err(e) => {
                warn!(seq, error = %e, "Menu fetch failed, keeping last known state");
                Err(StoreError::RemoteRead(e))
            }
        };
        self.menu_fetch.settle(outcome);
    }

    // --- Catalog management (manager-only) ---

    fn require_manager(&self) -> Result<&User, StoreError> {
        let user = self.current_user.as_ref().ok_or(StoreError::AuthRequired)?;
        if user.role != Role::Manager {
            return Err(StoreError::Forbidden);
        }
        Ok(user)
    }

    #[instrument(fields(name = %create.name), skip(self, create))]
    async fn add_menu_item(&mut self, create: MenuItemCreate) -> Result<MenuItem, StoreError> {
        self.require_manager()?;
        if create.price < 0.0 {
            return Err(StoreError::InvalidPrice(create.price));
        }
        let item = MenuItem {
            item_id: Uuid::new_v4().to_string(),
            name: create.name,
            description: create.description,
            price: create.price,
            category: create.category,
            size: create.size,
            created_at: Utc::now(),
        };
        let stored = self
            .backend
            .insert_menu_item(&item)
            .await
            .map_err(StoreError::RemoteWrite)?;
        self.menu_items.push(stored.clone());
        info!(item_id = %stored.item_id, "Menu item added");
        Ok(stored)
    }

    #[instrument(fields(item_id = %item.item_id), skip(self, item))]
    async fn update_menu_item(&mut self, item: MenuItem) -> Result<MenuItem, StoreError> {
        self.require_manager()?;
        if item.price < 0.0 {
            return Err(StoreError::InvalidPrice(item.price));
        }
        let stored = self
            .backend
            .update_menu_item(&item)
            .await
            .map_err(StoreError::RemoteWrite)?;
        if let Some(row) = self
            .menu_items
            .iter_mut()
            .find(|m| m.item_id == stored.item_id)
        {
            *row = stored.clone();
        } else {
            self.menu_items.push(stored.clone());
        }
        info!("Menu item updated");
        Ok(stored)
    }

    /// Never touches existing orders: their line items carry their own
    /// denormalized name and price.
    #[instrument(fields(item_id = %item_id), skip(self))]
    async fn delete_menu_item(&mut self, item_id: String) -> Result<(), StoreError> {
        self.require_manager()?;
        self.backend
            .delete_menu_item(&item_id)
            .await
            .map_err(StoreError::RemoteWrite)?;
        self.menu_items.retain(|m| m.item_id != item_id);
        info!("Menu item deleted");
        Ok(())
    }

    // --- Staff management (manager-only) ---

    #[instrument(fields(username = %create.username, role = %create.role), skip(self, create))]
    async fn add_user(&mut self, create: UserCreate) -> Result<User, StoreError> {
        self.require_manager()?;
        let user = User {
            user_id: Uuid::new_v4().to_string(),
            auth_id: create.auth_id,
            username: create.username,
            role: create.role,
            phone: create.phone,
            created_at: Utc::now(),
        };
        let stored = self
            .backend
            .insert_user(&user)
            .await
            .map_err(StoreError::RemoteWrite)?;
        self.users.push(stored.clone());
        info!(user_id = %stored.user_id, "User created");
        Ok(stored)
    }

    async fn list_users(&mut self) -> Result<Vec<User>, StoreError> {
        self.require_manager()?;
        let users = self
            .backend
            .select_users()
            .await
            .map_err(StoreError::RemoteRead)?;
        self.users = users.clone();
        Ok(users)
    }

    // --- Session ---

    #[instrument(skip(self, password))]
    async fn sign_in(&mut self, username: &str, password: &str) -> Result<User, StoreError> {
        let auth_id = self.auth.sign_in(username, password).await?;
        let user = self
            .backend
            .find_user_by_auth(&auth_id)
            .await
            .map_err(StoreError::RemoteRead)?
            .ok_or(StoreError::Auth(AuthError::UnknownProfile(auth_id)))?;
        info!(user_id = %user.user_id, role = %user.role, "Signed in");
        self.current_user = Some(user.clone());
        Ok(user)
    }
}
