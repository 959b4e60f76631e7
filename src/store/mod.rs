//! The order store: a single actor owning the client's view of orders, menu
//! items, and the session, mediating every mutation through the remote
//! backend. All state changes funnel through one mailbox, which is what
//! keeps the full-replace reconciliation strategy coherent.

mod actor;
mod client;

pub use actor::OrderStore;
pub use client::StoreClient;

use tokio::sync::oneshot;

use crate::domain::{
    MenuItem, MenuItemCreate, Order, OrderDraft, OrderStatus, PaymentMethod, User, UserCreate,
};
use crate::error::{RemoteError, StoreError};

pub type ServiceResult<T> = std::result::Result<T, StoreError>;
pub type ServiceResponse<T> = oneshot::Sender<ServiceResult<T>>;

/// Typed messages for the store actor. Each request variant carries a
/// oneshot channel for the reply; the `*Fetched` variants are internal,
/// posted back into the mailbox by spawned fetch tasks.
#[derive(Debug)]
pub enum StoreRequest {
    PlaceOrder {
        draft: OrderDraft,
        respond_to: ServiceResponse<Order>,
    },
    AdvanceStatus {
        order_id: String,
        target: OrderStatus,
        payment: Option<PaymentMethod>,
        respond_to: ServiceResponse<Order>,
    },
    FetchOrders {
        respond_to: ServiceResponse<()>,
    },
    FetchMenuItems {
        respond_to: ServiceResponse<()>,
    },
    Orders {
        respond_to: ServiceResponse<Vec<Order>>,
    },
    MenuItems {
        respond_to: ServiceResponse<Vec<MenuItem>>,
    },
    AddMenuItem {
        create: MenuItemCreate,
        respond_to: ServiceResponse<MenuItem>,
    },
    UpdateMenuItem {
        item: MenuItem,
        respond_to: ServiceResponse<MenuItem>,
    },
    DeleteMenuItem {
        item_id: String,
        respond_to: ServiceResponse<()>,
    },
    AddUser {
        create: UserCreate,
        respond_to: ServiceResponse<User>,
    },
    Users {
        respond_to: ServiceResponse<Vec<User>>,
    },
    SignIn {
        username: String,
        password: String,
        respond_to: ServiceResponse<User>,
    },
    SignOut {
        respond_to: ServiceResponse<()>,
    },
    CurrentUser {
        respond_to: ServiceResponse<Option<User>>,
    },
    OrdersFetched {
        seq: u64,
        result: Result<Vec<Order>, RemoteError>,
    },
    MenuFetched {
        seq: u64,
        result: Result<Vec<MenuItem>, RemoteError>,
    },
    Shutdown,
}
