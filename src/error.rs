use thiserror::Error;

use crate::domain::OrderStatus;

/// Errors from the remote order service collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RemoteError {
    #[error("remote read failed: {0}")]
    ReadFailed(String),
    #[error("remote write failed: {0}")]
    WriteFailed(String),
    #[error("row not found: {0}")]
    NotFound(String),
}

/// Errors from the authentication collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("invalid credentials for {0}")]
    InvalidCredentials(String),
    #[error("no profile linked to auth identity {0}")]
    UnknownProfile(String),
}

/// Errors surfaced by the order store to its callers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("authentication required")]
    AuthRequired,
    #[error("manager role required")]
    Forbidden,
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("payment method required to complete an order")]
    PaymentRequired,
    #[error("order has no items")]
    EmptyOrder,
    #[error("invalid quantity {quantity} for item {item_id}")]
    InvalidQuantity { item_id: String, quantity: u32 },
    #[error("unknown menu item: {0}")]
    UnknownMenuItem(String),
    #[error("price must be non-negative, got {0}")]
    InvalidPrice(f64),
    #[error("order not found: {0}")]
    OrderNotFound(String),
    #[error("order {order_id} rolled back, line items were not written: {reason}")]
    PartialOrderWrite { order_id: String, reason: String },
    #[error("remote write failed: {0}")]
    RemoteWrite(RemoteError),
    #[error("remote read failed: {0}")]
    RemoteRead(RemoteError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("actor communication error: {0}")]
    ActorClosed(String),
}
