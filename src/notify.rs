//! Output-only notification collaborator. The store hands it human-readable
//! strings; what happens to them (toast, log line, nothing) is not the
//! store's concern.

use tracing::{error, info};

pub const ORDER_PLACED: &str = "Order placed successfully";
pub const ORDER_STARTED: &str = "Order started processing";
pub const ORDER_COMPLETED: &str = "Order completed";
pub const ORDER_CANCELLED: &str = "Order cancelled";
pub const ORDER_FAILED: &str = "Failed to place order";
pub const UPDATE_FAILED: &str = "Failed to update order";

pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default notifier: structured log lines through `tracing`.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(target: "waffle_pos::notify", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "waffle_pos::notify", "{}", message);
    }
}
