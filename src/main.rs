mod app_system;
mod domain;
mod error;
mod lifecycle;
mod listener;
mod notify;
mod remote;
mod reports;
mod session;
mod store;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::app_system::{setup_tracing, PosSystem};
use crate::domain::{Category, DraftLine, MenuItemCreate, OrderDraft, OrderStatus, PaymentMethod, Role, Size, User};
use crate::notify::LogNotifier;
use crate::remote::memory::MemoryBackend;
use crate::remote::RemoteBackend;
use crate::reports::{sales_summary, top_items, Timeframe};
use crate::session::MemoryAuthenticator;

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting waffle POS");

    let backend = Arc::new(MemoryBackend::new());
    let auth = Arc::new(MemoryAuthenticator::new());

    // Bootstrap one manager account; everything else goes through the store.
    let manager = User {
        user_id: Uuid::new_v4().to_string(),
        auth_id: Some(auth.register("meera", "waffles")),
        username: "meera".to_string(),
        role: Role::Manager,
        phone: None,
        created_at: Utc::now(),
    };
    backend
        .insert_user(&manager)
        .await
        .map_err(|e| e.to_string())?;

    let system = PosSystem::new(backend, auth, Arc::new(LogNotifier));
    let store = &system.store;

    let user = store
        .sign_in("meera".to_string(), "waffles".to_string())
        .await
        .map_err(|e| e.to_string())?;
    info!(username = %user.username, role = %user.role, "Signed in");

    // Stock the catalog.
    let span = tracing::info_span!("catalog_setup");
    let (mini, bubble) = async {
        let mini = store
            .add_menu_item(MenuItemCreate::new(
                "Dark Choco Mini",
                50.0,
                Category::MiniWaffle,
                Size::Regular,
            ))
            .await?;
        let bubble = store
            .add_menu_item(MenuItemCreate::new(
                "Bubble Death by Chocolate",
                150.0,
                Category::BubbleWaffle,
                Size::Large,
            ))
            .await?;
        Ok::<_, crate::error::StoreError>((mini, bubble))
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    // Take one order through its whole lifecycle.
    let span = tracing::info_span!("order_flow");
    async {
        let order = store
            .place_order(OrderDraft::new(vec![
                DraftLine::new(mini.item_id.clone(), 2),
                DraftLine::new(bubble.item_id.clone(), 1),
            ]))
            .await?;
        info!(order_number = %order.order_number, total = %order.total_amount, "Order placed");

        store
            .advance_status(order.order_id.clone(), OrderStatus::Processing, None)
            .await?;
        store
            .advance_status(
                order.order_id.clone(),
                OrderStatus::Completed,
                Some(PaymentMethod::Cash),
            )
            .await?;
        Ok::<_, crate::error::StoreError>(())
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    let orders = store.orders().await.map_err(|e| e.to_string())?;
    let summary = sales_summary(&orders, Timeframe::Today, Utc::now());
    info!(
        total_sales = %summary.total_sales,
        completed = summary.completed_orders,
        cash = %summary.cash_sales,
        "Today's numbers"
    );
    for item in top_items(&orders, Timeframe::Today, Utc::now(), 3) {
        info!(name = %item.name, quantity = item.quantity, revenue = %item.revenue, "Top seller");
    }

    system.shutdown().await?;

    info!("Done");
    Ok(())
}
