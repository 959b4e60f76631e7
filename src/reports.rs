//! Aggregate sales reporting over an order snapshot. Pure functions: the
//! caller passes the orders and the clock, nothing here touches the store
//! or the backend.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::domain::{Order, OrderStatus, PaymentMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Today,
    Week,
    Month,
    Year,
}

impl Timeframe {
    /// Orders created at or after this instant fall inside the timeframe.
    /// All windows anchor to the start of the current day.
    fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        match self {
            Timeframe::Today => today,
            Timeframe::Week => today - Duration::days(7),
            Timeframe::Month => today - Duration::days(30),
            Timeframe::Year => today - Duration::days(365),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesSummary {
    pub total_sales: f64,
    pub total_orders: usize,
    pub completed_orders: usize,
    pub cancelled_orders: usize,
    pub cash_sales: f64,
    pub cash_orders: usize,
    pub gpay_sales: f64,
    pub gpay_orders: usize,
    pub average_order_value: f64,
}

/// Revenue only counts completed orders; cancelled and in-flight ones show
/// up in the counts alone.
pub fn sales_summary(orders: &[Order], timeframe: Timeframe, now: DateTime<Utc>) -> SalesSummary {
    let cutoff = timeframe.cutoff(now);
    let in_frame: Vec<&Order> = orders.iter().filter(|o| o.created_at >= cutoff).collect();

    let mut summary = SalesSummary {
        total_orders: in_frame.len(),
        ..SalesSummary::default()
    };
    for order in &in_frame {
        match order.status {
            OrderStatus::Completed => {
                summary.completed_orders += 1;
                summary.total_sales += order.total_amount;
                match order.payment_method {
                    Some(PaymentMethod::Cash) => {
                        summary.cash_orders += 1;
                        summary.cash_sales += order.total_amount;
                    }
                    Some(PaymentMethod::Gpay) => {
                        summary.gpay_orders += 1;
                        summary.gpay_sales += order.total_amount;
                    }
                    None => {}
                }
            }
            OrderStatus::Cancelled => summary.cancelled_orders += 1,
            OrderStatus::New | OrderStatus::Processing => {}
        }
    }
    if summary.completed_orders > 0 {
        summary.average_order_value = summary.total_sales / summary.completed_orders as f64;
    }
    summary
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemSales {
    pub name: String,
    pub quantity: u32,
    pub revenue: f64,
}

/// Top menu items by quantity sold across completed orders in the
/// timeframe, most popular first.
pub fn top_items(
    orders: &[Order],
    timeframe: Timeframe,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<ItemSales> {
    let cutoff = timeframe.cutoff(now);
    let mut by_name: HashMap<&str, (u32, f64)> = HashMap::new();
    for order in orders {
        if order.status != OrderStatus::Completed || order.created_at < cutoff {
            continue;
        }
        for item in &order.items {
            let entry = by_name.entry(item.name.as_str()).or_default();
            entry.0 += item.quantity;
            entry.1 += item.subtotal;
        }
    }

    let mut ranked: Vec<ItemSales> = by_name
        .into_iter()
        .map(|(name, (quantity, revenue))| ItemSales {
            name: name.to_string(),
            quantity,
            revenue,
        })
        .collect();
    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity).then(a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderItem;

    fn order(
        id: &str,
        status: OrderStatus,
        payment: Option<PaymentMethod>,
        total: f64,
        age_days: i64,
        now: DateTime<Utc>,
    ) -> Order {
        let created_at = now - Duration::days(age_days);
        Order {
            order_id: id.to_string(),
            order_number: "0000".to_string(),
            status,
            total_amount: total,
            notes: None,
            payment_method: payment,
            created_by: "user_1".to_string(),
            created_at,
            updated_at: created_at,
            items: Vec::new(),
        }
    }

    fn with_items(mut order: Order, items: Vec<(&str, u32, f64)>) -> Order {
        order.items = items
            .into_iter()
            .map(|(name, quantity, price)| OrderItem {
                order_item_id: format!("{}-{}", order.order_id, name),
                order_id: order.order_id.clone(),
                item_id: name.to_string(),
                name: name.to_string(),
                quantity,
                item_price: price,
                subtotal: price * f64::from(quantity),
                special_instructions: None,
            })
            .collect();
        order
    }

    #[test]
    fn summary_splits_by_payment_method() {
        let now = Utc::now();
        let orders = vec![
            order("o1", OrderStatus::Completed, Some(PaymentMethod::Cash), 100.0, 0, now),
            order("o2", OrderStatus::Completed, Some(PaymentMethod::Gpay), 150.0, 0, now),
            order("o3", OrderStatus::Completed, Some(PaymentMethod::Cash), 50.0, 0, now),
            order("o4", OrderStatus::Cancelled, None, 80.0, 0, now),
            order("o5", OrderStatus::Processing, None, 60.0, 0, now),
        ];

        let summary = sales_summary(&orders, Timeframe::Today, now);
        assert_eq!(summary.total_orders, 5);
        assert_eq!(summary.completed_orders, 3);
        assert_eq!(summary.cancelled_orders, 1);
        assert_eq!(summary.total_sales, 300.0);
        assert_eq!(summary.cash_sales, 150.0);
        assert_eq!(summary.cash_orders, 2);
        assert_eq!(summary.gpay_sales, 150.0);
        assert_eq!(summary.gpay_orders, 1);
        assert_eq!(summary.average_order_value, 100.0);
    }

    #[test]
    fn timeframe_excludes_older_orders() {
        let now = Utc::now();
        let orders = vec![
            order("o1", OrderStatus::Completed, Some(PaymentMethod::Cash), 100.0, 0, now),
            order("o2", OrderStatus::Completed, Some(PaymentMethod::Cash), 200.0, 3, now),
            order("o3", OrderStatus::Completed, Some(PaymentMethod::Cash), 400.0, 40, now),
        ];

        assert_eq!(sales_summary(&orders, Timeframe::Today, now).total_sales, 100.0);
        assert_eq!(sales_summary(&orders, Timeframe::Week, now).total_sales, 300.0);
        assert_eq!(sales_summary(&orders, Timeframe::Month, now).total_sales, 300.0);
        assert_eq!(sales_summary(&orders, Timeframe::Year, now).total_sales, 700.0);
    }

    #[test]
    fn empty_snapshot_has_zero_average() {
        let summary = sales_summary(&[], Timeframe::Year, Utc::now());
        assert_eq!(summary, SalesSummary::default());
    }

    #[test]
    fn top_items_ranks_by_quantity_from_completed_orders() {
        let now = Utc::now();
        let orders = vec![
            with_items(
                order("o1", OrderStatus::Completed, Some(PaymentMethod::Cash), 250.0, 0, now),
                vec![("Dark Choco Mini", 3, 50.0), ("Bubble Dark Choco", 1, 150.0)],
            ),
            with_items(
                order("o2", OrderStatus::Completed, Some(PaymentMethod::Gpay), 100.0, 0, now),
                vec![("Dark Choco Mini", 2, 50.0)],
            ),
            // Cancelled orders never count toward popularity.
            with_items(
                order("o3", OrderStatus::Cancelled, None, 450.0, 0, now),
                vec![("Bubble Dark Choco", 3, 150.0)],
            ),
        ];

        let ranked = top_items(&orders, Timeframe::Today, now, 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "Dark Choco Mini");
        assert_eq!(ranked[0].quantity, 5);
        assert_eq!(ranked[0].revenue, 250.0);
        assert_eq!(ranked[1].name, "Bubble Dark Choco");
        assert_eq!(ranked[1].quantity, 1);
    }
}
