use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tracing::info;

use crate::api::{as_text, OrderRequest};
use crate::errors::Result;

/// Prefix of every order id
pub const ORDER_ID_PREFIX: &str = "ORD";

/// Trait hiding where accepted orders end up
///
/// Orders are not stored anywhere, the production implementation only writes them to the log.
/// The trait lets tests swap in a mock that remembers what it was given.
pub trait OrderLog: Send + Sync {
    /// Record an order that was just accepted under `order_id`
    fn record(&self, order_id: &str, order: &OrderRequest) -> Result<()>;
}

/// Writes a human readable summary of each order through `tracing`
#[derive(Debug, Default)]
pub struct TracingOrderLog;

impl OrderLog for TracingOrderLog {
    fn record(&self, order_id: &str, order: &OrderRequest) -> Result<()> {
        for line in order_summary(order_id, order) {
            info!(order_id, "{}", line);
        }
        Ok(())
    }
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| "<missing>".to_string())
}

/// Lines describing an order, as they appear in the log
pub fn order_summary(order_id: &str, order: &OrderRequest) -> Vec<String> {
    let mut lines = vec![
        "===== NEW ORDER RECEIVED =====".to_string(),
        format!("Order ID: {}", order_id),
        format!("Customer: {}", or_unknown(order.customer_name())),
        format!("Phone: {}", or_unknown(order.phone())),
        format!("Address: {}", or_unknown(order.address())),
        format!("Total: {}", or_unknown(as_text(order.total.as_ref()))),
        "Items ordered:".to_string(),
    ];
    lines.extend(order.items.iter().map(|item| {
        format!(
            "   - {} x{} = {}",
            or_unknown(item.name()),
            as_text(item.quantity.as_ref()).unwrap_or_else(|| "?".to_string()),
            item.line_total()
                .map_or_else(|| "?".to_string(), |t| t.to_string())
        )
    }));
    lines.push("================================".to_string());
    lines
}

/// Problems found in a submitted order
///
/// An empty list means the order is well formed. The server only refuses orders with problems
/// when strict mode is on.
pub fn validate_order(order: &OrderRequest) -> Vec<String> {
    let mut problems = Vec::new();
    if order.items.is_empty() {
        problems.push("order has no items".to_string());
    }
    for (i, item) in order.items.iter().enumerate() {
        if item.id().is_none() {
            problems.push(format!("item {} has no id", i));
        }
        match item.quantity() {
            Some(q) if q >= 1 => (),
            _ => problems.push(format!("item {} has no valid quantity", i)),
        }
    }
    let required = [
        ("customerName", order.customer_name()),
        ("phone", order.phone()),
        ("address", order.address()),
    ];
    for (field, value) in required {
        if value.map_or(true, |v| v.trim().is_empty()) {
            problems.push(format!("missing {}", field));
        }
    }
    problems
}

/// Hands out `ORD<milliseconds>` order ids.
///
/// Ids come from the wall clock, but the generator never hands out the same value twice: when
/// the clock has not moved since the last id, the last value plus one is used instead. This
/// only holds within a process, ids may repeat after a restart.
#[derive(Debug, Default)]
pub struct OrderIdGenerator {
    last: AtomicU64,
}

impl OrderIdGenerator {
    pub fn new() -> OrderIdGenerator {
        OrderIdGenerator::default()
    }

    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.next_id_at(now)
    }

    fn next_id_at(&self, now: u64) -> String {
        let mut last = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return format!("{}{}", ORDER_ID_PREFIX, candidate),
                Err(current) => last = current,
            }
        }
    }
}

pub mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Keeps every recorded order in memory
    #[derive(Debug, Default)]
    pub struct RecordingOrderLog(Mutex<Vec<(String, OrderRequest)>>);

    impl RecordingOrderLog {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn recorded(&self) -> Vec<(String, OrderRequest)> {
            self.0.lock().map(|orders| orders.clone()).unwrap_or_default()
        }
    }

    impl OrderLog for RecordingOrderLog {
        fn record(&self, order_id: &str, order: &OrderRequest) -> Result<()> {
            if let Ok(mut orders) = self.0.lock() {
                orders.push((order_id.to_string(), order.clone()));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::{Customer, OrderItem};
    use crate::cart::Cart;
    use crate::menu::Catalog;
    use mock::RecordingOrderLog;

    fn sample_order() -> OrderRequest {
        let menu = Catalog::standard();
        let mut cart = Cart::new();
        cart.add_item(&menu, 1).unwrap();
        cart.add_item(&menu, 1).unwrap();
        cart.add_item(&menu, 13).unwrap();
        cart.to_order_request(&Customer {
            name: "Ana".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
        })
    }

    #[test]
    fn test_ids_are_distinct_within_same_millisecond() {
        let generator = OrderIdGenerator::new();
        assert_eq!(generator.next_id_at(1000), "ORD1000");
        assert_eq!(generator.next_id_at(1000), "ORD1001");
        assert_eq!(generator.next_id_at(999), "ORD1002");
        assert_eq!(generator.next_id_at(5000), "ORD5000");
    }

    #[test]
    fn test_ids_from_clock() {
        let generator = OrderIdGenerator::new();
        let first = generator.next_id();
        let second = generator.next_id();
        assert!(first.starts_with(ORDER_ID_PREFIX));
        assert_ne!(first, second);
        let millis: u64 = first[ORDER_ID_PREFIX.len()..].parse().unwrap();
        assert!(millis > 1_600_000_000_000);
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let generator = std::sync::Arc::new(OrderIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || (0..100).map(|_| generator.next_id()).collect::<Vec<_>>())
            })
            .collect();
        let mut ids: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 400);
    }

    #[test]
    fn test_order_summary() {
        let lines = order_summary("ORD42", &sample_order());
        assert!(lines.contains(&"Order ID: ORD42".to_string()));
        assert!(lines.contains(&"Customer: Ana".to_string()));
        assert!(lines.contains(&"Total: 687".to_string()));
        assert!(lines.contains(&"   - Classic Burger x2 = 598".to_string()));
        assert!(lines.contains(&"   - Coca Cola x1 = 49".to_string()));
    }

    #[test]
    fn test_order_summary_with_missing_fields() {
        let order = OrderRequest {
            items: vec![OrderItem {
                name: Some("Sprite".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let lines = order_summary("ORD1", &order);
        assert!(lines.contains(&"Customer: <missing>".to_string()));
        assert!(lines.contains(&"   - Sprite x? = ?".to_string()));
    }

    #[test]
    fn test_order_summary_with_mistyped_fields() {
        let order: OrderRequest = serde_json::from_str(
            r#"{"items":[{"name":"Fries","price":"99","quantity":2.0}],
                "total":"339","phone":5550100}"#,
        )
        .unwrap();
        let lines = order_summary("ORD7", &order);
        assert!(lines.contains(&"Phone: 5550100".to_string()));
        assert!(lines.contains(&"Total: 339".to_string()));
        assert!(lines.contains(&"   - Fries x2.0 = 198".to_string()));

        let problems = validate_order(&order);
        assert_eq!(
            problems,
            vec![
                "item 0 has no id".to_string(),
                "missing customerName".to_string(),
                "missing address".to_string()
            ]
        );
    }

    #[test]
    fn test_validate_order() {
        assert!(validate_order(&sample_order()).is_empty());

        let problems = validate_order(&OrderRequest::default());
        assert!(problems.contains(&"order has no items".to_string()));
        assert!(problems.contains(&"missing customerName".to_string()));
        assert!(problems.contains(&"missing phone".to_string()));
        assert!(problems.contains(&"missing address".to_string()));

        let mut order = sample_order();
        order.items[0].quantity = Some(serde_json::json!(0));
        order.phone = Some("  ".into());
        let problems = validate_order(&order);
        assert_eq!(
            problems,
            vec![
                "item 0 has no valid quantity".to_string(),
                "missing phone".to_string()
            ]
        );
    }

    #[test]
    fn test_recording_log() {
        let log = RecordingOrderLog::new();
        log.record("ORD1", &sample_order()).unwrap();
        log.record("ORD2", &OrderRequest::default()).unwrap();
        let recorded = log.recorded();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].0, "ORD1");
        assert_eq!(recorded[0].1.items.len(), 2);
    }

    #[test]
    fn test_tracing_log_never_fails() {
        assert!(TracingOrderLog.record("ORD1", &OrderRequest::default()).is_ok());
    }
}
