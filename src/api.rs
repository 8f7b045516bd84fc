// This file contains the basic types used to communicate through the API
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::CLIError;

/// Estimated delivery window returned with every accepted order
pub const ESTIMATED_TIME: &str = "30-40 minutes";

/// Message returned with every accepted order
pub const ORDER_PLACED: &str = "Order placed successfully!";

/// Section of the menu an entry belongs to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Burgers,
    Pizza,
    Sides,
    Drinks,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Burgers,
        Category::Pizza,
        Category::Sides,
        Category::Drinks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Burgers => "burgers",
            Category::Pizza => "pizza",
            Category::Sides => "sides",
            Category::Drinks => "drinks",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CLIError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CLIError::InvalidParameter(s.to_string()))
    }
}

/// An orderable item, as returned by `GET /api/menu`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MenuEntry {
    /// Unique ID, fixed when the server starts
    pub id: u32,
    pub name: String,
    pub category: Category,
    /// Price in minor currency units
    pub price: u32,
    pub description: String,
    /// Glyph shown next to the entry
    pub image: String,
}

/// One line of a submitted order.
///
/// The server takes whatever the client sends and only checks it when strict mode is enabled,
/// so every field is kept as the raw JSON value and read through the accessors below.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct OrderItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
}

impl OrderItem {
    pub fn id(&self) -> Option<u32> {
        as_amount(self.id.as_ref()).and_then(|id| u32::try_from(id).ok())
    }

    pub fn name(&self) -> Option<String> {
        as_text(self.name.as_ref())
    }

    pub fn category(&self) -> Option<String> {
        as_text(self.category.as_ref())
    }

    pub fn price(&self) -> Option<u64> {
        as_amount(self.price.as_ref())
    }

    pub fn quantity(&self) -> Option<u64> {
        as_amount(self.quantity.as_ref())
    }

    /// Price times quantity, when both are known
    pub fn line_total(&self) -> Option<u64> {
        self.price()?.checked_mul(self.quantity()?)
    }
}

/// Body of `POST /api/order`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderItem>,
    /// Amount to pay including delivery, in minor currency units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
}

impl OrderRequest {
    pub fn total_amount(&self) -> Option<u64> {
        as_amount(self.total.as_ref())
    }

    pub fn customer_name(&self) -> Option<String> {
        as_text(self.customer_name.as_ref())
    }

    pub fn phone(&self) -> Option<String> {
        as_text(self.phone.as_ref())
    }

    pub fn address(&self) -> Option<String> {
        as_text(self.address.as_ref())
    }
}

/// Reads a loosely typed field as text. Strings are taken as they are, numbers and booleans in
/// their JSON form.
pub fn as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Reads a loosely typed field as a non-negative whole amount.
///
/// Accepts integers, floats without a fractional part (`339.0`) and numeric strings (`"339"`).
pub fn as_amount(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Who the order is for, as typed in at checkout
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Answer to `POST /api/order`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    /// The total from the request, echoed back as it was sent
    #[serde(default)]
    pub total: Option<Value>,
}

impl OrderResult {
    /// The confirmation sent back for an accepted order
    pub fn accepted(order_id: String, total: Option<Value>) -> OrderResult {
        OrderResult {
            success: true,
            message: ORDER_PLACED.to_string(),
            order_id: Some(order_id),
            estimated_time: Some(ESTIMATED_TIME.to_string()),
            total,
        }
    }

    /// A failure body, used for any request the server refuses
    pub fn rejected(message: impl Into<String>) -> OrderResult {
        OrderResult {
            success: false,
            message: message.into(),
            order_id: None,
            estimated_time: None,
            total: None,
        }
    }
}

/// Answer to `GET /health`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub menu_items: usize,
    pub message: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!("pizza".parse::<Category>(), Ok(Category::Pizza));
        assert_eq!("DRINKS".parse::<Category>(), Ok(Category::Drinks));
        assert!("desserts".parse::<Category>().is_err());
        assert_eq!(
            serde_json::to_string(&Category::Sides).unwrap(),
            "\"sides\""
        );
    }

    #[test]
    fn test_order_request_accepts_missing_fields() {
        let order: OrderRequest = serde_json::from_str("{}").unwrap();
        assert!(order.items.is_empty());
        assert_eq!(order.total_amount(), None);
        assert_eq!(order.customer_name(), None);

        let order: OrderRequest =
            serde_json::from_str(r#"{"items":[{"name":"Sprite"}],"customerName":"Ana"}"#).unwrap();
        assert_eq!(order.items[0].name().as_deref(), Some("Sprite"));
        assert_eq!(order.items[0].line_total(), None);
        assert_eq!(order.customer_name().as_deref(), Some("Ana"));
    }

    #[test]
    fn test_order_request_accepts_mistyped_fields() {
        let order: OrderRequest = serde_json::from_str(
            r#"{"items":[{"id":"3","price":149.0,"quantity":"2","name":7}],
                "total":"339","phone":5550100,"address":null}"#,
        )
        .unwrap();
        assert_eq!(order.total_amount(), Some(339));
        assert_eq!(order.phone().as_deref(), Some("5550100"));
        assert_eq!(order.address(), None);

        let item = &order.items[0];
        assert_eq!(item.id(), Some(3));
        assert_eq!(item.name().as_deref(), Some("7"));
        assert_eq!(item.line_total(), Some(298));

        let order: OrderRequest = serde_json::from_str(r#"{"total":339.5}"#).unwrap();
        assert_eq!(order.total_amount(), None);
        let order: OrderRequest = serde_json::from_str(r#"{"total":-5}"#).unwrap();
        assert_eq!(order.total_amount(), None);
    }

    #[test]
    fn test_order_result_wire_format() {
        let result = OrderResult::accepted("ORD1".to_string(), Some(serde_json::json!(687)));
        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["orderId"], "ORD1");
        assert_eq!(json["estimatedTime"], ESTIMATED_TIME);
        assert_eq!(json["message"], ORDER_PLACED);
        assert_eq!(json["total"], 687);

        let json = serde_json::to_value(OrderResult::accepted("ORD2".to_string(), None)).unwrap();
        assert!(json["total"].is_null());

        let json =
            serde_json::to_value(OrderResult::accepted("ORD3".to_string(), Some("339".into())))
                .unwrap();
        assert_eq!(json["total"], "339");
    }
}
