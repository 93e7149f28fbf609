//! Placed-order record — the immutable snapshot persisted in the ledger.

use chrono::{DateTime, Utc};
use krd_cart::LineItem;
use serde::{Deserialize, Serialize};

/// Stored lifecycle status of a placed order.
///
/// Serialized as `"Active" | "Cancelled" | "Delivered"` — the historical
/// persisted payload. The time-derived view (cancellable vs. expired) is
/// never stored; see [`clock`](crate::clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Placed and neither cancelled nor delivered.
    Active,
    /// Cancelled inside the window. **Terminal.**
    Cancelled,
    /// Fulfilled by the external delivery flow. **Terminal.**
    Delivered,
}

impl OrderStatus {
    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Delivered)
    }
}

/// An immutable snapshot of a cart at the moment of purchase confirmation.
///
/// `items` is a deep copy taken at placement; `subtotal`, `delivery_fee`
/// and `total` are fixed then and never recomputed. The only field that
/// ever changes afterwards is `status`, through the ledger's transition
/// methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Monotonic id from the persisted counter — unique across restarts.
    pub id: u64,
    pub placed_at: DateTime<Utc>,
    pub items: Vec<LineItem>,
    pub subtotal: i64,
    pub delivery_fee: i64,
    /// `subtotal + delivery_fee`, fixed at placement.
    pub total: i64,
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_terminality() {
        assert!(!OrderStatus::Active.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
    }

    #[test]
    fn status_serializes_as_plain_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Active).unwrap(),
            r#""Active""#
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            r#""Cancelled""#
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Delivered).unwrap(),
            r#""Delivered""#
        );
    }
}
