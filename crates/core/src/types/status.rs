//! Order status lifecycle.
//!
//! ```text
//! pending ──> processed ──> shipped ──> done
//!    │            │            │
//!    └────────────┴────────────┴──────> cancelled
//! ```
//!
//! `done` and `cancelled` are terminal.

use serde::{Deserialize, Serialize};

/// Status of a customer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed by the buyer, not yet looked at.
    #[default]
    Pending,
    /// Accepted and being prepared.
    Processed,
    /// Handed to delivery.
    Shipped,
    /// Delivered and complete.
    Done,
    /// Cancelled by the owner.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processed,
        Self::Shipped,
        Self::Done,
        Self::Cancelled,
    ];

    /// Whether no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Whether an order may move from `self` to `next`.
    ///
    /// Orders advance one step at a time along the fulfilment path, or are
    /// cancelled from any non-terminal status.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processed)
                | (Self::Processed, Self::Shipped)
                | (Self::Shipped, Self::Done)
                | (Self::Pending | Self::Processed | Self::Shipped, Self::Cancelled)
        )
    }

    /// The database / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Shipped => "shipped",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processed" => Ok(Self::Processed),
            "shipped" => Ok(Self::Shipped),
            "done" => Ok(Self::Done),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processed));
        assert!(OrderStatus::Processed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Done));
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Processed.can_transition_to(OrderStatus::Processed));
    }

    #[test]
    fn test_cancel_only_from_open_states() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Done.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in OrderStatus::ALL {
            assert!(!OrderStatus::Done.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_string_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("archived".parse::<OrderStatus>().is_err());
    }
}
