//! Order and payment status, and the order state machine.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Fulfilment status of an order.
///
/// ```text
/// pending          → processing | cancelled | refund_requested
/// processing       → shipped | cancelled | refund_requested
/// shipped          → delivered | refund_requested
/// refund_requested → refunded | <status before the request>
/// delivered, cancelled, refunded: terminal
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    RefundRequested,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::RefundRequested,
        OrderStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::RefundRequested => "refund_requested",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// Statuses from which a refund may be requested.
    pub fn accepts_refund_request(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Processing | OrderStatus::Shipped
        )
    }

    /// Whether the adjacency list contains `self → next`.
    ///
    /// Leaving `refund_requested` is listed for every status a request can be
    /// made from; the order additionally checks that the target is the status
    /// recorded on the request.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match self {
            Pending => matches!(next, Processing | Cancelled | RefundRequested),
            Processing => matches!(next, Shipped | Cancelled | RefundRequested),
            Shipped => matches!(next, Delivered | RefundRequested),
            RefundRequested => matches!(next, Refunded | Pending | Processing | Shipped),
            Delivered | Cancelled | Refunded => false,
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn adjacency_list_is_exact() {
        let allowed = [
            (Pending, Processing),
            (Pending, Cancelled),
            (Pending, RefundRequested),
            (Processing, Shipped),
            (Processing, Cancelled),
            (Processing, RefundRequested),
            (Shipped, Delivered),
            (Shipped, RefundRequested),
            (RefundRequested, Refunded),
            (RefundRequested, Pending),
            (RefundRequested, Processing),
            (RefundRequested, Shipped),
        ];
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} → {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        for status in [Delivered, Cancelled, Refunded] {
            assert!(status.is_terminal());
            assert!(OrderStatus::ALL
                .iter()
                .all(|next| !status.can_transition_to(*next)));
        }
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("refund_requested".parse::<OrderStatus>().unwrap(), RefundRequested);
        assert_eq!(" Shipped ".parse::<OrderStatus>().unwrap(), Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
        assert_eq!(serde_json::to_string(&RefundRequested).unwrap(), "\"refund_requested\"");
    }
}
