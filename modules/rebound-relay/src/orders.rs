//! Order events handled by the relay.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use rebound::Rebound;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderCompleted {
    #[serde(rename = "OrderID")]
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderCancelled {
    #[serde(rename = "OrderID")]
    pub order_id: String,
    #[serde(rename = "Reason", default)]
    pub reason: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("order id is empty")]
    MissingOrderId,

    #[error("order {0} was cancelled without a reason")]
    MissingReason(String),
}

/// Register every order handler on `rb`.
pub fn register(rb: &mut Rebound<OrderError>) {
    rb.react_to("order.completed", on_completed);
    rb.react_to("order.cancelled", on_cancelled);
}

fn on_completed(event: OrderCompleted) -> Result<(), OrderError> {
    if event.order_id.is_empty() {
        return Err(OrderError::MissingOrderId);
    }
    info!(order_id = %event.order_id, "Order completed");
    println!("Order {:?} is completed", event.order_id);
    Ok(())
}

fn on_cancelled(event: OrderCancelled) -> Result<(), OrderError> {
    if event.order_id.is_empty() {
        return Err(OrderError::MissingOrderId);
    }
    if event.reason.trim().is_empty() {
        return Err(OrderError::MissingReason(event.order_id));
    }
    info!(order_id = %event.order_id, reason = %event.reason, "Order cancelled");
    println!("Order {:?} is cancelled: {}", event.order_id, event.reason);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_both_order_events() {
        let mut rb = Rebound::new();
        register(&mut rb);
        assert_eq!(rb.event_names(), vec!["order.cancelled", "order.completed"]);
    }

    #[test]
    fn cancellation_needs_a_reason() {
        let mut rb = Rebound::new();
        register(&mut rb);

        let err = rb
            .dispatch("order.cancelled", br#"{"OrderID":"9"}"#)
            .unwrap_err();
        assert_eq!(
            err.into_handler_error(),
            Some(OrderError::MissingReason("9".into()))
        );
    }
}
