// ============================================================================
// Event Handler Interface
// Defines the contract for observing matching engine resolutions
// ============================================================================

use crate::domain::{OrderId, Side};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the matching engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderEvent {
    /// Standing order placed while the book was built
    StandingOrderSeeded {
        order_id: OrderId,
        side: Side,
        price: Decimal,
        quantity: u64,
        timestamp: DateTime<Utc>,
    },

    /// Command consumed a standing order in full
    OrderMatched {
        maker_order_id: OrderId,
        maker_account_id: String,
        taker_account_id: String,
        taker_side: Side,
        price: Decimal,
        quantity: u64,
        timestamp: DateTime<Utc>,
    },

    /// No standing order of exactly the requested quantity
    CommandRejected {
        account_id: String,
        side: Side,
        quantity: u64,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing matching engine events.
///
/// Called after the side lock has been released.
pub trait EventHandler: Send + Sync {
    /// Handle an order event
    fn on_event(&self, event: OrderEvent);

    /// Handle a batch of events in order. The engine delivers the seed book
    /// through this in a single call.
    fn on_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: OrderEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        match &event {
            OrderEvent::OrderMatched {
                maker_order_id,
                taker_account_id,
                price,
                quantity,
                ..
            } => tracing::debug!(
                %maker_order_id,
                account_id = %taker_account_id,
                %price,
                quantity,
                "command filled"
            ),
            OrderEvent::CommandRejected {
                account_id,
                side,
                quantity,
                ..
            } => tracing::debug!(%account_id, %side, quantity, "command rejected"),
            OrderEvent::StandingOrderSeeded { .. } => {
                tracing::debug!("Matching engine event: {:?}", event)
            },
        }
    }
}
