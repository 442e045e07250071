// ============================================================================
// Order Domain Model
// Standing (resting) orders and incoming market order commands
// ============================================================================

use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Direction of an order or command. Serialized as `BUY` / `SELL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side a command of this direction trades against.
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

// ============================================================================
// Standing Order
// ============================================================================

/// A resting limit order. Immutable once created; it leaves the book exactly
/// once, when an incoming command consumes it in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingOrder {
    pub id: OrderId,
    pub side: Side,
    pub quantity: u64,
    pub price: Decimal,
    pub account_id: String,
    /// Monotonic arrival stamp in nanoseconds. Only used to break price ties.
    pub arrival_nanos: u64,
}

impl StandingOrder {
    pub fn new(
        side: Side,
        quantity: u64,
        price: Decimal,
        account_id: impl Into<String>,
        arrival_nanos: u64,
    ) -> Self {
        Self {
            id: OrderId::new(),
            side,
            quantity,
            price,
            account_id: account_id.into(),
            arrival_nanos,
        }
    }
}

// ============================================================================
// Market Order Command
// ============================================================================

/// An incoming request to trade `quantity` immediately. Never rests in the book.
///
/// On the wire the direction may be spelled `side` or `type`; any other
/// unknown field fails the decode.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "camelCase", deny_unknown_fields)
)]
pub struct MarketOrderCommand {
    #[cfg_attr(feature = "serde", serde(alias = "type"))]
    pub side: Side,
    pub quantity: u64,
    pub account_id: String,
}

impl MarketOrderCommand {
    pub fn new(side: Side, quantity: u64, account_id: impl Into<String>) -> Self {
        Self {
            side,
            quantity,
            account_id: account_id.into(),
        }
    }

    pub fn buy(quantity: u64, account_id: impl Into<String>) -> Self {
        Self::new(Side::Buy, quantity, account_id)
    }

    pub fn sell(quantity: u64, account_id: impl Into<String>) -> Self {
        Self::new(Side::Sell, quantity, account_id)
    }
}
