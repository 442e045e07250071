// ============================================================================
// Engine Configuration
// The fixed seed set the book is built from
// ============================================================================

use rust_decimal::Decimal;

use super::Side;
use crate::error::{EngineError, EngineResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A standing order to place at book initialization. Arrival stamps are
/// assigned in list order when the engine is built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SeedOrder {
    pub side: Side,
    pub quantity: u64,
    pub price: Decimal,
    pub account_id: String,
}

impl SeedOrder {
    pub fn new(side: Side, quantity: u64, price: Decimal, account_id: impl Into<String>) -> Self {
        Self {
            side,
            quantity,
            price,
            account_id: account_id.into(),
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.quantity == 0 {
            return Err(EngineError::NonPositiveQuantity {
                account_id: self.account_id.clone(),
            });
        }
        if self.price <= Decimal::ZERO {
            return Err(EngineError::NonPositivePrice {
                account_id: self.account_id.clone(),
                price: self.price,
            });
        }
        Ok(())
    }
}

/// Configuration for building a matching engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EngineConfig {
    /// Standing orders, in arrival order
    #[cfg_attr(feature = "serde", serde(default))]
    pub standing_orders: Vec<SeedOrder>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: append a standing order
    pub fn with_standing_order(
        mut self,
        side: Side,
        quantity: u64,
        price: Decimal,
        account_id: impl Into<String>,
    ) -> Self {
        self.standing_orders
            .push(SeedOrder::new(side, quantity, price, account_id));
        self
    }

    /// Validate every seed order
    pub fn validate(&self) -> EngineResult<()> {
        self.standing_orders.iter().try_for_each(SeedOrder::validate)
    }

    // ========================================================================
    // Preset Configurations
    // ========================================================================

    /// The two-by-two reference book: bids 10 @ 105.0 and 5 @ 104.0,
    /// asks 10 @ 106.0 and 5 @ 107.0.
    pub fn reference_book() -> Self {
        Self::new()
            .with_standing_order(Side::Buy, 10, Decimal::from(105), "B1001")
            .with_standing_order(Side::Buy, 5, Decimal::from(104), "B1002")
            .with_standing_order(Side::Sell, 10, Decimal::from(106), "S1001")
            .with_standing_order(Side::Sell, 5, Decimal::from(107), "S1002")
    }
}
