// ============================================================================
// Matching Engine Factory
// Builds engines with their seed book
// ============================================================================

use crate::domain::{EngineConfig, SeedOrder, Side};
use crate::engine::{ExactQuantityMatch, MatchingEngine};
use crate::error::EngineResult;
use crate::interfaces::{EventHandler, MatchingAlgorithm, NoOpEventHandler};
use rust_decimal::Decimal;
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a matching engine from configuration
///
/// # Arguments
/// * `config` - Seed book configuration
/// * `event_handler` - Event handler for seeding and resolution events
///
/// # Returns
/// * `EngineResult<MatchingEngine>` - Seeded matching engine or the first invalid seed order
///
/// # Example
/// ```
/// use market_order_matcher::prelude::*;
/// use std::sync::Arc;
///
/// let engine = create_from_config(EngineConfig::reference_book(), Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(engine.len(Side::Buy), 2);
/// ```
pub fn create_from_config(
    config: EngineConfig,
    event_handler: Arc<dyn EventHandler>,
) -> EngineResult<MatchingEngine> {
    MatchingEngineBuilder::from_config(config)
        .with_event_handler(event_handler)
        .build()
}

// ============================================================================
// Builder Pattern
// ============================================================================

/// Builder for creating matching engines with fluent API
///
/// # Example
/// ```
/// use market_order_matcher::prelude::*;
/// use rust_decimal::Decimal;
///
/// let engine = MatchingEngineBuilder::new()
///     .with_standing_order(Side::Sell, 10, Decimal::from(106), "S1001")
///     .with_standing_order(Side::Sell, 5, Decimal::from(107), "S1002")
///     .build()
///     .unwrap();
///
/// let report = engine.process(&MarketOrderCommand::buy(5, "1233"));
/// assert_eq!(report.executed_price(), Some(Decimal::from(107)));
/// ```
pub struct MatchingEngineBuilder {
    config: EngineConfig,
    algorithm: Box<dyn MatchingAlgorithm>,
    event_handler: Arc<dyn EventHandler>,
}

impl MatchingEngineBuilder {
    /// Create a builder with an empty book
    pub fn new() -> Self {
        Self::from_config(EngineConfig::new())
    }

    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            algorithm: Box::new(ExactQuantityMatch::new()),
            event_handler: Arc::new(NoOpEventHandler),
        }
    }

    /// Append a standing order; arrival order follows call order
    pub fn with_standing_order(
        mut self,
        side: Side,
        quantity: u64,
        price: Decimal,
        account_id: impl Into<String>,
    ) -> Self {
        self.config = self
            .config
            .with_standing_order(side, quantity, price, account_id);
        self
    }

    pub fn with_seed_orders(mut self, orders: impl IntoIterator<Item = SeedOrder>) -> Self {
        self.config.standing_orders.extend(orders);
        self
    }

    pub fn with_algorithm(mut self, algorithm: Box<dyn MatchingAlgorithm>) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_event_handler(mut self, event_handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = event_handler;
        self
    }

    /// Validate the seed set, then build and seed the engine
    pub fn build(self) -> EngineResult<MatchingEngine> {
        self.config.validate()?;

        let engine = MatchingEngine::new(self.algorithm, self.event_handler);
        engine.seed_all(self.config.standing_orders)?;

        tracing::debug!(
            algorithm = engine.algorithm_name(),
            bids = engine.len(Side::Buy),
            asks = engine.len(Side::Sell),
            "matching engine built"
        );

        Ok(engine)
    }
}

impl Default for MatchingEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
