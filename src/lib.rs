// ============================================================================
// Market Order Matcher Library
// Exact-quantity market order matching against a seeded book
// ============================================================================

//! # Market Order Matcher
//!
//! A matching core that resolves market orders against a book of standing
//! orders, plus a newline-delimited JSON transport in front of it.
//!
//! ## Matching policy
//!
//! A command of quantity `Q` walks the opposite side in price-time priority
//! and fills entirely against the first standing order whose quantity is
//! exactly `Q`. There are no partial fills, and commands never rest: a
//! command with no exact match is REJECTED and leaves the book untouched.
//!
//! Each side sits behind its own lock. BUY commands only lock the sell side
//! and SELL commands only lock the buy side, so opposite-direction commands
//! never contend.
//!
//! ## Features
//!
//! - `serde`: JSON encoding of commands, reports, configs and events
//! - `transport` (default): TCP server and client, implies `serde`
//! - `logging`: `tracing-subscriber` setup via [`utils::init_logging`]
//!
//! ## Example
//!
//! ```rust
//! use market_order_matcher::prelude::*;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let engine = create_from_config(EngineConfig::reference_book(), Arc::new(NoOpEventHandler)).unwrap();
//!
//! let report = engine.process(&MarketOrderCommand::buy(10, "1233"));
//! assert_eq!(report.status(), ExecutionStatus::Filled);
//! assert_eq!(report.executed_price(), Some(Decimal::from(106)));
//!
//! // The standing order is gone, so the same command now finds nothing
//! let report = engine.process(&MarketOrderCommand::buy(10, "1233"));
//! assert_eq!(report.status(), ExecutionStatus::Rejected);
//!
//! let snapshot = engine.get_snapshot(10);
//! println!("Best bid: {:?}", snapshot.best_bid());
//! println!("Best ask: {:?}", snapshot.best_ask());
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod interfaces;
#[cfg(feature = "transport")]
pub mod transport;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        EngineConfig, ExecutionOutcome, ExecutionStatus, MarketOrderCommand, OrderBookSide,
        OrderBookSnapshot, OrderId, SeedOrder, Side, StandingOrder, UNKNOWN_ACCOUNT,
    };
    pub use crate::engine::{
        create_from_config, ExactQuantityMatch, MatchingEngine, MatchingEngineBuilder,
    };
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::interfaces::{
        EventHandler, LoggingEventHandler, MatchingAlgorithm, NoOpEventHandler, OrderEvent,
    };
    #[cfg(feature = "transport")]
    pub use crate::transport::{MatchingClient, MatchingServer, ServerConfig, TransportError};
}

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;
    use rust_decimal::Decimal;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_buy_walks_asks_by_price_then_consumes() {
        let engine = MatchingEngineBuilder::new()
            .with_standing_order(Side::Sell, 10, dec("106.0"), "S1001")
            .with_standing_order(Side::Sell, 5, dec("107.0"), "S1002")
            .build()
            .unwrap();

        let first = engine.process(&MarketOrderCommand::buy(10, "1233"));
        assert_eq!(first.status(), ExecutionStatus::Filled);
        assert_eq!(first.executed_price(), Some(dec("106.0")));
        assert_eq!(first.executed_quantity(), Some(10));
        assert_eq!(first.initial_quantity(), 10);

        let second = engine.process(&MarketOrderCommand::buy(5, "1233"));
        assert_eq!(second.status(), ExecutionStatus::Filled);
        assert_eq!(second.executed_price(), Some(dec("107.0")));
        assert_eq!(second.executed_quantity(), Some(5));

        assert!(engine.is_empty());
    }

    #[test]
    fn test_sell_without_exact_quantity_is_rejected() {
        let engine = MatchingEngineBuilder::new()
            .with_standing_order(Side::Buy, 10, dec("105.0"), "B1001")
            .build()
            .unwrap();

        let report = engine.process(&MarketOrderCommand::sell(7, "4444"));

        assert_eq!(report.status(), ExecutionStatus::Rejected);
        assert_eq!(report.initial_quantity(), 7);
        assert_eq!(report.account_id(), "4444");
        assert_eq!(report.executed_price(), None);
        assert_eq!(report.executed_quantity(), None);
        assert_eq!(engine.len(Side::Buy), 1);
    }

    #[test]
    fn test_concurrent_sells_fill_a_single_bid_once() {
        let engine = MatchingEngineBuilder::new()
            .with_standing_order(Side::Buy, 10, dec("105.0"), "B1001")
            .build()
            .unwrap();
        let barrier = Barrier::new(5);

        let reports: Vec<ExecutionOutcome> = thread::scope(|scope| {
            let handles: Vec<_> = (0..5)
                .map(|i| {
                    let engine = &engine;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        engine.process(&MarketOrderCommand::sell(10, format!("seller-{i}")))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let filled = reports.iter().filter(|r| r.is_filled()).count();
        assert_eq!(filled, 1);
        assert_eq!(reports.len() - filled, 4);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_reference_book_session() {
        let engine =
            create_from_config(EngineConfig::reference_book(), Arc::new(LoggingEventHandler))
                .unwrap();

        let sell = engine.process(&MarketOrderCommand::sell(5, "4444"));
        assert_eq!(sell.executed_price(), Some(dec("104")));

        // Selling only touched the bids
        assert_eq!(engine.len(Side::Sell), 2);
        assert_eq!(engine.get_snapshot(10).best_ask(), Some(dec("106")));

        let repeat = engine.process(&MarketOrderCommand::sell(5, "4444"));
        assert_eq!(repeat.status(), ExecutionStatus::Rejected);

        let buy = engine.process(&MarketOrderCommand::buy(5, "1233"));
        assert_eq!(buy.executed_price(), Some(dec("107")));

        let snapshot = engine.get_snapshot(10);
        assert_eq!(snapshot.bids, vec![(dec("105"), 10)]);
        assert_eq!(snapshot.asks, vec![(dec("106"), 10)]);
        assert_eq!(snapshot.spread, Some(dec("1")));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_engine_config_from_json_drives_matching() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"standingOrders":[
                {"side":"SELL","quantity":3,"price":99.5,"accountId":"a"},
                {"side":"SELL","quantity":3,"price":99.25,"accountId":"b"}
            ]}"#,
        )
        .unwrap();
        let engine = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();

        let report = engine.process(&MarketOrderCommand::buy(3, "c"));

        assert_eq!(report.executed_price(), Some(dec("99.25")));
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"type":"exe_report","initialQuantity":3,"executedPrice":99.25,"executedQuantity":3,"accountId":"c","status":"FILLED"}"#
        );
    }
}
