// ============================================================================
// Matching Engine
// Core business logic for resolving market orders against the book
// ============================================================================

use crate::domain::{
    ExecutionOutcome, MarketOrderCommand, OrderBookSide, OrderBookSnapshot, OrderId, SeedOrder,
    Side, StandingOrder,
};
use crate::error::EngineResult;
use crate::interfaces::{EventHandler, MatchingAlgorithm, OrderEvent};
use chrono::Utc;
use crossbeam::utils::CachePadded;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Matching engine over a two-sided book of standing orders.
///
/// Each side sits behind its own lock. A BUY command only ever locks the ask
/// side and a SELL command only ever locks the bid side, so commands in
/// opposite directions never contend, while commands in the same direction
/// serialize and consume standing orders in lock acquisition order.
pub struct MatchingEngine {
    /// Standing BUY orders. Touched only by SELL commands.
    bids: CachePadded<OrderBookSide>,

    /// Standing SELL orders. Touched only by BUY commands.
    asks: CachePadded<OrderBookSide>,

    /// Selection policy run under the side lock
    algorithm: Box<dyn MatchingAlgorithm>,

    /// Event handler for processing events
    event_handler: Arc<dyn EventHandler>,

    /// Arrival stamps for standing orders
    clock: ArrivalClock,
}

impl MatchingEngine {
    /// Create a matching engine with an empty book
    pub fn new(algorithm: Box<dyn MatchingAlgorithm>, event_handler: Arc<dyn EventHandler>) -> Self {
        Self {
            bids: CachePadded::new(OrderBookSide::new(Side::Buy)),
            asks: CachePadded::new(OrderBookSide::new(Side::Sell)),
            algorithm,
            event_handler,
            clock: ArrivalClock::new(),
        }
    }

    /// Resolve a market order to a terminal outcome.
    ///
    /// Locks only the side opposite to `command.side`, scans it in priority
    /// order and removes the first standing order the algorithm selects. The
    /// lock is released before the outcome is built and the event emitted.
    pub fn process(&self, command: &MarketOrderCommand) -> ExecutionOutcome {
        let book = self.contra_side(command.side);
        let matched = book.take_first(|candidates| self.algorithm.select(command, candidates));

        let outcome = ExecutionOutcome::resolve(command, matched.as_ref());
        tracing::trace!(
            side = %command.side,
            quantity = command.quantity,
            status = ?outcome.status(),
            "command resolved"
        );
        self.event_handler
            .on_event(Self::resolution_event(command, matched));

        outcome
    }

    /// Standing orders of one side, best first
    pub fn resting(&self, side: Side) -> Vec<StandingOrder> {
        self.book(side).orders()
    }

    /// Aggregated price levels of one side, best first
    pub fn depth(&self, side: Side, levels: usize) -> Vec<(Decimal, u64)> {
        self.book(side).get_depth(levels)
    }

    /// Get order book snapshot
    pub fn get_snapshot(&self, depth: usize) -> OrderBookSnapshot {
        let bids = self.bids.get_depth(depth);
        let asks = self.asks.get_depth(depth);

        OrderBookSnapshot::with_depth(bids, asks)
    }

    /// Number of standing orders on one side
    pub fn len(&self, side: Side) -> usize {
        self.book(side).len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Get the algorithm name
    pub fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }

    // ========================================================================
    // Crate-internal methods
    // ========================================================================

    /// Place the seed book in order. Only reachable while the engine is being
    /// built. Seeding events go to the handler as one batch once every order
    /// is in place, and none are emitted if any order is refused.
    pub(crate) fn seed_all(&self, seeds: Vec<SeedOrder>) -> EngineResult<Vec<OrderId>> {
        let mut ids = Vec::with_capacity(seeds.len());
        let mut events = Vec::with_capacity(seeds.len());

        for seed in seeds {
            let order = StandingOrder::new(
                seed.side,
                seed.quantity,
                seed.price,
                seed.account_id,
                self.clock.stamp(),
            );
            let (id, side, price, quantity) = (order.id, order.side, order.price, order.quantity);

            self.book(side).insert(order)?;
            ids.push(id);
            events.push(OrderEvent::StandingOrderSeeded {
                order_id: id,
                side,
                price,
                quantity,
                timestamp: Utc::now(),
            });
        }

        if !events.is_empty() {
            self.event_handler.on_events(events);
        }
        Ok(ids)
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn book(&self, side: Side) -> &OrderBookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn contra_side(&self, command_side: Side) -> &OrderBookSide {
        self.book(command_side.opposite())
    }

    fn resolution_event(command: &MarketOrderCommand, matched: Option<StandingOrder>) -> OrderEvent {
        match matched {
            Some(maker) => OrderEvent::OrderMatched {
                maker_order_id: maker.id,
                maker_account_id: maker.account_id,
                taker_account_id: command.account_id.clone(),
                taker_side: command.side,
                price: maker.price,
                quantity: command.quantity,
                timestamp: Utc::now(),
            },
            None => OrderEvent::CommandRejected {
                account_id: command.account_id.clone(),
                side: command.side,
                quantity: command.quantity,
                timestamp: Utc::now(),
            },
        }
    }
}

// ============================================================================
// Arrival Clock
// ============================================================================

/// Monotonic nanosecond stamps, strictly increasing per engine.
struct ArrivalClock {
    epoch: Instant,
    last: AtomicU64,
}

impl ArrivalClock {
    fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last: AtomicU64::new(0),
        }
    }

    fn stamp(&self) -> u64 {
        let now = u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX);
        let mut last = self.last.load(Ordering::Acquire);

        loop {
            let next = now.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(current) => last = current,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EngineConfig, ExecutionStatus};
    use crate::engine::{create_from_config, ExactQuantityMatch};
    use crate::interfaces::NoOpEventHandler;
    use parking_lot::Mutex;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    fn reference_engine() -> MatchingEngine {
        create_from_config(EngineConfig::reference_book(), Arc::new(NoOpEventHandler)).unwrap()
    }

    #[derive(Default)]
    struct RecordingHandler {
        events: Mutex<Vec<OrderEvent>>,
    }

    impl EventHandler for RecordingHandler {
        fn on_event(&self, event: OrderEvent) {
            self.events.lock().push(event);
        }
    }

    #[test]
    fn test_buy_fills_against_best_exact_ask() {
        let engine = reference_engine();

        let report = engine.process(&MarketOrderCommand::buy(10, "1233"));

        assert_eq!(report.status(), ExecutionStatus::Filled);
        assert_eq!(report.initial_quantity(), 10);
        assert_eq!(report.executed_quantity(), Some(10));
        assert_eq!(report.executed_price(), Some(Decimal::from(106)));
        assert_eq!(report.account_id(), "1233");
    }

    #[test]
    fn test_sell_fills_against_best_exact_bid() {
        let engine = reference_engine();

        let report = engine.process(&MarketOrderCommand::sell(10, "5678"));

        assert!(report.is_filled());
        assert_eq!(report.executed_price(), Some(Decimal::from(105)));
        assert_eq!(report.executed_quantity(), Some(10));
        assert_eq!(report.account_id(), "5678");
    }

    #[test]
    fn test_quantity_five_skips_better_priced_orders() {
        let engine = reference_engine();

        let buy = engine.process(&MarketOrderCommand::buy(5, "3333"));
        let sell = engine.process(&MarketOrderCommand::sell(5, "4444"));

        assert_eq!(buy.executed_price(), Some(Decimal::from(107)));
        assert_eq!(sell.executed_price(), Some(Decimal::from(104)));
    }

    #[test]
    fn test_unmatched_quantity_is_rejected() {
        let engine = reference_engine();

        let buy = engine.process(&MarketOrderCommand::buy(7, "1111"));
        let sell = engine.process(&MarketOrderCommand::sell(7, "2222"));

        for (report, account) in [(buy, "1111"), (sell, "2222")] {
            assert_eq!(report.status(), ExecutionStatus::Rejected);
            assert_eq!(report.initial_quantity(), 7);
            assert_eq!(report.executed_price(), None);
            assert_eq!(report.executed_quantity(), None);
            assert_eq!(report.account_id(), account);
        }
    }

    #[test]
    fn test_matched_order_is_consumed_once() {
        let engine = reference_engine();

        assert!(engine.process(&MarketOrderCommand::buy(10, "5555")).is_filled());
        assert!(!engine.process(&MarketOrderCommand::buy(10, "6666")).is_filled());

        assert!(engine.process(&MarketOrderCommand::sell(5, "7777")).is_filled());
        assert!(!engine.process(&MarketOrderCommand::sell(5, "8888")).is_filled());
    }

    #[test]
    fn test_repeated_rejection_leaves_book_unchanged() {
        let engine = reference_engine();
        let bids = engine.resting(Side::Buy);
        let asks = engine.resting(Side::Sell);

        for _ in 0..2 {
            assert!(!engine.process(&MarketOrderCommand::buy(3, "x")).is_filled());
            assert!(!engine.process(&MarketOrderCommand::sell(3, "y")).is_filled());
        }

        assert_eq!(engine.resting(Side::Buy), bids);
        assert_eq!(engine.resting(Side::Sell), asks);
    }

    #[test]
    fn test_empty_side_rejects() {
        let engine = MatchingEngine::new(Box::new(ExactQuantityMatch::new()), Arc::new(NoOpEventHandler));

        assert!(engine.is_empty());
        assert!(!engine.process(&MarketOrderCommand::buy(1, "a")).is_filled());
        assert!(!engine.process(&MarketOrderCommand::sell(1, "b")).is_filled());
    }

    #[test]
    fn test_buy_never_locks_bid_side() {
        let engine = Arc::new(reference_engine());
        let _bids = engine.bids.hold();
        let (tx, rx) = crossbeam::channel::bounded(1);

        let worker = Arc::clone(&engine);
        let handle = thread::spawn(move || {
            let _ = tx.send(worker.process(&MarketOrderCommand::buy(10, "1233")));
        });

        let report = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("BUY command blocked on the bid side lock");
        assert!(report.is_filled());
        handle.join().unwrap();
    }

    #[test]
    fn test_sell_never_locks_ask_side() {
        let engine = Arc::new(reference_engine());
        let _asks = engine.asks.hold();
        let (tx, rx) = crossbeam::channel::bounded(1);

        let worker = Arc::clone(&engine);
        let handle = thread::spawn(move || {
            let _ = tx.send(worker.process(&MarketOrderCommand::sell(7, "2222")));
        });

        let report = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("SELL command blocked on the ask side lock");
        assert!(!report.is_filled());
        handle.join().unwrap();
    }

    #[test]
    fn test_same_side_commands_wait_for_the_lock() {
        let engine = Arc::new(reference_engine());
        let asks = engine.asks.hold();
        let (tx, rx) = crossbeam::channel::bounded(1);

        let worker = Arc::clone(&engine);
        let handle = thread::spawn(move || {
            let _ = tx.send(worker.process(&MarketOrderCommand::buy(10, "1233")));
        });

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        drop(asks);

        let report = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(report.is_filled());
        handle.join().unwrap();
    }

    #[test]
    fn test_concurrent_sells_fill_exactly_once() {
        const THREADS: usize = 5;
        let engine = reference_engine();
        let barrier = Barrier::new(THREADS);

        let reports: Vec<ExecutionOutcome> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        engine.process(&MarketOrderCommand::sell(10, "concurrentSell"))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let filled = reports.iter().filter(|r| r.is_filled()).count();
        assert_eq!(filled, 1);
        assert_eq!(reports.len() - filled, THREADS - 1);
        assert_eq!(engine.len(Side::Buy), 1);
    }

    #[test]
    fn test_opposite_directions_proceed_in_parallel() {
        let engine = reference_engine();
        let barrier = Barrier::new(2);

        let (buy, sell) = thread::scope(|s| {
            let buy = s.spawn(|| {
                barrier.wait();
                engine.process(&MarketOrderCommand::buy(10, "b"))
            });
            let sell = s.spawn(|| {
                barrier.wait();
                engine.process(&MarketOrderCommand::sell(10, "s"))
            });
            (buy.join().unwrap(), sell.join().unwrap())
        });

        assert_eq!(buy.executed_price(), Some(Decimal::from(106)));
        assert_eq!(sell.executed_price(), Some(Decimal::from(105)));
    }

    #[test]
    fn test_events_follow_resolutions() {
        let handler = Arc::new(RecordingHandler::default());
        let engine = create_from_config(
            EngineConfig::new().with_standing_order(Side::Sell, 10, Decimal::from(106), "S1001"),
            handler.clone(),
        )
        .unwrap();

        engine.process(&MarketOrderCommand::buy(10, "1233"));
        engine.process(&MarketOrderCommand::buy(10, "6666"));

        let events = handler.events.lock();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], OrderEvent::StandingOrderSeeded { quantity: 10, .. }));
        assert!(matches!(
            &events[1],
            OrderEvent::OrderMatched { maker_account_id, quantity: 10, .. } if maker_account_id == "S1001"
        ));
        assert!(matches!(
            &events[2],
            OrderEvent::CommandRejected { account_id, .. } if account_id == "6666"
        ));
    }

    #[test]
    fn test_arrival_clock_is_strictly_increasing() {
        let clock = ArrivalClock::new();
        let stamps: Vec<u64> = (0..1000).map(|_| clock.stamp()).collect();

        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_order_book_snapshot() {
        let engine = reference_engine();

        let snapshot = engine.get_snapshot(10);
        assert_eq!(snapshot.best_bid(), Some(Decimal::from(105)));
        assert_eq!(snapshot.best_ask(), Some(Decimal::from(106)));
        assert_eq!(snapshot.spread, Some(Decimal::from(1)));

        engine.process(&MarketOrderCommand::buy(10, "1233"));
        assert_eq!(engine.depth(Side::Sell, 10), vec![(Decimal::from(107), 5)]);
    }
}
