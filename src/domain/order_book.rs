// ============================================================================
// Order Book Domain Model
// One guarded, priority-ordered collection of standing orders per side
// ============================================================================

use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::btree_map::{self, BTreeMap};

use super::{Side, StandingOrder};
use crate::error::{EngineError, EngineResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Priority Key
// ============================================================================

/// Price component of the priority key. Bids rank higher prices first, asks
/// rank lower prices first. A side only ever holds one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriceRank {
    Bid(Reverse<Decimal>),
    Ask(Decimal),
}

/// Total order over standing orders of one side: price rank, then arrival,
/// then insertion sequence for exact (price, arrival) ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriorityKey {
    pub rank: PriceRank,
    pub arrival_nanos: u64,
    pub sequence: u64,
}

/// Standing orders in priority order, best first.
pub type Candidates<'a> = btree_map::Iter<'a, PriorityKey, StandingOrder>;

// ============================================================================
// Order Book Side
// ============================================================================

#[derive(Debug, Default)]
struct SideState {
    orders: BTreeMap<PriorityKey, StandingOrder>,
    next_sequence: u64,
}

/// One side of the book (bids or asks).
///
/// The collection is only reachable through the side's own lock, so anything
/// that reads or mutates it serializes with every other user of this side and
/// with nobody else.
#[derive(Debug)]
pub struct OrderBookSide {
    side: Side,
    state: Mutex<SideState>,
}

impl OrderBookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            state: Mutex::new(SideState::default()),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Insert a standing order. Only used while the book is being seeded.
    pub(crate) fn insert(&self, order: StandingOrder) -> EngineResult<PriorityKey> {
        if order.side != self.side {
            return Err(EngineError::SideMismatch {
                expected: self.side,
                actual: order.side,
            });
        }
        if order.quantity == 0 {
            return Err(EngineError::NonPositiveQuantity {
                account_id: order.account_id,
            });
        }
        if order.price <= Decimal::ZERO {
            return Err(EngineError::NonPositivePrice {
                account_id: order.account_id,
                price: order.price,
            });
        }

        let mut state = self.state.lock();
        let key = PriorityKey {
            rank: self.rank(order.price),
            arrival_nanos: order.arrival_nanos,
            sequence: state.next_sequence,
        };
        state.next_sequence += 1;
        state.orders.insert(key, order);
        Ok(key)
    }

    /// Scan in priority order under the side lock and remove the order
    /// `select` picks, if any. Scan and removal form one critical section.
    pub(crate) fn take_first<F>(&self, select: F) -> Option<StandingOrder>
    where
        F: FnOnce(Candidates<'_>) -> Option<PriorityKey>,
    {
        let mut state = self.state.lock();
        let key = select(state.orders.iter())?;
        state.orders.remove(&key)
    }

    /// Hold the side lock. Lets tests prove which side a command touches.
    #[cfg(test)]
    pub(crate) fn hold(&self) -> MutexGuard<'_, impl Sized> {
        self.state.lock()
    }

    /// Standing orders in priority order.
    pub fn orders(&self) -> Vec<StandingOrder> {
        self.locked().orders.values().cloned().collect()
    }

    /// Best (top-of-book) price.
    pub fn best_price(&self) -> Option<Decimal> {
        self.locked().orders.values().next().map(|order| order.price)
    }

    /// Aggregated `(price, total quantity)` for the best `num_levels` prices.
    pub fn get_depth(&self, num_levels: usize) -> Vec<(Decimal, u64)> {
        let state = self.locked();
        let mut levels: Vec<(Decimal, u64)> = Vec::new();

        for order in state.orders.values() {
            if let Some((price, total)) = levels.last_mut() {
                if *price == order.price {
                    *total += order.quantity;
                    continue;
                }
            }
            if levels.len() == num_levels {
                break;
            }
            levels.push((order.price, order.quantity));
        }

        levels
    }

    pub fn len(&self) -> usize {
        self.locked().orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locked().orders.is_empty()
    }

    fn locked(&self) -> MutexGuard<'_, SideState> {
        self.state.lock()
    }

    fn rank(&self, price: Decimal) -> PriceRank {
        match self.side {
            Side::Buy => PriceRank::Bid(Reverse(price)),
            Side::Sell => PriceRank::Ask(price),
        }
    }
}

// ============================================================================
// Order Book Snapshot
// ============================================================================

/// Point-in-time view of the book. Each side is read under its own lock, so
/// the two sides are not captured atomically with respect to each other.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    /// Bid levels (price, quantity), best first
    pub bids: Vec<(Decimal, u64)>,
    /// Ask levels (price, quantity), best first
    pub asks: Vec<(Decimal, u64)>,
    /// Current spread (ask - bid)
    pub spread: Option<Decimal>,
    /// Mid price
    pub mid_price: Option<Decimal>,
}

impl OrderBookSnapshot {
    pub fn with_depth(bids: Vec<(Decimal, u64)>, asks: Vec<(Decimal, u64)>) -> Self {
        let (spread, mid_price) = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => {
                (Some(ask - bid), Some((bid + ask) / Decimal::from(2)))
            },
            _ => (None, None),
        };

        Self {
            bids,
            asks,
            spread,
            mid_price,
        }
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|(price, _)| *price)
    }

    pub fn total_bid_quantity(&self) -> u64 {
        self.bids.iter().map(|(_, qty)| qty).sum()
    }

    pub fn total_ask_quantity(&self) -> u64 {
        self.asks.iter().map(|(_, qty)| qty).sum()
    }
}
