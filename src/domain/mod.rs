// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod execution;
pub mod order;
pub mod order_book;

pub use config::{EngineConfig, SeedOrder};
pub use execution::{ExecutionOutcome, ExecutionStatus, UNKNOWN_ACCOUNT};
pub use order::{MarketOrderCommand, OrderId, Side, StandingOrder};
pub use order_book::{Candidates, OrderBookSide, OrderBookSnapshot, PriceRank, PriorityKey};
