// ============================================================================
// Engine Module
// Contains the core matching engine business logic
// ============================================================================

mod exact_quantity;
mod matching_engine;

pub mod factory;

pub use exact_quantity::ExactQuantityMatch;
pub use factory::{create_from_config, MatchingEngineBuilder};
pub use matching_engine::MatchingEngine;
