// ============================================================================
// Engine Errors
// Failures while building the book. Matching itself never fails: a command
// with no counterpart resolves to a REJECTED outcome, not an error.
// ============================================================================

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::Side;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Standing order placed on the wrong side of the book
    #[error("standing order for {actual} side cannot rest on the {expected} side")]
    SideMismatch { expected: Side, actual: Side },

    #[error("standing order for account {account_id} has zero quantity")]
    NonPositiveQuantity { account_id: String },

    #[error("standing order for account {account_id} has non-positive price {price}")]
    NonPositivePrice { account_id: String, price: Decimal },
}

/// Result type alias for engine construction
pub type EngineResult<T> = Result<T, EngineError>;
