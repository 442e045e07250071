// ============================================================================
// Exact-Quantity Matching Algorithm
// First standing order, in price/time priority, whose quantity equals the
// command's quantity. No partial fills.
// ============================================================================

use crate::domain::{Candidates, MarketOrderCommand, PriorityKey};
use crate::interfaces::MatchingAlgorithm;

/// Exact-quantity, price/time priority selection.
///
/// Walks the opposite side best first and stops at the first order whose
/// quantity is exactly the requested quantity. Better-priced orders of a
/// different size are skipped, not split.
///
/// # Example
/// ```text
/// Asks:  106.0 x 10  (t=1)
///        107.0 x 5   (t=2)
///
/// Buy 5  -> fills 107.0 x 5, the 106.0 order is skipped
/// Buy 7  -> rejected, nothing rests with quantity 7
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactQuantityMatch;

impl ExactQuantityMatch {
    pub fn new() -> Self {
        Self
    }
}

impl MatchingAlgorithm for ExactQuantityMatch {
    fn select(
        &self,
        command: &MarketOrderCommand,
        mut candidates: Candidates<'_>,
    ) -> Option<PriorityKey> {
        candidates
            .find(|(_, order)| order.quantity == command.quantity)
            .map(|(key, _)| *key)
    }

    fn name(&self) -> &str {
        "ExactQuantity"
    }
}
