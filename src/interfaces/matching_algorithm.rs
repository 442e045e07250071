// ============================================================================
// Matching Algorithm Interface
// Defines the contract for choosing which standing order a command consumes
// ============================================================================

use crate::domain::{Candidates, MarketOrderCommand, PriorityKey};

/// Strategy interface for resolving a command against one side of the book.
///
/// `select` runs while the side lock is held. It must be a bounded scan with
/// no I/O and must not block.
pub trait MatchingAlgorithm: Send + Sync {
    /// Pick the standing order `command` consumes in full, if any.
    ///
    /// # Arguments
    /// * `command` - The incoming market order
    /// * `candidates` - The opposite side's standing orders, best first
    ///
    /// # Returns
    /// Key of the order to remove, or `None` to reject the command
    fn select(&self, command: &MarketOrderCommand, candidates: Candidates<'_>)
        -> Option<PriorityKey>;

    /// Get the algorithm name for logging
    fn name(&self) -> &str;
}
