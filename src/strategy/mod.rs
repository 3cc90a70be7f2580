pub mod mean_reversion;

pub use mean_reversion::MeanReversion;

use crate::core::OrderIntent;
use crate::orderbook::OrderBook;

/// Strategy defines a common interface for signal generators.
/// The engine multiplexes every book snapshot to all active strategies.
pub trait Strategy: Send {
    /// Returns the name of the strategy for logging purposes
    fn name(&self) -> &str;

    /// Called once per book snapshot, after the book has been mutated.
    /// Returns at most one order to send.
    fn on_book(&mut self, book: &OrderBook) -> Option<OrderIntent>;
}
