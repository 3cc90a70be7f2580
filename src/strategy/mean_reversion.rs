//! Mean-reversion signal on the book midprice.
//!
//! Keeps an exponential moving average of the mid. After a warm-up window
//! it buys the offer when the mid trades below the average by more than the
//! threshold, and hits the bid when it trades above.

use rust_decimal::prelude::ToPrimitive;

use crate::core::config::StrategyConfig;
use crate::core::{OrderIntent, Side, Symbol};
use crate::orderbook::OrderBook;

use super::Strategy;

/// Mean-reversion parameters
#[derive(Debug, Clone)]
pub struct MeanReversionParams {
    pub symbol: Symbol,
    /// Evaluations that only calibrate the mean
    pub warmup_window: u32,
    /// EMA alpha, in (0, 1)
    pub smoothing_factor: f64,
    /// Relative band around the mean (0.005 = 0.5%)
    pub deviation_threshold: f64,
    pub order_qty: u64,
}

impl MeanReversionParams {
    pub fn from_config(symbol: Symbol, config: &StrategyConfig) -> Self {
        Self {
            symbol,
            warmup_window: config.warmup_window,
            smoothing_factor: config.smoothing_factor,
            deviation_threshold: config.deviation_threshold,
            order_qty: config.order_qty,
        }
    }
}

pub struct MeanReversion {
    params: MeanReversionParams,
    running_mean: f64,
    samples_seen: u32,
}

impl MeanReversion {
    pub fn new(params: MeanReversionParams) -> Self {
        Self { params, running_mean: 0.0, samples_seen: 0 }
    }

    pub fn running_mean(&self) -> f64 {
        self.running_mean
    }

    pub fn samples_seen(&self) -> u32 {
        self.samples_seen
    }

    pub fn is_warm(&self) -> bool {
        self.samples_seen >= self.params.warmup_window
    }

    /// Fold one midprice into the mean and decide against the mean as it
    /// stood before this sample. The first sample seeds the mean.
    fn observe(&mut self, mid: f64) -> Option<Side> {
        let trailing = self.running_mean;
        let warm = self.is_warm();

        if self.samples_seen == 0 {
            self.running_mean = mid;
        } else {
            self.running_mean += self.params.smoothing_factor * (mid - self.running_mean);
        }
        self.samples_seen = self.samples_seen.saturating_add(1);

        if !warm {
            return None;
        }

        let band = self.params.deviation_threshold;
        if mid < trailing * (1.0 - band) {
            Some(Side::Buy)
        } else if mid > trailing * (1.0 + band) {
            Some(Side::Sell)
        } else {
            None
        }
    }
}

impl Strategy for MeanReversion {
    fn name(&self) -> &str {
        "mean-reversion"
    }

    fn on_book(&mut self, book: &OrderBook) -> Option<OrderIntent> {
        // One-sided or empty book: not a snapshot, leave the state alone.
        let mid = book.mid_price()?.to_f64()?;
        let trailing = self.running_mean;

        let side = self.observe(mid)?;
        let price = match side {
            Side::Buy => book.best_ask()?,
            Side::Sell => book.best_bid()?,
        };

        tracing::info!(
            "{} signal: mid={:.4} mean={:.4} band={:.4}% → {} {} @ {}",
            self.name(),
            mid,
            trailing,
            self.params.deviation_threshold * 100.0,
            side,
            self.params.order_qty,
            price
        );

        Some(OrderIntent {
            symbol: self.params.symbol.clone(),
            side,
            quantity: self.params.order_qty,
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Order;
    use rust_decimal::Decimal;

    fn params() -> MeanReversionParams {
        MeanReversionParams {
            symbol: Symbol::new("TEST"),
            warmup_window: 20,
            smoothing_factor: 0.1,
            deviation_threshold: 0.005,
            order_qty: 10,
        }
    }

    fn quoted(bid: &str, ask: &str) -> OrderBook {
        let mut book = OrderBook::new(Symbol::new("TEST"));
        book.add_order(Order { id: 1, quantity: 5, price: bid.parse().unwrap(), side: Side::Buy });
        book.add_order(Order { id: 2, quantity: 5, price: ask.parse().unwrap(), side: Side::Sell });
        book
    }

    fn warmed_at_100() -> MeanReversion {
        let mut strategy = MeanReversion::new(params());
        let book = quoted("99", "101");
        for _ in 0..20 {
            assert!(strategy.on_book(&book).is_none());
        }
        assert!(strategy.is_warm());
        assert!((strategy.running_mean() - 100.0).abs() < 1e-9);
        strategy
    }

    #[test]
    fn test_warmup_never_trades() {
        let mut strategy = MeanReversion::new(params());
        let cheap = quoted("49", "51");
        let rich = quoted("149", "151");
        for i in 0..20 {
            let book = if i % 2 == 0 { &cheap } else { &rich };
            assert!(strategy.on_book(book).is_none(), "traded during warm-up at {}", i);
        }
        assert_eq!(strategy.samples_seen(), 20);
    }

    #[test]
    fn test_first_sample_seeds_mean() {
        let mut strategy = MeanReversion::new(params());
        strategy.on_book(&quoted("249", "251"));
        assert_eq!(strategy.running_mean(), 250.0);
        strategy.on_book(&quoted("239", "241")); // 250 + 0.1 * (240 - 250)
        assert!((strategy.running_mean() - 249.0).abs() < 1e-9);
    }

    #[test]
    fn test_buy_below_band() {
        let mut strategy = warmed_at_100();
        let intent = strategy.on_book(&quoted("98", "100")).unwrap(); // mid 99.0
        assert_eq!(intent.side, Side::Buy);
        assert_eq!(intent.price, Decimal::from(100));
        assert_eq!(intent.quantity, 10);
        assert_eq!(intent.symbol, Symbol::new("TEST"));
    }

    #[test]
    fn test_inside_band_no_signal() {
        let mut strategy = warmed_at_100();
        assert!(strategy.on_book(&quoted("99.2", "101.2")).is_none()); // mid 100.2
    }

    #[test]
    fn test_sell_above_band() {
        let mut strategy = warmed_at_100();
        let intent = strategy.on_book(&quoted("99.6", "101.6")).unwrap(); // mid 100.6
        assert_eq!(intent.side, Side::Sell);
        assert_eq!(intent.price, "99.6".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_mean_updates_after_warmup() {
        let mut strategy = warmed_at_100();
        strategy.on_book(&quoted("109", "111")); // mid 110
        assert!((strategy.running_mean() - 101.0).abs() < 1e-9);
        assert_eq!(strategy.samples_seen(), 21);
    }

    #[test]
    fn test_one_sided_book_is_skipped() {
        let mut strategy = MeanReversion::new(params());
        let mut book = OrderBook::new(Symbol::new("TEST"));
        book.add_order(Order { id: 1, quantity: 5, price: Decimal::from(99), side: Side::Buy });
        assert!(strategy.on_book(&book).is_none());
        assert_eq!(strategy.samples_seen(), 0);
    }
}
