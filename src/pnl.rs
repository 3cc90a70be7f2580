//! Fill-driven position and cash accumulator.
//!
//! Records trade outcomes decided elsewhere (execution reports from the
//! exchange); it never decides anything itself.

use rust_decimal::Decimal;

use crate::core::Side;

#[derive(Debug, Default, Clone)]
pub struct PnlTracker {
    position: Decimal,
    cash: Decimal,
    fills: u64,
}

impl PnlTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one fill. A non-positive quantity is ignored.
    pub fn on_fill(&mut self, side: Side, qty: Decimal, price: Decimal) {
        if qty <= Decimal::ZERO {
            return;
        }
        let notional = qty * price;
        match side {
            Side::Buy => {
                self.position += qty;
                self.cash -= notional;
            }
            Side::Sell => {
                self.position -= qty;
                self.cash += notional;
            }
        }
        self.fills += 1;
    }

    /// Signed position
    pub fn position(&self) -> Decimal {
        self.position
    }

    /// Cash from fills
    pub fn realized_cash(&self) -> Decimal {
        self.cash
    }

    pub fn fills(&self) -> u64 {
        self.fills
    }

    /// Cash plus position marked at `mark_price`.
    pub fn total_pnl(&self, mark_price: Decimal) -> Decimal {
        self.cash + self.position * mark_price
    }
}
