use crate::core::{Order, OrderId, Side, Symbol};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// In-memory aggregated orderbook for a single symbol.
/// Bids: best = highest key. Asks: best = lowest key.
///
/// Orders only aggregate into price levels; nothing is ever matched, so a
/// bid at or above the best ask simply rests. Levels that drop to zero are
/// pruned, so the best quotes never point at an empty level.
pub struct OrderBook {
    symbol: Symbol,
    bids: BTreeMap<Decimal, u64>, // price → aggregated qty
    asks: BTreeMap<Decimal, u64>,
    orders: HashMap<OrderId, Order>,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol, bids: BTreeMap::new(), asks: BTreeMap::new(), orders: HashMap::new() }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Rest an order. A live order with the same id is replaced: its
    /// contribution is removed before the new one is applied.
    ///
    /// Returns `false` (book untouched) for a zero-quantity order or one
    /// that would push its level's aggregate past `u64::MAX`.
    pub fn add_order(&mut self, order: Order) -> bool {
        if order.quantity == 0 {
            tracing::warn!(id = order.id, "rejecting zero-quantity order");
            return false;
        }
        // The level total once a replaced order's share is taken out.
        let replaced = self
            .orders
            .get(&order.id)
            .filter(|prev| prev.side == order.side && prev.price == order.price)
            .map_or(0, |prev| prev.quantity);
        let resting = self.quantity_at(order.side, order.price).saturating_sub(replaced);
        if resting.checked_add(order.quantity).is_none() {
            tracing::warn!(id = order.id, price = %order.price, "rejecting order: level quantity overflow");
            return false;
        }
        self.cancel_order(order.id);

        *self.levels_mut(order.side).entry(order.price).or_insert(0) += order.quantity;
        self.orders.insert(order.id, order);
        true
    }

    /// Remove an order's contribution. Unknown ids are a no-op, which also
    /// makes a repeated cancel harmless.
    pub fn cancel_order(&mut self, id: OrderId) -> Option<Order> {
        let order = self.orders.remove(&id)?;
        let levels = self.levels_mut(order.side);
        if let Some(qty) = levels.get_mut(&order.price) {
            *qty = qty.saturating_sub(order.quantity);
            if *qty == 0 {
                levels.remove(&order.price);
            }
        }
        Some(order)
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next_back().copied()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// `(best_bid + best_ask) / 2`; `None` unless both sides are quoted.
    pub fn mid_price(&self) -> Option<Decimal> {
        Some((self.best_bid()? + self.best_ask()?) / Decimal::TWO)
    }

    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()? - self.best_bid()?)
    }

    /// Aggregated resting quantity at one price level.
    pub fn quantity_at(&self, side: Side, price: Decimal) -> u64 {
        let levels = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        levels.get(&price).copied().unwrap_or(0)
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// Number of live orders
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn levels_mut(&mut self, side: Side) -> &mut BTreeMap<Decimal, u64> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}
