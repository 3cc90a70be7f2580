//! Engine: the single-threaded receive → decode → update → send loop.
//!
//! The engine is the only writer of the book and strategy state, so none of
//! it is locked. Adding a second writer means wrapping the book and the
//! strategies behind one exclusive-access boundary first.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::core::{Config, Order, OrderId, Result, Side, Symbol, Transport};
use crate::fix::{self, tags, Message, MsgType};
use crate::orderbook::OrderBook;
use crate::pnl::PnlTracker;
use crate::session::{Dispatcher, SessionTracker};
use crate::shutdown::Shutdown;
use crate::strategy::{MeanReversion, Strategy};
use crate::strategy::mean_reversion::MeanReversionParams;

/// Counters reported when the loop exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    pub received: u64,
    pub empty: u64,
    pub replies: u64,
    pub orders_sent: u64,
    pub book_updates: u64,
}

pub struct Engine {
    book: OrderBook,
    strategies: Vec<Box<dyn Strategy>>,
    dispatcher: Dispatcher,
    session: SessionTracker,
    pnl: PnlTracker,
    begin_string: String,
    rest_own_orders: bool,
    next_order_id: OrderId,
    /// Inbound ClOrdID → book id, for cancels
    cl_ord_ids: HashMap<String, OrderId>,
    /// Book ids of the current top-of-book quote, per side
    quote_bid: Option<OrderId>,
    quote_ask: Option<OrderId>,
    stats: EngineStats,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        let symbol = Symbol::new(&config.book.symbol);
        let params = MeanReversionParams::from_config(symbol.clone(), &config.strategy);
        Self::with_strategies(config, vec![Box::new(MeanReversion::new(params))])
    }

    pub fn with_strategies(config: &Config, strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self {
            book: OrderBook::new(Symbol::new(&config.book.symbol)),
            strategies,
            dispatcher: Dispatcher::new(config.session.heartbeat_interval_secs),
            session: SessionTracker::new(),
            pnl: PnlTracker::new(),
            begin_string: config.session.begin_string.clone(),
            rest_own_orders: config.book.rest_own_orders,
            next_order_id: 1,
            cl_ord_ids: HashMap::new(),
            quote_bid: None,
            quote_ask: None,
            stats: EngineStats::default(),
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn pnl(&self) -> &PnlTracker {
        &self.pnl
    }

    pub fn session(&self) -> &SessionTracker {
        &self.session
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Handle one inbound frame and return the messages to send, in order.
    pub fn process(&mut self, bytes: &[u8]) -> Vec<Message> {
        self.stats.received += 1;
        let msg = fix::decode(bytes);
        if msg.is_empty() {
            self.stats.empty += 1;
            debug!("dropping frame with no decodable fields ({} bytes)", bytes.len());
            return Vec::new();
        }
        debug!("← {}", msg);

        let msg_type = msg.msg_type();
        self.session.on_inbound(msg_type);

        let mut outbound = Vec::new();
        let reply = self.dispatcher.handle(&msg);
        if !reply.is_empty() {
            self.session.on_outbound(reply.msg_type());
            self.stats.replies += 1;
            outbound.push(reply);
        }

        let book_changed = match msg_type {
            Some(MsgType::MarketDataIncrementalRefresh) => self.on_market_data(&msg),
            Some(MsgType::NewOrderSingle) => self.on_new_order(&msg),
            Some(MsgType::OrderCancelRequest) => self.on_cancel(&msg),
            Some(MsgType::ExecutionReport) => {
                self.on_execution_report(&msg);
                false
            }
            _ => false,
        };

        if book_changed {
            self.stats.book_updates += 1;
            outbound.extend(self.evaluate_strategies());
        }

        outbound
    }

    /// Run until `shutdown` is triggered or the transport faults.
    pub async fn run<T: Transport>(&mut self, transport: &mut T, shutdown: &Shutdown) -> Result<()> {
        info!("Engine running on {} transport for {}", transport.name(), self.book.symbol());

        while !shutdown.is_triggered() {
            let datagram = match transport.recv().await {
                Ok(Some(datagram)) => datagram,
                Ok(None) => continue,
                Err(e) => return Err(self.fault(e)),
            };
            if datagram.is_empty() {
                continue;
            }

            for msg in self.process(&datagram) {
                let msg = self.stamp(msg);
                debug!("→ {}", msg);
                if let Err(e) = transport.send(&fix::encode(&msg)).await {
                    return Err(self.fault(e));
                }
            }
        }

        info!(
            "Engine stopped: {:?} position={} cash={}",
            self.stats,
            self.pnl.position(),
            self.pnl.realized_cash()
        );
        Ok(())
    }

    fn fault(&mut self, e: crate::Error) -> crate::Error {
        error!("Transport fault: {}", e);
        self.session.on_fault();
        e
    }

    /// Outbound header: BeginString and SendingTime.
    fn stamp(&self, msg: Message) -> Message {
        msg.with(tags::BEGIN_STRING, self.begin_string.as_str())
            .with(tags::SENDING_TIME, Utc::now().format("%Y%m%d-%H:%M:%S%.3f").to_string())
    }

    fn allocate_id(&mut self) -> OrderId {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    /// Top-of-book update (132/133 prices, 134/135 sizes). Each side
    /// replaces the previous quote on that side; a zero size or missing
    /// price pulls it.
    fn on_market_data(&mut self, msg: &Message) -> bool {
        if !self.is_own_symbol(msg) {
            return false;
        }
        let bid = quote_level(msg, tags::BID_PX, tags::BID_SIZE);
        let ask = quote_level(msg, tags::OFFER_PX, tags::OFFER_SIZE);

        let previous = self.quote_bid.take();
        self.quote_bid = self.replace_quote(previous, Side::Buy, bid);
        let previous = self.quote_ask.take();
        self.quote_ask = self.replace_quote(previous, Side::Sell, ask);
        true
    }

    fn replace_quote(
        &mut self,
        previous: Option<OrderId>,
        side: Side,
        level: Option<(Decimal, u64)>,
    ) -> Option<OrderId> {
        if let Some(id) = previous {
            self.book.cancel_order(id);
        }
        let (price, quantity) = level?;
        let id = self.allocate_id();
        self.book.add_order(Order { id, quantity, price, side }).then_some(id)
    }

    /// A missing Symbol(55) is taken to mean this book's instrument.
    fn is_own_symbol(&self, msg: &Message) -> bool {
        match msg.get(tags::SYMBOL) {
            Some(symbol) if Symbol::new(symbol) != *self.book.symbol() => {
                debug!("ignoring {} message {}, book is {}", symbol, msg, self.book.symbol());
                false
            }
            _ => true,
        }
    }

    /// Only orders carrying a ClOrdID rest, since nothing else could ever
    /// cancel them.
    fn on_new_order(&mut self, msg: &Message) -> bool {
        if !self.is_own_symbol(msg) {
            return false;
        }
        let Some(side) = msg.get(tags::SIDE).and_then(Side::from_fix) else {
            warn!("order without a valid side, not resting: {}", msg);
            return false;
        };
        let price = match parse_decimal(msg.get(tags::PRICE)) {
            Some(px) if px > Decimal::ZERO => px,
            _ => {
                warn!("order without a positive price, not resting: {}", msg);
                return false;
            }
        };
        let quantity = match parse_decimal(msg.get(tags::ORDER_QTY)).and_then(whole_quantity) {
            Some(q) if q > 0 => q,
            _ => {
                warn!("order without a positive quantity, not resting: {}", msg);
                return false;
            }
        };
        let Some(cl_ord_id) = msg.get(tags::CL_ORD_ID) else {
            debug!("order without ClOrdID acked, not resting: {}", msg);
            return false;
        };

        // A repeated ClOrdID replaces the order it named.
        let existing = self.cl_ord_ids.get(cl_ord_id).copied();
        let id = existing.unwrap_or_else(|| self.allocate_id());
        let rested = self.book.add_order(Order { id, quantity, price, side });
        if rested {
            self.cl_ord_ids.insert(cl_ord_id.to_string(), id);
        }
        rested
    }

    fn on_cancel(&mut self, msg: &Message) -> bool {
        let Some(cl_ord_id) = msg.get(tags::ORIG_CL_ORD_ID) else {
            debug!("cancel without OrigClOrdID ignored");
            return false;
        };
        let Some(id) = self.cl_ord_ids.remove(cl_ord_id) else {
            debug!("cancel for unknown order {} ignored", cl_ord_id);
            return false;
        };
        self.book.cancel_order(id).is_some()
    }

    /// Fills on our orders. LastQty/LastPx are preferred, falling back to
    /// OrderQty/Price for reports that carry only those.
    fn on_execution_report(&mut self, msg: &Message) {
        let status = msg.get(tags::ORD_STATUS);
        if status != Some(tags::ORD_STATUS_FILLED) && status != Some(tags::ORD_STATUS_PARTIALLY_FILLED) {
            return;
        }
        let Some(side) = msg.get(tags::SIDE).and_then(Side::from_fix) else {
            return;
        };
        let qty = parse_decimal(msg.get(tags::LAST_QTY).or(msg.get(tags::ORDER_QTY)));
        let price = parse_decimal(msg.get(tags::LAST_PX).or(msg.get(tags::PRICE)));
        if let (Some(qty), Some(price)) = (qty, price) {
            self.pnl.on_fill(side, qty, price);
            debug!("fill {} {} @ {} → position {}", side, qty, price, self.pnl.position());
        }
    }

    fn evaluate_strategies(&mut self) -> Vec<Message> {
        let mut orders = Vec::new();
        for i in 0..self.strategies.len() {
            let Some(intent) = self.strategies[i].on_book(&self.book) else {
                continue;
            };
            let id = self.allocate_id();
            let cl_ord_id = id.to_string();
            if self.rest_own_orders {
                let order = Order { id, quantity: intent.quantity, price: intent.price, side: intent.side };
                if self.book.add_order(order) {
                    self.cl_ord_ids.insert(cl_ord_id.clone(), id);
                }
            }
            self.stats.orders_sent += 1;
            orders.push(intent.to_message(&cl_ord_id));
        }
        orders
    }
}

fn parse_decimal(raw: Option<&str>) -> Option<Decimal> {
    raw?.trim().parse().ok()
}

/// Quantities are whole units; fractional sizes are truncated.
fn whole_quantity(qty: Decimal) -> Option<u64> {
    use rust_decimal::prelude::ToPrimitive;
    if qty.is_sign_negative() {
        return None;
    }
    qty.trunc().to_u64()
}

fn quote_level(msg: &Message, px_tag: u32, size_tag: u32) -> Option<(Decimal, u64)> {
    let price = parse_decimal(msg.get(px_tag))?;
    let size = parse_decimal(msg.get(size_tag)).and_then(whole_quantity)?;
    (size > 0 && price > Decimal::ZERO).then_some((price, size))
}
