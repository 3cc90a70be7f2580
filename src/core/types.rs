use rust_decimal::Decimal;

use crate::fix::{tags, Message, MsgType};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self { Self(s.into().to_uppercase()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side { Buy, Sell }

impl Side {
    /// FIX tag 54 code: `1` = Buy, `2` = Sell.
    pub fn from_fix(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Side::Buy),
            "2" => Some(Side::Sell),
            _ => None,
        }
    }

    pub fn as_fix(&self) -> &'static str {
        match self {
            Side::Buy => "1",
            Side::Sell => "2",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Book-local order identifier, unique per `OrderBook` instance.
pub type OrderId = u64;

/// A resting order. Owned by the book once submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub quantity: u64,
    pub price: Decimal,
    pub side: Side,
}

/// What a strategy wants to send: one limit order at a reference price.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: u64,
    pub price: Decimal,
}

impl OrderIntent {
    /// Build the NewOrderSingle (35=D) limit order carrying this intent.
    pub fn to_message(&self, cl_ord_id: &str) -> Message {
        Message::new()
            .with(tags::MSG_TYPE, MsgType::NewOrderSingle.as_str())
            .with(tags::CL_ORD_ID, cl_ord_id)
            .with(tags::SYMBOL, self.symbol.as_str())
            .with(tags::SIDE, self.side.as_fix())
            .with(tags::ORDER_QTY, self.quantity.to_string())
            .with(tags::ORD_TYPE, "2")
            .with(tags::PRICE, self.price.normalize().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_codes() {
        assert_eq!(Side::from_fix("1"), Some(Side::Buy));
        assert_eq!(Side::from_fix("2"), Some(Side::Sell));
        assert_eq!(Side::from_fix("3"), None);
        assert_eq!(Side::Sell.as_fix(), "2");
    }

    #[test]
    fn test_intent_message() {
        let intent = OrderIntent {
            symbol: Symbol::new("test"),
            side: Side::Buy,
            quantity: 10,
            price: Decimal::new(10150, 2),
        };
        let msg = intent.to_message("7");
        assert_eq!(msg.get(tags::MSG_TYPE), Some("D"));
        assert_eq!(msg.get(tags::CL_ORD_ID), Some("7"));
        assert_eq!(msg.get(tags::SYMBOL), Some("TEST"));
        assert_eq!(msg.get(tags::SIDE), Some("1"));
        assert_eq!(msg.get(tags::ORDER_QTY), Some("10"));
        assert_eq!(msg.get(tags::PRICE), Some("101.5"));
    }
}
