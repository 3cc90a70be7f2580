//! Session dispatcher: maps an inbound message to the reply it warrants.
//!
//! A pure lookup on MsgType (35). It does not track logon status, sequence
//! numbers or heartbeat timers; see [`super::SessionTracker`] for the state
//! that sits above it.

use crate::fix::{tags, Message, MsgType};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    heartbeat_interval_secs: u32,
}

impl Dispatcher {
    pub fn new(heartbeat_interval_secs: u32) -> Self {
        Self { heartbeat_interval_secs }
    }

    /// Build the reply for `inbound`. An empty message means "send nothing".
    pub fn handle(&self, inbound: &Message) -> Message {
        let reply = match inbound.msg_type() {
            Some(MsgType::Heartbeat) => heartbeat(),
            Some(MsgType::TestRequest) => {
                let mut hb = heartbeat();
                if let Some(id) = inbound.get(tags::TEST_REQ_ID) {
                    hb.set(tags::TEST_REQ_ID, id);
                }
                hb
            }
            Some(MsgType::Logon) => Message::new()
                .with(tags::MSG_TYPE, MsgType::Logon.as_str())
                .with(tags::ENCRYPT_METHOD, "0")
                .with(tags::HEART_BT_INT, self.heartbeat_interval_secs.to_string()),
            Some(MsgType::NewOrderSingle) => fill_report(inbound),
            _ => return Message::new(),
        };

        swap_comp_ids(inbound, reply)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(30)
    }
}

fn heartbeat() -> Message {
    Message::new().with(tags::MSG_TYPE, MsgType::Heartbeat.as_str())
}

/// ExecutionReport acknowledging a NewOrderSingle as fully filled.
fn fill_report(order: &Message) -> Message {
    let mut report = Message::new()
        .with(tags::MSG_TYPE, MsgType::ExecutionReport.as_str())
        .with(tags::ORD_STATUS, tags::ORD_STATUS_FILLED)
        .with(tags::EXEC_TYPE, tags::EXEC_TYPE_TRADE)
        .with(tags::LEAVES_QTY, "0");

    for tag in [tags::SYMBOL, tags::SIDE, tags::ORDER_QTY, tags::CL_ORD_ID] {
        if let Some(value) = order.get(tag) {
            report.set(tag, value);
        }
    }
    if let Some(qty) = order.get(tags::ORDER_QTY) {
        report.set(tags::CUM_QTY, qty);
        report.set(tags::LAST_QTY, qty);
    }
    if let Some(px) = order.get(tags::PRICE) {
        report.set(tags::PRICE, px);
        report.set(tags::LAST_PX, px);
        report.set(tags::AVG_PX, px);
    }
    if let Some(cl_ord_id) = order.get(tags::CL_ORD_ID) {
        report.set(tags::ORDER_ID, cl_ord_id);
        report.set(tags::EXEC_ID, format!("{}-1", cl_ord_id));
    }
    report
}

/// Address the reply back to whoever sent the request.
fn swap_comp_ids(inbound: &Message, mut reply: Message) -> Message {
    if let Some(sender) = inbound.get(tags::SENDER_COMP_ID) {
        reply.set(tags::TARGET_COMP_ID, sender);
    }
    if let Some(target) = inbound.get(tags::TARGET_COMP_ID) {
        reply.set(tags::SENDER_COMP_ID, target);
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logon_ack() {
        let reply = Dispatcher::default().handle(&Message::new().with(35, "A"));
        assert_eq!(reply.get(35), Some("A"));
        assert_eq!(reply.get(98), Some("0"));
        assert_eq!(reply.get(108), Some("30"));
    }

    #[test]
    fn test_heartbeat_echo() {
        let reply = Dispatcher::default().handle(&Message::new().with(35, "0"));
        assert_eq!(reply, Message::new().with(35, "0"));
    }

    #[test]
    fn test_test_request_echoes_id() {
        let inbound = Message::new().with(35, "1").with(112, "PING-7");
        let reply = Dispatcher::default().handle(&inbound);
        assert_eq!(reply.get(35), Some("0"));
        assert_eq!(reply.get(112), Some("PING-7"));
    }

    #[test]
    fn test_new_order_filled() {
        let inbound = Message::new()
            .with(35, "D")
            .with(11, "ord-1")
            .with(55, "AAPL")
            .with(54, "1")
            .with(38, "100")
            .with(44, "150.0");
        let reply = Dispatcher::default().handle(&inbound);
        assert_eq!(reply.get(35), Some("8"));
        assert_eq!(reply.get(55), Some("AAPL"));
        assert_eq!(reply.get(54), Some("1"));
        assert_eq!(reply.get(38), Some("100"));
        assert_eq!(reply.get(39), Some("2"));
        assert_eq!(reply.get(150), Some("F"));
        assert_eq!(reply.get(14), Some("100"));
        assert_eq!(reply.get(151), Some("0"));
        assert_eq!(reply.get(31), Some("150.0"));
        assert_eq!(reply.get(11), Some("ord-1"));
    }

    #[test]
    fn test_unknown_and_missing_type_are_empty() {
        let dispatcher = Dispatcher::default();
        assert!(dispatcher.handle(&Message::new().with(35, "Q")).is_empty());
        assert!(dispatcher.handle(&Message::new().with(55, "AAPL")).is_empty());
        assert!(dispatcher.handle(&Message::new().with(35, "X").with(49, "EX")).is_empty());
    }

    #[test]
    fn test_comp_ids_swapped() {
        let inbound = Message::new().with(35, "0").with(49, "EXCHANGE").with(56, "CLIENT");
        let reply = Dispatcher::default().handle(&inbound);
        assert_eq!(reply.get(49), Some("CLIENT"));
        assert_eq!(reply.get(56), Some("EXCHANGE"));
    }

    #[test]
    fn test_custom_heartbeat_interval() {
        let reply = Dispatcher::new(45).handle(&Message::new().with(35, "A"));
        assert_eq!(reply.get(108), Some("45"));
    }
}
