//! Tags this system reads or writes, and the message types it knows.

pub const AVG_PX: u32 = 6;
pub const BEGIN_STRING: u32 = 8;
pub const CL_ORD_ID: u32 = 11;
pub const CUM_QTY: u32 = 14;
pub const EXEC_ID: u32 = 17;
pub const LAST_PX: u32 = 31;
pub const LAST_QTY: u32 = 32;
pub const MSG_TYPE: u32 = 35;
pub const ORDER_ID: u32 = 37;
pub const ORDER_QTY: u32 = 38;
pub const ORD_STATUS: u32 = 39;
pub const ORD_TYPE: u32 = 40;
pub const ORIG_CL_ORD_ID: u32 = 41;
pub const PRICE: u32 = 44;
pub const SENDER_COMP_ID: u32 = 49;
pub const SENDING_TIME: u32 = 52;
pub const SIDE: u32 = 54;
pub const SYMBOL: u32 = 55;
pub const TARGET_COMP_ID: u32 = 56;
pub const ENCRYPT_METHOD: u32 = 98;
pub const HEART_BT_INT: u32 = 108;
pub const TEST_REQ_ID: u32 = 112;
pub const BID_PX: u32 = 132;
pub const OFFER_PX: u32 = 133;
pub const BID_SIZE: u32 = 134;
pub const OFFER_SIZE: u32 = 135;
pub const EXEC_TYPE: u32 = 150;
pub const LEAVES_QTY: u32 = 151;

/// OrdStatus (39) values
pub const ORD_STATUS_PARTIALLY_FILLED: &str = "1";
pub const ORD_STATUS_FILLED: &str = "2";

/// ExecType (150) for a trade
pub const EXEC_TYPE_TRADE: &str = "F";

/// MsgType (35) values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgType {
    Heartbeat,
    TestRequest,
    Logout,
    ExecutionReport,
    Logon,
    NewOrderSingle,
    OrderCancelRequest,
    MarketDataIncrementalRefresh,
}

impl MsgType {
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "0" => Some(MsgType::Heartbeat),
            "1" => Some(MsgType::TestRequest),
            "5" => Some(MsgType::Logout),
            "8" => Some(MsgType::ExecutionReport),
            "A" => Some(MsgType::Logon),
            "D" => Some(MsgType::NewOrderSingle),
            "F" => Some(MsgType::OrderCancelRequest),
            "X" => Some(MsgType::MarketDataIncrementalRefresh),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MsgType::Heartbeat => "0",
            MsgType::TestRequest => "1",
            MsgType::Logout => "5",
            MsgType::ExecutionReport => "8",
            MsgType::Logon => "A",
            MsgType::NewOrderSingle => "D",
            MsgType::OrderCancelRequest => "F",
            MsgType::MarketDataIncrementalRefresh => "X",
        }
    }
}

impl std::fmt::Display for MsgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({})", self, self.as_str())
    }
}
