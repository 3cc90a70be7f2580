//! hft-system - Core Library
//! FIX tag/value trading loop: codec, order book, mean-reversion signal

// Public modules
pub mod core;
pub mod engine;
pub mod fix;
pub mod orderbook;
pub mod pnl;
pub mod session;
pub mod shutdown;
pub mod strategy;
pub mod transport;

// Re-exports
pub use core::{Config, Error, Result};
pub use engine::Engine;
pub use shutdown::Shutdown;
