//! Session layer - stateless reply table plus an observational state tracker

pub mod dispatcher;
pub mod state;

pub use dispatcher::Dispatcher;
pub use state::{SessionState, SessionTracker};
