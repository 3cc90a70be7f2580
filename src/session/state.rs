use crate::fix::MsgType;

/// Where the counterparty's session stands, as seen from the traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    /// Logon received, ack not yet sent
    LogonPending,
    LoggedOn,
}

/// Observes inbound and outbound admin traffic and tracks session state.
///
/// Purely observational: replies are never gated on it.
pub struct SessionTracker {
    state: SessionState,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self { state: SessionState::LoggedOut }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn on_inbound(&mut self, msg_type: Option<MsgType>) {
        match msg_type {
            Some(MsgType::Logon) => self.transition(SessionState::LogonPending),
            Some(MsgType::Logout) => self.transition(SessionState::LoggedOut),
            Some(t) if self.state == SessionState::LoggedOut => {
                tracing::debug!("{} received outside a logged-on session", t);
            }
            _ => {}
        }
    }

    pub fn on_outbound(&mut self, msg_type: Option<MsgType>) {
        if msg_type == Some(MsgType::Logon) && self.state == SessionState::LogonPending {
            self.transition(SessionState::LoggedOn);
        }
    }

    pub fn on_fault(&mut self) {
        self.transition(SessionState::LoggedOut);
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::info!("session {:?} → {:?}", self.state, next);
            self.state = next;
        }
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}
