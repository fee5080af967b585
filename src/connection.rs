use actix::Addr;
use std::sync::Arc;

use crate::error::SendError;
use crate::models::RelayFrame;
use crate::websocket::RelaySession;

/// Anything that can carry a text frame to one client.
pub trait Connection: Send + Sync {
    fn id(&self) -> &str;

    fn send_text(&self, text: String) -> Result<(), SendError>;
}

pub type ConnectionRef = Arc<dyn Connection>;

/// Handle to a live `RelaySession` actor
pub struct SessionHandle {
    id: String,
    addr: Addr<RelaySession>,
}

impl SessionHandle {
    pub fn new(id: String, addr: Addr<RelaySession>) -> Self {
        SessionHandle { id, addr }
    }
}

impl Connection for SessionHandle {
    fn id(&self) -> &str {
        &self.id
    }

    fn send_text(&self, text: String) -> Result<(), SendError> {
        if !self.addr.connected() {
            return Err(SendError(self.id.clone()));
        }
        self.addr.do_send(RelayFrame(text));
        Ok(())
    }
}
