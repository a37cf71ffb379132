use crate::{ConnectionId, ServerMessage};

/// Which connections receive an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fanout {
    AllButSender,
    AllIncludingSender,
    SenderOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub message: ServerMessage,
}

/// Resolves fan-out policies against the set of open connections.
///
/// Deliveries are appended to the outbox in the order they are routed, and the
/// transport sends them in outbox order, so each recipient sees messages in the
/// order they were produced.
#[derive(Debug, Default)]
pub struct BroadcastRouter {
    endpoints: Vec<ConnectionId>,
}

impl BroadcastRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, connection_id: ConnectionId) {
        if !self.is_attached(connection_id) {
            self.endpoints.push(connection_id);
        }
    }

    pub fn detach(&mut self, connection_id: ConnectionId) -> bool {
        let before = self.endpoints.len();
        self.endpoints.retain(|e| *e != connection_id);
        before != self.endpoints.len()
    }

    pub fn is_attached(&self, connection_id: ConnectionId) -> bool {
        self.endpoints.contains(&connection_id)
    }

    pub fn endpoints(&self) -> &[ConnectionId] {
        &self.endpoints
    }

    pub fn route(
        &self,
        from: ConnectionId,
        fanout: Fanout,
        message: ServerMessage,
        outbox: &mut Vec<Delivery>,
    ) {
        match fanout {
            Fanout::SenderOnly => outbox.push(Delivery { to: from, message }),
            Fanout::AllButSender => {
                for to in self.endpoints.iter().filter(|e| **e != from) {
                    outbox.push(Delivery {
                        to: *to,
                        message: message.clone(),
                    });
                }
            }
            Fanout::AllIncludingSender => {
                for to in &self.endpoints {
                    outbox.push(Delivery {
                        to: *to,
                        message: message.clone(),
                    });
                }
            }
        }
    }
}
