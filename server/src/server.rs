use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::sync::oneshot;

use drawing_system::{ClientMessage, ConnectionId, Delivery, Session, SessionSnapshot, Timestamp};

use crate::connection::ConnectionEvent;
use crate::connection_tx_storage::{ConnectionTx, ConnectionTxStorage};

pub type ServerTx = UnboundedSender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connect {
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    Message {
        from: ConnectionId,
        message: ClientMessage,
    },
    Status {
        tx: oneshot::Sender<SessionSnapshot>,
    },
}

/// Owns the session. Commands are handled one at a time, in arrival order.
struct Server {
    session: Session,
    connections: ConnectionTxStorage,
}

impl Server {
    fn new() -> Self {
        Self {
            session: Session::new(),
            connections: ConnectionTxStorage::new(),
        }
    }

    async fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connect { tx } => {
                let connection_id = self.session.open_connection();
                self.connections.insert(connection_id, tx);
                if !self
                    .connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id })
                    .await
                {
                    self.reap(connection_id);
                }
            }
            ServerCommand::Disconnect { from } => self.reap(from),
            ServerCommand::Message { from, message } => {
                let deliveries = self.session.handle_message(from, message, now());
                self.deliver(deliveries).await;
            }
            ServerCommand::Status { tx } => {
                if tx.send(self.session.snapshot()).is_err() {
                    log::debug!("Status requester went away");
                }
            }
        }
    }

    /// Sends deliveries in order. Connections whose actor is gone are closed afterwards.
    async fn deliver(&mut self, deliveries: Vec<Delivery>) {
        let mut gone = Vec::new();
        for Delivery { to, message } in deliveries {
            if gone.contains(&to) {
                continue;
            }
            if !self
                .connections
                .send(&to, ConnectionEvent::Message(message))
                .await
            {
                gone.push(to);
            }
        }
        for connection_id in gone {
            self.reap(connection_id);
        }
    }

    fn reap(&mut self, connection_id: ConnectionId) {
        self.session.close_connection(connection_id);
        self.connections.remove(&connection_id);
        log::debug!("{} connections open", self.connections.len());
    }
}

fn now() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ServerCommand>();

    tokio::spawn(async move {
        let mut server = Server::new();

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command).await;
        }
        log::info!("Server loop terminated");
    });

    srv_tx
}
