use crate::connection::ConnectionEvent;
use drawing_system::ConnectionId;
use std::collections::HashMap;

pub type ConnectionTx = tokio::sync::mpsc::Sender<ConnectionEvent>;

/// Outbound channels of the open connections.
pub struct ConnectionTxStorage {
    connection_txs: HashMap<ConnectionId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    /// Returns false if the connection is unknown or its actor is gone.
    pub async fn send(&mut self, to: &ConnectionId, event: ConnectionEvent) -> bool {
        if let Some(tx) = self.connection_txs.get_mut(to) {
            if tx.send(event).await.is_err() {
                log::warn!("Connection {} stopped receiving", to);
                false
            } else {
                true
            }
        } else {
            log::warn!("No outbound channel for connection {}", to);
            false
        }
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connection_txs.remove(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connection_txs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::channel;

    #[tokio::test]
    async fn it_sends_only_to_known_connections() {
        let mut storage = ConnectionTxStorage::new();
        let (tx, mut rx) = channel(4);
        storage.insert(1, tx);

        assert!(
            storage
                .send(&1, ConnectionEvent::Connected { connection_id: 1 })
                .await
        );
        assert!(
            !storage
                .send(&2, ConnectionEvent::Connected { connection_id: 2 })
                .await
        );

        match rx.recv().await {
            Some(ConnectionEvent::Connected { connection_id }) => assert_eq!(connection_id, 1),
            other => panic!("unexpected event {:?}", other),
        }

        assert!(storage.remove(&1).is_some());
        assert_eq!(storage.len(), 0);
    }

    #[tokio::test]
    async fn it_reports_dropped_receiver() {
        let mut storage = ConnectionTxStorage::new();
        let (tx, rx) = channel(4);
        storage.insert(1, tx);
        drop(rx);

        assert!(
            !storage
                .send(&1, ConnectionEvent::Connected { connection_id: 1 })
                .await
        );
    }
}
