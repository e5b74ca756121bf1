//! Connection table for the multiplayer server
//!
//! Tracks every open connection, joined or not, together with the queue its
//! writer task drains. Identities are handed out here, once per connection,
//! and are never reused for the lifetime of the process.
//!
//! Sends are fire-and-forget. Each queue is bounded, so a client that stops
//! reading loses frames instead of growing the queue without limit. A closed
//! queue is ignored here; the disconnect notification that follows a closed
//! socket is what actually removes the client.

use log::{debug, info, warn};
use shared::PlayerId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Frames a connection may have queued before new ones are dropped
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Outbound queue of encoded frames for one connection
pub type ClientSender = mpsc::Sender<String>;

/// Creates the bounded queue feeding one connection's writer task
pub fn outbound_channel() -> (ClientSender, mpsc::Receiver<String>) {
    mpsc::channel(OUTBOUND_QUEUE_CAPACITY)
}

/// An open connection and the queue feeding its socket
#[derive(Debug)]
pub struct Client {
    /// Connection identity, doubling as the player id once joined
    pub id: PlayerId,
    /// Remote address, for logging
    pub addr: SocketAddr,
    /// When the connection was accepted
    pub connected_at: Instant,
    sender: ClientSender,
}

impl Client {
    pub fn new(id: PlayerId, addr: SocketAddr, sender: ClientSender) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            sender,
        }
    }

    /// Queues a frame without waiting. Returns false if the frame was dropped
    /// because the queue is full or the connection's writer is gone.
    pub fn send(&self, frame: String) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Client {} is not keeping up, dropping frame", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// All open connections, bounded by a capacity limit
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<PlayerId, Client>,
    /// Next available identity; only ever increases
    next_client_id: PlayerId,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Registers a new connection.
    ///
    /// Returns `None` when the server is at capacity; the caller is expected to
    /// close the socket.
    pub fn add_client(&mut self, addr: SocketAddr, sender: ClientSender) -> Option<PlayerId> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients
            .insert(client_id, Client::new(client_id, addr, sender));

        Some(client_id)
    }

    /// Drops a connection. Returns false if it was already gone.
    pub fn remove_client(&mut self, client_id: PlayerId) -> bool {
        if let Some(client) = self.clients.remove(&client_id) {
            info!(
                "Client {} disconnected after {:.1}s",
                client.id,
                client.connected_at.elapsed().as_secs_f32()
            );
            true
        } else {
            false
        }
    }

    pub fn contains(&self, client_id: PlayerId) -> bool {
        self.clients.contains_key(&client_id)
    }

    /// Queues a frame for one connection
    pub fn send_to(&self, client_id: PlayerId, frame: String) -> bool {
        match self.clients.get(&client_id) {
            Some(client) => {
                let sent = client.send(frame);
                if !sent {
                    debug!("Frame for client {} was not queued", client_id);
                }
                sent
            }
            None => false,
        }
    }

    /// Queues a frame for every open connection. Returns how many accepted it.
    pub fn broadcast(&self, frame: &str) -> usize {
        let mut delivered = 0;
        for client in self.clients.values() {
            if client.send(frame.to_owned()) {
                delivered += 1;
            } else {
                debug!("Broadcast frame for client {} was not queued", client.id);
            }
        }
        delivered
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn channel() -> (ClientSender, mpsc::Receiver<String>) {
        outbound_channel()
    }

    #[test]
    fn test_client_manager_creation() {
        let manager = ClientManager::new(5);
        assert_eq!(manager.max_clients, 5);
        assert!(manager.is_empty());
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn test_add_multiple_clients() {
        let mut manager = ClientManager::new(3);

        let client_id1 = manager.add_client(test_addr(), channel().0).unwrap();
        let client_id2 = manager.add_client(test_addr(), channel().0).unwrap();

        assert_eq!(client_id1, 1);
        assert_eq!(client_id2, 2);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_capacity_limit() {
        let mut manager = ClientManager::new(1);

        assert!(manager.add_client(test_addr(), channel().0).is_some());
        assert!(manager.add_client(test_addr(), channel().0).is_none());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut manager = ClientManager::new(1);

        let first = manager.add_client(test_addr(), channel().0).unwrap();
        assert!(manager.remove_client(first));
        let second = manager.add_client(test_addr(), channel().0).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_remove_client_twice() {
        let mut manager = ClientManager::new(2);
        let client_id = manager.add_client(test_addr(), channel().0).unwrap();

        assert!(manager.remove_client(client_id));
        assert!(!manager.remove_client(client_id));
        assert!(!manager.contains(client_id));
    }

    #[test]
    fn test_send_to_single_client() {
        let mut manager = ClientManager::new(2);
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        let id1 = manager.add_client(test_addr(), tx1).unwrap();
        manager.add_client(test_addr(), tx2).unwrap();

        assert!(manager.send_to(id1, "hello".to_string()));
        assert!(!manager.send_to(99, "nobody".to_string()));

        assert_eq!(rx1.try_recv().unwrap(), "hello");
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_skips_closed_queues() {
        let mut manager = ClientManager::new(3);
        let (tx1, mut rx1) = channel();
        let (tx2, rx2) = channel();
        manager.add_client(test_addr(), tx1).unwrap();
        manager.add_client(test_addr(), tx2).unwrap();
        drop(rx2);

        assert_eq!(manager.broadcast("tick"), 1);
        assert_eq!(rx1.try_recv().unwrap(), "tick");
    }

    #[test]
    fn test_stalled_client_queue_is_bounded() {
        let mut manager = ClientManager::new(2);
        let (stalled_tx, mut stalled_rx) = channel();
        let (live_tx, mut live_rx) = channel();
        let stalled = manager.add_client(test_addr(), stalled_tx).unwrap();
        manager.add_client(test_addr(), live_tx).unwrap();

        let frame = "x".repeat(50_000);
        let accepted = (0..2000)
            .filter(|_| manager.send_to(stalled, frame.clone()))
            .count();
        assert_eq!(accepted, OUTBOUND_QUEUE_CAPACITY);

        // A full queue only costs its own client frames
        assert_eq!(manager.broadcast("tick"), 1);
        assert_eq!(live_rx.try_recv().unwrap(), "tick");
        assert!(manager.contains(stalled));

        let mut pending = 0;
        while let Ok(queued) = stalled_rx.try_recv() {
            assert_eq!(queued.len(), 50_000);
            pending += 1;
        }
        assert_eq!(pending, OUTBOUND_QUEUE_CAPACITY);

        // Draining makes room again
        assert!(manager.send_to(stalled, "again".to_string()));
    }
}
