//! Snapshot construction and outbound fan-out
//!
//! Every event is encoded once and the same text is queued on each recipient's
//! connection. There is no acknowledgment or retry.

use crate::client_manager::ClientManager;
use crate::session::PlayerState;
use log::error;
use shared::{PlayerId, PlayerView, ServerEvent, Snapshot};

/// Messages produced by the game state for the network layer to deliver
#[derive(Debug, Clone, PartialEq)]
pub enum GameMessage {
    /// Private message to one connection
    Send { client_id: PlayerId, event: ServerEvent },
    /// Message to every open connection, joined or not
    Broadcast { event: ServerEvent },
}

impl From<&PlayerState> for PlayerView {
    fn from(player: &PlayerState) -> Self {
        PlayerView {
            id: player.id,
            x: player.x,
            y: player.y,
            name: player.name.clone(),
        }
    }
}

/// World snapshot as seen by clients: position and name only
pub fn snapshot<'a>(players: impl Iterator<Item = &'a PlayerState>, timestamp: u64) -> ServerEvent {
    ServerEvent::Snapshot(Snapshot {
        players: players.map(PlayerView::from).collect(),
        t: timestamp,
    })
}

/// Encodes and queues a message. Returns the number of connections it was queued on.
pub fn deliver(clients: &ClientManager, message: &GameMessage) -> usize {
    match message {
        GameMessage::Send { client_id, event } => match event.encode() {
            Ok(frame) => usize::from(clients.send_to(*client_id, frame)),
            Err(e) => {
                error!("Failed to encode message for client {}: {}", client_id, e);
                0
            }
        },
        GameMessage::Broadcast { event } => match event.encode() {
            Ok(frame) => clients.broadcast(&frame),
            Err(e) => {
                error!("Failed to encode broadcast: {}", e);
                0
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PlayerLeft;
    use std::net::SocketAddr;
    use std::time::Instant;
    use crate::client_manager::outbound_channel;

    fn addr() -> SocketAddr {
        "127.0.0.1:9000".parse().unwrap()
    }

    #[test]
    fn test_snapshot_contains_every_player() {
        let now = Instant::now();
        let players = vec![
            PlayerState::new(1, 10.0, 20.0, "a".to_string(), now),
            PlayerState::new(2, 30.0, 40.0, "b".to_string(), now),
        ];

        match snapshot(players.iter(), 1234) {
            ServerEvent::Snapshot(Snapshot { players: views, t }) => {
                assert_eq!(t, 1234);
                assert_eq!(views.len(), 2);
                assert_eq!(
                    views[1],
                    PlayerView {
                        id: 2,
                        x: 30.0,
                        y: 40.0,
                        name: "b".to_string()
                    }
                );
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_empty_world_snapshot() {
        match snapshot(std::iter::empty(), 5) {
            ServerEvent::Snapshot(Snapshot { players, .. }) => assert!(players.is_empty()),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_deliver_broadcast_reaches_everyone() {
        let mut clients = ClientManager::new(4);
        let (tx1, mut rx1) = outbound_channel();
        let (tx2, mut rx2) = outbound_channel();
        clients.add_client(addr(), tx1).unwrap();
        clients.add_client(addr(), tx2).unwrap();

        let message = GameMessage::Broadcast {
            event: ServerEvent::PlayerLeft(PlayerLeft { id: 9 }),
        };
        assert_eq!(deliver(&clients, &message), 2);

        for rx in [&mut rx1, &mut rx2] {
            let frame = rx.try_recv().unwrap();
            assert_eq!(
                ServerEvent::decode(&frame).unwrap(),
                ServerEvent::PlayerLeft(PlayerLeft { id: 9 })
            );
        }
    }

    #[test]
    fn test_deliver_send_is_private() {
        let mut clients = ClientManager::new(4);
        let (tx1, mut rx1) = outbound_channel();
        let (tx2, mut rx2) = outbound_channel();
        let id1 = clients.add_client(addr(), tx1).unwrap();
        clients.add_client(addr(), tx2).unwrap();

        let message = GameMessage::Send {
            client_id: id1,
            event: ServerEvent::PlayerLeft(PlayerLeft { id: 3 }),
        };
        assert_eq!(deliver(&clients, &message), 1);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }
}
