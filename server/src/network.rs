//! Server network layer: WebSocket connections and the fixed-rate tick loop
//!
//! Connection tasks never touch game state. They forward decoded events into a
//! single queue, and the server loop is the only consumer: it applies queued
//! events between ticks and runs the tick itself, so simulation state has exactly
//! one owner and needs no locking.

use crate::broadcast::{self, GameMessage};
use crate::client_manager::{outbound_channel, ClientManager, ClientSender};
use crate::config::{ConfigError, ServerConfig};
use crate::game::GameState;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{timestamp_millis, ClientEvent, PlayerId, ProtocolError};
use std::borrow::Cow;
use std::net::SocketAddr;
use std::time::Instant;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::accept_async;

/// How often, in ticks, the loop logs its statistics
const STATS_INTERVAL_TICKS: u64 = 100;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to bind: {0}")]
    Bind(#[from] std::io::Error),
}

/// Messages sent from connection tasks to the server loop
#[derive(Debug)]
pub enum ServerMessage {
    Connected {
        addr: SocketAddr,
        sender: ClientSender,
        /// Receives the assigned id, or `None` when the server is full
        reply: oneshot::Sender<Option<PlayerId>>,
    },
    Event {
        client_id: PlayerId,
        event: ClientEvent,
    },
    Disconnected {
        client_id: PlayerId,
    },
}

/// Main server coordinating connections and game simulation
pub struct Server {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    config: ServerConfig,
    clients: ClientManager,
    game_state: GameState,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    /// Validates the configuration and binds the listening socket
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let listener = TcpListener::bind(config.bind_address()).await?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on {}", local_addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener: Some(listener),
            local_addr,
            clients: ClientManager::new(config.max_clients),
            game_state: GameState::from_config(&config),
            config,
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawns the task accepting TCP connections
    fn spawn_acceptor(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        tokio::spawn(handle_connection(stream, addr, server_tx.clone()));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    fn deliver(&self, message: &GameMessage) {
        broadcast::deliver(&self.clients, message);
    }

    /// Applies one connection event to the game state
    fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Connected {
                addr,
                sender,
                reply,
            } => {
                let client_id = self.clients.add_client(addr, sender);
                if client_id.is_none() {
                    warn!("Refusing connection from {}: server full", addr);
                }
                // A dropped reply means the connection task is gone and will never
                // report a disconnect for this id.
                if reply.send(client_id).is_err() {
                    if let Some(client_id) = client_id {
                        self.clients.remove_client(client_id);
                    }
                }
            }

            ServerMessage::Event { client_id, event } => {
                if !self.clients.contains(client_id) {
                    return;
                }

                match event {
                    ClientEvent::Join(request) => {
                        let messages =
                            self.game_state
                                .handle_join(client_id, request.name, Instant::now());
                        for message in &messages {
                            self.deliver(message);
                        }
                    }
                    ClientEvent::Input(intent) => {
                        self.game_state.handle_input(client_id, &intent);
                    }
                    ClientEvent::Chat(text) => {
                        let message = self.game_state.handle_chat(client_id, &text);
                        self.deliver(&message);
                    }
                }
            }

            ServerMessage::Disconnected { client_id } => {
                if !self.clients.remove_client(client_id) {
                    return;
                }
                let message = self.game_state.handle_disconnect(client_id);
                self.deliver(&message);
            }
        }
    }

    /// Runs one simulation step and broadcasts its snapshot
    fn tick(&mut self) {
        let snapshot = self.game_state.step(Instant::now(), timestamp_millis());
        self.deliver(&snapshot);

        if self.game_state.tick % STATS_INTERVAL_TICKS == 0 {
            debug!(
                "Tick {}: {} connections, {} players",
                self.game_state.tick,
                self.clients.len(),
                self.game_state.player_count()
            );
        }
    }

    /// Main server loop. Runs until the process exits.
    pub async fn run(mut self) {
        self.spawn_acceptor();

        // Missed ticks fire back-to-back (tokio's default burst behaviour); they are
        // never skipped and dt stays fixed regardless.
        let mut tick_interval = interval(self.config.tick_duration());

        info!(
            "Server started: {} Hz, world {}x{}",
            self.config.tick_rate, self.config.world_width, self.config.world_height
        );

        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => break,
                    }
                },

                _ = tick_interval.tick() => self.tick(),
            }
        }

        info!("Server shutting down");
    }
}

/// Drives one WebSocket connection: registers it, forwards its events and
/// pumps its outbound queue until either side closes.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws_stream) => ws_stream,
        Err(e) => {
            error!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (tx, mut rx) = outbound_channel();
    let (reply_tx, reply_rx) = oneshot::channel();
    let connected = ServerMessage::Connected {
        addr,
        sender: tx,
        reply: reply_tx,
    };
    if server_tx.send(connected).is_err() {
        return;
    }

    let client_id = match reply_rx.await {
        Ok(Some(client_id)) => client_id,
        _ => {
            let frame = CloseFrame {
                code: CloseCode::Again,
                reason: Cow::Borrowed("server full"),
            };
            let _ = ws_sender.send(Message::Close(Some(frame))).await;
            return;
        }
    };

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = ws_sender.send(Message::Text(frame)).await {
                debug!("Send to {} failed: {}", addr, e);
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    while let Some(received) = ws_receiver.next().await {
        let text = match received {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    warn!("Dropping non-UTF-8 binary frame from client {}", client_id);
                    continue;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!("Connection {} read error: {}", client_id, e);
                break;
            }
        };

        match ClientEvent::decode(&text) {
            Ok(event) => {
                if server_tx
                    .send(ServerMessage::Event { client_id, event })
                    .is_err()
                {
                    break;
                }
            }
            Err(ProtocolError::UnknownEvent(name)) => {
                debug!("Ignoring unknown event `{}` from client {}", name, client_id);
            }
            Err(e) => {
                warn!("Dropping frame from client {}: {}", client_id, e);
            }
        }
    }

    let _ = server_tx.send(ServerMessage::Disconnected { client_id });
    // The writer stops once the server loop drops this client's queue
    let _ = writer.await;
}
