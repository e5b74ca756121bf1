use crate::game::{ClientGameState, INTERPOLATION_FACTOR};
use crate::input::InputManager;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use shared::{ClientEvent, JoinRequest, ServerEvent};
use std::time::{Duration, Instant};
use tokio::time::{interval, sleep_until};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Input is resent at 20 Hz whether or not it changed
pub const INPUT_INTERVAL: Duration = Duration::from_millis(50);
const RENDER_INTERVAL: Duration = Duration::from_millis(16);

pub struct Client {
    server_url: String,
    name: Option<String>,
    greeting: Option<String>,

    game_state: ClientGameState,
    input_manager: InputManager,
}

impl Client {
    pub fn new(server_url: &str, name: Option<String>, input_manager: InputManager) -> Self {
        Client {
            server_url: server_url.to_string(),
            name,
            greeting: None,
            game_state: ClientGameState::new(),
            input_manager,
        }
    }

    /// Chat line sent once the join is acknowledged
    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting;
        self
    }

    pub fn game_state(&self) -> &ClientGameState {
        &self.game_state
    }

    /// Decodes one server frame and folds it into the local state.
    ///
    /// Returns true when the frame was the join acknowledgment.
    fn handle_frame(&mut self, text: &str) -> bool {
        let event = match ServerEvent::decode(text) {
            Ok(event) => event,
            Err(e) => {
                warn!("Dropping frame from server: {}", e);
                return false;
            }
        };

        match &event {
            ServerEvent::Joined(ack) => {
                info!("Joined as {} at ({:.1}, {:.1})", ack.id, ack.x, ack.y)
            }
            ServerEvent::PlayerJoined(view) => info!("+ {} joined", view.name),
            ServerEvent::PlayerLeft(left) => info!("- player left {}", left.id),
            ServerEvent::Chat(chat) => info!("{}: {}", chat.name, chat.text),
            ServerEvent::Snapshot(snapshot) => {
                debug!("Snapshot t={} with {} players", snapshot.t, snapshot.players.len())
            }
        }

        self.game_state.apply_event(&event);
        matches!(event, ServerEvent::Joined(_))
    }

    /// Connects, joins and plays until the server closes or `duration` elapses.
    pub async fn run(&mut self, duration: Option<Duration>) -> Result<(), Box<dyn std::error::Error>> {
        let (ws_stream, _) = connect_async(self.server_url.as_str()).await?;
        info!("Connected to {}", self.server_url);
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let join = ClientEvent::Join(JoinRequest {
            name: self.name.clone(),
        });
        ws_sender.send(Message::Text(join.encode()?)).await?;

        let mut input_interval = interval(INPUT_INTERVAL);
        let mut render_interval = interval(RENDER_INTERVAL);

        let deadline = duration.map(|d| tokio::time::Instant::now() + d);
        let stop = async move {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(stop);

        loop {
            tokio::select! {
                received = ws_receiver.next() => {
                    match received {
                        Some(Ok(Message::Text(text))) => {
                            if self.handle_frame(&text) {
                                if let Some(greeting) = self.greeting.take() {
                                    let chat = ClientEvent::Chat(greeting);
                                    ws_sender.send(Message::Text(chat.encode()?)).await?;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Server closed the connection");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                    }
                },

                _ = input_interval.tick() => {
                    if self.game_state.client_id.is_some() {
                        let intent = self.input_manager.update(Instant::now());
                        ws_sender.send(Message::Text(ClientEvent::Input(intent).encode()?)).await?;
                    }
                },

                _ = render_interval.tick() => {
                    self.game_state.interpolate(INTERPOLATION_FACTOR);
                },

                _ = &mut stop => {
                    info!("Run time elapsed, leaving");
                    break;
                },
            }
        }

        let _ = ws_sender.close().await;
        Ok(())
    }
}
