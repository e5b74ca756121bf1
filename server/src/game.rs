//! Authoritative game state and connection lifecycle
//!
//! Owns the session registry and turns lifecycle events into outbound messages.
//! All methods take `&mut self` and are driven from a single task, so a tick
//! never observes a half-applied join or a player vanishing mid-iteration.

use crate::broadcast::{self, GameMessage};
use crate::chat;
use crate::config::ServerConfig;
use crate::input;
use crate::physics;
use crate::session::SessionRegistry;
use shared::{InputIntent, JoinedAck, PlayerId, PlayerLeft, PlayerView, ServerEvent, WorldBounds};
use std::time::Instant;

pub struct GameState {
    /// Number of completed ticks
    pub tick: u64,
    registry: SessionRegistry,
    dt: f32,
    max_speed: Option<f32>,
}

impl GameState {
    pub fn new(registry: SessionRegistry, dt: f32, max_speed: Option<f32>) -> Self {
        Self {
            tick: 0,
            registry,
            dt,
            max_speed,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            SessionRegistry::new(config.world()),
            config.dt(),
            config.max_speed,
        )
    }

    pub fn world(&self) -> WorldBounds {
        self.registry.world()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn player_count(&self) -> usize {
        self.registry.len()
    }

    /// Spawns (or respawns) the player, then acknowledges privately and announces publicly
    pub fn handle_join(
        &mut self,
        client_id: PlayerId,
        name: Option<String>,
        now: Instant,
    ) -> Vec<GameMessage> {
        let world = self.registry.world();
        let player = self.registry.join(client_id, name, now);

        let ack = ServerEvent::Joined(JoinedAck {
            id: player.id,
            x: player.x,
            y: player.y,
            world,
        });
        let announcement = ServerEvent::PlayerJoined(PlayerView::from(player));

        vec![
            GameMessage::Send {
                client_id,
                event: ack,
            },
            GameMessage::Broadcast {
                event: announcement,
            },
        ]
    }

    /// Applies movement intent; silently ignored for connections that have not joined
    pub fn handle_input(&mut self, client_id: PlayerId, intent: &InputIntent) {
        input::apply_intent(&mut self.registry, client_id, intent, self.max_speed);
    }

    pub fn handle_chat(&self, client_id: PlayerId, text: &str) -> GameMessage {
        GameMessage::Broadcast {
            event: ServerEvent::Chat(chat::relay(&self.registry, client_id, text)),
        }
    }

    /// Removes the player (a no-op if it never joined) and announces the departure
    pub fn handle_disconnect(&mut self, client_id: PlayerId) -> GameMessage {
        self.registry.remove(client_id);
        GameMessage::Broadcast {
            event: ServerEvent::PlayerLeft(PlayerLeft { id: client_id }),
        }
    }

    /// Integrates every player by the fixed timestep and produces the tick's snapshot
    pub fn step(&mut self, now: Instant, timestamp: u64) -> GameMessage {
        let dt = self.dt;
        let world = self.registry.world();

        for player in self.registry.all_mut() {
            physics::integrate(player, dt, world);
            player.last_update = player.last_update.max(now);
        }
        self.tick += 1;

        GameMessage::Broadcast {
            event: broadcast::snapshot(self.registry.all(), timestamp),
        }
    }
}
