//! Client-side view of the world, rebuilt from server snapshots.
//!
//! The client never predicts. It keeps the last authoritative position of each
//! player as a target and eases a separate render position toward it every frame.

use shared::{JoinedAck, PlayerId, ServerEvent, Snapshot, WorldBounds};
use std::collections::HashMap;

/// Fraction of the remaining distance covered per render frame
pub const INTERPOLATION_FACTOR: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlayer {
    pub id: PlayerId,
    pub name: String,
    /// Last authoritative position
    pub x: f32,
    pub y: f32,
    /// Smoothed position to draw
    pub render_x: f32,
    pub render_y: f32,
}

impl RemotePlayer {
    fn new(id: PlayerId, name: String, x: f32, y: f32) -> Self {
        Self {
            id,
            name,
            x,
            y,
            render_x: x,
            render_y: y,
        }
    }
}

#[derive(Debug, Default)]
pub struct ClientGameState {
    pub client_id: Option<PlayerId>,
    pub world: WorldBounds,
    pub players: HashMap<PlayerId, RemotePlayer>,
    /// Server timestamp of the newest snapshot applied
    pub last_snapshot_time: Option<u64>,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_event(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::Joined(ack) => self.apply_joined(ack),
            ServerEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            ServerEvent::PlayerJoined(view) => {
                self.players
                    .entry(view.id)
                    .or_insert_with(|| RemotePlayer::new(view.id, view.name.clone(), view.x, view.y));
            }
            ServerEvent::PlayerLeft(left) => {
                self.players.remove(&left.id);
            }
            ServerEvent::Chat(_) => {}
        }
    }

    fn apply_joined(&mut self, ack: &JoinedAck) {
        self.client_id = Some(ack.id);
        self.world = ack.world;
    }

    /// Adds new players, retargets known ones and forgets the ones that vanished.
    ///
    /// Snapshots older than the newest one applied are ignored.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        if let Some(last) = self.last_snapshot_time {
            if snapshot.t < last {
                return;
            }
        }
        self.last_snapshot_time = Some(snapshot.t);

        for view in &snapshot.players {
            match self.players.get_mut(&view.id) {
                Some(player) => {
                    player.x = view.x;
                    player.y = view.y;
                    player.name = view.name.clone();
                }
                None => {
                    self.players.insert(
                        view.id,
                        RemotePlayer::new(view.id, view.name.clone(), view.x, view.y),
                    );
                }
            }
        }

        self.players
            .retain(|id, _| snapshot.players.iter().any(|view| view.id == *id));
    }

    /// Moves every render position a fraction of the way to its target
    pub fn interpolate(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        for player in self.players.values_mut() {
            player.render_x += (player.x - player.render_x) * factor;
            player.render_y += (player.y - player.render_y) * factor;
        }
    }

    pub fn local_player(&self) -> Option<&RemotePlayer> {
        self.client_id.and_then(|id| self.players.get(&id))
    }
}
