//! Session registry: the sole owner of per-player simulation state
//!
//! A connection only gets a [`PlayerState`] once it asks to join. Joining again
//! respawns the player in place of the old state, and removal is idempotent so
//! a disconnect racing other cleanup never fails.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{PlayerId, WorldBounds, ANON_NAME};
use std::collections::HashMap;
use std::time::Instant;

/// Authoritative state of one joined player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub name: String,
    /// Time of the most recent integration (or the join, before the first tick)
    pub last_update: Instant,
}

impl PlayerState {
    pub fn new(id: PlayerId, x: f32, y: f32, name: String, now: Instant) -> Self {
        Self {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            name,
            last_update: now,
        }
    }
}

/// Display name used when a player joins without one
pub fn default_name(id: PlayerId) -> String {
    let prefix: String = id.to_string().chars().take(4).collect();
    format!("{}{}", ANON_NAME, prefix)
}

pub struct SessionRegistry {
    world: WorldBounds,
    players: HashMap<PlayerId, PlayerState>,
    rng: StdRng,
}

impl SessionRegistry {
    pub fn new(world: WorldBounds) -> Self {
        Self::with_rng(world, StdRng::from_entropy())
    }

    /// Registry with deterministic spawn positions
    pub fn with_seed(world: WorldBounds, seed: u64) -> Self {
        Self::with_rng(world, StdRng::seed_from_u64(seed))
    }

    fn with_rng(world: WorldBounds, rng: StdRng) -> Self {
        Self {
            world,
            players: HashMap::new(),
            rng,
        }
    }

    pub fn world(&self) -> WorldBounds {
        self.world
    }

    /// Spawns the player at a uniformly random point inside the world.
    ///
    /// Any previous state for `id` is replaced, so velocity never carries over a respawn.
    pub fn join(&mut self, id: PlayerId, name: Option<String>, now: Instant) -> &PlayerState {
        let x = self.rng.gen_range(0.0..=self.world.width);
        let y = self.rng.gen_range(0.0..=self.world.height);
        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => default_name(id),
        };

        let player = PlayerState::new(id, x, y, name, now);
        info!(
            "Player {} ({}) spawned at ({:.1}, {:.1})",
            id, player.name, player.x, player.y
        );

        self.players.insert(id, player);
        &self.players[&id]
    }

    /// Removes the player if present. Returns the removed state.
    pub fn remove(&mut self, id: PlayerId) -> Option<PlayerState> {
        let removed = self.players.remove(&id);
        if removed.is_some() {
            info!("Removed player {}", id);
        }
        removed
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(&id)
    }

    /// Every live player, in no particular order
    pub fn all(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values()
    }

    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut PlayerState> {
        self.players.values_mut()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
