//! Reduces directional intent to a velocity on the player's state.
//!
//! Last write wins: intents are not queued, so whatever velocity was written most
//! recently before a tick is what that tick integrates.

use crate::session::SessionRegistry;
use log::debug;
use shared::{InputIntent, PlayerId};
use std::f32::consts::FRAC_1_SQRT_2;

/// Velocity for an intent. Diagonals are scaled so their magnitude equals the speed.
pub fn velocity_for(intent: &InputIntent, max_speed: Option<f32>) -> (f32, f32) {
    let mut speed = intent.resolved_speed();
    if let Some(max_speed) = max_speed {
        speed = speed.min(max_speed);
    }

    let mut vx = 0.0;
    let mut vy = 0.0;
    if intent.left {
        vx -= speed;
    }
    if intent.right {
        vx += speed;
    }
    if intent.up {
        vy -= speed;
    }
    if intent.down {
        vy += speed;
    }

    if vx != 0.0 && vy != 0.0 {
        vx *= FRAC_1_SQRT_2;
        vy *= FRAC_1_SQRT_2;
    }

    (vx, vy)
}

/// Writes the intent's velocity onto the player. Returns false when `id` has not joined.
pub fn apply_intent(
    registry: &mut SessionRegistry,
    id: PlayerId,
    intent: &InputIntent,
    max_speed: Option<f32>,
) -> bool {
    let Some(player) = registry.get_mut(id) else {
        debug!("Dropping input from {} without a player", id);
        return false;
    };

    let (vx, vy) = velocity_for(intent, max_speed);
    player.vx = vx;
    player.vy = vy;
    true
}
