use crate::session::PlayerState;
use shared::WorldBounds;

/// Advances the player by one fixed timestep and clamps it into the world.
///
/// Velocity is left untouched at a wall, so a player holding a direction keeps
/// pushing against it instead of bouncing.
pub fn integrate(player: &mut PlayerState, dt: f32, world: WorldBounds) {
    player.x = clamp_axis(player.x + player.vx * dt, world.width);
    player.y = clamp_axis(player.y + player.vy * dt, world.height);
}

// max/min rather than clamp: a NaN coordinate collapses to 0 instead of escaping the bounds
fn clamp_axis(value: f32, bound: f32) -> f32 {
    value.max(0.0).min(bound)
}
