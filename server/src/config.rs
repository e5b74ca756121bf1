//! Server configuration parsed from the command line and environment

use clap::Parser;
use shared::{WorldBounds, DEFAULT_PORT, TICK_RATE, WORLD_HEIGHT, WORLD_WIDTH};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tick rate must be at least 1 Hz")]
    ZeroTickRate,
    #[error("world bounds must be positive and finite, got {width}x{height}")]
    InvalidWorld { width: f32, height: f32 },
    #[error("max clients must be at least 1")]
    NoCapacity,
    #[error("max speed must be positive and finite, got {0}")]
    InvalidMaxSpeed(f32),
}

/// Authoritative server settings, fixed for the lifetime of the process
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about)]
pub struct ServerConfig {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,
    /// Server port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Tick rate (simulation steps and snapshots per second)
    #[arg(short, long, default_value_t = TICK_RATE)]
    pub tick_rate: u32,
    /// World width in world units
    #[arg(long, default_value_t = WORLD_WIDTH)]
    pub world_width: f32,
    /// World height in world units
    #[arg(long, default_value_t = WORLD_HEIGHT)]
    pub world_height: f32,
    /// Maximum number of simultaneous connections
    #[arg(long, default_value_t = 1024)]
    pub max_clients: usize,
    /// Clamp client-requested speed to this value (unlimited when unset)
    #[arg(long)]
    pub max_speed: Option<f32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            tick_rate: TICK_RATE,
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            max_clients: 1024,
            max_speed: None,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }

        let world_ok = |v: f32| v.is_finite() && v > 0.0;
        if !world_ok(self.world_width) || !world_ok(self.world_height) {
            return Err(ConfigError::InvalidWorld {
                width: self.world_width,
                height: self.world_height,
            });
        }

        if self.max_clients == 0 {
            return Err(ConfigError::NoCapacity);
        }

        if let Some(max_speed) = self.max_speed {
            if !(max_speed.is_finite() && max_speed > 0.0) {
                return Err(ConfigError::InvalidMaxSpeed(max_speed));
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn world(&self) -> WorldBounds {
        WorldBounds::new(self.world_width, self.world_height)
    }

    /// Wall-clock period between ticks
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }

    /// Fixed simulation timestep, independent of scheduler jitter
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}
