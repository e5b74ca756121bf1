//! Wire protocol and world constants shared by the server and client crates.
//!
//! Every message travels as one JSON text frame shaped `{"event": <name>, "data": <payload>}`.
//! Client events are decoded leniently: missing or malformed fields fall back to defaults
//! instead of failing, so a sloppy client can never take the simulation down.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub const WORLD_WIDTH: f32 = 4000.0;
pub const WORLD_HEIGHT: f32 = 4000.0;
pub const TICK_RATE: u32 = 20;
pub const DEFAULT_SPEED: f32 = 200.0;
pub const CHAT_MAX_CHARS: usize = 300;
pub const DEFAULT_PORT: u16 = 3000;
pub const ANON_NAME: &str = "anon";

/// Connection identity. Allocated once per connection and never reused.
pub type PlayerId = u64;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::new(WORLD_WIDTH, WORLD_HEIGHT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    #[serde(
        default,
        deserialize_with = "lenient_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
}

/// Directional movement intent. Only the most recent intent per player matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputIntent {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub up: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub down: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub left: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub right: bool,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub speed: Option<f32>,
}

impl InputIntent {
    /// Requested speed, or [`DEFAULT_SPEED`] when absent, non-positive or non-finite.
    pub fn resolved_speed(&self) -> f32 {
        match self.speed {
            Some(speed) if speed.is_finite() && speed > 0.0 => speed,
            _ => DEFAULT_SPEED,
        }
    }
}

/// Events a client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    Join(JoinRequest),
    Input(InputIntent),
    Chat(String),
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

impl ClientEvent {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        let data = envelope.data;

        match envelope.event.as_str() {
            "join" => {
                let request = match data {
                    Value::Object(_) => serde_json::from_value(data)?,
                    _ => JoinRequest::default(),
                };
                Ok(ClientEvent::Join(request))
            }
            "input" => {
                let intent = match data {
                    Value::Object(_) => serde_json::from_value(data)?,
                    _ => InputIntent::default(),
                };
                Ok(ClientEvent::Input(intent))
            }
            "chat" => Ok(ClientEvent::Chat(match data {
                Value::String(text) => text,
                other => other.to_string(),
            })),
            _ => Err(ProtocolError::UnknownEvent(envelope.event)),
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Private acknowledgment sent to a joining connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedAck {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub world: WorldBounds,
}

/// Visible per-player state. Velocity and update time stay on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub players: Vec<PlayerView>,
    pub t: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerLeft {
    pub id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: PlayerId,
    pub name: String,
    pub text: String,
}

/// Events the server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    Joined(JoinedAck),
    Snapshot(Snapshot),
    PlayerJoined(PlayerView),
    PlayerLeft(PlayerLeft),
    Chat(ChatMessage),
}

impl ServerEvent {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Current Unix time in milliseconds
pub fn timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

// Loose truthiness so `1`, `"yes"` and friends still read as pressed keys.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().map_or(false, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

// Only a non-empty string counts as a name; anything else gets the default.
fn lenient_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(name) if !name.is_empty() => Some(name),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64().map(|n| n as f32),
        Value::String(text) => text.trim().parse::<f32>().ok(),
        _ => None,
    })
}
