//! # Authoritative Sync Server
//!
//! This library implements the server side of a real-time multiplayer world. The
//! server owns the true position of every player: clients only send movement
//! intent, and every tick the server integrates all players and broadcasts one
//! consistent snapshot to every open connection.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Positions are advanced at a fixed rate (20 Hz by default) with a fixed timestep,
//! and clamped to the world bounds after every tick. Velocity comes from the most
//! recent intent each player sent; nothing is queued or replayed.
//!
//! ### Session Lifecycle
//! A connection exists before it has a player. Joining spawns the player at a
//! random point, joining again respawns it, and disconnecting removes it. Join and
//! leave are announced to every connection as they happen, independent of the tick.
//!
//! ### Snapshot Broadcasting
//! Each tick sends `{id, x, y, name}` for every player plus a server timestamp to
//! all connections, joined or not. There is no interest management and no
//! acknowledgment.
//!
//! ## Architecture Design
//!
//! ### Single-Owner Event Loop
//! Per-connection tasks decode frames and forward them into one queue. The server
//! loop is that queue's only consumer and also fires the tick, so joins, removals,
//! intents and integration are serialized without locks. An intent that arrives
//! while a tick is running is picked up by the next tick.
//!
//! ### WebSocket Transport
//! Each message is a JSON text frame shaped `{"event": ..., "data": ...}`. Sends are
//! fire-and-forget through a per-connection queue drained by a writer task.
//!
//! ## Module Organization
//!
//! - `config`: command line and environment configuration
//! - `session`: the session registry owning every `PlayerState`
//! - `input`: intent to velocity reduction, including diagonal normalization
//! - `physics`: fixed-step integration and bounds clamping
//! - `chat`: stateless chat relay with truncation
//! - `broadcast`: snapshot construction and outbound fan-out
//! - `game`: lifecycle handling and the per-tick step
//! - `client_manager`: open connections and their outbound queues
//! - `network`: WebSocket handling and the tick loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         port: 3000,
//!         ..ServerConfig::default()
//!     };
//!
//!     // Binds the listener, then ticks and serves connections forever
//!     let server = Server::bind(config).await?;
//!     server.run().await;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Known Trust Gap
//!
//! The client-declared `speed` is accepted as-is unless `--max-speed` is given, in
//! which case it is clamped to that ceiling. No other input validation is done.

pub mod broadcast;
pub mod chat;
pub mod client_manager;
pub mod config;
pub mod game;
pub mod input;
pub mod network;
pub mod physics;
pub mod session;
