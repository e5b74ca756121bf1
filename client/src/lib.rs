//! # Headless Sync Client
//!
//! A thin client for the authoritative sync server. It joins, streams movement
//! intent at a fixed rate, and turns the server's snapshots into smoothed render
//! positions. Drawing those positions is left to whatever embeds this library.
//!
//! ## Architecture Overview
//!
//! The client never simulates movement itself. The server is the only authority
//! on positions; the client keeps the latest authoritative position of every
//! player and eases a separate render position toward it each frame. There is no
//! prediction and therefore nothing to reconcile.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The local copy of the world:
//! - Snapshot application (new players appear, missing players vanish)
//! - Per-frame interpolation of render positions
//! - Identity and world bounds from the join acknowledgment
//!
//! ### Input Module (`input`)
//! Scripted wandering intent, standing in for a keyboard.
//!
//! ### Network Module (`network`)
//! The WebSocket session: join, 20 Hz intent stream, event logging and the
//! render tick.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::input::InputManager;
//! use client::network::Client;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input = InputManager::new(Some(220.0), Duration::from_secs(2));
//!     let mut client = Client::new("ws://127.0.0.1:3000", Some("bot".to_string()), input);
//!
//!     // Wander for ten seconds, then leave
//!     client.run(Some(Duration::from_secs(10))).await?;
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod input;
pub mod network;
