//! # Kickoff Match Server Library
//!
//! This library provides the authoritative server for a top-down, two-team
//! ball game. It owns the only true copy of the match, advances it on a fixed
//! tick and answers every client input with a snapshot of the pitch.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Players, the ball and the goal posts are circles moving in a fixed
//! canonical space. Each tick applies at most one input per player, integrates
//! motion with drag, resolves collisions and kicks, and checks for goals.
//!
//! ### Match Flow
//! A clock cycles the match through break, regular time and, after a draw,
//! golden-goal overtime. An operator can force a kickoff, pause, resume and
//! change durations from the console.
//!
//! ### Client Service
//! Every connection negotiates a name and a team, then settles into a strict
//! cycle: one input in, one snapshot out. Snapshots are scaled to the window
//! size each client reports.
//!
//! ## Architecture Design
//!
//! ### One Lock, One Broadcast
//! The game state and a one-slot-per-player input mailbox share a single
//! mutex. The simulation task takes it once per tick; connection tasks take it
//! only to deposit an input. Finished snapshots are published on a `watch`
//! channel so every waiting connection wakes up at once, and each connection
//! writes to its own socket without holding the lock.
//!
//! ### Most Recent Input Wins
//! A newer input from the same player replaces the one still waiting. Inputs
//! are never queued, so a lagging client never replays stale keys.
//!
//! ## Module Organization
//!
//! - `game`: entity registry and the per-tick simulation step
//! - `match_manager`: match clock, phases and score
//! - `coordinator`: shared world lock, input mailbox and snapshot publication
//! - `viewport`: per-client scaling of snapshots
//! - `handshake`: name and team negotiation for new connections
//! - `network`: TCP listener, simulation loop and connection handlers
//! - `console`: operator commands
//! - `config`: command line configuration
//! - `error`: error types
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use kickoff_server::config::ServerConfig;
//! use kickoff_server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         port: 7000,
//!         ..ServerConfig::default()
//!     };
//!
//!     // Binds the listener; the simulation starts with `run`
//!     let server = Server::bind(&config).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod console;
pub mod coordinator;
pub mod error;
pub mod game;
pub mod handshake;
pub mod match_manager;
pub mod network;
pub mod viewport;
