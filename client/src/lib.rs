//! # Kickoff Headless Client Library
//!
//! This library provides a client for the kickoff match server that needs no
//! window. It is used for load testing, for filling empty teams with bots and
//! by the workspace integration tests.
//!
//! ## Connection Lifecycle
//!
//! ### Handshake
//! After connecting, the server sends a welcome with the player id and the
//! current roster. The client then proposes a name (retrying with a numeric
//! suffix if it is taken) and a team (falling back to the other team if the
//! first choice would unbalance the match).
//!
//! ### Input/Snapshot Cycle
//! From then on the client sends one input and receives exactly one snapshot
//! in return. Each input carries the client's viewport, and the server scales
//! the snapshot to it.
//!
//! ## Module Organization
//!
//! - `network`: TCP connection, handshake and the input/snapshot exchange
//! - `autopilot`: a simple bot that chases the ball and kicks towards goal
//! - `error`: client error type

pub mod autopilot;
pub mod error;
pub mod network;

pub use autopilot::Autopilot;
pub use error::ClientError;
pub use network::Client;
