//! Command line configuration for the server binary

use crate::match_manager::MatchDurations;
use clap::{value_parser, Parser};
use std::time::Duration;

/// Most players a server can be configured to hold.
pub const PLAYER_LIMIT: u32 = 64;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about = "Authoritative kickoff match server")]
pub struct ServerConfig {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = 12345)]
    pub port: u16,

    /// Simulation ticks per second
    #[arg(short, long, default_value_t = 60, value_parser = value_parser!(u32).range(1..=240))]
    pub tick_rate: u32,

    /// Length of regular time, in seconds
    #[arg(long, default_value_t = 180, value_parser = value_parser!(u32).range(1..))]
    pub match_time: u32,

    /// Length of the break before kickoff, in seconds
    #[arg(long, default_value_t = 10, value_parser = value_parser!(u32).range(1..))]
    pub break_time: u32,

    /// Length of overtime after a draw, in seconds
    #[arg(long, default_value_t = 60, value_parser = value_parser!(u32).range(1..))]
    pub overtime_time: u32,

    /// Maximum number of players on the pitch
    #[arg(long, default_value_t = 16, value_parser = value_parser!(u32).range(2..=PLAYER_LIMIT as i64))]
    pub max_players: u32,

    /// Do not read operator commands from stdin
    #[arg(long)]
    pub no_console: bool,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate as f64)
    }

    /// Simulated seconds that pass on the match clock per tick.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    pub fn durations(&self) -> MatchDurations {
        MatchDurations {
            match_time: self.match_time as f32,
            break_time: self.break_time as f32,
            overtime: self.overtime_time as f32,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 12345,
            tick_rate: 60,
            match_time: 180,
            break_time: 10,
            overtime_time: 60,
            max_players: 16,
            no_console: false,
        }
    }
}
