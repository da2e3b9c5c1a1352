//! Messages exchanged between clients and the server
//!
//! Every message travels inside a length-prefixed frame (see [`crate::codec`]).
//! A connection starts with the join handshake (`Welcome`, `Join`,
//! `NameChecked`, `PickTeam`, `TeamChecked`) and then settles into a strict
//! request/response cycle: one [`ClientPacket::Input`] answered by one
//! [`ServerPacket::Snapshot`].

use crate::geometry::{Rect, Vec2};
use crate::{CANONICAL_HEIGHT, CANONICAL_WIDTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identity of a connected player, valid for the connection's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Red => f.write_str("red"),
            Team::Blue => f.write_str("blue"),
        }
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Team::Red),
            "blue" | "b" => Ok(Team::Blue),
            other => Err(format!("unknown team '{}', expected red or blue", other)),
        }
    }
}

/// Window dimensions reported by a client, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The resolution the simulation itself runs in.
    pub fn canonical() -> Self {
        Self::new(CANONICAL_WIDTH as u32, CANONICAL_HEIGHT as u32)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::canonical()
    }
}

/// One tick worth of player intent.
///
/// The viewport is presentation-only and never reaches the physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Input {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub kick: bool,
    pub viewport: Viewport,
}

impl Input {
    /// Raw direction from the held keys; opposite keys cancel out.
    pub fn direction(&self) -> Vec2 {
        let axis = |negative: bool, positive: bool| -> f32 {
            (positive as i8 - negative as i8) as f32
        };
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Phase of the match clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Countdown to kickoff; the pitch is frozen.
    Break,
    /// Regular time.
    Playing,
    /// Golden-goal extra time after a draw.
    Overtime,
    /// Frozen by an operator; resumes into the interrupted phase.
    Paused,
}

impl MatchPhase {
    /// Whether physics, kicks and goals advance in this phase.
    pub fn is_live(self) -> bool {
        matches!(self, MatchPhase::Playing | MatchPhase::Overtime)
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchPhase::Break => "break",
            MatchPhase::Playing => "playing",
            MatchPhase::Overtime => "overtime",
            MatchPhase::Paused => "paused",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub red: u32,
    pub blue: u32,
}

impl Score {
    pub fn is_tied(&self) -> bool {
        self.red == self.blue
    }

    pub fn credit(&mut self, team: Team) {
        match team {
            Team::Red => self.red += 1,
            Team::Blue => self.blue += 1,
        }
    }

    pub fn leader(&self) -> Option<Team> {
        match self.red.cmp(&self.blue) {
            std::cmp::Ordering::Greater => Some(Team::Red),
            std::cmp::Ordering::Less => Some(Team::Blue),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "red {} - {} blue", self.red, self.blue)
    }
}

/// Goal post location; the left posts guard Red's goal, the right ones Blue's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostCorner {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl PostCorner {
    pub const ALL: [PostCorner; 4] = [
        PostCorner::TopLeft,
        PostCorner::BottomLeft,
        PostCorner::TopRight,
        PostCorner::BottomRight,
    ];

    pub fn team(self) -> Team {
        match self {
            PostCorner::TopLeft | PostCorner::BottomLeft => Team::Red,
            PostCorner::TopRight | PostCorner::BottomRight => Team::Blue,
        }
    }
}

/// Rendered-ready view of a circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleView {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub team: Team,
    pub body: CircleView,
    pub kick: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub corner: PostCorner,
    pub body: CircleView,
}

/// Full state of the match as produced by one tick.
///
/// Snapshots are never mutated once published; per-client copies are derived
/// from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: MatchPhase,
    /// Seconds left in the current phase.
    pub time_remaining: f32,
    pub score: Score,
    /// Final score of the last finished match, shown until the next kickoff.
    pub result: Option<Score>,
    pub field: Rect,
    pub player_area: Rect,
    pub players: Vec<PlayerView>,
    pub ball: CircleView,
    pub posts: Vec<PostView>,
}

impl Snapshot {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|player| player.id == id)
    }
}

/// Names of the currently connected players, per team.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Roster {
    pub red: Vec<String>,
    pub blue: Vec<String>,
}

impl Roster {
    pub fn team_size(&self, team: Team) -> usize {
        match team {
            Team::Red => self.red.len(),
            Team::Blue => self.blue.len(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.red.iter().chain(self.blue.iter()).any(|n| n == name)
    }
}

/// Client to server messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientPacket {
    Join { name: String },
    PickTeam { team: Team },
    Input(Input),
}

/// Server to client messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerPacket {
    Welcome { player_id: PlayerId, roster: Roster },
    NameChecked { accepted: bool },
    TeamChecked { accepted: bool },
    Rejected { reason: String },
    Snapshot(Snapshot),
}
