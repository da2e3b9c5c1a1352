//! Types and rules shared by the kickoff server and its clients
//!
//! The crate holds everything both ends of a connection must agree on: the
//! canonical pitch geometry, the circle physics primitives, the message
//! types and the length-prefixed wire framing.

pub mod codec;
pub mod geometry;
pub mod protocol;

pub use codec::{read_message, write_message, WireError};
pub use geometry::{Circle, Rect, Vec2};
pub use protocol::{
    CircleView, ClientPacket, Input, MatchPhase, PlayerId, PlayerView, PostCorner, PostView,
    Roster, Score, ServerPacket, Snapshot, Team, Viewport,
};

/// Width of the coordinate space the simulation runs in.
pub const CANONICAL_WIDTH: f32 = 1280.0;
/// Height of the coordinate space the simulation runs in.
pub const CANONICAL_HEIGHT: f32 = 720.0;

/// Region that contains every moving body, run-off included.
pub const PLAYER_AREA: Rect = Rect::new(40.0, 40.0, 1240.0, 680.0);
/// Playing field; the goal lines are its left and right edges.
pub const FIELD: Rect = Rect::new(120.0, 80.0, 1160.0, 640.0);
/// Vertical distance from the field's center line to each post.
pub const GOAL_HALF_WIDTH: f32 = 80.0;

pub const PLAYER_RADIUS: f32 = 45.0;
pub const PLAYER_MASS: f32 = 1.0;
pub const PLAYER_DRAG: f32 = 0.96;

pub const BALL_RADIUS: f32 = 30.0;
pub const BALL_MASS: f32 = 0.5;
pub const BALL_DRAG: f32 = 0.99;

pub const POST_RADIUS: f32 = 15.0;

/// Extra distance past touching at which a player can still kick the ball.
pub const KICK_REACH: f32 = 20.0;
