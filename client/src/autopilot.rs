//! Simple ball-chasing bot that turns snapshots into inputs
//!
//! The bot runs towards a point just behind the ball, as seen from the goal
//! it attacks, then walks through the ball while holding kick. After every tick
//! with kick held it lets go for one tick so the server's kick latch resets.

use kickoff_shared::{Input, PlayerId, Snapshot, Team, Vec2, Viewport, BALL_RADIUS, KICK_REACH};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chance per tick of pressing a random extra key.
const JITTER_CHANCE: f64 = 0.05;

pub struct Autopilot {
    player_id: PlayerId,
    team: Team,
    viewport: Viewport,
    kicked_last_tick: bool,
    rng: StdRng,
}

impl Autopilot {
    pub fn new(player_id: PlayerId, team: Team, viewport: Viewport) -> Self {
        Self::with_rng(player_id, team, viewport, StdRng::from_entropy())
    }

    /// Builds a bot with a fixed random sequence.
    pub fn seeded(player_id: PlayerId, team: Team, viewport: Viewport, seed: u64) -> Self {
        Self::with_rng(player_id, team, viewport, StdRng::seed_from_u64(seed))
    }

    fn with_rng(player_id: PlayerId, team: Team, viewport: Viewport, rng: StdRng) -> Self {
        Self {
            player_id,
            team,
            viewport,
            kicked_last_tick: false,
            rng,
        }
    }

    /// Chooses the next input from the latest snapshot.
    pub fn decide(&mut self, snapshot: &Snapshot) -> Input {
        let mut input = Input {
            viewport: self.viewport,
            ..Input::default()
        };

        let Some(me) = snapshot.player(self.player_id) else {
            return input;
        };
        if !snapshot.phase.is_live() {
            self.kicked_last_tick = false;
            return input;
        }

        let ball = snapshot.ball.position;
        let position = me.body.position;
        let contact = me.body.radius + snapshot.ball.radius;
        // Snapshots may be scaled; the ball radius tells by how much
        let reach = KICK_REACH * snapshot.ball.radius / BALL_RADIUS;

        let goal_x = match self.team {
            Team::Red => snapshot.field.right,
            Team::Blue => snapshot.field.left,
        };
        let goal = Vec2::new(goal_x, snapshot.field.center().y);
        let behind_ball = ball - (goal - ball).normalize() * contact;

        let to_ball = ball - position;
        let lined_up = (behind_ball - position).length() < me.body.radius
            || to_ball.dot(goal - ball) > 0.0;
        let target = if lined_up { ball } else { behind_ball };

        steer(&mut input, target - position, me.body.radius * 0.1);

        let in_reach = to_ball.length() < contact + reach;
        input.kick = in_reach && !self.kicked_last_tick;
        self.kicked_last_tick = input.kick;

        if self.rng.gen_bool(JITTER_CHANCE) {
            match self.rng.gen_range(0..4) {
                0 => input.up = true,
                1 => input.down = true,
                2 => input.left = true,
                _ => input.right = true,
            }
        }

        input
    }
}

fn steer(input: &mut Input, direction: Vec2, deadzone: f32) {
    input.left = direction.x < -deadzone;
    input.right = direction.x > deadzone;
    input.up = direction.y < -deadzone;
    input.down = direction.y > deadzone;
}
