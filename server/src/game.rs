//! Authoritative entity registry and the fixed-tick simulation step
//!
//! [`GameState`] owns every body on the pitch: the connected players, the
//! ball and the four goal posts, together with the match clock. One call to
//! [`GameState::step`] advances the world by exactly one tick in a fixed
//! order:
//!
//! 1. apply the pending inputs, at most one per player
//! 2. integrate players and ball
//! 3. resolve collisions between moving bodies
//! 4. keep bodies inside the player area, and the ball inside the field
//!    except through the goal mouths
//! 5. bounce moving bodies off the posts
//! 6. resolve kicks
//! 7. detect goals
//! 8. advance the match clock
//! 9. produce the snapshot
//! 10. clear the per-tick kick flags
//!
//! Steps 1 to 7 only run while the match is live (playing or overtime);
//! a frozen pitch still lets a kick release clear the kick latch.

use crate::match_manager::{MatchDurations, MatchManager, PhaseChange};
use kickoff_shared::geometry::{
    integrate, resolve_boundary_collision, resolve_pair_collision, resolve_post_collision,
};
use kickoff_shared::{
    Circle, CircleView, Input, PlayerId, PlayerView, PostCorner, PostView, Rect,
    Roster, Snapshot, Team, Vec2, BALL_DRAG, BALL_MASS, BALL_RADIUS, FIELD, GOAL_HALF_WIDTH,
    KICK_REACH, PLAYER_AREA, PLAYER_DRAG, PLAYER_MASS, PLAYER_RADIUS, POST_RADIUS,
};
use log::{debug, info};
use std::collections::BTreeMap;

/// Velocity gained per tick while a direction is held.
pub const MOVE_ACCELERATION: f32 = 0.05;
/// Fraction of the acceleration kept while the kick key is held.
pub const KICK_MOVE_FACTOR: f32 = 0.7;
/// Speed cap for players, in speed units.
pub const MAX_PLAYER_SPEED: f32 = 1.0;
/// Impulse given to the ball by a kick at the very edge of reach.
pub const KICK_MIN_STRENGTH: f32 = 0.3;
/// Impulse given to the ball by a kick in contact with the player.
pub const KICK_MAX_STRENGTH: f32 = 0.7;
/// Vertical gap between neighbouring kickoff slots.
pub const FORMATION_SPACING: f32 = 2.5 * PLAYER_RADIUS;
/// Kickoff slots stacked in one column before a new column starts.
const SLOTS_PER_COLUMN: usize = 5;

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: Team,
    pub body: Circle,
    /// Kick armed for this tick.
    pub kick: bool,
    /// Set once a kick connects, until the kick key is released.
    pub kick_locked: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String, team: Team, position: Vec2) -> Self {
        Self {
            id,
            name,
            team,
            body: Circle::new(position, PLAYER_RADIUS, PLAYER_MASS, PLAYER_DRAG),
            kick: false,
            kick_locked: false,
        }
    }

    /// Turns held keys into acceleration and updates the kick latch.
    pub fn apply_input(&mut self, input: &Input) {
        let direction = input.direction();

        if !direction.is_zero() {
            let acceleration = if input.kick {
                MOVE_ACCELERATION * KICK_MOVE_FACTOR
            } else {
                MOVE_ACCELERATION
            };
            self.body.velocity += direction.normalize() * acceleration;

            let speed = self.body.velocity.length();
            if speed > MAX_PLAYER_SPEED {
                self.body.velocity = self.body.velocity / speed * MAX_PLAYER_SPEED;
            }
        }

        if !input.kick {
            self.kick_locked = false;
        }
        self.kick = input.kick && !self.kick_locked;
    }

    fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            team: self.team,
            body: circle_view(&self.body),
            kick: self.kick,
        }
    }
}

/// A fixed goal post.
#[derive(Debug, Clone)]
pub struct Post {
    pub corner: PostCorner,
    pub body: Circle,
}

impl Post {
    fn new(corner: PostCorner, field: &Rect) -> Self {
        let center = field.center();
        let x = match corner {
            PostCorner::TopLeft | PostCorner::BottomLeft => field.left,
            PostCorner::TopRight | PostCorner::BottomRight => field.right,
        };
        let y = match corner {
            PostCorner::TopLeft | PostCorner::TopRight => center.y - GOAL_HALF_WIDTH,
            PostCorner::BottomLeft | PostCorner::BottomRight => center.y + GOAL_HALF_WIDTH,
        };
        Self {
            corner,
            body: Circle::new(Vec2::new(x, y), POST_RADIUS, 1.0, 1.0),
        }
    }
}

fn circle_view(circle: &Circle) -> CircleView {
    CircleView {
        position: circle.position,
        velocity: circle.velocity,
        radius: circle.radius(),
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// Number of completed ticks.
    pub tick: u64,
    pub players: BTreeMap<PlayerId, Player>,
    pub ball: Circle,
    /// Indexed in [`PostCorner::ALL`] order.
    pub posts: [Post; 4],
    pub field: Rect,
    pub player_area: Rect,
    pub match_manager: MatchManager,
}

impl GameState {
    pub fn new(durations: MatchDurations) -> Self {
        let field = FIELD;
        Self {
            tick: 0,
            players: BTreeMap::new(),
            ball: Circle::new(field.center(), BALL_RADIUS, BALL_MASS, BALL_DRAG),
            posts: PostCorner::ALL.map(|corner| Post::new(corner, &field)),
            field,
            player_area: PLAYER_AREA,
            match_manager: MatchManager::new(durations),
        }
    }

    pub fn post(&self, corner: PostCorner) -> &Post {
        &self.posts[corner as usize]
    }

    /// Adds a player at the first free kickoff slot of their team.
    pub fn add_player(&mut self, id: PlayerId, name: String, team: Team) {
        let position = self.free_formation_slot(team);
        info!(
            "Added player {} ({}) to {} at ({:.0}, {:.0})",
            name, id, team, position.x, position.y
        );
        self.players
            .insert(id, Player::new(id, name, team, position));
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        let removed = self.players.remove(id);
        if let Some(player) = &removed {
            info!("Removed player {} ({})", player.name, id);
        }
        removed
    }

    pub fn roster(&self) -> Roster {
        let mut roster = Roster::default();
        for player in self.players.values() {
            match player.team {
                Team::Red => roster.red.push(player.name.clone()),
                Team::Blue => roster.blue.push(player.name.clone()),
            }
        }
        roster
    }

    /// Runs one tick and returns the snapshot it produced.
    pub fn step<I>(&mut self, inputs: I, dt: f32) -> Snapshot
    where
        I: IntoIterator<Item = (PlayerId, Input)>,
    {
        self.tick += 1;
        let live = self.match_manager.phase().is_live();

        // While the pitch is frozen only a kick release gets through
        for (id, input) in inputs {
            if let Some(player) = self.players.get_mut(&id) {
                if live {
                    player.apply_input(&input);
                } else if !input.kick {
                    player.kick_locked = false;
                }
            }
        }

        if live {
            self.update_physics();
            self.handle_body_collisions();
            self.handle_boundaries();
            self.handle_post_collisions();
            self.handle_kicks();
            self.check_goal();
        }

        if let Some(change) = self.match_manager.update(dt) {
            self.apply_phase_change(change);
        }

        let snapshot = self.snapshot();
        self.clear_kicks();

        if self.tick % 60 == 0 {
            debug!(
                "Tick {}: {} players, phase {}, {:.1}s left",
                self.tick,
                self.players.len(),
                self.match_manager.phase(),
                self.match_manager.time_remaining()
            );
        }

        snapshot
    }

    pub fn update_physics(&mut self) {
        for player in self.players.values_mut() {
            integrate(&mut player.body);
        }
        integrate(&mut self.ball);
    }

    /// Pairwise collisions between all moving bodies, players and ball alike.
    pub fn handle_body_collisions(&mut self) {
        let mut bodies: Vec<&mut Circle> = self
            .players
            .values_mut()
            .map(|player| &mut player.body)
            .chain(std::iter::once(&mut self.ball))
            .collect();

        for i in 0..bodies.len() {
            let (head, tail) = bodies.split_at_mut(i + 1);
            let first = &mut *head[i];
            for second in tail.iter_mut() {
                resolve_pair_collision(first, second);
            }
        }
    }

    pub fn handle_boundaries(&mut self) {
        for player in self.players.values_mut() {
            resolve_boundary_collision(&mut player.body, &self.player_area);
        }

        resolve_boundary_collision(&mut self.ball, &self.player_area);

        // The goal mouths are openings in the field walls
        let (mouth_top, mouth_bottom) = self.goal_mouth(Team::Red);
        let y = self.ball.position.y;
        let walls = if mouth_top < y && y < mouth_bottom {
            Rect {
                left: f32::NEG_INFINITY,
                right: f32::INFINITY,
                ..self.field
            }
        } else {
            self.field
        };
        resolve_boundary_collision(&mut self.ball, &walls);
    }

    pub fn handle_post_collisions(&mut self) {
        for post in &self.posts {
            for player in self.players.values_mut() {
                resolve_post_collision(&mut player.body, &post.body);
            }
            resolve_post_collision(&mut self.ball, &post.body);
        }
    }

    /// Applies every armed kick that reaches the ball. Returns how many connected.
    pub fn handle_kicks(&mut self) -> usize {
        let mut connected = 0;

        for player in self.players.values_mut() {
            if !player.kick || player.kick_locked {
                continue;
            }

            let delta = self.ball.position - player.body.position;
            let distance = delta.length();
            let contact = player.body.radius() + self.ball.radius();
            if distance >= contact + KICK_REACH || distance == 0.0 {
                continue;
            }

            // Closer to the player's surface means a harder kick
            let gap = (distance - contact).clamp(0.0, KICK_REACH);
            let closeness = 1.0 - gap / KICK_REACH;
            let strength = KICK_MIN_STRENGTH + (KICK_MAX_STRENGTH - KICK_MIN_STRENGTH) * closeness;

            self.ball.velocity += delta / distance * strength;
            player.kick_locked = true;
            connected += 1;
            debug!("{} kicked the ball with strength {:.2}", player.name, strength);
        }

        connected
    }

    /// Scores a goal if the ball has crossed a goal line inside the mouth.
    ///
    /// Returns the scoring team. The pitch is reset for a kickoff, so a second
    /// call in the same tick finds nothing.
    pub fn check_goal(&mut self) -> Option<Team> {
        if !self.match_manager.phase().is_live() {
            return None;
        }

        let ball = self.ball.position;
        let conceding = [Team::Red, Team::Blue].into_iter().find(|&defender| {
            let line = self.goal_line(defender);
            let crossed = match defender {
                Team::Red => ball.x < line,
                Team::Blue => ball.x > line,
            };
            let (top, bottom) = self.goal_mouth(defender);
            crossed && top < ball.y && ball.y < bottom
        })?;

        let scorer = conceding.opponent();
        if let Some(change) = self.match_manager.record_goal(scorer) {
            self.apply_phase_change(change);
        }
        self.reset_kickoff();
        Some(scorer)
    }

    /// X coordinate of the goal line defended by `team`.
    pub fn goal_line(&self, team: Team) -> f32 {
        match team {
            Team::Red => self.post(PostCorner::TopLeft).body.position.x,
            Team::Blue => self.post(PostCorner::TopRight).body.position.x,
        }
    }

    /// Vertical extent, top then bottom, of the goal defended by `team`.
    pub fn goal_mouth(&self, team: Team) -> (f32, f32) {
        let (top, bottom) = match team {
            Team::Red => (PostCorner::TopLeft, PostCorner::BottomLeft),
            Team::Blue => (PostCorner::TopRight, PostCorner::BottomRight),
        };
        let a = self.post(top).body.position.y;
        let b = self.post(bottom).body.position.y;
        (a.min(b), a.max(b))
    }

    pub fn start_match(&mut self) -> Option<PhaseChange> {
        let change = self.match_manager.start_match()?;
        self.apply_phase_change(change);
        Some(change)
    }

    pub fn pause_match(&mut self) -> Option<PhaseChange> {
        self.match_manager.pause()
    }

    pub fn resume_match(&mut self) -> Option<PhaseChange> {
        self.match_manager.resume()
    }

    fn apply_phase_change(&mut self, change: PhaseChange) {
        if change.needs_kickoff() {
            self.reset_kickoff();
        }
    }

    /// Ball to the center spot, players to their formation, everything at rest.
    pub fn reset_kickoff(&mut self) {
        self.ball.reset_to(self.field.center());

        let mut placed = [0usize; 2];
        let slots: Vec<(PlayerId, Vec2)> = self
            .players
            .values()
            .map(|player| {
                let index = &mut placed[player.team as usize];
                let slot = self.formation_slot(player.team, *index);
                *index += 1;
                (player.id, slot)
            })
            .collect();

        for (id, slot) in slots {
            if let Some(player) = self.players.get_mut(&id) {
                player.body.reset_to(slot);
                player.kick = false;
                player.kick_locked = false;
            }
        }
    }

    /// Kickoff position of the `index`-th player of `team`.
    ///
    /// Slots fan out above and below the center line on the team's half,
    /// starting a new column closer to the team's own goal every few players.
    /// Once the half is out of columns, the next layer is staggered between
    /// the previous ones. Every slot stays inside the team's half of the
    /// player area.
    pub fn formation_slot(&self, team: Team, index: usize) -> Vec2 {
        let center = self.field.center();
        let (base_x, backwards, min_x, max_x) = match team {
            Team::Red => (
                center.x - self.field.width() / 4.0,
                -1.0,
                self.player_area.left + PLAYER_RADIUS,
                center.x - PLAYER_RADIUS,
            ),
            Team::Blue => (
                center.x + self.field.width() / 4.0,
                1.0,
                center.x + PLAYER_RADIUS,
                self.player_area.right - PLAYER_RADIUS,
            ),
        };
        let own_edge = if backwards < 0.0 { min_x } else { max_x };
        let columns = ((base_x - own_edge).abs() / FORMATION_SPACING) as usize + 1;

        let column = index / SLOTS_PER_COLUMN;
        let layer = (column / columns) as f32;
        let column = (column % columns) as f32;
        let row = index % SLOTS_PER_COLUMN;
        let level = ((row + 1) / 2) as f32;
        let side = if row % 2 == 1 { -1.0 } else { 1.0 };

        let x = base_x + backwards * (column - layer / 2.0) * FORMATION_SPACING;
        let y = center.y + side * level * FORMATION_SPACING + layer * FORMATION_SPACING / 4.0;

        Vec2::new(
            x.clamp(min_x, max_x),
            y.clamp(
                self.player_area.top + PLAYER_RADIUS,
                self.player_area.bottom - PLAYER_RADIUS,
            ),
        )
    }

    fn free_formation_slot(&self, team: Team) -> Vec2 {
        (0..)
            .map(|index| self.formation_slot(team, index))
            .find(|slot| {
                !self
                    .players
                    .values()
                    .any(|player| (player.body.position - *slot).length_squared() < 1.0)
            })
            .unwrap_or_else(|| self.field.center())
    }

    pub fn clear_kicks(&mut self) {
        for player in self.players.values_mut() {
            player.kick = false;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            phase: self.match_manager.phase(),
            time_remaining: self.match_manager.time_remaining(),
            score: self.match_manager.score(),
            result: self.match_manager.result(),
            field: self.field,
            player_area: self.player_area,
            players: self.players.values().map(Player::view).collect(),
            ball: circle_view(&self.ball),
            posts: self
                .posts
                .iter()
                .map(|post| PostView {
                    corner: post.corner,
                    body: circle_view(&post.body),
                })
                .collect(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(MatchDurations::default())
    }
}
