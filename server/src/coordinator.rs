//! Shared server context: the world lock, the input mailbox and snapshot publication
//!
//! A single [`Coordinator`] is created at startup and shared by reference
//! between the simulation task, every connection handler and the operator
//! console. It owns:
//!
//! - the [`GameState`] together with a one-slot-per-player input mailbox,
//!   both behind one mutex that is only held for short, non-blocking sections
//! - a `watch` channel carrying the most recent [`Snapshot`], which wakes all
//!   waiting handlers at once when a tick completes
//!
//! A handler deposits an input, remembers the number of the last completed
//! tick and then waits for a snapshot with a higher tick number. That snapshot
//! is guaranteed to come from the tick that consumed the input, or a later one.

use crate::config::ServerConfig;
use crate::error::{JoinRefusal, ServerError};
use crate::game::GameState;
use kickoff_shared::{Input, PlayerId, Roster, Snapshot, Team};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 24;

/// Everything guarded by the world lock.
#[derive(Debug)]
pub struct World {
    pub game: GameState,
    /// Latest unconsumed input per player; a newer deposit overwrites the older one.
    pending: BTreeMap<PlayerId, Input>,
}

pub struct Coordinator {
    world: Mutex<World>,
    next_player_id: AtomicU32,
    snapshots: watch::Sender<Arc<Snapshot>>,
    tick_seconds: f32,
    max_players: usize,
}

impl Coordinator {
    pub fn new(config: &ServerConfig) -> Self {
        let game = GameState::new(config.durations());
        let (snapshots, _) = watch::channel(Arc::new(game.snapshot()));

        Self {
            world: Mutex::new(World {
                game,
                pending: BTreeMap::new(),
            }),
            next_player_id: AtomicU32::new(1),
            snapshots,
            tick_seconds: config.tick_seconds(),
            max_players: config.max_players as usize,
        }
    }

    /// Hands out a fresh identity for a new connection.
    pub fn allocate_player_id(&self) -> PlayerId {
        PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn roster(&self) -> Roster {
        self.world.lock().game.roster()
    }

    pub fn player_count(&self) -> usize {
        self.world.lock().game.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.player_count() >= self.max_players
    }

    /// Checks a requested name and returns it trimmed.
    ///
    /// The answer can go stale before the player is admitted; [`admit`](Self::admit)
    /// checks again under the lock.
    pub fn check_name(&self, name: &str) -> Result<String, JoinRefusal> {
        let world = self.world.lock();
        validate_name(&world.game.roster(), name)
    }

    pub fn check_team(&self, team: Team) -> Result<(), JoinRefusal> {
        let world = self.world.lock();
        validate_team(&world.game.roster(), team)
    }

    /// Puts a negotiated player on the pitch.
    ///
    /// Capacity, name and team balance are validated together with the
    /// insertion so concurrent joiners cannot both win the same slot.
    pub fn admit(&self, id: PlayerId, name: &str, team: Team) -> Result<(), JoinRefusal> {
        let mut world = self.world.lock();

        if world.game.players.len() >= self.max_players {
            return Err(JoinRefusal::ServerFull);
        }
        let roster = world.game.roster();
        let name = validate_name(&roster, name)?;
        validate_team(&roster, team)?;

        world.game.add_player(id, name, team);
        Ok(())
    }

    /// Drops a player and any input still waiting for them.
    pub fn remove_player(&self, id: PlayerId) -> bool {
        let mut world = self.world.lock();
        world.pending.remove(&id);
        world.game.remove_player(&id).is_some()
    }

    /// Stores `input` as the player's next input and returns the last completed tick.
    pub fn deposit_input(&self, id: PlayerId, input: Input) -> u64 {
        let mut world = self.world.lock();
        if world.game.players.contains_key(&id) {
            world.pending.insert(id, input);
        }
        world.game.tick
    }

    pub fn current_tick(&self) -> u64 {
        self.world.lock().game.tick
    }

    /// Runs one simulation step and publishes its snapshot.
    pub fn tick(&self) -> Arc<Snapshot> {
        let snapshot = {
            let mut world = self.world.lock();
            let inputs = std::mem::take(&mut world.pending);
            Arc::new(world.game.step(inputs, self.tick_seconds))
        };

        self.snapshots.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshots.subscribe()
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Runs `f` against the game while holding the world lock.
    pub fn with_game<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        let mut world = self.world.lock();
        f(&mut world.game)
    }
}

/// Waits until a snapshot newer than tick `after` has been published.
pub async fn next_snapshot(
    snapshots: &mut watch::Receiver<Arc<Snapshot>>,
    after: u64,
) -> Result<Arc<Snapshot>, ServerError> {
    let snapshot = snapshots
        .wait_for(|snapshot| snapshot.tick > after)
        .await
        .map_err(|_| ServerError::SimulationStopped)?;
    Ok(Arc::clone(&snapshot))
}

fn validate_name(roster: &Roster, name: &str) -> Result<String, JoinRefusal> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(JoinRefusal::InvalidName { max: MAX_NAME_LEN });
    }
    if roster.contains(name) {
        debug!("Name '{}' is already in use", name);
        return Err(JoinRefusal::NameTaken(name.to_string()));
    }
    Ok(name.to_string())
}

/// Teams may differ by at most one player after the join.
fn validate_team(roster: &Roster, team: Team) -> Result<(), JoinRefusal> {
    if roster.team_size(team) > roster.team_size(team.opponent()) {
        info!("Refused {} join: {}", team, roster_summary(roster));
        return Err(JoinRefusal::TeamsUnbalanced(team));
    }
    Ok(())
}

fn roster_summary(roster: &Roster) -> String {
    format!("{} red, {} blue", roster.red.len(), roster.blue.len())
}
