//! Match clock and phase state machine
//!
//! The manager owns the score and the countdown for the current phase:
//!
//! - `Break` counts down to kickoff, then `Playing` starts.
//! - `Playing` ends in `Overtime` on a draw, otherwise in `Break` with the
//!   score reset.
//! - `Overtime` is golden goal: the first goal or the end of the clock sends
//!   the match back to `Break`.
//! - `Paused` freezes the clock and remembers the phase it interrupted.
//!
//! The final score of a finished match is kept as its result until the next
//! kickoff, so it can still be shown during the break.
//!
//! Commands that do not apply to the current phase are ignored and reported
//! as such through their `Option` return.

use kickoff_shared::{MatchPhase, Score, Team};
use log::info;

/// Configured length of each timed phase, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchDurations {
    pub match_time: f32,
    pub break_time: f32,
    pub overtime: f32,
}

impl Default for MatchDurations {
    fn default() -> Self {
        Self {
            match_time: 180.0,
            break_time: 10.0,
            overtime: 60.0,
        }
    }
}

/// A transition the state machine has just taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: MatchPhase,
    pub to: MatchPhase,
}

impl PhaseChange {
    /// Whether the pitch should be set up for a kickoff after this change.
    ///
    /// Pausing and resuming leave the pitch exactly as it was.
    pub fn needs_kickoff(&self) -> bool {
        self.from != MatchPhase::Paused && self.to != MatchPhase::Paused
    }
}

#[derive(Debug, Clone)]
pub struct MatchManager {
    phase: MatchPhase,
    time_remaining: f32,
    durations: MatchDurations,
    paused_from: Option<MatchPhase>,
    score: Score,
    result: Option<Score>,
}

impl MatchManager {
    /// Creates a manager at the start of a break.
    pub fn new(durations: MatchDurations) -> Self {
        Self {
            phase: MatchPhase::Break,
            time_remaining: durations.break_time,
            durations,
            paused_from: None,
            score: Score::default(),
            result: None,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub fn durations(&self) -> MatchDurations {
        self.durations
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Final score of the last finished match, until the next kickoff.
    pub fn result(&self) -> Option<Score> {
        self.result
    }

    /// Phase that a resume would return to, if paused.
    pub fn paused_from(&self) -> Option<MatchPhase> {
        self.paused_from
    }

    /// Advances the clock by `dt` seconds and takes any transition that is due.
    pub fn update(&mut self, dt: f32) -> Option<PhaseChange> {
        if self.phase == MatchPhase::Paused {
            return None;
        }

        self.time_remaining = (self.time_remaining - dt).max(0.0);
        if self.time_remaining > 0.0 {
            return None;
        }

        let next = match self.phase {
            MatchPhase::Break => MatchPhase::Playing,
            MatchPhase::Playing if self.score.is_tied() => MatchPhase::Overtime,
            MatchPhase::Playing | MatchPhase::Overtime => MatchPhase::Break,
            MatchPhase::Paused => return None,
        };
        Some(self.enter(next))
    }

    /// Credits a goal to `team`. Ends the match when it happens in overtime.
    ///
    /// Goals outside of live play are ignored.
    pub fn record_goal(&mut self, team: Team) -> Option<PhaseChange> {
        if !self.phase.is_live() {
            return None;
        }

        self.score.credit(team);
        info!("Goal for {}! Score is now {}", team, self.score);

        if self.phase == MatchPhase::Overtime {
            Some(self.enter(MatchPhase::Break))
        } else {
            None
        }
    }

    /// Skips the rest of the break and kicks off immediately.
    pub fn start_match(&mut self) -> Option<PhaseChange> {
        if self.phase != MatchPhase::Break {
            return None;
        }
        Some(self.enter(MatchPhase::Playing))
    }

    pub fn pause(&mut self) -> Option<PhaseChange> {
        if !self.phase.is_live() {
            return None;
        }

        let from = self.phase;
        self.paused_from = Some(from);
        self.phase = MatchPhase::Paused;
        info!("Match paused during {}", from);
        Some(PhaseChange {
            from,
            to: MatchPhase::Paused,
        })
    }

    pub fn resume(&mut self) -> Option<PhaseChange> {
        if self.phase != MatchPhase::Paused {
            return None;
        }
        let resumed = self.paused_from.take()?;

        self.phase = resumed;
        info!("Match resumed into {}", resumed);
        Some(PhaseChange {
            from: MatchPhase::Paused,
            to: resumed,
        })
    }

    pub fn set_match_time(&mut self, seconds: f32) {
        self.durations.match_time = seconds;
        self.clamp_remaining(MatchPhase::Playing, seconds);
    }

    pub fn set_break_time(&mut self, seconds: f32) {
        self.durations.break_time = seconds;
        self.clamp_remaining(MatchPhase::Break, seconds);
    }

    pub fn set_overtime(&mut self, seconds: f32) {
        self.durations.overtime = seconds;
        self.clamp_remaining(MatchPhase::Overtime, seconds);
    }

    /// Shortens the running countdown when its phase was just reconfigured.
    fn clamp_remaining(&mut self, phase: MatchPhase, seconds: f32) {
        let current = self.paused_from.unwrap_or(self.phase);
        if current == phase {
            self.time_remaining = self.time_remaining.min(seconds);
        }
    }

    fn enter(&mut self, next: MatchPhase) -> PhaseChange {
        let from = self.phase;

        if next == MatchPhase::Break && from.is_live() {
            match self.score.leader() {
                Some(winner) => info!("Match over, {} wins ({})", winner, self.score),
                None => info!("Match over, draw ({})", self.score),
            }
            self.result = Some(self.score);
            self.score = Score::default();
        }
        if next == MatchPhase::Playing {
            self.result = None;
        }

        self.phase = next;
        self.time_remaining = match next {
            MatchPhase::Break => self.durations.break_time,
            MatchPhase::Playing => self.durations.match_time,
            MatchPhase::Overtime => self.durations.overtime,
            MatchPhase::Paused => self.time_remaining,
        };
        info!("Match phase {} -> {} ({:.0}s)", from, next, self.time_remaining);

        PhaseChange { from, to: next }
    }
}

impl Default for MatchManager {
    fn default() -> Self {
        Self::new(MatchDurations::default())
    }
}
