//! Operator commands read line by line from standard input

use crate::coordinator::Coordinator;
use crate::error::CommandError;
use log::{info, warn};
use std::io::BufRead;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartMatch,
    PauseMatch,
    ResumeMatch,
    SetMatchTime(u32),
    SetBreakTime(u32),
    SetOvertimeTime(u32),
    Status,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();

        let seconds = |command: &'static str, arg: Option<&str>| -> Result<u32, CommandError> {
            let arg = arg.ok_or(CommandError::MissingSeconds(command))?;
            match arg.parse::<u32>() {
                Ok(seconds) if seconds > 0 => Ok(seconds),
                _ => Err(CommandError::InvalidSeconds(arg.to_string())),
            }
        };

        match name {
            "start_match" => Ok(Command::StartMatch),
            "pause_match" => Ok(Command::PauseMatch),
            "resume_match" => Ok(Command::ResumeMatch),
            "set_match_time" => seconds("set_match_time", words.next()).map(Command::SetMatchTime),
            "set_break_time" => seconds("set_break_time", words.next()).map(Command::SetBreakTime),
            "set_overtime_time" => {
                seconds("set_overtime_time", words.next()).map(Command::SetOvertimeTime)
            }
            "status" => Ok(Command::Status),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Applies `command` under the world lock and describes the outcome.
pub fn execute(coordinator: &Coordinator, command: Command) -> String {
    coordinator.with_game(|game| {
        let change = match command {
            Command::StartMatch => game.start_match(),
            Command::PauseMatch => game.pause_match(),
            Command::ResumeMatch => game.resume_match(),
            Command::SetMatchTime(seconds) => {
                game.match_manager.set_match_time(seconds as f32);
                return format!("match time set to {}s", seconds);
            }
            Command::SetBreakTime(seconds) => {
                game.match_manager.set_break_time(seconds as f32);
                return format!("break time set to {}s", seconds);
            }
            Command::SetOvertimeTime(seconds) => {
                game.match_manager.set_overtime(seconds as f32);
                return format!("overtime set to {}s", seconds);
            }
            Command::Status => {
                return format!(
                    "{}, {:.0}s left, {}, {} players",
                    game.match_manager.phase(),
                    game.match_manager.time_remaining(),
                    game.match_manager.score(),
                    game.players.len()
                );
            }
        };

        match change {
            Some(_) => format!("ok, match is now {}", game.match_manager.phase()),
            None => format!("ignored, match is {}", game.match_manager.phase()),
        }
    })
}

/// Reads commands from `input` until it ends, printing each reply.
pub fn run_commands<R: BufRead>(input: R, coordinator: &Coordinator) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read console input: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                let reply = execute(coordinator, command);
                info!("Operator {:?}: {}", command, reply);
                println!("{}", reply);
            }
            Err(e) => println!("{}", e),
        }
    }
}

/// Starts the console on its own thread, since stdin reads block.
pub fn spawn_console(coordinator: Arc<Coordinator>) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            run_commands(stdin.lock(), &coordinator);
            info!("Console input closed");
        })
}
