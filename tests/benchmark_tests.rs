//! Performance benchmarks for the simulation hot paths

use kickoff_server::config::ServerConfig;
use kickoff_server::coordinator::Coordinator;
use kickoff_server::game::GameState;
use kickoff_server::viewport::scale_snapshot;
use kickoff_shared::geometry::resolve_pair_collision;
use kickoff_shared::{
    codec, Circle, Input, PlayerId, ServerPacket, Team, Vec2, Viewport, PLAYER_DRAG, PLAYER_MASS,
    PLAYER_RADIUS,
};
use std::time::Instant;

fn full_game(players: u32) -> GameState {
    let mut game = GameState::default();
    for id in 0..players {
        let team = if id % 2 == 0 { Team::Red } else { Team::Blue };
        game.add_player(PlayerId(id), format!("p{}", id), team);
    }
    game.start_match();
    game
}

fn running(id: u32, tick: u32) -> Input {
    Input {
        up: (id + tick) % 3 == 0,
        down: (id + tick) % 3 == 1,
        left: id % 2 == 1,
        right: id % 2 == 0,
        kick: tick % 4 == 0,
        ..Input::default()
    }
}

/// Benchmarks pairwise collision resolution
#[test]
fn benchmark_pair_collision() {
    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let mut a = Circle::new(Vec2::new(100.0, 100.0), PLAYER_RADIUS, PLAYER_MASS, PLAYER_DRAG);
        let mut b = Circle::new(Vec2::new(150.0, 120.0), PLAYER_RADIUS, PLAYER_MASS, PLAYER_DRAG);
        a.velocity = Vec2::new(1.0, 0.0);
        b.velocity = Vec2::new(-1.0, 0.0);

        resolve_pair_collision(&mut a, &mut b);
    }

    let duration = start.elapsed();
    println!(
        "Pair collision: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks a full tick with a crowded pitch
#[test]
fn benchmark_tick_with_full_teams() {
    let mut game = full_game(16);
    let dt = 1.0 / 60.0;
    let iterations = 1000u32;
    let start = Instant::now();

    for tick in 0..iterations {
        let inputs: Vec<_> = (0..16).map(|id| (PlayerId(id), running(id, tick))).collect();
        game.step(inputs, dt);
    }

    let duration = start.elapsed();
    println!(
        "Simulation step: {} ticks with 16 players in {:?} ({:.2} μs/tick)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // 1000 ticks is over 16 seconds of play; must run far faster than real time
    assert!(duration.as_millis() < 2000);
    assert_eq!(game.tick, iterations as u64);
    for player in game.players.values() {
        assert!(player.body.position.x.is_finite() && player.body.position.y.is_finite());
    }
}

/// Benchmarks input deposits and ticks through the shared coordinator
#[test]
fn benchmark_coordinator_round_trip() {
    let coordinator = Coordinator::new(&ServerConfig::default());
    for id in 0..16 {
        let team = if id % 2 == 0 { Team::Red } else { Team::Blue };
        coordinator
            .admit(PlayerId(id), &format!("p{}", id), team)
            .unwrap();
    }
    coordinator.with_game(|game| game.start_match());

    let iterations = 1000u32;
    let start = Instant::now();

    for tick in 0..iterations {
        for id in 0..16 {
            coordinator.deposit_input(PlayerId(id), running(id, tick));
        }
        coordinator.tick();
    }

    let duration = start.elapsed();
    println!(
        "Coordinator: {} deposit+tick rounds in {:?} ({:.2} μs/round)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 2000);
    assert_eq!(coordinator.current_tick(), iterations as u64);
}

/// Benchmarks per-client scaling and encoding of a snapshot
#[test]
fn benchmark_scale_and_encode_snapshot() {
    let snapshot = full_game(16).snapshot();
    let viewport = Viewport::new(1920, 1080);

    let iterations = 10_000;
    let start = Instant::now();
    let mut bytes = 0;

    for _ in 0..iterations {
        let scaled = scale_snapshot(&snapshot, viewport);
        let frame = codec::encode_frame(&ServerPacket::Snapshot(scaled)).unwrap();
        bytes += frame.len();
    }

    let duration = start.elapsed();
    println!(
        "Scale + encode: {} snapshots ({} bytes) in {:?} ({:.2} μs/snapshot)",
        iterations,
        bytes,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 3000);
    assert!(bytes / iterations < codec::MAX_FRAME_LEN);
}
