//! Integration tests for the match server and the headless client
//!
//! These tests run a real server on an ephemeral TCP port and talk to it with
//! real clients, plus whole-match scenarios driven tick by tick.

use kickoff_client::{Client, ClientError};
use kickoff_server::config::ServerConfig;
use kickoff_server::coordinator::Coordinator;
use kickoff_server::network::Server;
use kickoff_shared::{Input, Team, Viewport};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Starts a server in the background and returns its address and shared context.
async fn start_server(config: ServerConfig) -> (String, Arc<Coordinator>) {
    let config = ServerConfig {
        port: 0,
        no_console: true,
        ..config
    };
    let server = Server::bind(&config).await.expect("Failed to bind server");
    let addr = server.local_addr().unwrap().to_string();
    let coordinator = server.coordinator();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    (addr, coordinator)
}

async fn join(addr: &str, name: &str, team: Option<Team>) -> Client {
    Client::connect(addr, name, team, Viewport::canonical())
        .await
        .expect("Failed to join")
}

/// HANDSHAKE TESTS
mod handshake_tests {
    use super::*;

    /// Tests a full join handshake followed by a first snapshot
    #[tokio::test]
    async fn client_joins_and_receives_snapshots() {
        let (addr, coordinator) = start_server(ServerConfig::default()).await;

        let mut client = join(&addr, "ana", Some(Team::Red)).await;
        let snapshot = client.exchange(Input::default()).await.unwrap();

        let me = snapshot.player(client.player_id()).expect("Own player missing");
        assert_eq!(me.name, "ana");
        assert_eq!(me.team, Team::Red);
        assert_eq!(coordinator.roster().red, vec!["ana".to_string()]);
    }

    /// Tests name retries when the preferred name is taken
    #[tokio::test]
    async fn taken_name_gets_a_suffix() {
        let (addr, _) = start_server(ServerConfig::default()).await;

        let first = join(&addr, "bot", None).await;
        let second = join(&addr, "bot", None).await;

        assert_eq!(first.name(), "bot");
        assert_eq!(second.name(), "bot2");
        assert_ne!(first.player_id(), second.player_id());
    }

    /// Tests team fallback when the preferred team is already larger
    #[tokio::test]
    async fn unbalancing_team_choice_falls_back() {
        let (addr, _) = start_server(ServerConfig::default()).await;

        let first = join(&addr, "ana", Some(Team::Red)).await;
        let second = join(&addr, "rui", Some(Team::Red)).await;

        assert_eq!(first.team(), Team::Red);
        assert_eq!(second.team(), Team::Blue);
    }

    /// Tests rejection of joiners once the server is full
    #[tokio::test]
    async fn full_server_rejects_newcomers() {
        let config = ServerConfig {
            max_players: 2,
            ..ServerConfig::default()
        };
        let (addr, _) = start_server(config).await;

        let _a = join(&addr, "ana", None).await;
        let _b = join(&addr, "rui", None).await;
        let result = Client::connect(&addr, "ze", None, Viewport::canonical()).await;

        match result {
            Err(ClientError::Rejected(reason)) => assert_eq!(reason, "Server full"),
            Err(e) => panic!("Expected rejection, got {}", e),
            Ok(_) => panic!("Expected rejection, got a connection"),
        }
    }
}

/// SNAPSHOT BROADCAST TESTS
mod broadcast_tests {
    use super::*;

    /// Tests that each input is answered by a strictly newer snapshot
    #[tokio::test]
    async fn every_exchange_returns_a_newer_snapshot() {
        let (addr, _) = start_server(ServerConfig::default()).await;
        let mut client = join(&addr, "ana", None).await;

        let mut last_tick = 0;
        for _ in 0..10 {
            let snapshot = client.exchange(Input::default()).await.unwrap();
            assert!(snapshot.tick > last_tick);
            last_tick = snapshot.tick;
        }
    }

    /// Tests per-client viewport scaling of the same tick
    #[tokio::test]
    async fn snapshots_are_scaled_per_client() {
        let (addr, _) = start_server(ServerConfig::default()).await;
        let mut full = join(&addr, "ana", None).await;
        let mut half = Client::connect(&addr, "rui", None, Viewport::new(640, 360))
            .await
            .unwrap();

        let full_view = full.exchange(Input::default()).await.unwrap();
        let half_view = half.exchange(Input::default()).await.unwrap();

        assert_eq!(full_view.ball.radius, 30.0);
        assert_eq!(half_view.ball.radius, 15.0);
        assert_eq!(half_view.field.right, full_view.field.right / 2.0);
        assert_eq!(half_view.players.len(), 2);
    }

    /// Tests player removal after a client disconnects
    #[tokio::test]
    async fn departed_player_disappears_for_others() {
        let (addr, coordinator) = start_server(ServerConfig::default()).await;
        let mut stays = join(&addr, "ana", None).await;
        let leaves = join(&addr, "rui", None).await;

        let snapshot = stays.exchange(Input::default()).await.unwrap();
        assert_eq!(snapshot.players.len(), 2);

        let departed = leaves.player_id();
        drop(leaves);

        let mut gone = false;
        for _ in 0..200 {
            let snapshot = stays.exchange(Input::default()).await.unwrap();
            if snapshot.player(departed).is_none() {
                gone = true;
                break;
            }
        }
        assert!(gone, "Departed player still on the pitch");
        assert_eq!(coordinator.player_count(), 1);
    }

    /// Tests that inputs do not move players during the break
    #[tokio::test]
    async fn inputs_are_frozen_during_break() {
        let (addr, _) = start_server(ServerConfig::default()).await;
        let mut client = join(&addr, "ana", None).await;
        let input = Input {
            right: true,
            ..Input::default()
        };

        let first = client.exchange(input).await.unwrap();
        sleep(Duration::from_millis(50)).await;
        let second = client.exchange(input).await.unwrap();

        let id = client.player_id();
        assert_eq!(first.phase.to_string(), "break");
        assert_eq!(
            first.player(id).unwrap().body.position,
            second.player(id).unwrap().body.position
        );
    }
}

/// WHOLE MATCH SCENARIOS
mod match_tests {
    use super::*;
    use kickoff_server::game::GameState;
    use kickoff_shared::{
        MatchPhase, PlayerId, Score, Vec2, BALL_RADIUS, FIELD, KICK_REACH, PLAYER_AREA,
        PLAYER_RADIUS,
    };

    const TICK: f32 = 1.0 / 60.0;

    fn keys(right: bool, left: bool, kick: bool) -> Input {
        Input {
            right,
            left,
            kick,
            ..Input::default()
        }
    }

    /// Tests the first ball touch of two players running at kickoff
    #[test]
    fn kick_sends_ball_away_from_the_kicker() {
        let mut game = GameState::default();
        game.add_player(PlayerId(1), "red".to_string(), Team::Red);
        game.add_player(PlayerId(2), "blue".to_string(), Team::Blue);
        game.start_match();

        let center_y = PLAYER_AREA.center().y;
        game.players.get_mut(&PlayerId(1)).unwrap().body.position =
            Vec2::new(PLAYER_AREA.left + PLAYER_RADIUS, center_y);
        game.players.get_mut(&PlayerId(2)).unwrap().body.position =
            Vec2::new(PLAYER_AREA.right - PLAYER_RADIUS, center_y);

        // Both run at the ball; red kicks once it is almost in reach
        let mut red_x = PLAYER_AREA.left + PLAYER_RADIUS;
        let mut first_touch = None;
        for _ in 0..400 {
            let kick = FIELD.center().x - red_x < PLAYER_RADIUS + BALL_RADIUS + KICK_REACH + 5.5;
            let snapshot = game.step(
                [
                    (PlayerId(1), keys(true, false, kick)),
                    (PlayerId(2), keys(false, true, false)),
                ],
                TICK,
            );
            red_x = snapshot.player(PlayerId(1)).unwrap().body.position.x;
            if !snapshot.ball.velocity.is_zero() {
                first_touch = Some(snapshot.ball.velocity);
                break;
            }
        }

        let velocity = first_touch.expect("Nobody reached the ball");
        assert!(velocity.x > 0.0);
        assert_eq!(velocity.y, 0.0);
    }

    /// Tests single goal detection and kickoff reset
    #[test]
    fn goal_fires_once_after_crossing_the_line() {
        let mut game = GameState::default();
        game.start_match();
        game.ball.position = Vec2::new(1000.0, FIELD.center().y);
        game.ball.velocity = Vec2::new(0.8, 0.0);
        let line = game.goal_line(Team::Blue);

        let mut scored_at = None;
        for tick in 0..200 {
            let snapshot = game.step(std::iter::empty(), TICK);
            if snapshot.score != Score::default() {
                scored_at = Some(tick);
                assert_eq!(snapshot.score, Score { red: 1, blue: 0 });
                assert_eq!(snapshot.ball.position, FIELD.center());
                break;
            }
            assert!(snapshot.ball.position.x <= line);
        }
        assert!(scored_at.is_some(), "Ball never crossed the goal line");

        for _ in 0..30 {
            let snapshot = game.step(std::iter::empty(), TICK);
            assert_eq!(snapshot.score, Score { red: 1, blue: 0 });
            assert_eq!(snapshot.phase, MatchPhase::Playing);
        }
    }

    /// Tests wall bounces outside the goal mouth
    #[test]
    fn ball_outside_the_mouth_never_scores() {
        let mut game = GameState::default();
        game.start_match();
        game.ball.position = Vec2::new(1000.0, FIELD.top + 60.0);
        game.ball.velocity = Vec2::new(1.0, 0.0);

        for _ in 0..300 {
            let snapshot = game.step(std::iter::empty(), TICK);
            assert_eq!(snapshot.score, Score::default());
            assert!(snapshot.ball.position.x <= FIELD.right);
        }
    }

    /// Tests a goal scored by real clients over TCP
    #[tokio::test]
    async fn red_scores_over_the_network() {
        let config = ServerConfig {
            tick_rate: 240,
            ..ServerConfig::default()
        };
        let (addr, coordinator) = start_server(config).await;
        let mut red = join(&addr, "red", Some(Team::Red)).await;
        let mut blue = join(&addr, "blue", Some(Team::Blue)).await;
        coordinator.with_game(|game| game.start_match());

        // Blue clears the way, red dribbles straight at blue's goal
        let mut score = Score::default();
        for exchange in 0..3000u32 {
            blue.exchange(Input {
                up: true,
                ..Input::default()
            })
            .await
            .unwrap();
            let snapshot = red
                .exchange(keys(true, false, exchange % 2 == 0))
                .await
                .unwrap();

            score = snapshot.score;
            if score != Score::default() {
                break;
            }
        }

        assert_eq!(score, Score { red: 1, blue: 0 });
    }
}
