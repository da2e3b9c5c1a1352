//! Join negotiation run on every new connection before it may send inputs
//!
//! The server greets the client with its player id and the current roster,
//! then gives it a few attempts to choose an acceptable name and team. Only
//! once both are agreed is the player put on the pitch.

use crate::coordinator::Coordinator;
use crate::error::{HandshakeError, JoinRefusal};
use kickoff_shared::{read_message, write_message, ClientPacket, PlayerId, ServerPacket, Team};
use log::{debug, info};
use tokio::io::{AsyncRead, AsyncWrite};

/// Tries a client gets for each of the name and team questions.
pub const MAX_ATTEMPTS: usize = 3;

/// A player that completed the handshake and is now on the pitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub player_id: PlayerId,
    pub name: String,
    pub team: Team,
}

/// Runs the join handshake on `stream`.
///
/// On failure the client is told why with a `Rejected` packet whenever the
/// connection still allows it.
pub async fn negotiate<S>(
    stream: &mut S,
    coordinator: &Coordinator,
) -> Result<Admission, HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if coordinator.is_full() {
        return Err(reject(stream, JoinRefusal::ServerFull.into()).await);
    }

    let player_id = coordinator.allocate_player_id();
    let welcome = ServerPacket::Welcome {
        player_id,
        roster: coordinator.roster(),
    };
    write_message(stream, &welcome).await?;

    let name = match choose_name(stream, coordinator).await {
        Ok(name) => name,
        Err(e) => return Err(reject(stream, e).await),
    };
    let team = match choose_team(stream, coordinator).await {
        Ok(team) => team,
        Err(e) => return Err(reject(stream, e).await),
    };

    if let Err(refusal) = coordinator.admit(player_id, &name, team) {
        return Err(reject(stream, refusal.into()).await);
    }

    info!("Player {} ({}) joined {}", name, player_id, team);
    Ok(Admission {
        player_id,
        name,
        team,
    })
}

async fn choose_name<S>(stream: &mut S, coordinator: &Coordinator) -> Result<String, HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    for _ in 0..MAX_ATTEMPTS {
        let requested = match read_message::<_, ClientPacket>(stream).await? {
            ClientPacket::Join { name } => name,
            _ => return Err(HandshakeError::UnexpectedPacket { expected: "Join" }),
        };

        let checked = coordinator.check_name(&requested);
        write_message(
            stream,
            &ServerPacket::NameChecked {
                accepted: checked.is_ok(),
            },
        )
        .await?;

        match checked {
            Ok(name) => return Ok(name),
            Err(refusal) => debug!("Name refused: {}", refusal),
        }
    }

    Err(HandshakeError::TooManyNameAttempts)
}

async fn choose_team<S>(stream: &mut S, coordinator: &Coordinator) -> Result<Team, HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    for _ in 0..MAX_ATTEMPTS {
        let team = match read_message::<_, ClientPacket>(stream).await? {
            ClientPacket::PickTeam { team } => team,
            _ => return Err(HandshakeError::UnexpectedPacket { expected: "PickTeam" }),
        };

        let checked = coordinator.check_team(team);
        write_message(
            stream,
            &ServerPacket::TeamChecked {
                accepted: checked.is_ok(),
            },
        )
        .await?;

        if checked.is_ok() {
            return Ok(team);
        }
    }

    Err(HandshakeError::TooManyTeamAttempts)
}

/// Tells the client why it is being turned away, then hands the error back.
async fn reject<S>(stream: &mut S, error: HandshakeError) -> HandshakeError
where
    S: AsyncWrite + Unpin,
{
    // Nothing can be sent over a broken connection
    if matches!(error, HandshakeError::Wire(_)) {
        return error;
    }

    let reason = match &error {
        HandshakeError::Refused(refusal) => refusal.to_string(),
        other => other.to_string(),
    };
    if let Err(e) = write_message(stream, &ServerPacket::Rejected { reason }).await {
        debug!("Could not deliver rejection: {}", e);
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use kickoff_shared::Input;
    use std::sync::Arc;
    use tokio::io::{duplex, DuplexStream};
    use tokio::task::JoinHandle;

    fn spawn_server(
        coordinator: &Arc<Coordinator>,
    ) -> (DuplexStream, JoinHandle<Result<Admission, HandshakeError>>) {
        let (client, mut server) = duplex(64 * 1024);
        let coordinator = Arc::clone(coordinator);
        let handle = tokio::spawn(async move { negotiate(&mut server, &coordinator).await });
        (client, handle)
    }

    async fn send(client: &mut DuplexStream, packet: ClientPacket) {
        write_message(client, &packet).await.unwrap();
    }

    async fn receive(client: &mut DuplexStream) -> ServerPacket {
        read_message(client).await.unwrap()
    }

    #[tokio::test]
    async fn test_successful_join() {
        let coordinator = Arc::new(Coordinator::new(&ServerConfig::default()));
        let (mut client, handle) = spawn_server(&coordinator);

        let player_id = match receive(&mut client).await {
            ServerPacket::Welcome { player_id, roster } => {
                assert_eq!(roster, Default::default());
                player_id
            }
            other => panic!("expected welcome, got {:?}", other),
        };

        send(&mut client, ClientPacket::Join { name: "ana".into() }).await;
        assert_eq!(receive(&mut client).await, ServerPacket::NameChecked { accepted: true });
        send(&mut client, ClientPacket::PickTeam { team: Team::Blue }).await;
        assert_eq!(receive(&mut client).await, ServerPacket::TeamChecked { accepted: true });

        let admission = handle.await.unwrap().unwrap();
        assert_eq!(admission.player_id, player_id);
        assert_eq!(admission.name, "ana");
        assert_eq!(admission.team, Team::Blue);
        assert_eq!(coordinator.roster().blue, vec!["ana".to_string()]);
    }

    #[tokio::test]
    async fn test_name_retry_after_refusal() {
        let coordinator = Arc::new(Coordinator::new(&ServerConfig::default()));
        coordinator.admit(PlayerId(100), "ana", Team::Red).unwrap();
        let (mut client, handle) = spawn_server(&coordinator);
        receive(&mut client).await;

        send(&mut client, ClientPacket::Join { name: "ana".into() }).await;
        assert_eq!(receive(&mut client).await, ServerPacket::NameChecked { accepted: false });
        send(&mut client, ClientPacket::Join { name: " ".into() }).await;
        assert_eq!(receive(&mut client).await, ServerPacket::NameChecked { accepted: false });
        send(&mut client, ClientPacket::Join { name: "bea".into() }).await;
        assert_eq!(receive(&mut client).await, ServerPacket::NameChecked { accepted: true });

        // Red already has one more player than blue
        send(&mut client, ClientPacket::PickTeam { team: Team::Red }).await;
        assert_eq!(receive(&mut client).await, ServerPacket::TeamChecked { accepted: false });
        send(&mut client, ClientPacket::PickTeam { team: Team::Blue }).await;
        assert_eq!(receive(&mut client).await, ServerPacket::TeamChecked { accepted: true });

        let admission = handle.await.unwrap().unwrap();
        assert_eq!(admission.name, "bea");
        assert_eq!(admission.team, Team::Blue);
    }

    #[tokio::test]
    async fn test_too_many_name_attempts() {
        let coordinator = Arc::new(Coordinator::new(&ServerConfig::default()));
        coordinator.admit(PlayerId(100), "ana", Team::Red).unwrap();
        let (mut client, handle) = spawn_server(&coordinator);
        receive(&mut client).await;

        for _ in 0..MAX_ATTEMPTS {
            send(&mut client, ClientPacket::Join { name: "ana".into() }).await;
            assert_eq!(receive(&mut client).await, ServerPacket::NameChecked { accepted: false });
        }

        assert!(matches!(receive(&mut client).await, ServerPacket::Rejected { .. }));
        assert!(matches!(
            handle.await.unwrap(),
            Err(HandshakeError::TooManyNameAttempts)
        ));
        assert_eq!(coordinator.player_count(), 1);
    }

    #[tokio::test]
    async fn test_full_server_rejects_before_welcome() {
        let config = ServerConfig {
            max_players: 2,
            ..ServerConfig::default()
        };
        let coordinator = Arc::new(Coordinator::new(&config));
        coordinator.admit(PlayerId(100), "ana", Team::Red).unwrap();
        coordinator.admit(PlayerId(101), "rui", Team::Blue).unwrap();
        let (mut client, handle) = spawn_server(&coordinator);

        assert_eq!(
            receive(&mut client).await,
            ServerPacket::Rejected {
                reason: "Server full".to_string()
            }
        );
        assert!(matches!(
            handle.await.unwrap(),
            Err(HandshakeError::Refused(JoinRefusal::ServerFull))
        ));
    }

    #[tokio::test]
    async fn test_input_before_join_is_rejected() {
        let coordinator = Arc::new(Coordinator::new(&ServerConfig::default()));
        let (mut client, handle) = spawn_server(&coordinator);
        receive(&mut client).await;

        send(&mut client, ClientPacket::Input(Input::default())).await;

        assert!(matches!(receive(&mut client).await, ServerPacket::Rejected { .. }));
        assert!(matches!(
            handle.await.unwrap(),
            Err(HandshakeError::UnexpectedPacket { expected: "Join" })
        ));
    }

    #[tokio::test]
    async fn test_client_leaving_mid_handshake() {
        let coordinator = Arc::new(Coordinator::new(&ServerConfig::default()));
        let (mut client, handle) = spawn_server(&coordinator);
        receive(&mut client).await;

        drop(client);

        assert!(matches!(handle.await.unwrap(), Err(HandshakeError::Wire(_))));
        assert_eq!(coordinator.player_count(), 0);
    }
}
