use crate::autopilot::Autopilot;
use crate::error::ClientError;
use kickoff_shared::{
    read_message, write_message, ClientPacket, Input, MatchPhase, PlayerId, Roster, Score,
    ServerPacket, Snapshot, Team, Viewport,
};
use log::{debug, info};
use tokio::net::TcpStream;

/// Name variants tried before giving up; matches the server's attempt limit.
const NAME_ATTEMPTS: usize = 3;

pub struct Client {
    stream: TcpStream,
    player_id: PlayerId,
    name: String,
    team: Team,
    viewport: Viewport,
}

impl Client {
    /// Connects and completes the join handshake.
    ///
    /// A taken name is retried with a numeric suffix. Without a preferred
    /// team the smaller one is picked; a refused team falls back to the other.
    pub async fn connect(
        server_addr: &str,
        name: &str,
        team: Option<Team>,
        viewport: Viewport,
    ) -> Result<Self, ClientError> {
        let mut stream = TcpStream::connect(server_addr)
            .await
            .map_err(|source| ClientError::Connect {
                addr: server_addr.to_string(),
                source,
            })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not disable Nagle: {}", e);
        }

        let (player_id, roster) = match read_message::<_, ServerPacket>(&mut stream).await? {
            ServerPacket::Welcome { player_id, roster } => (player_id, roster),
            ServerPacket::Rejected { reason } => return Err(ClientError::Rejected(reason)),
            _ => return Err(ClientError::UnexpectedPacket { expected: "Welcome" }),
        };
        info!(
            "Welcomed as {}, {} red and {} blue players on the pitch",
            player_id,
            roster.red.len(),
            roster.blue.len()
        );

        let name = Self::choose_name(&mut stream, name).await?;
        let team = Self::choose_team(&mut stream, team, &roster).await?;
        info!("Joined as {} on {}", name, team);

        Ok(Self {
            stream,
            player_id,
            name,
            team,
            viewport,
        })
    }

    async fn choose_name(stream: &mut TcpStream, base: &str) -> Result<String, ClientError> {
        for attempt in 0..NAME_ATTEMPTS {
            let name = if attempt == 0 {
                base.to_string()
            } else {
                format!("{}{}", base, attempt + 1)
            };

            write_message(stream, &ClientPacket::Join { name: name.clone() }).await?;
            match read_message::<_, ServerPacket>(stream).await? {
                ServerPacket::NameChecked { accepted: true } => return Ok(name),
                ServerPacket::NameChecked { accepted: false } => {
                    debug!("Name '{}' refused", name)
                }
                ServerPacket::Rejected { reason } => return Err(ClientError::Rejected(reason)),
                _ => return Err(ClientError::UnexpectedPacket { expected: "NameChecked" }),
            }
        }

        Err(ClientError::NameRefused)
    }

    async fn choose_team(
        stream: &mut TcpStream,
        preferred: Option<Team>,
        roster: &Roster,
    ) -> Result<Team, ClientError> {
        let first = preferred.unwrap_or_else(|| smaller_team(roster));

        for team in [first, first.opponent()] {
            write_message(stream, &ClientPacket::PickTeam { team }).await?;
            match read_message::<_, ServerPacket>(stream).await? {
                ServerPacket::TeamChecked { accepted: true } => return Ok(team),
                ServerPacket::TeamChecked { accepted: false } => {
                    debug!("Team {} refused", team)
                }
                ServerPacket::Rejected { reason } => return Err(ClientError::Rejected(reason)),
                _ => return Err(ClientError::UnexpectedPacket { expected: "TeamChecked" }),
            }
        }

        Err(ClientError::TeamRefused)
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Sends one input and waits for the snapshot that answers it.
    ///
    /// The input's viewport is replaced with the client's own.
    pub async fn exchange(&mut self, input: Input) -> Result<Snapshot, ClientError> {
        let input = Input {
            viewport: self.viewport,
            ..input
        };
        write_message(&mut self.stream, &ClientPacket::Input(input)).await?;

        match read_message::<_, ServerPacket>(&mut self.stream).await? {
            ServerPacket::Snapshot(snapshot) => Ok(snapshot),
            ServerPacket::Rejected { reason } => Err(ClientError::Rejected(reason)),
            _ => Err(ClientError::UnexpectedPacket { expected: "Snapshot" }),
        }
    }

    /// Plays with the autopilot, for `ticks` exchanges or until the connection ends.
    pub async fn run(&mut self, ticks: Option<u64>) -> Result<(), ClientError> {
        let mut autopilot = Autopilot::new(self.player_id, self.team, self.viewport);
        let mut snapshot = self.exchange(Input::default()).await?;
        let mut phase = snapshot.phase;
        let mut score = snapshot.score;
        let mut exchanged = 1u64;

        info!("Match is in {} ({})", phase, score);

        while ticks.map_or(true, |limit| exchanged < limit) {
            let input = autopilot.decide(&snapshot);
            snapshot = self.exchange(input).await?;
            exchanged += 1;

            report_changes(&mut phase, &mut score, &snapshot);
        }

        Ok(())
    }
}

fn smaller_team(roster: &Roster) -> Team {
    if roster.team_size(Team::Blue) < roster.team_size(Team::Red) {
        Team::Blue
    } else {
        Team::Red
    }
}

fn report_changes(phase: &mut MatchPhase, score: &mut Score, snapshot: &Snapshot) {
    if snapshot.score != *score && snapshot.phase.is_live() {
        info!("Score: {}", snapshot.score);
    }
    if snapshot.phase != *phase {
        if let Some(result) = snapshot.result.filter(|_| snapshot.phase == MatchPhase::Break) {
            info!("Final score: {}", result);
        }
        info!("Match phase {} -> {} ({:.0}s)", phase, snapshot.phase, snapshot.time_remaining);
    }
    *phase = snapshot.phase;
    *score = snapshot.score;
}
