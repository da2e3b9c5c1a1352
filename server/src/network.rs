//! Server network layer: TCP listener, simulation loop and per-connection handlers

use crate::config::ServerConfig;
use crate::coordinator::{next_snapshot, Coordinator};
use crate::error::{ConnectionError, ServerError};
use crate::handshake::negotiate;
use crate::viewport::scale_snapshot;
use kickoff_shared::{
    read_message, write_message, ClientPacket, PlayerId, ServerPacket, Viewport, WireError,
};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{interval, MissedTickBehavior};

/// Main server coordinating the listener and the simulation loop
pub struct Server {
    listener: TcpListener,
    coordinator: Arc<Coordinator>,
    tick_duration: Duration,
}

impl Server {
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let addr = config.address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            coordinator: Arc::new(Coordinator::new(config)),
            tick_duration: config.tick_duration(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn coordinator(&self) -> Arc<Coordinator> {
        Arc::clone(&self.coordinator)
    }

    /// Runs the simulation and accepts connections until either stops.
    pub async fn run(self) -> Result<(), ServerError> {
        let simulation = tokio::spawn(run_simulation(
            Arc::clone(&self.coordinator),
            self.tick_duration,
        ));

        info!("Server started successfully");

        tokio::select! {
            result = accept_loop(self.listener, Arc::clone(&self.coordinator)) => result,
            result = simulation => {
                if let Err(e) = result {
                    error!("Simulation task failed: {}", e);
                }
                Err(ServerError::SimulationStopped)
            }
        }
    }
}

async fn accept_loop(listener: TcpListener, coordinator: Arc<Coordinator>) -> Result<(), ServerError> {
    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                tokio::time::sleep(Duration::from_millis(10)).await;
                continue;
            }
        };

        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            handle_connection(stream, addr, coordinator).await;
        });
    }
}

/// Advances the world once per tick, forever.
pub async fn run_simulation(coordinator: Arc<Coordinator>, tick_duration: Duration) {
    let mut tick_interval = interval(tick_duration);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tick_interval.tick().await;

        let started = Instant::now();
        let snapshot = coordinator.tick();
        let elapsed = started.elapsed();

        if elapsed > tick_duration {
            warn!(
                "Tick {} took {:.2}ms, longer than the {:.2}ms budget",
                snapshot.tick,
                elapsed.as_secs_f64() * 1000.0,
                tick_duration.as_secs_f64() * 1000.0
            );
        }
    }
}

async fn handle_connection(mut stream: TcpStream, addr: SocketAddr, coordinator: Arc<Coordinator>) {
    debug!("Connection from {}", addr);
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Could not disable Nagle for {}: {}", addr, e);
    }

    match serve_connection(&mut stream, &coordinator).await {
        Ok(()) => debug!("Connection from {} closed", addr),
        Err(ConnectionError::Handshake(e)) => warn!("Handshake with {} failed: {}", addr, e),
        Err(e) => debug!("Connection from {} ended: {}", addr, e),
    }
}

/// Handles one connection from handshake to disconnect.
///
/// The player is removed from the pitch however the connection ends.
pub async fn serve_connection<S>(stream: &mut S, coordinator: &Coordinator) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let admission = negotiate(stream, coordinator).await?;
    let result = serve_player(stream, coordinator, admission.player_id).await;

    coordinator.remove_player(admission.player_id);
    info!("Player {} ({}) left", admission.name, admission.player_id);
    result
}

/// Input/snapshot cycle: every input read is answered by exactly one snapshot.
async fn serve_player<S>(
    stream: &mut S,
    coordinator: &Coordinator,
    player_id: PlayerId,
) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut snapshots = coordinator.subscribe();
    let mut viewport = Viewport::canonical();

    loop {
        let after = match read_message::<_, ClientPacket>(stream).await {
            Ok(ClientPacket::Input(input)) => {
                viewport = input.viewport;
                coordinator.deposit_input(player_id, input)
            }
            Ok(other) => {
                warn!("Ignoring {:?} from {} during play", other, player_id);
                coordinator.current_tick()
            }
            // The frame was consumed whole, so the stream is still in sync
            Err(WireError::Malformed(e)) => {
                warn!("Malformed input from {}: {}", player_id, e);
                coordinator.current_tick()
            }
            Err(WireError::Closed) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let snapshot = next_snapshot(&mut snapshots, after).await?;
        let scaled = scale_snapshot(&snapshot, viewport);
        write_message(stream, &ServerPacket::Snapshot(scaled)).await?;
    }
}
