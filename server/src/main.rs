use clap::Parser;
use kickoff_server::config::ServerConfig;
use kickoff_server::console::spawn_console;
use kickoff_server::network::Server;
use log::{error, info};

/// Main-method of the server.
/// Parses command-line arguments, binds the listener and runs until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();
    info!(
        "Starting server on {} at {}Hz (match {}s, break {}s, overtime {}s, {} players max)",
        config.address(),
        config.tick_rate,
        config.match_time,
        config.break_time,
        config.overtime_time,
        config.max_players
    );

    let server = Server::bind(&config).await?;

    if !config.no_console {
        spawn_console(server.coordinator())?;
        info!("Operator console ready, type 'status' for the match state");
    }

    tokio::select! {
        result = server.run() => {
            if let Err(e) = &result {
                error!("Server stopped: {}", e);
            }
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
