use clap::Parser;
use kickoff_client::Client;
use kickoff_shared::{Team, Viewport};
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless kickoff client driven by an autopilot", long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:12345")]
    server: String,

    /// Player name; a suffix is added if it is taken
    #[arg(short = 'n', long, default_value = "bot")]
    name: String,

    /// Preferred team (red or blue); defaults to the smaller team
    #[arg(short = 't', long)]
    team: Option<Team>,

    /// Reported window width
    #[arg(short = 'w', long, default_value_t = 1280)]
    width: u32,

    /// Reported window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Stop after this many input/snapshot exchanges
    #[arg(long)]
    ticks: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {}", args.server);

    let viewport = Viewport::new(args.width, args.height);
    let mut client = Client::connect(&args.server, &args.name, args.team, viewport).await?;

    tokio::select! {
        result = client.run(args.ticks) => result?,
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, leaving the match"),
    }

    Ok(())
}
