use clap::Parser;
use client::input::InputManager;
use client::network::Client;
use log::info;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server WebSocket URL to connect to
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:3000")]
    server: String,

    /// Display name (the server picks one when omitted)
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Requested movement speed in world units per second
    #[arg(long)]
    speed: Option<f32>,

    /// Seconds between random heading changes
    #[arg(long, default_value = "2")]
    wander_secs: u64,

    /// Chat line to send after joining
    #[arg(long)]
    greeting: Option<String>,

    /// Stop after this many seconds (0 runs until Ctrl+C)
    #[arg(short = 'd', long, default_value = "0")]
    duration_secs: u64,
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

    let input_manager = InputManager::new(args.speed, Duration::from_secs(args.wander_secs));
    let mut client =
        Client::new(&args.server, args.name, input_manager).with_greeting(args.greeting);

    let duration = (args.duration_secs > 0).then(|| Duration::from_secs(args.duration_secs));

    tokio::select! {
        result = client.run(duration) => result?,
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, leaving"),
    }

    Ok(())
}
