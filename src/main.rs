use std::net::TcpListener;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use peer_connect_four::config::{AppConfig, NetworkConfig};
use peer_connect_four::error::{ChannelError, SyncError};
use peer_connect_four::game::{Game, Side};
use peer_connect_four::logging::init_logging;
use peer_connect_four::runner::{spawn_match, MatchHandle};
use peer_connect_four::sync::{CancelToken, Synchronizer, TcpChannel};
use peer_connect_four::ui::App;

/// Play Connect Four in the terminal, on one keyboard or against a peer.
#[derive(Parser)]
#[command(name = "connect-four", about = "Play Connect Four locally or over the network")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "connect-four.toml")]
    config: PathBuf,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Two players sharing this terminal
    Hotseat,
    /// Wait for a peer to join, then play as PlayerOne
    Host {
        /// Address to listen on (defaults to network.bind_address)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Join a hosting peer and play as PlayerTwo
    Join {
        /// Host address, e.g. 192.168.1.20:4004
        address: String,
    },
    /// Print the default configuration as TOML
    PrintConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Mode::PrintConfig = cli.mode {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    init_logging(&config.logging)
        .with_context(|| format!("opening log file {}", config.logging.file.display()))?;

    let names = (config.players.player_one.clone(), config.players.player_two.clone());
    let game = match cli.mode {
        Mode::Hotseat => Game::new(names.0, names.1),
        Mode::Host { bind } => {
            let addr = bind.unwrap_or_else(|| config.network.bind_address.clone());
            let listener =
                TcpListener::bind(&addr).with_context(|| format!("binding {addr}"))?;
            println!(
                "Waiting for a player to join on {}...",
                listener.local_addr().context("reading listen address")?
            );
            let options = config.network.receive_options(CancelToken::new());
            let channel = TcpChannel::accept(&listener, config.network.max_payload_bytes, &options)
                .context("waiting for a peer")?;
            println!("{} joined, starting the match", channel.peer_addr());
            Game::networked(names.0, names.1, Side::PlayerOne, synchronizer(channel, &config.network))
        }
        Mode::Join { address } => {
            let channel = TcpChannel::connect(address.as_str(), config.network.max_payload_bytes)
                .with_context(|| format!("connecting to {address}"))?;
            info!(host = %channel.peer_addr(), "joined match");
            Game::networked(names.0, names.1, Side::PlayerTwo, synchronizer(channel, &config.network))
        }
        Mode::PrintConfig => return Ok(()),
    };

    info!(networked = game.is_networked(), "starting match");
    let handle = spawn_match(game).context("starting match worker")?;
    let handle = run_ui(handle)?;

    match handle.shutdown() {
        Ok(()) | Err(SyncError::Channel(ChannelError::Cancelled)) => Ok(()),
        Err(err) => {
            warn!(error = %err, "match ended with an error");
            eprintln!("Match ended with an error: {err}");
            Ok(())
        }
    }
}

fn synchronizer(channel: TcpChannel, network: &NetworkConfig) -> Synchronizer {
    Synchronizer::new(channel)
        .with_policy(network.snapshot_policy())
        .with_receive_options(network.receive_options(CancelToken::new()))
}

fn run_ui(handle: MatchHandle) -> Result<MatchHandle> {
    // Setup terminal
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal")?;

    let mut app = App::new(handle);
    let res = app.run(&mut terminal);

    // Restore terminal — always runs, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res.context("running game view")?;
    Ok(app.into_handle())
}
