mod messages;
mod repl;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pace_audio::{AudioSink, NullAudioSink};
use pace_core::{
    config::validate_page_size, init_logging, AppDirs, Config, CredentialStore, SinkBackend,
};
use pace_player::{
    Collaborators, ControllerOptions, EventStreams, PlaybackController, PlayerHandle, PlayerService,
    Status,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use youtube_provider::{HttpStreamSource, StreamMode, YoutubeListing};

use crate::messages::{render_notice, render_outcome};
use crate::repl::{parse_line, ReplCommand, HELP};

/// Keyring entry and provider label for the listing API key.
const PROVIDER: &str = "youtube";

#[derive(Debug, Parser)]
#[command(name = "pace", version, about = "Queue and play songs and playlists by url")]
struct Cli {
    /// Playlist items fetched per listing request (takes precedence over config)
    #[arg(long, global = true)]
    page_size: Option<u32>,
    /// Audio backend override (takes precedence over config)
    #[arg(long, global = true, value_enum)]
    sink: Option<SinkArg>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the player and read commands from stdin (default)
    Run,
    /// Listing API key management
    #[command(subcommand)]
    Auth(AuthCommand),
}

#[derive(Debug, Subcommand)]
enum AuthCommand {
    /// Store the API key in the OS keyring
    SetKey { key: String },
    /// Remove the stored API key
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkArg {
    Null,
    Cpal,
}

impl From<SinkArg> for SinkBackend {
    fn from(arg: SinkArg) -> Self {
        match arg {
            SinkArg::Null => SinkBackend::Null,
            SinkArg::Cpal => SinkBackend::Cpal,
        }
    }
}

/// Apply command line overrides on top of the loaded config.
fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(page_size) = cli.page_size {
        validate_page_size(page_size)?;
        config.playback.page_size = page_size;
    }
    if let Some(sink) = cli.sink {
        config.sink.backend = sink.into();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = AppDirs::discover()?;
    let mut config = Config::load_or_default(&dirs)?;
    apply_overrides(&mut config, &cli)?;
    let _logging = init_logging(&config.logging, &dirs)?;

    match cli.command {
        Some(Command::Auth(AuthCommand::SetKey { key })) => {
            CredentialStore::new()
                .store_api_key(PROVIDER, key.trim())
                .context("failed to store the API key in the keyring")?;
            println!("API key stored.");
            Ok(())
        }
        Some(Command::Auth(AuthCommand::Clear)) => {
            CredentialStore::new()
                .delete_api_key(PROVIDER)
                .context("failed to remove the API key from the keyring")?;
            println!("API key removed.");
            Ok(())
        }
        Some(Command::Run) | None => run(&config).await,
    }
}

async fn run(config: &Config) -> Result<()> {
    let api_key = CredentialStore::new()
        .resolve_api_key(PROVIDER, &config.youtube.api_key_env)
        .with_context(|| {
            format!(
                "no API key found; set {} or run `pace auth set-key <key>`",
                config.youtube.api_key_env
            )
        })?;

    let listing = YoutubeListing::new(&config.youtube, &api_key)?;
    let (sink, mode) = build_sink(config)?;
    let source = HttpStreamSource::new(&config.youtube, mode)?;

    let (controller, EventStreams { sessions, mut notices }) = PlaybackController::new(
        Collaborators {
            listing: Arc::new(listing),
            source: Arc::new(source),
            sink,
        },
        ControllerOptions {
            page_size: config.playback.page_size,
        },
    );
    let (player, join) = PlayerService::spawn(controller, sessions);

    tracing::info!(
        backend = ?config.sink.backend,
        page_size = config.playback.page_size,
        "player ready"
    );
    println!("pace ready, type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match parse_line(&line) {
                    Ok(Some(ReplCommand::Quit)) => break,
                    Ok(Some(command)) => execute(&player, command).await,
                    Ok(None) => {}
                    Err(err) => println!("{err}"),
                }
            }
            Some(notice) = notices.recv() => {
                println!("{}", render_notice(&notice));
            }
        }
    }

    player.shutdown();
    join.await.context("player service panicked")?;
    Ok(())
}

async fn execute(player: &PlayerHandle, command: ReplCommand) {
    let (outcome, input) = match command {
        ReplCommand::Play(url) => {
            let outcome = player.enqueue(url.as_str()).await;
            (outcome, Some(url))
        }
        ReplCommand::Next => (player.next().await, None),
        ReplCommand::Pause => (player.pause().await, None),
        ReplCommand::Resume => (player.resume().await, None),
        ReplCommand::Clear => (player.clear().await, None),
        ReplCommand::Status => {
            match player.status().await {
                Some(status) => println!("{}", describe_status(&status)),
                None => println!("The player has stopped"),
            }
            return;
        }
        ReplCommand::Help => {
            println!("{HELP}");
            return;
        }
        ReplCommand::Quit => return,
    };
    if outcome.failed {
        tracing::debug!(category = ?outcome.category, "command failed");
    }
    println!("{}", render_outcome(&outcome, input.as_deref()));
}

fn describe_status(status: &Status) -> String {
    let state = match (status.playing, status.paused) {
        (false, _) => "stopped",
        (true, true) => "paused",
        (true, false) => "playing",
    };
    let mut line = format!("{state} | {} queued", status.queue_len);
    if let Some(url) = &status.current_url {
        let title = status.current_title.as_deref().unwrap_or("unknown title");
        line.push_str(&format!(" | {title} ({url})"));
    }
    line
}

fn build_sink(config: &Config) -> Result<(Arc<dyn AudioSink>, StreamMode)> {
    match config.sink.backend {
        SinkBackend::Null => {
            let track = Duration::from_secs(config.sink.simulated_track_secs);
            Ok((Arc::new(NullAudioSink::new(track)), StreamMode::Reference))
        }
        SinkBackend::Cpal => cpal_sink(),
    }
}

#[cfg(feature = "cpal-backend")]
fn cpal_sink() -> Result<(Arc<dyn AudioSink>, StreamMode)> {
    Ok((Arc::new(pace_audio::CpalAudioSink), StreamMode::Download))
}

#[cfg(not(feature = "cpal-backend"))]
fn cpal_sink() -> Result<(Arc<dyn AudioSink>, StreamMode)> {
    anyhow::bail!("the cpal sink requires building pace with the `cpal-backend` feature")
}
