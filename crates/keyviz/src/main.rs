//! keyviz
//!
//! Watches every readable keyboard-class device and renders the most
//! recent keystrokes as a single right-aligned terminal line.

mod device;
mod listener;
mod monitor;
mod render;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use keyviz_config::Config;
use keyviz_engine::format::{Formatter, Palette};
use keyviz_engine::history::History;
use keyviz_engine::normalize::{EventFilter, Normalizer};
use keyviz_engine::symbols::SymbolTable;

use render::Redraw;

#[derive(Parser, Debug)]
#[command(name = "keyviz")]
#[command(about = "Visualize keystrokes from all attached keyboards")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/keyviz/config.kdl")]
    config: String,

    /// Seconds of inactivity before the display is cleared
    #[arg(long)]
    timeout: Option<u64>,

    /// Set a symbol in the format <key>=<glyph>, e.g. KEY_KP8=8
    #[arg(short = 'S', long = "symbol", value_name = "KEY=GLYPH")]
    symbols: Vec<String>,

    /// Ignore a specific event, e.g. BTN_TOUCH
    #[arg(long = "ignore-event", value_name = "EVENT")]
    ignore_events: Vec<String>,

    /// Listen to an event even if it is ignored by default
    #[arg(long = "listen-event", value_name = "EVENT")]
    listen_events: Vec<String>,

    /// Listen to an event class, e.g. EV_SW
    #[arg(long = "class", value_name = "CLASS")]
    classes: Vec<String>,

    /// Stop listening to an event class
    #[arg(long = "no-class", value_name = "CLASS")]
    no_classes: Vec<String>,

    /// Override a display color in the format <role>=#rrggbb
    #[arg(long = "color", value_name = "ROLE=#RRGGBB")]
    colors: Vec<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available input devices
    Devices {
        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // The key line owns stdout, diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(Command::Devices { json }) = &args.command {
        return device::list_devices(*json);
    }

    let config = load_config(&args)?;

    // Resolve everything before a single listener starts; unknown names
    // in overrides are startup errors, never mid-run surprises
    let filter = Arc::new(
        EventFilter::from_config(&config.input).context("Invalid event filter configuration")?,
    );
    let table = Arc::new(
        SymbolTable::from_config(&config.display, &config.input)
            .context("Invalid symbol configuration")?,
    );
    let formatter = Formatter::new(
        Arc::clone(&table),
        Palette::with_overrides(&config.display.colors),
    );

    if !nix::unistd::geteuid().is_root() {
        tracing::warn!(
            "Running without root; most devices under /dev/input will likely be unreadable"
        );
    }

    let devices = device::open_matching(&filter)?;
    anyhow::ensure!(
        !devices.is_empty(),
        "No readable input device supports the configured event classes (try running as root)"
    );
    tracing::info!("Listening on {} device(s)", devices.len());

    let history = Arc::new(Mutex::new(History::new()));
    let (redraw_tx, redraw_rx) = mpsc::unbounded_channel();

    let mut listeners = JoinSet::new();
    for (dev, info) in devices {
        let normalizer = Normalizer::new(
            Arc::clone(&table),
            Arc::clone(&filter),
            config.display.keep_hidden,
        );
        listeners.spawn(listener::run(
            dev,
            info,
            normalizer,
            Arc::clone(&history),
            redraw_tx.clone(),
        ));
    }

    tokio::spawn(render::run(redraw_rx, Arc::clone(&history), formatter));
    tokio::spawn(monitor::run(
        Arc::clone(&history),
        redraw_tx.clone(),
        config.display.timeout,
    ));
    tokio::spawn(render::watch_resize(redraw_tx.clone()));

    let _ = redraw_tx.send(Redraw::Startup);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
            joined = listeners.join_next() => match joined {
                Some(Err(e)) => tracing::error!("Listener task failed: {}", e),
                Some(Ok(())) => {}
                None => {
                    // Every device is gone, nothing is left to drive redraws
                    tracing::error!("All device listeners have exited, shutting down");
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Load the config file (defaults if absent) and fold the CLI overrides
/// into it.
fn load_config(args: &Args) -> Result<Config> {
    let path: PathBuf = shellexpand::tilde(&args.config).into_owned().into();

    let mut config = if path.exists() {
        tracing::info!("Loading configuration from {}", path.display());
        keyviz_config::parse_config(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        Config::default()
    };

    if let Some(secs) = args.timeout {
        config.display.timeout = Duration::from_secs(secs);
    }

    for spec in &args.symbols {
        let (key, glyph) = spec
            .split_once('=')
            .with_context(|| format!("--symbol `{}` is not in KEY=GLYPH format", spec))?;
        config
            .input
            .symbols
            .push((key.to_string(), glyph.to_string()));
    }

    for spec in &args.colors {
        let (role, hex) = spec
            .split_once('=')
            .with_context(|| format!("--color `{}` is not in ROLE=#RRGGBB format", spec))?;
        let role = role
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("--color `{}`", spec))?;
        let rgb = hex
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("--color `{}`", spec))?;
        config.display.colors.push((role, rgb));
    }

    config.input.ignore.extend(args.ignore_events.iter().cloned());
    config.input.listen.extend(args.listen_events.iter().cloned());
    config.input.classes_on.extend(args.classes.iter().cloned());
    config.input.classes_off.extend(args.no_classes.iter().cloned());

    Ok(config)
}
