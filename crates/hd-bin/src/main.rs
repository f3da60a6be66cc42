//! homedigits entrypoint: a scratch editor whose number prefix is typed on
//! the home row.
mod host;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use core_input::{InputEvent, next_event};
use host::{Host, HostAction};
use std::path::{Path, PathBuf};
use std::sync::Once;
use terminal::CrosstermBackend;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE_NAME: &str = "homedigits.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "homedigits", version, about = "Home-row number prefix editor")]
struct Args {
    /// Configuration file path (overrides discovery of `homedigits.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Layout preset name, e.g. `dvorak` or `colemak-dh`.
    #[arg(long = "layout")]
    layout: Option<String>,
    /// Digit order preset: `traditional`, `zero-first` or `programmer-dvorak`.
    #[arg(long = "digit-order")]
    digit_order: Option<String>,
    /// Print the resolved key to digit table and exit.
    #[arg(long = "print-layout")]
    print_layout: bool,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE_NAME);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
        .ok()
        // Subscriber already installed: drop the guard so the writer shuts down.
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn load_config(args: &Args) -> Result<core_config::Config> {
    let mut config = core_config::load_from(args.config.clone())?;
    if let Some(name) = &args.layout {
        config.override_layout(name);
    }
    if let Some(name) = &args.digit_order {
        config.override_digit_order(name);
    }
    Ok(config)
}

fn print_layout(config: &core_config::Config) -> Result<()> {
    let settings = config.keymap_settings().context("resolving layout")?;
    let resolved = core_layout::resolve(
        &settings.layout,
        &settings.digit_order,
        settings.strict_layout,
    )?;
    for warning in &resolved.warnings {
        eprintln!("warning: {warning}");
    }
    for (key, digit) in resolved.mapping.iter() {
        println!("{key}\t{digit}");
    }
    Ok(())
}

fn run(host: &mut Host) -> Result<()> {
    let mut backend = CrosstermBackend::new();
    let _guard = backend.enter_guard("homedigits")?;
    let (mut cols, mut rows) = crossterm::terminal::size()?;
    loop {
        terminal::draw(host.document(), &host.status_line(), cols, rows)?;
        match next_event()? {
            InputEvent::Key(key) => {
                if host.handle_key(&key) == HostAction::Quit {
                    break;
                }
            }
            InputEvent::Resize(c, r) => {
                cols = c;
                rows = r;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let config = load_config(&args)?;
    if args.print_layout {
        return print_layout(&config);
    }

    let settings = config.keymap_settings().context("resolving keymap")?;
    let prefix_keys = config.prefix_keys().context("parsing prefix keys")?;
    let mut host = Host::new(settings, prefix_keys).context("installing bindings")?;

    run(&mut host)?;
    info!(target: "runtime", bytes = host.document().len(), "shutdown");
    if !host.document().is_empty() {
        println!("{}", host.document());
    }
    Ok(())
}
