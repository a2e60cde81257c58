use anyhow::{Context, Result};
use clap::Parser;
use quill::Cli;
use std::path::Path;
use std::sync::Once;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "quill.log";

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Global subscriber already installed; dropping the guard stops the writer.
        Err(_) => None,
    }
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

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    let cli = Cli::parse();
    info!(target: "runtime", path = ?cli.path, script = ?cli.script, "startup");
    let report = match quill::run(&cli) {
        Ok(report) => report,
        Err(err) => {
            error!(target: "runtime", error = %format!("{err:#}"), "run_failed");
            return Err(err);
        }
    };
    let json = serde_json::to_string_pretty(&report).context("serializing frame")?;
    println!("{json}");
    Ok(())
}
