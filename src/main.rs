//! socd-cleaner - SOCD resolution for Linux keyboards
//!
//! Reads a physical keyboard and replays a conflict-free version of its direction
//! keys through a uinput virtual keyboard.

use anyhow::{Context, Result};
use socd_cleaner::device::{self, EvdevSource, UinputSink};
use socd_cleaner::emit::{LogSink, OutputSink};
use socd_cleaner::{Application, Config, InputSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; RUST_LOG=debug enables the state monitor output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Config::command().get_matches();
    let config = Config::from_matches(&matches)?;

    if config.list_devices {
        for path in device::list_keyboards() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let device_path = match &config.device {
        Some(path) => path.clone(),
        None => device::find_keyboard()?,
    };

    let source = EvdevSource::open(&device_path, &config.keymap)
        .with_context(|| format!("opening keyboard {}", device_path.display()))?;
    log::info!(
        "Reading inputs from: {} ({})",
        source.name(),
        source.path().display()
    );

    let sink: Box<dyn OutputSink> = if config.dry_run {
        log::info!("dry run: emitted batches are logged, no virtual keyboard is created");
        Box::new(LogSink::new())
    } else {
        let sink = UinputSink::create(&config.device_name, &config.keymap)
            .context("creating virtual keyboard")?;
        log::info!("Writing to virtual keyboard: {}", config.device_name);
        Box::new(sink)
    };

    let app = Application::from_config(&config, source, sink);
    let summary = app.run_until(shutdown_signal()).await?;

    log::info!(
        "stopping: {} batches emitted, {} transitions applied",
        summary.batches_emitted,
        summary.transitions_applied
    );
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for SIGINT: {err}");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                log::error!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_version_constant() {
        assert!(!socd_cleaner::VERSION.is_empty());
    }
}
