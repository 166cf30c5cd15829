use raft_kv::{create_root_logger, run_node, NodeConfig};
use std::process;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let config = match NodeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(2);
        }
    };

    let logger = match create_root_logger(&config) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            process::exit(2);
        }
    };

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        let logger = logger.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    slog::info!(logger, "Received Ctrl-C, shutting down");
                    cancel.cancel();
                }
                Err(e) => slog::warn!(logger, "Unable to listen for Ctrl-C: {:?}", e),
            }
        }
    });

    let exit_code = match run_node(config, logger.clone(), cancel).await {
        Ok(()) => 0,
        Err(e) => {
            slog::crit!(logger, "Node failed: {}", e);
            1
        }
    };

    // The async drain only flushes once its last logger is dropped, and the Ctrl-C task holds a
    // clone.
    ctrl_c.abort();
    let _ = ctrl_c.await;
    drop(logger);
    process::exit(exit_code);
}
