use crate::config::NodeConfig;
use chrono::Utc;
use slog::Drain;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

pub fn create_root_logger(config: &NodeConfig) -> io::Result<slog::Logger> {
    match &config.log_directory {
        Some(directory) => create_root_logger_for_file(directory, config.id, config.debug),
        None => Ok(create_root_logger_for_stdout(config.id, config.debug)),
    }
}

pub fn create_root_logger_for_file(directory: &Path, node_id: u64, debug: bool) -> io::Result<slog::Logger> {
    fs::create_dir_all(directory)?;
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let log_path = directory.join(format!("node_{}_{}.log", node_id, now));
    let file = OpenOptions::new().create(true).write(true).truncate(true).open(log_path)?;

    let decorator = slog_term::PlainDecorator::new(file);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(level(debug)).ignore_res();

    Ok(slog::Logger::root(drain, slog::o!("NodeId" => node_id)))
}

pub fn create_root_logger_for_stdout(node_id: u64, debug: bool) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).use_file_location().build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(level(debug)).ignore_res();

    slog::Logger::root(drain, slog::o!("NodeId" => node_id))
}

fn level(debug: bool) -> slog::Level {
    if debug {
        slog::Level::Debug
    } else {
        slog::Level::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_logger_writes_to_directory() {
        let directory = std::env::temp_dir().join(format!("raft-kv-logging-{}", std::process::id()));

        let logger = create_root_logger_for_file(&directory, 7, true).unwrap();
        slog::debug!(logger, "hello");
        drop(logger);

        let files: Vec<_> = fs::read_dir(&directory).unwrap().map(|f| f.unwrap().path()).collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].to_string_lossy().contains("node_7_"));
        assert!(fs::read_to_string(&files[0]).unwrap().contains("hello"));
        fs::remove_dir_all(&directory).unwrap();
    }

    #[tokio::test]
    async fn flushed_once_task_holding_clone_is_aborted() {
        // -- setup --
        let directory = std::env::temp_dir().join(format!("raft-kv-logging-abort-{}", std::process::id()));
        let logger = create_root_logger_for_file(&directory, 3, false).unwrap();
        let task = tokio::spawn({
            let logger = logger.clone();
            async move {
                std::future::pending::<()>().await;
                slog::info!(logger, "unreachable");
            }
        });

        // -- execute --
        slog::info!(logger, "last words");
        task.abort();
        let _ = task.await;
        drop(logger);

        // -- verify --
        let files: Vec<_> = fs::read_dir(&directory).unwrap().map(|f| f.unwrap().path()).collect();
        assert!(fs::read_to_string(&files[0]).unwrap().contains("last words"));
        fs::remove_dir_all(&directory).unwrap();
    }
}
