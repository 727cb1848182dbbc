//! Logger setup for the binary.
//!
//! Stdout carries protocol replies, so logs go to stderr unless a log
//! directory is given.

use std::path::Path;

use flexi_logger::{
    opt_format, Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming,
};

/// Start logging at `level` (overridden by `RUST_LOG`). Keep the returned
/// handle alive for as long as logs should be written.
pub fn setup_logging(
    level: &str,
    log_dir: Option<&Path>,
) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = Logger::try_with_env_or_str(level)?.format(opt_format);
    let logger = match log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename("quoridor"))
            .rotate(
                Criterion::Size(10 * 1024 * 1024),
                Naming::Numbers,
                Cleanup::KeepLogFiles(1),
            ),
        None => logger.log_to_stderr(),
    };
    logger.start()
}
