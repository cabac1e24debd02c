use std::path::Path;

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

pub const LOG_FILE: &str = "packetdecode.log";

/// Install the global subscriber.
///
/// Human-readable logs go to stderr, since stdout carries decoded messages.
/// With a `log_dir`, the same events are also written to a daily rolling
/// `packetdecode.log` in that directory.
pub fn init_tracing(log_level: &str, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_new(log_level)
        .with_context(|| format!("invalid log level `{}`", log_level))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE);
            Some(fmt::layer().with_writer(appender).with_ansi(false))
        }
        None => None,
    };

    Registry::default()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_level() {
        let err = init_tracing("packetdecode=loud", None).unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }
}
