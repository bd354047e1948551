use std::io::Write;

use env_logger::DEFAULT_FILTER_ENV;
use log::LevelFilter;
use tokio_util::sync::CancellationToken;

/// Maps the `--verbose` level to a log filter.
/// 0: errors only, 1: warnings, 2: executed commands, 3 and more: debugging output.
pub fn verbosity_to_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Sets the behavior of the logger, based on the verbosity level and passed environment
/// variables such as `RUST_LOG`.
pub fn setup_logging(verbosity: u8) {
    let level = verbosity_to_level(verbosity);
    let mut builder = env_logger::Builder::default();
    builder.filter_level(level);

    let has_debug = std::env::var(DEFAULT_FILTER_ENV)
        .map(|v| v.contains("debug"))
        .unwrap_or(false);

    if level >= LevelFilter::Debug || has_debug {
        builder.format_timestamp_millis();
    } else {
        // Shortened format
        // <time> <level> <message>
        builder.format(|buf, record| {
            let level_style = buf.default_level_style(record.level()).bold();
            writeln!(
                buf,
                "{} {level_style}{}{level_style:#} {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        });
    }

    // Overwrite the defaults from env
    builder.parse_default_env();
    builder.init();
}

/// Returns a token that is cancelled once SIGINT or SIGTERM is received.
/// Has to be called from within a Tokio runtime.
pub fn setup_shutdown() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();

    tokio::spawn(async move {
        let terminate = async {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{SignalKind, signal};
                match signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(error) => {
                        log::warn!("Cannot install SIGTERM handler: {error}");
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            std::future::pending::<()>().await;
        };

        let interrupt = async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                log::warn!("Cannot listen for SIGINT: {error}");
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = interrupt => {
                log::info!("Received SIGINT, attempting to stop");
            }
            _ = terminate => {
                log::info!("Received SIGTERM, attempting to stop");
            }
        }
        cancel.cancel();
    });

    token
}

#[cfg(test)]
mod tests {
    use super::verbosity_to_level;
    use log::LevelFilter;

    #[test]
    fn verbosity_levels() {
        assert_eq!(verbosity_to_level(0), LevelFilter::Error);
        assert_eq!(verbosity_to_level(1), LevelFilter::Warn);
        assert_eq!(verbosity_to_level(2), LevelFilter::Info);
        assert_eq!(verbosity_to_level(3), LevelFilter::Debug);
        assert_eq!(verbosity_to_level(9), LevelFilter::Debug);
    }
}
