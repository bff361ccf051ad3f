// Structured Logging for the Trade Window
// tracing + tracing-subscriber with an env-driven filter

use tracing::Level;
use tracing_subscriber::EnvFilter;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn setup_logging(
    log_level: Option<&str>,
    json_format: Option<bool>,
    console_output: Option<bool>,
) {
    let log_level_str = log_level.unwrap_or("INFO");
    let json_format = json_format.unwrap_or(true);
    let console_output = console_output.unwrap_or(true);

    let level = parse_level(log_level_str);

    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive(level.into());

        // try_init: a host application may already own the global subscriber
        let installed = if console_output {
            if json_format {
                tracing_subscriber::fmt()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_env_filter(filter)
                    .try_init()
            } else {
                tracing_subscriber::fmt()
                    .with_target(true)
                    .with_env_filter(filter)
                    .try_init()
            }
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .try_init()
        };

        if installed.is_ok() {
            tracing::info!(log_level = %log_level_str, json = json_format, "Logging initialized");
        }
    });
}

fn parse_level(level: &str) -> Level {
    match level.to_uppercase().as_str() {
        "TRACE" => Level::TRACE,
        "DEBUG" => Level::DEBUG,
        "INFO" => Level::INFO,
        "WARN" | "WARNING" => Level::WARN,
        "ERROR" => Level::ERROR,
        _ => Level::INFO,
    }
}
