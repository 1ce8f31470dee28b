use anyhow::{Context, Result};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use tracing_appender::{
    non_blocking,
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|val| val == "true" || val == "1")
        .unwrap_or(false)
}

/// Installs the global subscriber: console output, a JSON daily-rolling file
/// when `ENABLE_FILE_LOG` is set, and the OTLP log bridge when a provider is
/// given.
///
/// The returned guard flushes the file writer on drop; keep it alive in `main`.
pub fn init_logger(
    sdk_logger_provider: Option<&SdkLoggerProvider>,
    component: &str,
) -> Result<Option<WorkerGuard>> {
    let is_dev = env_flag("DEV_MODE");

    let (file_layer, guard) = if env_flag("ENABLE_FILE_LOG") {
        let log_dir = if is_dev { "./logs" } else { "/var/log/app" };
        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, log_dir, format!("{component}.log"));
        let (file_writer, guard) = non_blocking(file_appender);

        let layer = fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .json()
            .with_filter(EnvFilter::new("info"));

        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_thread_names(true)
        .with_ansi(is_dev)
        .with_filter(console_filter);

    let otel_layer = match sdk_logger_provider {
        Some(provider) => {
            let otel_filter = EnvFilter::new("info")
                .add_directive("hyper=off".parse().context("invalid hyper directive")?)
                .add_directive(
                    "opentelemetry=off"
                        .parse()
                        .context("invalid opentelemetry directive")?,
                )
                .add_directive("tonic=off".parse().context("invalid tonic directive")?)
                .add_directive("h2=off".parse().context("invalid h2 directive")?)
                .add_directive("rdkafka=off".parse().context("invalid rdkafka directive")?);

            Some(OpenTelemetryTracingBridge::new(provider).with_filter(otel_filter))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(otel_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
