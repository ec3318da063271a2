use std::fs;
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Initializes logging with a JSON file layer under `log_dir` and a console layer.
///
/// The console layer writes to stderr so command output on stdout stays clean.
/// If `log_dir` cannot be created only the console layer is installed. The
/// returned guard flushes the file writer on drop; hold it until exit.
pub fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    // Respect RUST_LOG if set; otherwise info for our crate, warn elsewhere
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("femsntl=info,warn"));

    if fs::create_dir_all(log_dir).is_err() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer())
            .init();
        tracing::warn!(
            log_dir = %log_dir.display(),
            "Log directory unavailable, logging to console only"
        );
        return None;
    }

    // Daily-rotated file, written off the main thread
    let file_appender = tracing_appender::rolling::daily(log_dir, "femsntl.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer())
        .init();

    Some(guard)
}

fn console_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    fmt::layer().with_target(true).with_writer(std::io::stderr)
}
