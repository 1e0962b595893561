use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_filter` (the config's `log_filter`). If
/// `XIVLOG_LOG_PATH` is set, append to that file instead of stderr.
pub fn init_logging(default_filter: &str) {
    let builder = EnvFilter::builder().with_default_directive(tracing::Level::INFO.into());
    let filter = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        builder.from_env_lossy()
    } else {
        builder.parse_lossy(default_filter)
    };

    if let Ok(path) = std::env::var("XIVLOG_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
