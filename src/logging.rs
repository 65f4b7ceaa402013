use std::path::PathBuf;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Initialise logging. Debug builds, or `debug` from the settings file, log at
/// `debug` level and honour `RUST_LOG`; otherwise the level is forced to
/// `info`.
///
/// When `log_file` is given every line is also appended to that file.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let debug = debug || cfg!(debug_assertions);
    let level = if debug { "debug" } else { "info" };

    // Ignore RUST_LOG unless debug logging was asked for, so a stray variable
    // in the user's environment cannot make release builds verbose.
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let Some(path) = log_file else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        return;
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let Some(name) = path.file_name() else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        return;
    };
    let file = tracing_appender::rolling::never(dir, name);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::io::stdout.and(file))
        .try_init();
}
