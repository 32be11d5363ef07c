use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the global tracing subscriber. Level defaults to INFO and can be
/// raised to DEBUG with DEBRIEF_LOG=debug.
pub fn init() {
    let level = match std::env::var("DEBRIEF_LOG").as_deref() {
        Ok("debug") => Level::DEBUG,
        Ok("warn") => Level::WARN,
        Ok("error") => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok(); // Ignored if a test already installed one
}
