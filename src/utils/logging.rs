use std::env;
use tracing::Level;

pub fn setup_tracing() {
    let level = env::var("BOOKSHELF_LOG_LEVEL").ok()
        .and_then(|raw| raw.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    let json = env::var("BOOKSHELF_LOG_JSON").map(|raw| raw == "true").unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        // disable printing the name of the module in every log line.
        .with_target(false);
    if json {
        // log collectors add their own colors and ingestion time
        builder.with_ansi(false).without_time().json().init();
    } else {
        builder.init();
    }
}
