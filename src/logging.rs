use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Level for a `-v` count: warnings by default, then debug, then trace.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. Log lines go to stderr so `list` output
/// stays clean on stdout.
pub fn init(verbosity: u8) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level_for(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();

    // A subscriber may already be set when running inside tests.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::DEBUG);
        assert_eq!(level_for(5), Level::TRACE);
    }
}
