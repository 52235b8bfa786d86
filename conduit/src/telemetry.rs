use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Environment variable holding an `EnvFilter` directive, e.g. `CONDUIT_LOG=conduit_core=debug`.
pub const LOG_ENV_VAR: &str = "CONDUIT_LOG";

/// Installs the stderr log subscriber. `CONDUIT_LOG` overrides the level picked by `-v`.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbosity).into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();
}

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}
