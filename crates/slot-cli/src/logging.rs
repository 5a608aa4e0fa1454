use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log to stderr so stdout stays clean for slot listings and JSON.
///
/// `RUST_LOG` wins when set; otherwise `-v` turns on debug output for the
/// engine and the CLI.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose {
        "slot_engine=debug,slot_cli=debug,info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
