use tracing_subscriber::EnvFilter;

/// Setup logging of resolution progress on stderr.
///
/// `RUST_LOG` wins when set; otherwise `level` is used.
///
/// E.g. to see every hop and the records that decided it:
///   RUST_LOG=dns_iterative=debug
///
/// Or to dump whole replies:
///   RUST_LOG=dns_iterative::resolver=trace
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init()
        .ok();
}
