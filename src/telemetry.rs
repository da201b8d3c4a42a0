use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize the global tracing subscriber. `RUST_LOG` wins over the
/// default level; `verbose` lowers the default from info to debug.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let default_level = if verbose {
            "cyberfinance=debug,tower_http=debug"
        } else {
            "cyberfinance=info,tower_http=info"
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        fmt().with_env_filter(filter).with_target(false).init();
    });
}
