//! Console logging for the binary.
//!
//! Filtering follows `RUST_LOG` (for example `RUST_LOG=gridedit=debug`) and
//! defaults to `warn`. The library only emits events; it never installs a
//! subscriber itself.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(filter);

    // A second init (tests, embedding hosts) is not an error worth reporting.
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
