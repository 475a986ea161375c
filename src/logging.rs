//! Logging setup shared by the command line tools

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing on stderr
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects `debug` over `warn` for this
/// crate and its binaries. Dependencies stay at `warn`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "warn,gh_org_admin={default_level},gh_org_labels={default_level},gh_master_to_main={default_level}"
            ))
        });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}
