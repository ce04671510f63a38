pub mod build_info;
pub mod paths;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "bucks_core=info";

/// Installs the global `fmt` subscriber once. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: Option<&str>) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let directive = format!("bucks_core={}", level.unwrap_or("info"));
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&directive))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    });
}
