//! Logger setup on top of `env_logger`

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from the `RUST_LOG` environment variable
pub fn init() {
    let _ = env_logger::try_init();
}

/// Initialize the logging system with a default level filter such as
/// `"info"` or `"scene_graph=debug"`. `RUST_LOG` still overrides it.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).try_init();
}
