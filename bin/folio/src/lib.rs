//! folio CLI library
//!
//! Command implementations and the HTTP server behind the `folio` binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, serve, check)
//! - [`server`] - Router serving pages, the feed and the browser APIs
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use folio::cmd;
//!
//! // Render the site to ./public
//! cmd::build::run(Path::new("config.toml"), Some(Path::new("public"))).unwrap();
//! ```

use std::path::Path;

pub mod cmd;
pub mod server;

pub use folio_core::Config;
pub use folio_generator::{BuildStats, Builder, PostStore};

/// Directory that relative paths in the configuration resolve against.
pub fn config_root(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_root() {
        assert_eq!(config_root(Path::new("config.toml")), Path::new("."));
        assert_eq!(config_root(Path::new("site/config.toml")), Path::new("site"));
        assert_eq!(config_root(Path::new("/srv/site/folio.toml")), Path::new("/srv/site"));
    }
}
