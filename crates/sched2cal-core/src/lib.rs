pub mod config;
pub mod error;

pub use config::{
    CalendarConfig, Config, GoogleConfig, HttpConfig, HuflitConfig, SguConfig, ValidationResult,
};
pub use error::{AppError, AuthError, ConfigError, NetworkError, PortalError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize tracing. `RUST_LOG` wins over the verbosity flag.
pub fn init(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    tracing::debug!("sched2cal core initialized");
    Ok(())
}
