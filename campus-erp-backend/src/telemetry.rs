use tracing::warn;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Layer as _};

use crate::error::AppError;

pub const DEFAULT_LOG_LEVEL: &str = "info,campus_erp_backend=debug,campus_erp_ledger=debug,\
                                     campus_erp_database=debug,tower_http=debug,hyper=info";

/// `RUST_LOG` wins over the configured directive, which wins over [`DEFAULT_LOG_LEVEL`].
///
/// An unparsable `rust_log` falls back like an unset one; its parse error is handed back so it
/// can be reported once logging works.
pub fn env_filter(
    rust_log: Option<&str>,
    log: Option<&str>,
) -> Result<(EnvFilter, Option<ParseError>), AppError> {
    let rejected = match rust_log.map(EnvFilter::try_new) {
        Some(Ok(filter)) => return Ok((filter, None)),
        Some(Err(err)) => Some(err),
        None => None,
    };
    Ok((EnvFilter::try_new(log.unwrap_or(DEFAULT_LOG_LEVEL))?, rejected))
}

pub fn setup_telemetry(log: Option<&str>) -> Result<(), AppError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, rejected) = env_filter(rust_log.as_deref(), log)?;
    let stdout_log = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(stdout_log.with_filter(filter))
        .try_init()?;

    if let Some(err) = rejected {
        warn!("ignoring invalid {}: {err}", EnvFilter::DEFAULT_ENV);
    }
    Ok(())
}
