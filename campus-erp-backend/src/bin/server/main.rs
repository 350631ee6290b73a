use campus_erp_backend::error::AppError;
use campus_erp_backend::run_server;
use campus_erp_backend::telemetry::setup_telemetry;
use campus_erp_config::get_config;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = get_config()?;
    setup_telemetry(config.log.as_deref())?;
    debug!(?config, "loaded configuration");

    run_server(&config).await?.await
}
