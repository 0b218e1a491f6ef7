use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use patient_core::{store_from_env_value, CoreConfig, PatientService};

/// Main entry point for the patient service
///
/// Resolves configuration once, opens the configured store and serves the REST API
/// until Ctrl-C.
///
/// # Environment Variables
/// - `PATIENT_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_STORE`: `memory`, or a SQLite database path (default: "patient_data/patients.db")
/// - `RUST_LOG`: extra tracing directives
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, store opening or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patient_service=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("patient_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("PATIENT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let store = store_from_env_value(std::env::var("PATIENT_STORE").ok())?;
    let cfg = CoreConfig::new(store);

    tracing::info!("++ Patient store: {:?}", cfg.store());
    tracing::info!("++ Starting patient REST on {}", rest_addr);

    let patient_service = PatientService::from_config(&cfg)?;
    api_rest::serve(&rest_addr, patient_service).await
}
