use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use zahani_core::WorkflowService;

mod config;

use config::ServerConfig;

/// Main entry point for the ZahaniFlow server
///
/// Serves the REST API (with Swagger UI at `/swagger-ui`) over the workflow service selected by
/// the environment.
///
/// # Environment Variables
/// - `ZAHANI_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `ZAHANI_DATA_DIR`: Directory for workflow progress files
/// - `ZAHANI_STORE`: `memory` or `file`
/// - `API_KEY`: API key required on workflow routes (optional)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zahaniflow_run=info".parse()?)
                .add_directive("zahani_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = ServerConfig::from_env()?;

    tracing::info!(
        "++ Starting ZahaniFlow REST on {} ({} store, auth {})",
        cfg.rest_addr,
        cfg.core.store_kind(),
        if cfg.api_key.is_some() { "on" } else { "off" }
    );

    let workflow_service = WorkflowService::from_config(&cfg.core);
    let app = router(AppState::new(workflow_service, cfg.api_key));

    let listener = tokio::net::TcpListener::bind(&cfg.rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
