use std::env;

use tracing::{error, info};

use urpaq_core::config::Config;
use urpaq_rag::ingest::{DataInitializer, ObjectLoader};
use urpaq_server::{logging, router, verbose_flag, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    logging::init(verbose_flag(&args));

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;
    info!("Starting Digital Urpaq assistant");

    let state = AppState::from_settings(&settings).await?;

    DataInitializer::new(state.retrieval.clone(), settings.ingest.clone()).run().await?;

    if settings.ingest.load_s3_on_start && settings.s3.is_configured() {
        let loader = ObjectLoader::new(state.objects.clone(), state.retrieval.clone(), settings.ingest.use_chunking);
        tokio::spawn(async move {
            if let Err(e) = loader.load_all().await {
                error!("Error loading data from object storage: {}", e);
            }
        });
    }

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
