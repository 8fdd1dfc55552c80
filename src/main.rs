use actix_web::{middleware, web, App, HttpServer};
use skill_match::config::{DatastoreBackend, Settings};
use skill_match::core::{Enricher, TeacherMatcher};
use skill_match::routes::{self, teachers::AppState};
use skill_match::services::{ChatCompletionClient, PostgresStore, SupabaseClient, TeacherStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn TeacherStore>> {
    let datastore = &settings.datastore;

    match datastore.backend {
        DatastoreBackend::Supabase => {
            let client = SupabaseClient::new(
                datastore.url.clone().unwrap_or_default(),
                datastore.service_key.clone().unwrap_or_default(),
            )
            .map_err(|e| startup_error("Failed to create Supabase client", e))?;

            info!("Supabase data store initialized");
            Ok(Arc::new(client))
        }
        DatastoreBackend::Postgres => {
            let store = PostgresStore::from_settings(
                datastore.database_url.as_deref().unwrap_or_default(),
                datastore.max_connections,
                datastore.min_connections,
                datastore.acquire_timeout_secs,
                datastore.idle_timeout_secs,
            )
            .await
            .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

            info!(
                "PostgreSQL data store initialized (max: {} connections)",
                datastore.max_connections.unwrap_or(10)
            );
            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => {
            init_logging("info", "json");
            return Err(startup_error("Configuration error", e));
        }
    };

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting Skill Match service...");
    info!("Configuration loaded successfully");

    let store = build_store(&settings).await?;

    let enrichment = &settings.enrichment;
    let generator = ChatCompletionClient::new(
        enrichment.endpoint.clone(),
        enrichment.api_key.clone(),
        enrichment.model.clone(),
        Duration::from_secs(enrichment.timeout_secs),
    )
    .map_err(|e| startup_error("Failed to create text generation client", e))?;

    let enricher = Enricher::new(
        Arc::new(generator),
        enrichment.max_enriched,
        enrichment.fallback_description.clone(),
    );

    info!(
        "Enricher initialized (model: {}, max enriched: {}, timeout: {}s)",
        enrichment.model, enrichment.max_enriched, enrichment.timeout_secs
    );

    let app_state = AppState {
        matcher: Arc::new(TeacherMatcher::new(store, enricher)),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::teachers::json_config())
            .wrap(routes::cors())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
