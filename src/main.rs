mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Settings;
use crate::core::VoteCoordinator;
use crate::routes::profiles::AppState;
use crate::services::{MemoryStore, PostgresStore, RatingStore, SnapshotCache};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap_or_default())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so the logging section applies
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Ranked profile ranking service...");

    // Initialize the rating store
    let store: Arc<dyn RatingStore> = match settings.database.backend.as_str() {
        "memory" => {
            info!("Using in-memory store backend (state is lost on restart)");
            Arc::new(MemoryStore::new())
        }
        "postgres" => {
            let db_max_conn = settings.database.max_connections.unwrap_or(10);
            let db_min_conn = settings.database.min_connections.unwrap_or(1);

            let postgres = PostgresStore::connect(&settings.database.url, db_max_conn, db_min_conn)
                .await
                .unwrap_or_else(|e| {
                    error!("Failed to connect to PostgreSQL: {}", e);
                    panic!("PostgreSQL connection error: {}", e);
                });

            info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);
            Arc::new(postgres)
        }
        other => {
            error!("Unknown store backend: {}", other);
            panic!("Configuration error: unknown store backend {:?}", other);
        }
    };

    // Initialize the snapshot cache
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(30);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match SnapshotCache::connect(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
        Ok(c) => {
            info!("Snapshot cache connected (local: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            Arc::new(c)
        }
        Err(e) => {
            error!("Failed to connect to Redis: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "Redis connection required"));
        }
    };

    // Initialize the vote coordinator
    let coordinator = Arc::new(VoteCoordinator::new(
        store.clone(),
        settings.rating.k_factor,
        settings.rating.max_commit_retries,
    ));

    info!(
        "Vote coordinator initialized (K = {}, up to {} commit attempts)",
        settings.rating.k_factor, settings.rating.max_commit_retries
    );

    // Build application state
    let app_state = AppState {
        store,
        cache,
        coordinator,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
