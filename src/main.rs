mod api;
mod bootstrap;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting User Service...");

    // Configuration errors abort before any database call
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // Initialize MongoDB connection
    let db = match database::MongoDB::new(&config.mongodb_uri, &config.db_name).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };

    // First-run bootstrap: collection, root user, uniqueness indexes.
    // Any failure here is fatal; the orchestrator decides whether to restart.
    if let Err(e) = bootstrap::init_db::run(&db, &config).await {
        log::error!("❌ Database bootstrap failed: {}", e);
        std::process::exit(1);
    }

    let host = config.host.clone();
    let port = config.port.clone();
    let secret_key = config.secret_key.clone();

    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config);

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = actix_cors::Cors::permissive();

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .wrap(cors)
            .wrap(middleware::RequestLogger)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Auth endpoints
            .service(
                web::scope("/api/v1/auth")
                    .route("/register", web::post().to(api::auth::register))
                    .route("/login", web::post().to(api::auth::login))
                    .route("/refresh", web::post().to(api::auth::refresh_token)),
            )
            // Current-user endpoints (JWT required)
            .service(
                web::scope("/api/v1/me")
                    .wrap(middleware::AuthMiddleware::new(secret_key.clone()))
                    .route("", web::get().to(api::me::get_me))
                    .route(
                        "/change-password",
                        web::patch().to(api::me::change_password),
                    ),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
