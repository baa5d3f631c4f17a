mod artifacts;
mod config;
mod context;
mod inference;
mod routes;
mod upload;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use config::ServiceConfig;
use context::ServiceContext;
use routes::configure_routes;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("=== STARTUP ===");
    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = ServiceConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let context = match ServiceContext::load(&config) {
        Ok(context) => web::Data::new(context),
        Err(e) => {
            log::error!("Failed to load artifacts at startup: {}", e);
            return Err(std::io::Error::other(format!(
                "Artifact loading failed: {}",
                e
            )));
        }
    };

    log::info!("Starting server on {}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(context.clone())
            .configure(configure_routes)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
