use actix_web::{web, App, HttpServer};
use actix_cors::Cors;
use anyhow::Context;
use chirpy_server::{AppState, Settings};
use dotenv::dotenv;
use std::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn build_cors(config: &Settings) -> Cors {
    if !config.cors.enabled {
        // CORS disabled - use most restrictive settings
        return Cors::default();
    }

    let cors = if config.cors.allow_any_origin {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
    } else {
        Cors::default()
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec!["Authorization", "Content-Type"])
    };

    cors.max_age(config.cors.max_age as usize)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = Settings::new().context("Failed to load configuration")?;
    info!("Configuration loaded successfully ({} mode)", config.environment);

    let state = AppState::new(config.clone())
        .with_context(|| format!("Failed to open state file {}", config.database.path.display()))?;
    let state = web::Data::new(state);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?;
    info!("Serving on http://{}:{}", config.server.host, config.server.port);

    let cors_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&cors_config))
            .app_data(state.clone())
            .configure(chirpy_server::configure)
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .context("HTTP server failed")?;

    Ok(())
}
