pub mod admin;
pub mod auth;
pub mod chirps;
pub mod config;
pub mod db;
pub mod error;
pub mod users;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use actix_web::{dev::Service as _, web, HttpResponse};
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use crate::config::Settings;

pub use auth::{TokenKind, TokenService};
pub use chirps::ChirpService;
pub use db::{Chirp, Store, User};
pub use users::UserService;

/// Readiness check
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("OK")
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub store: Arc<Store>,
    pub tokens: TokenService,
    pub users: UserService,
    pub chirps: ChirpService,
    hits: Arc<AtomicU64>,
}

impl AppState {
    /// Opens the state file named in `config`, creating it if needed.
    pub fn new(config: Settings) -> Result<Self> {
        let store = Store::open(config.database.path.clone())?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: Settings, store: Arc<Store>) -> Self {
        Self {
            tokens: TokenService::from_settings(store.clone(), &config),
            users: UserService::new(store.clone()),
            chirps: ChirpService::new(store.clone()),
            config: Arc::new(config),
            store,
            hits: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_hit(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}

/// Registers every route. Shared by the binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap_fn(|req, srv| {
                info!("{} {}", req.method(), req.path());
                if let Some(state) = req.app_data::<web::Data<AppState>>() {
                    state.record_hit();
                }
                srv.call(req)
            })
            .route("/healthz", web::get().to(health_check))
            .route("/users", web::post().to(users::handlers::register))
            .route("/users", web::put().to(users::handlers::update))
            .route("/login", web::post().to(auth::handlers::login))
            .route("/refresh", web::post().to(auth::handlers::refresh))
            .route("/revoke", web::post().to(auth::handlers::revoke))
            .route("/chirps", web::post().to(chirps::handlers::create_chirp))
            .route("/chirps", web::get().to(chirps::handlers::list_chirps))
            .route("/chirps/{id}", web::get().to(chirps::handlers::get_chirp))
            .route("/chirps/{id}", web::delete().to(chirps::handlers::delete_chirp)),
    )
    .service(web::scope("/admin").route("/metrics", web::get().to(admin::metrics)));
}
