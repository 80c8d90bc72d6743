use chirpy_server::config::{AuthConfig, CorsConfig, DatabaseConfig, ServerConfig};
use chirpy_server::{AppState, Settings, TokenKind};
use std::path::Path;

pub fn test_settings(path: &Path) -> Settings {
    Settings {
        environment: "test".to_string(),
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: 1,
        },
        database: DatabaseConfig {
            path: path.to_path_buf(),
        },
        auth: AuthConfig {
            jwt_secret: "test_secret".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_days: 60,
        },
        cors: CorsConfig {
            enabled: false,
            allow_any_origin: false,
            max_age: 0,
        },
    }
}

pub fn test_state(dir: &Path) -> AppState {
    AppState::new(test_settings(&dir.join("database.json"))).expect("Failed to create app state")
}

/// Registers a user straight through the services and returns an access token.
pub fn sign_up(state: &AppState, email: &str) -> String {
    let user = state.users.create(email, "pw").expect("Failed to create user");
    state
        .tokens
        .issue(user.id, TokenKind::Access)
        .expect("Failed to issue token")
}
