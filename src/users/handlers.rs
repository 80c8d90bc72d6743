use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use crate::AppState;
use crate::auth::authorization_header;
use crate::db::User;
use crate::error::AppError;
use tracing::{info, error};

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account; the password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: u64,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

pub async fn register(
    req: web::Json<UserRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received registration request for email: {}", req.email);
    let UserRequest { email, password } = req.into_inner();

    let worker = state.clone();
    match web::block(move || worker.users.create(&email, &password)).await? {
        Ok(user) => {
            info!("Registration successful for user {}", user.id);
            Ok(HttpResponse::Created().json(UserResponse::from(user)))
        }
        Err(e) => {
            error!("Registration failed: {}", e);
            Err(e)
        }
    }
}

pub async fn update(
    req: HttpRequest,
    body: web::Json<UserRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    // Only the account owner, holding an access token, may change it
    let user_id = state.tokens.authenticate(&authorization_header(&req)?)?;
    let UserRequest { email, password } = body.into_inner();

    let worker = state.clone();
    let user = web::block(move || worker.users.update(user_id, &email, &password)).await??;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
