use actix_web::{web, HttpResponse, HttpRequest};
use serde::{Deserialize, Serialize};
use crate::AppState;
use crate::auth::{authorization_header, TokenKind};
use crate::error::{AppError, AuthError};
use tracing::{info, error};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: u64,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for email: {}", req.email);
    let LoginRequest { email, password } = req.into_inner();

    let worker = state.clone();
    let outcome = web::block(move || {
        // Unknown email and wrong password look the same from outside
        let id = worker.users.authorize(&email, &password).map_err(|e| match e {
            AppError::NotFound(_) => AppError::from(AuthError::InvalidCredentials),
            other => other,
        })?;
        let token = worker.tokens.issue(id, TokenKind::Access)?;
        let refresh_token = worker.tokens.issue(id, TokenKind::Refresh)?;
        Ok::<_, AppError>(LoginResponse { id, email, token, refresh_token })
    })
    .await?;

    match outcome {
        Ok(response) => {
            info!("Login successful for user {}", response.id);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            error!("Login failed: {}", e);
            Err(e)
        }
    }
}

pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let header = authorization_header(&req)?;

    let worker = state.clone();
    let token = web::block(move || {
        let user_id = worker.tokens.validate_refresh(&header)?;
        worker.tokens.issue(user_id, TokenKind::Access)
    })
    .await??;

    info!("Issued a fresh access token");
    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

pub async fn revoke(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let header = authorization_header(&req)?;

    let worker = state.clone();
    web::block(move || worker.tokens.revoke(&header)).await??;

    Ok(HttpResponse::Ok().json(serde_json::json!({})))
}
