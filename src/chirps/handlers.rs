use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use crate::AppState;
use crate::auth::authorization_header;
use crate::chirps::ChirpQuery;
use crate::error::AppError;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

fn parse_chirp_id(raw: &str) -> Result<u64, AppError> {
    raw.parse()
        .map_err(|_| AppError::ValidationError(format!("Invalid chirp id: {}", raw)))
}

pub async fn create_chirp(
    req: HttpRequest,
    body: web::Json<CreateChirpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let author_id = state.tokens.authenticate(&authorization_header(&req)?)?;
    let CreateChirpRequest { body } = body.into_inner();

    let worker = state.clone();
    let chirp = web::block(move || worker.chirps.create(&body, author_id)).await??;

    Ok(HttpResponse::Created().json(chirp))
}

pub async fn list_chirps(
    query: web::Query<ChirpQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();

    let worker = state.clone();
    let chirps = web::block(move || worker.chirps.list_filtered(&query)).await??;

    info!("Listing {} chirps", chirps.len());
    Ok(HttpResponse::Ok().json(chirps))
}

pub async fn get_chirp(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = parse_chirp_id(&path)?;

    let worker = state.clone();
    let chirp = web::block(move || worker.chirps.get(id)).await??;

    Ok(HttpResponse::Ok().json(chirp))
}

pub async fn delete_chirp(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let requester_id = state.tokens.authenticate(&authorization_header(&req)?)?;
    let id = parse_chirp_id(&path)?;

    let worker = state.clone();
    web::block(move || worker.chirps.delete(id, requester_id)).await??;

    Ok(HttpResponse::Ok().json(serde_json::json!({})))
}
