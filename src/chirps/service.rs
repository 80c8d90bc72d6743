use crate::db::{Chirp, Store};
use crate::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const MAX_CHIRP_LENGTH: usize = 140;

const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Optional narrowing for [`ChirpService::list`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChirpQuery {
    pub author_id: Option<u64>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Checks the length limit and masks banned words.
///
/// Splitting on whitespace and joining with single spaces means runs of
/// whitespace collapse to one space.
pub fn clean_body(body: &str) -> Result<String, AppError> {
    let length = body.chars().count();
    if length > MAX_CHIRP_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Chirp is too long ({} > {} characters)",
            length, MAX_CHIRP_LENGTH
        )));
    }

    let cleaned = body
        .split_whitespace()
        .map(|word| {
            if BANNED_WORDS.contains(&word.to_lowercase().as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    Ok(cleaned)
}

#[derive(Clone)]
pub struct ChirpService {
    store: Arc<Store>,
}

impl ChirpService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn create(&self, body: &str, author_id: u64) -> Result<Chirp, AppError> {
        let body = clean_body(body)?;

        let chirp = self.store.update(|snapshot| {
            let id = snapshot.next_chirp_id();
            let chirp = Chirp { id, body, author_id };
            snapshot.chirps.insert(id, chirp.clone());
            Ok::<_, AppError>(chirp)
        })?;

        info!("User {} created chirp {}", author_id, chirp.id);
        Ok(chirp)
    }

    pub fn get(&self, id: u64) -> Result<Chirp, AppError> {
        self.store
            .load()?
            .chirps
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("chirp {}", id)))
    }

    pub fn list(&self) -> Result<Vec<Chirp>, AppError> {
        Ok(self.store.load()?.chirps.into_values().collect())
    }

    pub fn list_filtered(&self, query: &ChirpQuery) -> Result<Vec<Chirp>, AppError> {
        let mut chirps: Vec<Chirp> = self
            .list()?
            .into_iter()
            .filter(|chirp| query.author_id.map_or(true, |author| chirp.author_id == author))
            .collect();

        chirps.sort_by_key(|chirp| chirp.id);
        if query.sort == SortOrder::Desc {
            chirps.reverse();
        }
        Ok(chirps)
    }

    /// Removes a chirp on behalf of `requester_id`, who must be its author.
    pub fn delete(&self, id: u64, requester_id: u64) -> Result<(), AppError> {
        self.store.update(|snapshot| {
            let chirp = snapshot
                .chirps
                .get(&id)
                .ok_or_else(|| AppError::NotFound(format!("chirp {}", id)))?;

            if chirp.author_id != requester_id {
                warn!(
                    "User {} tried to delete chirp {} of user {}",
                    requester_id, id, chirp.author_id
                );
                return Err(AppError::Forbidden(
                    "Can't delete a chirp with a different author".into(),
                ));
            }

            snapshot.chirps.remove(&id);
            Ok(())
        })?;

        info!("User {} deleted chirp {}", requester_id, id);
        Ok(())
    }
}
