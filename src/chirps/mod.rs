//! Chirps: short text messages with a length limit and a profanity filter.

pub mod handlers;
mod service;

pub use service::{clean_body, ChirpQuery, ChirpService, SortOrder, MAX_CHIRP_LENGTH};
