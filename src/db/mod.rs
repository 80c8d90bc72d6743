//! Flat-file persistence for chirps, users and refresh tokens.
//!
//! The entire database is one JSON document. See [`Store`] for the
//! locking and write discipline.

pub mod models;
pub mod store;

pub use models::{Chirp, RefreshTokenRecord, Snapshot, User};
pub use store::Store;
