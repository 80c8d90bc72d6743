//! User accounts: registration, credential checks and profile updates.

pub mod handlers;
mod service;

pub use service::UserService;
