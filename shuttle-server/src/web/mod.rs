//! Web layer for the transfer optimization server.
//!
//! Provides HTTP endpoints for running optimizations and managing
//! possible stops.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{create_router, AppError};
pub use state::AppState;
