use crate::state::AppState;
use axum::Router;

mod dto;
mod error;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod services;
pub mod store;

pub fn router() -> Router<AppState> {
    handlers::credential_routes()
}
