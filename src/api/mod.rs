pub mod rest;
pub mod websocket;

pub use rest::{create_router, AppState};
