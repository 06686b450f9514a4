//! HTTP Layer - RESTful API

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use dto::SynthesisDefaults;
pub use error::ApiError;
pub use routes::create_routes;
pub use server::{build_router, serve, ServerConfig};
pub use state::AppState;
