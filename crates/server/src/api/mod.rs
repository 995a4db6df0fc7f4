pub mod handlers;
pub mod manga;
pub mod middleware;
pub mod proxy;
pub mod routes;

pub use routes::create_router;

use serde::Serialize;

/// JSON body for server-side failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
