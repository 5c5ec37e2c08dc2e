//! HTTP API.
//!
//! JSON endpoints under `/api/` for the browser UI. Handlers are thin:
//! they validate, hop onto the blocking pool for SQLite and generator
//! calls, and map domain errors to `ApiError`.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
