//! Codec portfolio web server.
//!
//! Serves the codec session API over `codec-core`, the public registry
//! listings, static assets, and a passthrough to the front-end dev server.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod proxy;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::AppError;
pub use router::build_router;
pub use state::AppState;
