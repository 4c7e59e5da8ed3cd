//! Overlay tile server.
//!
//! Serves the tile tree written by the downloader under
//! `/v1/metoffice/datahub/`. A tile missing from disk is redirected to the
//! same instant in the previous day's run when that run covers it.

pub mod handlers;
pub mod refresh;
pub mod routes;
pub mod state;

pub use routes::{build_router, STATIC_PREFIX};
pub use state::AppState;
