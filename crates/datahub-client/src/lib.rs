//! Client for the provider's map-image catalogue.
//!
//! Two read operations against an order:
//! - the manifest of files in the latest run
//! - the raw PNG bytes of one file
//!
//! Both forward the API key in an `apikey` header. There is no retry; a
//! failed request fails once.

pub mod client;
pub mod error;
pub mod models;
pub mod query;

pub use client::{collect_bytes, CatalogueClient, DataHubClient, FileStream, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use models::{FileEntry, Order, OrderDetails, OrderResponse};
pub use query::QueryParams;
