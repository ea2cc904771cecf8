//! SportMonks Soccer API Client
//!
//! A Rust client for the SportMonks soccer HTTP API v2.0, built around a
//! fetch engine that walks paginated responses to exhaustion, strips the
//! `{"data": ...}` response envelope, unnests requested includes, and caches
//! identifier-keyed lookups for the lifetime of the client.
//!
//! ## Features
//!
//! - **Transparent Pagination**: every page of a query is fetched and merged
//!   in order, with loop detection on malformed cursors
//! - **Include Unnesting**: requested sub-resources are flattened out of
//!   their envelopes, recursively
//! - **Identifier Cache**: resource-by-id lookups are cached per
//!   (resource, id, include-set), with at-most-one in-flight fetch per key
//! - **Optional Retry**: bounded exponential backoff for transient failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sportmonks::SoccerClient;
//!
//! # async fn example() -> sportmonks::Result<()> {
//! let client = SoccerClient::new("my-api-token")?;
//!
//! // One call, however many pages the API serves.
//! let leagues = client.all_leagues("country").await?;
//!
//! // Cached after the first lookup with this include set.
//! let denmark = client.country_by_id(320, "continent").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod fetch;
pub mod query;
pub mod retry;
pub mod soccer;

// Re-export commonly used types
pub use client::{SoccerClient, SoccerClientBuilder, DEFAULT_BASE_URL};
pub use error::{Result, SportmonksError};
pub use fetch::cache::{LookupCache, LookupKey};
pub use query::{ForeignKeyFilter, Includes, Query};
pub use retry::RetryPolicy;

/// One upstream entity after unnesting: an ordered field-name-to-value map
/// with no fixed schema.
pub type Record = serde_json::Map<String, serde_json::Value>;
