//! Google Workspace adapter for dirsync
//!
//! Implements [`dirsync_core::DirectoryClient`] on top of the Admin SDK
//! Directory API, the Groups Settings API and the Gmail API.
//!
//! ## Features
//!
//! - **Service account auth**: RS256 assertions with domain-wide delegation,
//!   one cached token per scope set and impersonated subject
//! - **Retries**: network errors, 429 and 5xx with exponential backoff
//! - **Pagination**: member listings follow `nextPageToken`
//! - **Error classification**: HTTP statuses map onto
//!   [`dirsync_core::DirectoryError`] kinds

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;

pub use auth::{scopes, ServiceAccountKey, ServiceAccountTokenProvider, StaticTokenProvider, TokenProvider};
pub use client::GoogleDirectoryClient;
pub use config::GoogleConfig;
pub use error::{GoogleError, Result};
pub use middleware::{RetryConfig, RetryMiddleware};
