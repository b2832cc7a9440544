//! Offline shell cache subsystem.
//!
//! Every outbound request in the crate goes through the [`Fetch`] seam, so a
//! [`CachingFetcher`] wrapped around the real HTTP fetcher intercepts all
//! traffic. The store is versioned by name; bumping [`CACHE_NAME`] is the only
//! eviction mechanism.

pub mod cache;
pub mod fetch;
pub mod store;

pub use cache::{install, CachingFetcher, FetchStrategy, ShellManifest, CACHE_NAME, SHELL_PATHS};
pub use fetch::{Fetch, FetchError, HttpRequest, HttpResponse, UreqFetcher, FETCH_TIMEOUT_MS};
pub use store::CacheStore;
