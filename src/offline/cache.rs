//! Shell install and fetch-interception policy.

use super::fetch::{Fetch, FetchError, HttpRequest, HttpResponse};
use super::store::CacheStore;

/// Version tag of the live cache store. Bumping it evicts everything older
/// at the next activation.
pub const CACHE_NAME: &str = "habitat-locator-v1";

/// Fixed application-shell resources cached at install time.
pub const SHELL_PATHS: &[&str] = &["/", "/habitat_locator.html", "/manifest.json"];

pub const SHELL_ORIGIN: &str = "https://habitat-locator.app";

/// The enumerated shell asset list against one origin.
pub struct ShellManifest {
    pub origin: String,
    pub paths: Vec<String>,
}

impl Default for ShellManifest {
    fn default() -> Self {
        Self {
            origin: SHELL_ORIGIN.into(),
            paths: SHELL_PATHS.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

impl ShellManifest {
    pub fn requests(&self) -> impl Iterator<Item = HttpRequest> + '_ {
        self.paths
            .iter()
            .map(move |path| HttpRequest::get(format!("{}{}", self.origin, path)))
    }
}

/// Install step: populate the store with the shell set. A resource that fails
/// to fetch is logged and skipped; installation itself never fails.
pub fn install<F: Fetch>(store: &mut CacheStore, fetcher: &F, manifest: &ShellManifest) {
    for request in manifest.requests() {
        match fetcher.fetch(&request) {
            Ok(response) => store.put(&request, response),
            Err(err) => log::warn!("shell cache: could not populate {}: {}", request.url, err),
        }
    }
}

/// Interception policy applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Store hit wins; miss goes to the network and is not written back.
    CacheFirst,
    /// Network wins; the store is a fallback when the network fails.
    NetworkFirst,
}

/// Decorates a fetcher with the interception policy. Wrapping the one real
/// fetcher here makes interception total: every outbound request in the crate
/// passes the store check.
pub struct CachingFetcher<F> {
    store: CacheStore,
    inner: F,
    strategy: FetchStrategy,
}

impl<F: Fetch> CachingFetcher<F> {
    pub fn new(store: CacheStore, inner: F, strategy: FetchStrategy) -> Self {
        Self {
            store,
            inner,
            strategy,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }
}

impl<F: Fetch> Fetch for CachingFetcher<F> {
    fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        match self.strategy {
            FetchStrategy::CacheFirst => match self.store.lookup(request) {
                Some(hit) => Ok(hit),
                None => self.inner.fetch(request),
            },
            FetchStrategy::NetworkFirst => match self.inner.fetch(request) {
                Ok(response) => Ok(response),
                Err(err) => self.store.lookup(request).ok_or(err),
            },
        }
    }
}
