//! Reverse geocoding via OpenStreetMap Nominatim.

use super::types::{Coordinates, CountryCode, LocatorError};
use crate::offline::fetch::{Fetch, FetchError, HttpRequest};
use serde::Deserialize;

pub const NOMINATIM_BASE: &str = "https://nominatim.openstreetmap.org";

/// Maps a coordinate pair to a country code.
pub trait ReverseGeocode {
    fn resolve_country(&self, coords: Coordinates) -> Result<CountryCode, LocatorError>;
}

#[derive(Deserialize)]
struct ReverseReply {
    #[serde(default)]
    address: Option<AddressReply>,
}

#[derive(Deserialize)]
struct AddressReply {
    #[serde(default)]
    country_code: Option<String>,
}

/// Nominatim `/reverse` client. Country-level zoom, no result caching.
pub struct NominatimClient<F> {
    fetch: F,
    base: String,
}

impl<F: Fetch> NominatimClient<F> {
    pub fn new(fetch: F) -> Self {
        Self::with_base(fetch, NOMINATIM_BASE)
    }

    pub fn with_base(fetch: F, base: impl Into<String>) -> Self {
        Self {
            fetch,
            base: base.into(),
        }
    }
}

impl<F: Fetch> ReverseGeocode for NominatimClient<F> {
    fn resolve_country(&self, coords: Coordinates) -> Result<CountryCode, LocatorError> {
        let c = coords.rounded();
        let request = HttpRequest::get(format!(
            "{}/reverse?format=json&lat={:.4}&lon={:.4}&zoom=10&addressdetails=1",
            self.base, c.lat, c.lon
        ));

        let response = self.fetch.fetch(&request).map_err(|err| match err {
            FetchError::TimedOut => LocatorError::LookupTimeout,
            FetchError::Status(code) => {
                log::debug!("reverse geocode returned HTTP {}", code);
                LocatorError::CountryNotResolved
            }
            FetchError::Network(msg) => LocatorError::Unknown(msg),
        })?;

        let reply: ReverseReply = serde_json::from_slice(&response.body).map_err(|err| {
            log::debug!("malformed reverse geocode reply: {}", err);
            LocatorError::CountryNotResolved
        })?;

        let raw = reply
            .address
            .and_then(|a| a.country_code)
            .ok_or(LocatorError::CountryNotResolved)?;

        CountryCode::parse(&raw)
    }
}
