//! Location providers: IP geolocation, manual coordinates, offline stub.

use super::types::{Coordinates, LocatorError};
use crate::offline::fetch::{Fetch, FetchError, HttpRequest};
use serde::Deserialize;

pub const IP_API_BASE: &str = "https://ipapi.co";

/// Single-shot position acquisition. No retry; every call is a fresh reading.
pub trait LocationProvider {
    fn acquire(&self) -> Result<Coordinates, LocatorError>;
}

impl<P: LocationProvider + ?Sized> LocationProvider for Box<P> {
    fn acquire(&self) -> Result<Coordinates, LocatorError> {
        (**self).acquire()
    }
}

// ─── IP-based geolocation ───────────────────────────────────────

#[derive(Deserialize)]
struct IpApiReply {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Acquires the device position via IP geolocation.
pub struct IpApiProvider<F> {
    fetch: F,
    base: String,
}

impl<F: Fetch> IpApiProvider<F> {
    pub fn new(fetch: F) -> Self {
        Self::with_base(fetch, IP_API_BASE)
    }

    pub fn with_base(fetch: F, base: impl Into<String>) -> Self {
        Self {
            fetch,
            base: base.into(),
        }
    }
}

impl<F: Fetch> LocationProvider for IpApiProvider<F> {
    fn acquire(&self) -> Result<Coordinates, LocatorError> {
        let request = HttpRequest::get(format!("{}/json/", self.base));
        let response = self.fetch.fetch(&request).map_err(|err| match err {
            FetchError::TimedOut => LocatorError::LocationTimeout,
            FetchError::Status(403) => LocatorError::PermissionDenied,
            FetchError::Status(code) => {
                log::debug!("geolocation provider returned HTTP {}", code);
                LocatorError::PositionUnavailable
            }
            FetchError::Network(msg) => LocatorError::Unknown(msg),
        })?;

        let reply: IpApiReply = serde_json::from_slice(&response.body).map_err(|err| {
            log::debug!("malformed geolocation reply: {}", err);
            LocatorError::PositionUnavailable
        })?;

        if reply.error {
            log::debug!(
                "geolocation provider error: {}",
                reply.reason.as_deref().unwrap_or("no reason given")
            );
            return Err(LocatorError::PositionUnavailable);
        }

        match (reply.latitude, reply.longitude) {
            (Some(lat), Some(lon)) if in_range(lat, lon) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocatorError::PositionUnavailable),
        }
    }
}

// ─── Manual and offline providers ───────────────────────────────

/// Fixed coordinates supplied on the command line.
pub struct ManualProvider {
    coords: Coordinates,
}

impl ManualProvider {
    pub fn new(lat: f64, lon: f64) -> Result<Self, LocatorError> {
        if in_range(lat, lon) {
            Ok(Self {
                coords: Coordinates::new(lat, lon),
            })
        } else {
            Err(LocatorError::PositionUnavailable)
        }
    }
}

impl LocationProvider for ManualProvider {
    fn acquire(&self) -> Result<Coordinates, LocatorError> {
        Ok(self.coords)
    }
}

/// Stands in when no location capability is usable (offline, no manual input).
pub struct UnavailableProvider;

impl LocationProvider for UnavailableProvider {
    fn acquire(&self) -> Result<Coordinates, LocatorError> {
        Err(LocatorError::CapabilityUnavailable)
    }
}

fn in_range(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Pick the provider: manual coordinates win, offline mode disables the
/// network provider entirely.
pub fn select<'a, F: Fetch + 'a>(
    manual: Option<(f64, f64)>,
    offline: bool,
    fetch: F,
) -> Result<Box<dyn LocationProvider + 'a>, LocatorError> {
    match manual {
        Some((lat, lon)) => Ok(Box::new(ManualProvider::new(lat, lon)?)),
        None if offline => Ok(Box::new(UnavailableProvider)),
        None => Ok(Box::new(IpApiProvider::new(fetch))),
    }
}
