//! Core types for the locator pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A coordinate pair from the location provider. Immutable once obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Round both axes to 4 decimal digits. This is the precision used for
    /// display and for the geocode query.
    pub fn rounded(self) -> Self {
        Self {
            lat: round4(self.lat),
            lon: round4(self.lon),
        }
    }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// A normalized ISO 3166-1 alpha-2 country code (e.g. "BR", "SE").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a raw identifier from a geocoding reply. Anything that is not
    /// exactly two ASCII letters counts as a failed lookup.
    pub fn parse(raw: &str) -> Result<Self, LocatorError> {
        let trimmed = raw.trim();
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(LocatorError::CountryNotResolved)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptive data for one country. Terminal: rendered and discarded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRecord {
    pub common_name: String,
    pub localized_name: Option<String>,
    pub capital: Option<String>,
    pub population: u64,
    pub region: String,
    pub subregion: Option<String>,
    /// First entry of the provider's timezone list.
    pub timezone: Option<String>,
    pub flag: Option<String>,
}

/// Pipeline step failures, one variant per distinct user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    CapabilityUnavailable,
    PermissionDenied,
    PositionUnavailable,
    LocationTimeout,
    LookupTimeout,
    CountryNotResolved,
    DetailsTimeout,
    DetailsNotFound,
    Unknown(String),
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapabilityUnavailable => {
                write!(f, "location sensing is not available on this device")
            }
            Self::PermissionDenied => {
                write!(f, "permission denied, please allow access to your location")
            }
            Self::PositionUnavailable => {
                write!(f, "your position is unavailable, please try again")
            }
            Self::LocationTimeout => write!(f, "timed out while acquiring your position"),
            Self::LookupTimeout => {
                write!(f, "timed out while resolving your coordinates to a country")
            }
            Self::CountryNotResolved => {
                write!(f, "could not match your coordinates to a country, are you somewhere remote?")
            }
            Self::DetailsTimeout => write!(f, "timed out while fetching the country dossier"),
            Self::DetailsNotFound => write!(f, "no details found for the resolved country"),
            Self::Unknown(msg) => write!(f, "unexpected failure: {}", msg),
        }
    }
}

impl std::error::Error for LocatorError {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_coordinates_rounded() {
        let c = Coordinates::new(-23.550_519_9, -46.633_308_4).rounded();
        assert_relative_eq!(c.lat, -23.5505, epsilon = 1e-9);
        assert_relative_eq!(c.lon, -46.6333, epsilon = 1e-9);
    }

    #[test]
    fn test_coordinates_display_four_decimals() {
        let c = Coordinates::new(-23.5505, -46.6333);
        assert_eq!(c.to_string(), "-23.5505, -46.6333");
        assert_eq!(Coordinates::new(0.0, 0.0).to_string(), "0.0000, 0.0000");
    }

    #[test]
    fn test_country_code_uppercased() {
        let code = CountryCode::parse("br").unwrap();
        assert_eq!(code.as_str(), "BR");
        assert_eq!(code.as_str().len(), 2);
    }

    #[test]
    fn test_country_code_trims_whitespace() {
        assert_eq!(CountryCode::parse(" se ").unwrap().as_str(), "SE");
    }

    #[test]
    fn test_country_code_rejects_invalid() {
        assert_eq!(CountryCode::parse(""), Err(LocatorError::CountryNotResolved));
        assert_eq!(CountryCode::parse("brazil"), Err(LocatorError::CountryNotResolved));
        assert_eq!(CountryCode::parse("b1"), Err(LocatorError::CountryNotResolved));
        assert_eq!(CountryCode::parse("b"), Err(LocatorError::CountryNotResolved));
    }

    #[test]
    fn test_timeout_messages_are_distinct() {
        // The geocode timeout must not read like a location error.
        let lookup = LocatorError::LookupTimeout.to_string();
        assert_ne!(lookup, LocatorError::PermissionDenied.to_string());
        assert_ne!(lookup, LocatorError::PositionUnavailable.to_string());
        assert_ne!(lookup, LocatorError::LocationTimeout.to_string());
        assert_ne!(lookup, LocatorError::DetailsTimeout.to_string());
    }
}
