//! Locator pipeline subsystem.
//!
//! Three fallible steps run in strict sequence: a location provider yields
//! coordinates, a reverse-geocoding client maps them to a country code, and a
//! country-data client turns the code into a dossier. Each step carries its
//! own timeout and error variant so a failure always names the stage it
//! happened in.

pub mod countries;
pub mod geocode;
pub mod pipeline;
pub mod providers;
pub mod types;

pub use countries::{CountryData, RestCountriesClient};
pub use geocode::{NominatimClient, ReverseGeocode};
pub use pipeline::{LocatorPipeline, LocatorView, MessageKind, PipelineState};
pub use providers::LocationProvider;
pub use types::{Coordinates, CountryCode, CountryRecord, LocatorError};
