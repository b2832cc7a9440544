//! Country dossier lookup via the REST Countries service.

use super::types::{CountryCode, CountryRecord, LocatorError};
use crate::offline::fetch::{Fetch, FetchError, HttpRequest};
use serde::Deserialize;
use std::collections::HashMap;

pub const REST_COUNTRIES_BASE: &str = "https://restcountries.com/v3.1";

/// Maps a country code to its dossier record.
pub trait CountryData {
    fn fetch_details(&self, code: &CountryCode) -> Result<CountryRecord, LocatorError>;
}

#[derive(Deserialize)]
struct CountryReply {
    name: NameReply,
    #[serde(default)]
    translations: HashMap<String, TranslationReply>,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    population: u64,
    #[serde(default)]
    region: String,
    #[serde(default)]
    subregion: Option<String>,
    #[serde(default)]
    timezones: Vec<String>,
    #[serde(default)]
    flag: Option<String>,
}

#[derive(Deserialize)]
struct NameReply {
    common: String,
}

#[derive(Deserialize)]
struct TranslationReply {
    #[serde(default)]
    common: Option<String>,
}

impl CountryReply {
    fn into_record(self, lang: &str) -> CountryRecord {
        let localized_name = self
            .translations
            .get(lang)
            .and_then(|t| t.common.clone())
            .filter(|name| !name.is_empty());

        CountryRecord {
            common_name: self.name.common,
            localized_name,
            capital: self.capital.into_iter().next(),
            population: self.population,
            region: self.region,
            subregion: self.subregion.filter(|s| !s.is_empty()),
            timezone: self.timezones.into_iter().next(),
            flag: self.flag,
        }
    }
}

/// REST Countries `/alpha/{code}` client. The service may return several
/// variants; the first element of the reply array is authoritative.
pub struct RestCountriesClient<F> {
    fetch: F,
    base: String,
    lang: String,
}

impl<F: Fetch> RestCountriesClient<F> {
    pub fn new(fetch: F, lang: impl Into<String>) -> Self {
        Self::with_base(fetch, REST_COUNTRIES_BASE, lang)
    }

    pub fn with_base(fetch: F, base: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            fetch,
            base: base.into(),
            lang: lang.into(),
        }
    }
}

impl<F: Fetch> CountryData for RestCountriesClient<F> {
    fn fetch_details(&self, code: &CountryCode) -> Result<CountryRecord, LocatorError> {
        let request = HttpRequest::get(format!("{}/alpha/{}", self.base, code.as_str()));

        let response = self.fetch.fetch(&request).map_err(|err| match err {
            FetchError::TimedOut => LocatorError::DetailsTimeout,
            FetchError::Status(status) => {
                log::debug!("country data returned HTTP {}", status);
                LocatorError::DetailsNotFound
            }
            FetchError::Network(msg) => LocatorError::Unknown(msg),
        })?;

        let replies: Vec<CountryReply> = serde_json::from_slice(&response.body).map_err(|err| {
            log::debug!("malformed country data reply: {}", err);
            LocatorError::DetailsNotFound
        })?;

        replies
            .into_iter()
            .next()
            .map(|reply| reply.into_record(&self.lang))
            .ok_or(LocatorError::DetailsNotFound)
    }
}
