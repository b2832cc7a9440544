//! Habitat Locator core library.
//!
//! Resolves the device position to a country dossier through a sequential
//! pipeline (position acquisition, reverse geocoding, country data lookup),
//! and serves an offline application shell via a versioned cache-first store.

pub mod locator;
pub mod offline;
pub mod render;
