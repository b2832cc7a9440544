//! Dossier text rendering.

use crate::locator::types::{Coordinates, CountryRecord};

const FLAG_PLACEHOLDER: &str = "\u{2753}";

/// Localized name when the provider carries one, common name otherwise.
pub fn display_name(record: &CountryRecord) -> &str {
    record
        .localized_name
        .as_deref()
        .unwrap_or(&record.common_name)
}

/// Thousands grouping, e.g. 212559417 -> "212,559,417".
pub fn format_population(population: u64) -> String {
    let digits = population.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// "Americas (South America)", or "(Global)" when no subregion is known.
pub fn region_line(region: &str, subregion: Option<&str>) -> String {
    format!("{} ({})", region, subregion.unwrap_or("Global"))
}

/// The full dossier block, coordinates at 4-decimal precision.
pub fn dossier(coords: Coordinates, record: &CountryRecord) -> String {
    format!(
        "{}  {}\n  Coordinates: {}\n  Capital:     {}\n  Population:  {}\n  Region:      {}\n  Timezone:    {}\n",
        record.flag.as_deref().unwrap_or(FLAG_PLACEHOLDER),
        display_name(record),
        coords.rounded(),
        record.capital.as_deref().unwrap_or("N/A"),
        format_population(record.population),
        region_line(&record.region, record.subregion.as_deref()),
        record.timezone.as_deref().unwrap_or("N/A"),
    )
}
