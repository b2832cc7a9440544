use clap::Parser;
use habitat_locator::locator::pipeline::{LocatorView, MessageKind, PipelineState};
use habitat_locator::locator::types::{Coordinates, CountryRecord};
use habitat_locator::locator::{providers, LocatorPipeline, NominatimClient, RestCountriesClient};
use habitat_locator::offline::{
    install, CacheStore, CachingFetcher, FetchStrategy, ShellManifest, UreqFetcher, CACHE_NAME,
};
use habitat_locator::render;
use std::path::PathBuf;

/// Habitat Locator — locate this device and load its country dossier.
///
/// Acquires your position (IP geolocation by default), reverse-geocodes it to
/// a country, and fetches descriptive country data.
///
/// Examples:
///   habitat
///   habitat --lat -23.5505 --lon -46.6333
///   habitat --lang fra --json
///   habitat --offline --lat 59.3293 --lon 18.0686
#[derive(Parser)]
#[command(name = "habitat", version, about, long_about = None)]
struct Cli {
    /// Latitude (-90 to 90). Skips position acquisition.
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude (-180 to 180). Skips position acquisition.
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// Offline mode: never call the geolocation service.
    #[arg(long)]
    offline: bool,

    /// Translation key for the localized country name (ISO 639-3, e.g. por, fra).
    #[arg(long, default_value = "por")]
    lang: String,

    /// Print the dossier as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Cache directory (defaults to ~/.habitat/cache).
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

/// Terminal view: status lines to stderr, the dossier to stdout.
struct TerminalView {
    json: bool,
}

impl LocatorView for TerminalView {
    fn message(&mut self, kind: MessageKind, text: &str) {
        let glyph = match kind {
            MessageKind::Info => "\u{2139}",
            MessageKind::Loading => "\u{23F3}",
            MessageKind::Success => "\u{2705}",
            MessageKind::Error => "\u{274C}",
        };
        eprintln!("  {} {}", glyph, text);
    }

    fn set_busy(&mut self, _busy: bool) {
        // No control to disable in a one-shot CLI run; the pipeline guard
        // covers re-entry.
    }

    fn show_dossier(&mut self, coords: Coordinates, record: &CountryRecord) {
        if self.json {
            let payload = serde_json::json!({
                "coordinates": coords,
                "country": record,
            });
            match serde_json::to_string_pretty(&payload) {
                Ok(json) => println!("{}", json),
                Err(err) => eprintln!("Error: cannot serialize dossier: {}", err),
            }
        } else {
            println!("{}", render::dossier(coords, record));
        }
    }

    fn hide_dossier(&mut self) {}
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // ── Offline cache lifecycle ─────────────────────────────────

    let root = cli.cache_dir.unwrap_or_else(CacheStore::default_root);
    CacheStore::activate(&root, CACHE_NAME);
    let mut store = CacheStore::open(&root, CACHE_NAME);

    let network = UreqFetcher::new();
    if store.is_empty() && !cli.offline {
        install(&mut store, &network, &ShellManifest::default());
    }
    let fetcher = CachingFetcher::new(store, network, FetchStrategy::CacheFirst);

    // ── Pipeline wiring ─────────────────────────────────────────

    let manual = cli.lat.zip(cli.lon);
    let provider = providers::select(manual, cli.offline, &fetcher).unwrap_or_else(|err| {
        eprintln!("Error: {}", err);
        std::process::exit(2);
    });

    let geocoder = NominatimClient::new(&fetcher);
    let countries = RestCountriesClient::new(&fetcher, cli.lang);
    let mut pipeline = LocatorPipeline::new(provider, geocoder, countries);

    let mut view = TerminalView { json: cli.json };
    if pipeline.run(&mut view) != PipelineState::Success {
        std::process::exit(1);
    }
}
