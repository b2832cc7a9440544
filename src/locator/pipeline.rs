//! The locator pipeline: sequences the three steps and drives the view.
//!
//! Flow: Idle -(run)-> Loading -> Success | Error. A run while Loading is a
//! no-op, so at most one execution is ever in flight. Success and Error both
//! allow the next run.

use super::countries::CountryData;
use super::geocode::ReverseGeocode;
use super::providers::LocationProvider;
use super::types::{Coordinates, CountryRecord, LocatorError};

/// Pipeline lifecycle state. Drives control enablement in the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Loading,
    Success,
    Error,
}

/// Status classes for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Loading,
    Success,
    Error,
}

/// Presentation seam. The pipeline never touches output directly; a view
/// implementation renders status messages and the final dossier.
pub trait LocatorView {
    fn message(&mut self, kind: MessageKind, text: &str);
    /// Mirrors the triggering control: busy means disabled.
    fn set_busy(&mut self, busy: bool);
    fn show_dossier(&mut self, coords: Coordinates, record: &CountryRecord);
    fn hide_dossier(&mut self);
}

/// Sequences position acquisition, reverse geocoding, and the country lookup.
pub struct LocatorPipeline<P, G, C> {
    provider: P,
    geocoder: G,
    countries: C,
    state: PipelineState,
}

impl<P, G, C> LocatorPipeline<P, G, C>
where
    P: LocationProvider,
    G: ReverseGeocode,
    C: CountryData,
{
    pub fn new(provider: P, geocoder: G, countries: C) -> Self {
        Self {
            provider,
            geocoder,
            countries,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run the pipeline once. Returns the terminal state.
    ///
    /// The view's busy flag is cleared on every exit path, so the triggering
    /// control never stays disabled.
    pub fn run(&mut self, view: &mut dyn LocatorView) -> PipelineState {
        if self.state == PipelineState::Loading {
            return PipelineState::Loading;
        }
        self.state = PipelineState::Loading;
        view.set_busy(true);
        view.hide_dossier();

        self.state = match self.execute(view) {
            Ok(()) => PipelineState::Success,
            Err(err) => {
                log::debug!("pipeline step failed: {:?}", err);
                view.message(MessageKind::Error, &format!("Locating failed: {}.", err));
                PipelineState::Error
            }
        };

        view.set_busy(false);
        self.state
    }

    fn execute(&mut self, view: &mut dyn LocatorView) -> Result<(), LocatorError> {
        view.message(MessageKind::Loading, "Acquiring your position...");
        let coords = self.provider.acquire()?.rounded();

        view.message(MessageKind::Loading, "Looking up the country code...");
        let code = self.geocoder.resolve_country(coords)?;

        view.message(MessageKind::Loading, "Fetching the country dossier...");
        let record = self.countries.fetch_details(&code)?;

        view.show_dossier(coords, &record);
        view.message(MessageKind::Success, "Dossier loaded.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::types::{CountryCode, CountryRecord};
    use std::cell::Cell;

    // ── Step stubs ──────────────────────────────────────────────

    struct StubProvider {
        reply: Result<Coordinates, LocatorError>,
        calls: Cell<usize>,
    }

    impl StubProvider {
        fn ok(lat: f64, lon: f64) -> Self {
            Self {
                reply: Ok(Coordinates::new(lat, lon)),
                calls: Cell::new(0),
            }
        }

        fn failing(err: LocatorError) -> Self {
            Self {
                reply: Err(err),
                calls: Cell::new(0),
            }
        }
    }

    impl LocationProvider for StubProvider {
        fn acquire(&self) -> Result<Coordinates, LocatorError> {
            self.calls.set(self.calls.get() + 1);
            self.reply.clone()
        }
    }

    struct StubGeocoder(Result<&'static str, LocatorError>);

    impl ReverseGeocode for StubGeocoder {
        fn resolve_country(&self, _coords: Coordinates) -> Result<CountryCode, LocatorError> {
            self.0.clone().and_then(CountryCode::parse)
        }
    }

    struct StubCountries(Result<CountryRecord, LocatorError>);

    impl CountryData for StubCountries {
        fn fetch_details(&self, _code: &CountryCode) -> Result<CountryRecord, LocatorError> {
            self.0.clone()
        }
    }

    fn brazil() -> CountryRecord {
        CountryRecord {
            common_name: "Brazil".into(),
            localized_name: Some("Brasil".into()),
            capital: Some("Brasília".into()),
            population: 212_559_417,
            region: "Americas".into(),
            subregion: Some("South America".into()),
            timezone: Some("UTC-05:00".into()),
            flag: Some("🇧🇷".into()),
        }
    }

    // ── Recording view ──────────────────────────────────────────

    #[derive(Default)]
    struct RecordingView {
        messages: Vec<(MessageKind, String)>,
        busy_log: Vec<bool>,
        dossier: Option<(Coordinates, CountryRecord)>,
        hides: usize,
    }

    impl LocatorView for RecordingView {
        fn message(&mut self, kind: MessageKind, text: &str) {
            self.messages.push((kind, text.to_string()));
        }

        fn set_busy(&mut self, busy: bool) {
            self.busy_log.push(busy);
        }

        fn show_dossier(&mut self, coords: Coordinates, record: &CountryRecord) {
            self.dossier = Some((coords, record.clone()));
        }

        fn hide_dossier(&mut self) {
            self.dossier = None;
            self.hides += 1;
        }
    }

    fn happy_pipeline() -> LocatorPipeline<StubProvider, StubGeocoder, StubCountries> {
        LocatorPipeline::new(
            StubProvider::ok(-23.550_519, -46.633_308),
            StubGeocoder(Ok("br")),
            StubCountries(Ok(brazil())),
        )
    }

    #[test]
    fn test_successful_run() {
        let mut pipeline = happy_pipeline();
        let mut view = RecordingView::default();

        assert_eq!(pipeline.run(&mut view), PipelineState::Success);
        assert_eq!(pipeline.state(), PipelineState::Success);

        let (coords, record) = view.dossier.as_ref().unwrap();
        // Coordinates reach the view already rounded to 4 decimals.
        assert_eq!(coords.to_string(), "-23.5505, -46.6333");
        assert_eq!(record.region, "Americas");
        assert_eq!(view.busy_log, vec![true, false]);
        assert_eq!(
            view.messages.last().unwrap(),
            &(MessageKind::Success, "Dossier loaded.".to_string())
        );
    }

    #[test]
    fn test_provider_failure_short_circuits() {
        let mut pipeline = LocatorPipeline::new(
            StubProvider::failing(LocatorError::PermissionDenied),
            StubGeocoder(Ok("br")),
            StubCountries(Ok(brazil())),
        );
        let mut view = RecordingView::default();

        assert_eq!(pipeline.run(&mut view), PipelineState::Error);
        assert!(view.dossier.is_none());
        let (kind, text) = view.messages.last().unwrap();
        assert_eq!(*kind, MessageKind::Error);
        assert!(text.starts_with("Locating failed: "));
        assert!(text.contains("permission denied"));
        // Control re-enabled despite the failure.
        assert_eq!(view.busy_log, vec![true, false]);
    }

    #[test]
    fn test_geocode_failure_never_shows_partial_result() {
        let mut pipeline = LocatorPipeline::new(
            StubProvider::ok(0.0, 0.0),
            StubGeocoder(Err(LocatorError::CountryNotResolved)),
            StubCountries(Ok(brazil())),
        );
        let mut view = RecordingView::default();

        assert_eq!(pipeline.run(&mut view), PipelineState::Error);
        assert!(view.dossier.is_none());
    }

    #[test]
    fn test_details_failure_is_terminal_error() {
        let mut pipeline = LocatorPipeline::new(
            StubProvider::ok(0.0, 0.0),
            StubGeocoder(Ok("br")),
            StubCountries(Err(LocatorError::DetailsTimeout)),
        );
        let mut view = RecordingView::default();

        assert_eq!(pipeline.run(&mut view), PipelineState::Error);
        assert!(view
            .messages
            .last()
            .unwrap()
            .1
            .contains("timed out while fetching the country dossier"));
    }

    #[test]
    fn test_run_while_loading_is_a_noop() {
        let mut pipeline = happy_pipeline();
        pipeline.state = PipelineState::Loading;
        let mut view = RecordingView::default();

        assert_eq!(pipeline.run(&mut view), PipelineState::Loading);
        assert_eq!(pipeline.provider.calls.get(), 0);
        assert!(view.messages.is_empty());
        assert!(view.busy_log.is_empty());
    }

    #[test]
    fn test_rerun_after_error_is_allowed() {
        let mut pipeline = LocatorPipeline::new(
            StubProvider::failing(LocatorError::PositionUnavailable),
            StubGeocoder(Ok("br")),
            StubCountries(Ok(brazil())),
        );
        let mut view = RecordingView::default();

        assert_eq!(pipeline.run(&mut view), PipelineState::Error);
        assert_eq!(pipeline.run(&mut view), PipelineState::Error);
        assert_eq!(pipeline.provider.calls.get(), 2);
    }

    #[test]
    fn test_end_to_end_sao_paulo() {
        use crate::locator::countries::RestCountriesClient;
        use crate::locator::geocode::NominatimClient;
        use crate::locator::providers::ManualProvider;
        use crate::offline::fetch::{Fetch, FetchError, HttpRequest, HttpResponse};
        use crate::render;

        /// Routes by URL: geocode replies "br", country data replies Brazil.
        struct RouterFetch;

        impl Fetch for RouterFetch {
            fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
                let body: &[u8] = if request.url.contains("/reverse?") {
                    assert!(request.url.contains("lat=-23.5505&lon=-46.6333"));
                    r#"{"address": {"country_code": "br"}}"#.as_bytes()
                } else {
                    assert!(request.url.ends_with("/alpha/BR"));
                    r#"[{
                        "name": {"common": "Brazil"},
                        "translations": {"por": {"common": "Brasil"}},
                        "capital": ["Brasília"],
                        "population": 212559417,
                        "region": "Americas",
                        "subregion": "South America",
                        "timezones": ["UTC-05:00"]
                    }]"#
                    .as_bytes()
                };
                Ok(HttpResponse::new(200, Some("application/json".into()), body.to_vec()))
            }
        }

        let fetch = RouterFetch;
        let mut pipeline = LocatorPipeline::new(
            ManualProvider::new(-23.5505, -46.6333).unwrap(),
            NominatimClient::with_base(&fetch, "https://geo.test"),
            RestCountriesClient::with_base(&fetch, "https://countries.test", "por"),
        );
        let mut view = RecordingView::default();

        assert_eq!(pipeline.run(&mut view), PipelineState::Success);
        let (coords, record) = view.dossier.as_ref().unwrap();
        assert_eq!(record.capital.as_deref(), Some("Brasília"));
        assert_eq!(
            render::region_line(&record.region, record.subregion.as_deref()),
            "Americas (South America)"
        );
        assert!(render::dossier(*coords, record).contains("-23.5505, -46.6333"));
    }

    #[test]
    fn test_prior_dossier_hidden_on_new_run() {
        let mut pipeline = happy_pipeline();
        let mut view = RecordingView::default();
        pipeline.run(&mut view);
        assert!(view.dossier.is_some());

        pipeline.run(&mut view);
        assert_eq!(view.hides, 2);
        assert!(view.dossier.is_some());
    }
}
