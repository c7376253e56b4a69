use std::{collections::BTreeMap, time::Duration};

use _model::{OsmId, ResultRecord, ResultSet, SearchParams, MAX_RESULTS};
use geo::Point;
use itertools::Itertools;
use rand::Rng;
use tracing::{debug, info};

use crate::{error::SearchError, progress::Progress, session::Session};

mod address;
mod enrich;
mod nominatim;
mod normalize;
mod overpass;

pub use nominatim::Nominatim;
pub use overpass::Overpass;

pub const DEFAULT_RADIUS_M: u32 = 10_000;

pub type Tags = BTreeMap<String, String>;

/// Tag lookup where an empty value counts as absent.
pub(crate) fn tag<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str).filter(|x| !x.is_empty())
}

/// One element as returned by the feature source. Nodes carry `position`,
/// ways and relations carry `center`.
#[derive(Clone, Debug)]
pub struct OsmFeature {
    pub id: OsmId,
    pub position: Option<Point>,
    pub center: Option<Point>,
    pub tags: Tags,
}

pub struct FeatureQuery<'a> {
    /// Matched case-insensitively as a substring of the `name` tag.
    pub name: &'a str,
    pub center: Point,
    pub radius_m: u32,
    pub limit: u32,
}

pub trait Geocoder {
    /// Best match for a free-form location, `None` when nothing matched.
    fn locate(&self, location: &str) -> Result<Option<Point>, SearchError>;
}

pub trait FeatureSource {
    fn features(&self, query: &FeatureQuery) -> Result<Vec<OsmFeature>, SearchError>;
}

pub struct SearchPipeline<G, F> {
    geocoder: G,
    source: F,
    radius_m: u32,
    enrich_delay: Duration,
}

impl<G: Geocoder, F: FeatureSource> SearchPipeline<G, F> {
    pub fn new(geocoder: G, source: F) -> Self {
        SearchPipeline {
            geocoder,
            source,
            radius_m: DEFAULT_RADIUS_M,
            enrich_delay: Duration::ZERO,
        }
    }

    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = radius_m;
        self
    }

    pub fn with_enrich_delay(mut self, delay: Duration) -> Self {
        self.enrich_delay = delay;
        self
    }

    /// Runs a search and makes its results the session's current set. On
    /// failure the session keeps whatever it held before.
    pub fn run_search<'s>(
        &self,
        session: &'s mut Session,
        params: SearchParams,
        progress: &mut dyn Progress,
    ) -> Result<&'s ResultSet, SearchError> {
        let results = self.search(&params, progress)?;
        Ok(session.replace(ResultSet { params, results }))
    }

    /// Geocode, query, normalize, filter, truncate and enrich, without
    /// touching any session.
    pub fn search(
        &self,
        params: &SearchParams,
        progress: &mut dyn Progress,
    ) -> Result<Vec<ResultRecord>, SearchError> {
        self.search_with_rng(params, progress, &mut rand::rng())
    }

    pub(crate) fn search_with_rng<R: Rng + ?Sized>(
        &self,
        params: &SearchParams,
        progress: &mut dyn Progress,
        rng: &mut R,
    ) -> Result<Vec<ResultRecord>, SearchError> {
        validate(params)?;

        progress.report(20.0, "Looking up location...");
        let center = self
            .geocoder
            .locate(&params.location)?
            .ok_or_else(|| SearchError::LocationNotFound {
                location: params.location.clone(),
            })?;
        info!(location = %params.location, lat = center.y(), lon = center.x(), "location resolved");

        progress.report(40.0, "Searching for establishments...");
        let features = self.source.features(&FeatureQuery {
            name: &params.establishment_type,
            center,
            radius_m: self.radius_m,
            limit: params.max_results.min(MAX_RESULTS),
        })?;
        info!(count = features.len(), "features returned");

        progress.report(70.0, "Processing results...");
        let normalized = features
            .iter()
            .map(|x| normalize::normalize(x, &params.establishment_type))
            .collect_vec();
        let total = normalized.len();
        let named = normalized
            .into_iter()
            .filter(ResultRecord::has_name)
            .collect_vec();
        debug!(dropped = total - named.len(), "dropped unnamed features");
        let records = named
            .into_iter()
            .take(params.max_results as usize)
            .collect_vec();

        progress.report(90.0, "Finishing...");
        let records = enrich::enrich(records, rng, progress, self.enrich_delay);
        progress.report(100.0, "Done");
        info!(count = records.len(), "search finished");

        Ok(records)
    }
}

fn validate(params: &SearchParams) -> Result<(), SearchError> {
    if params.establishment_type.trim().is_empty() {
        return Err(SearchError::InvalidParameters(
            "establishment type is required".to_string(),
        ));
    }
    if params.location.trim().is_empty() {
        return Err(SearchError::InvalidParameters(
            "location is required".to_string(),
        ));
    }
    if !(1..=MAX_RESULTS).contains(&params.max_results) {
        return Err(SearchError::InvalidParameters(format!(
            "max results must be between 1 and {MAX_RESULTS}, got {}",
            params.max_results
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    pub fn params(establishment_type: &str, location: &str, max_results: u32) -> SearchParams {
        SearchParams {
            establishment_type: establishment_type.to_string(),
            location: location.to_string(),
            max_results,
        }
    }

    pub fn feature(id: u64, pairs: &[(&str, &str)]) -> OsmFeature {
        OsmFeature {
            id: OsmId::Node(id),
            position: Some(Point::new(-46.63, -23.55)),
            center: None,
            tags: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn named(id: u64) -> OsmFeature {
        let name = format!("Pizzaria {id}");
        feature(id, &[("name", name.as_str()), ("amenity", "restaurant")])
    }

    pub struct FakeGeocoder(pub Option<Point>);

    impl Geocoder for FakeGeocoder {
        fn locate(&self, _location: &str) -> Result<Option<Point>, SearchError> {
            Ok(self.0)
        }
    }

    pub fn sao_paulo() -> FakeGeocoder {
        FakeGeocoder(Some(Point::new(-46.6333, -23.5505)))
    }

    /// Serves a fixed feature list, or fails like an unreachable server.
    pub struct FakeSource {
        pub features: Option<Vec<OsmFeature>>,
        pub last_query: Mutex<Option<(String, u32, u32)>>,
    }

    impl FakeSource {
        pub fn serving(features: Vec<OsmFeature>) -> Self {
            FakeSource {
                features: Some(features),
                last_query: Mutex::new(None),
            }
        }

        pub fn down() -> Self {
            FakeSource {
                features: None,
                last_query: Mutex::new(None),
            }
        }
    }

    impl FeatureSource for FakeSource {
        fn features(&self, query: &FeatureQuery) -> Result<Vec<OsmFeature>, SearchError> {
            *self.last_query.lock().unwrap() =
                Some((query.name.to_string(), query.radius_m, query.limit));
            self.features
                .clone()
                .ok_or(SearchError::UpstreamUnavailable {
                    service: "Overpass",
                    status: Some(504),
                    reason: "HTTP 504".to_string(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use _model::UNAVAILABLE;
    use rand::{rngs::StdRng, SeedableRng};

    use super::{testing::*, *};
    use crate::progress::{testing::Recorder, Silent};

    #[test]
    fn unnamed_features_are_dropped() {
        let pipeline = SearchPipeline::new(
            sao_paulo(),
            FakeSource::serving(vec![named(1), feature(2, &[("amenity", "restaurant")]), named(3)]),
        );
        let mut session = Session::default();

        let set = pipeline
            .run_search(&mut session, params("pizzaria", "São Paulo", 10), &mut Silent)
            .unwrap();

        assert_eq!(set.results.len(), 2);
        assert_eq!(set.results.iter().map(|x| x.id).collect_vec(), vec![1, 3]);
        assert!(set.results.iter().all(|x| x.name != UNAVAILABLE));
        assert_eq!(session.current().unwrap().params.location, "São Paulo");
    }

    #[test]
    fn truncation_keeps_source_order() {
        let pipeline = SearchPipeline::new(
            sao_paulo(),
            FakeSource::serving(vec![
                feature(9, &[]),
                named(5),
                named(4),
                named(8),
                named(1),
            ]),
        );

        let results = pipeline
            .search(&params("pizzaria", "São Paulo", 3), &mut Silent)
            .unwrap();
        assert_eq!(results.iter().map(|x| x.id).collect_vec(), vec![5, 4, 8]);
    }

    #[test]
    fn every_result_is_enriched() {
        let pipeline =
            SearchPipeline::new(sao_paulo(), FakeSource::serving((1..=12).map(named).collect()));
        let results = pipeline
            .search_with_rng(
                &params("pizzaria", "São Paulo", 50),
                &mut Silent,
                &mut StdRng::seed_from_u64(11),
            )
            .unwrap();

        assert_eq!(results.len(), 12);
        assert!(results
            .iter()
            .all(|x| x.average_rating.is_some() && x.review_count.is_some() && x.is_synthetic));
    }

    #[test]
    fn query_uses_params_and_radius() {
        let source = FakeSource::serving(Vec::new());
        let pipeline = SearchPipeline::new(sao_paulo(), source).with_radius(2_500);

        let results = pipeline
            .search(&params("farmácia", "Campinas", 7), &mut Silent)
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(
            *pipeline.source.last_query.lock().unwrap(),
            Some(("farmácia".to_string(), 2_500, 7))
        );
    }

    #[test]
    fn unknown_location_leaves_session_untouched() {
        let mut session = Session::default();
        SearchPipeline::new(sao_paulo(), FakeSource::serving(vec![named(1)]))
            .run_search(&mut session, params("pizzaria", "São Paulo", 5), &mut Silent)
            .unwrap();
        let before = session.current().cloned();

        let source = FakeSource::serving(vec![named(2)]);
        let pipeline = SearchPipeline::new(FakeGeocoder(None), source);
        let err = pipeline
            .run_search(&mut session, params("pizzaria", "Nonexistentville", 5), &mut Silent)
            .unwrap_err();

        assert!(matches!(
            &err,
            SearchError::LocationNotFound { location } if location == "Nonexistentville"
        ));
        assert_eq!(err.to_string(), "location not found: Nonexistentville");
        assert_eq!(*pipeline.source.last_query.lock().unwrap(), None);
        assert_eq!(session.current().cloned(), before);
    }

    #[test]
    fn upstream_failure_leaves_session_untouched() {
        let mut session = Session::default();
        SearchPipeline::new(sao_paulo(), FakeSource::serving(vec![named(1)]))
            .run_search(&mut session, params("pizzaria", "São Paulo", 5), &mut Silent)
            .unwrap();
        let before = session.current().cloned();

        let err = SearchPipeline::new(sao_paulo(), FakeSource::down())
            .run_search(&mut session, params("bar", "São Paulo", 5), &mut Silent)
            .unwrap_err();

        assert!(matches!(
            err,
            SearchError::UpstreamUnavailable { status: Some(504), .. }
        ));
        assert_eq!(session.current().cloned(), before);
    }

    #[test]
    fn progress_is_monotonic() {
        let pipeline =
            SearchPipeline::new(sao_paulo(), FakeSource::serving((1..=4).map(named).collect()));
        let mut progress = Recorder::default();
        pipeline
            .search(&params("pizzaria", "São Paulo", 10), &mut progress)
            .unwrap();

        assert!(progress.is_monotonic(), "{:?}", progress.reports);
        let percents = progress.reports.iter().map(|x| x.0).collect_vec();
        for milestone in [20.0, 40.0, 70.0, 90.0, 100.0] {
            assert!(percents.contains(&milestone), "missing {milestone}");
        }
        assert_eq!(percents.last(), Some(&100.0));
    }

    #[test]
    fn rejects_bad_params() {
        let pipeline = SearchPipeline::new(sao_paulo(), FakeSource::serving(vec![named(1)]));
        for bad in [
            params("", "São Paulo", 5),
            params("pizzaria", "   ", 5),
            params("pizzaria", "São Paulo", 0),
            params("pizzaria", "São Paulo", 51),
        ] {
            assert!(matches!(
                pipeline.search(&bad, &mut Silent),
                Err(SearchError::InvalidParameters(_))
            ));
        }
    }
}
