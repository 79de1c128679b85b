use std::sync::Arc;

use tracing::{debug, info, warn};

use super::catalog::DatasetInfo;
use super::error::QueryError;
use crate::coordinate::Coordinate;
use crate::fetch::{FetchExecutor, FetchRequest, Page, PageLimits, QueryTemplate};
use crate::filter::{
    compile, Center, FilterSpec, InvalidFilter, Proximity, SearchRequest, DEFAULT_MASS_MAX,
    DEFAULT_MASS_MIN, DEFAULT_YEAR_MAX, DEFAULT_YEAR_MIN,
};
use crate::geocode::{GeocodeCache, ReverseGeocode};
use crate::sql::Table;
use crate::store::{DatasetStats, DatasetType, Record, SpatialStore};

/// Row count returned by [`DatasetQueries::largest`] when none is given.
pub const DEFAULT_LARGEST: u32 = 10;

/// End-to-end dataset operations: resolve, compile, fetch.
///
/// Holds its collaborators by handle; clones share the same store, cache
/// and executor.
#[derive(Clone)]
pub struct DatasetQueries {
    store: Arc<dyn SpatialStore>,
    executor: FetchExecutor,
    geocoder: GeocodeCache,
    limits: PageLimits,
}

impl DatasetQueries {
    /// Create queries over `store`, resolving places through `geocoder`.
    pub fn new(store: Arc<dyn SpatialStore>, geocoder: GeocodeCache) -> Self {
        DatasetQueries {
            executor: FetchExecutor::new(Arc::clone(&store)),
            store,
            geocoder,
            limits: PageLimits::default(),
        }
    }

    /// Replace the default page limits.
    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Bound the number of concurrent sub-queries per call.
    pub fn with_max_fanout(mut self, max_fanout: usize) -> Self {
        self.executor = self.executor.with_max_fanout(max_fanout);
        self
    }

    pub fn limits(&self) -> &PageLimits {
        &self.limits
    }

    pub fn geocoder(&self) -> &GeocodeCache {
        &self.geocoder
    }

    /// Resolve the request's center (if any), compile every filter into one
    /// predicate, and run a single query.
    pub async fn search(
        &self,
        template: QueryTemplate,
        request: SearchRequest,
    ) -> Result<Vec<Record>, QueryError> {
        let SearchRequest {
            mut filter,
            center,
            radius_meters,
            page,
        } = request;

        check_applicable(template.table, &filter)?;

        if let Some(center) = center {
            let (lat, lon) = self.resolve_center(center).await?;
            filter.radius_center = Some(Proximity::new(lat, lon, radius_meters));
        }

        self.run(template, &filter, page).await
    }

    /// [`search`](Self::search) over the meteorite table, newest first.
    pub async fn search_meteorites(&self, request: SearchRequest) -> Result<Vec<Record>, QueryError> {
        self.search(QueryTemplate::meteorites(), request).await
    }

    /// [`search`](Self::search) over the unified dataset table.
    pub async fn search_datasets(&self, request: SearchRequest) -> Result<Vec<Record>, QueryError> {
        self.search(QueryTemplate::datasets(), request).await
    }

    /// Meteorites within `radius_meters` of `center` that also match `filter`.
    pub async fn nearby(
        &self,
        center: Coordinate,
        radius_meters: f64,
        filter: FilterSpec,
        page: Page,
    ) -> Result<Vec<Record>, QueryError> {
        let filter = filter.near(center.lat(), center.lon(), radius_meters);
        self.run(QueryTemplate::meteorites(), &filter, page).await
    }

    /// Forward-resolve `place`, then [`nearby`](Self::nearby).
    pub async fn near_place(
        &self,
        place: &str,
        radius_meters: f64,
        filter: FilterSpec,
        page: Page,
    ) -> Result<Vec<Record>, QueryError> {
        check_applicable(Table::Locations, &filter)?;
        let center = self.geocoder.resolve_forward(place).await?;
        self.nearby(center, radius_meters, filter, page).await
    }

    /// Legacy nearby search: proximity, year range and mass range run as
    /// three separate queries and their rows are concatenated.
    ///
    /// This is the union of the three match sets, not their intersection, so
    /// a row matching several predicates appears several times. Callers that
    /// mean "near AND in range" want [`nearby`](Self::nearby).
    pub async fn nearby_any(
        &self,
        center: Coordinate,
        radius_meters: f64,
        filter: FilterSpec,
        page: Page,
    ) -> Result<Vec<Record>, QueryError> {
        warn!(%center, radius_meters, "legacy OR fan-out nearby search");

        let proximity = FilterSpec::new().near(center.lat(), center.lon(), radius_meters);
        let years = FilterSpec::new()
            .year_min(filter.year_min.unwrap_or(DEFAULT_YEAR_MIN))
            .year_max(filter.year_max.unwrap_or(DEFAULT_YEAR_MAX));
        let masses = FilterSpec::new()
            .mass_min(filter.mass_min.unwrap_or(DEFAULT_MASS_MIN))
            .mass_max(filter.mass_max.unwrap_or(DEFAULT_MASS_MAX));

        let mut requests = Vec::with_capacity(3);
        for spec in [proximity, years, masses] {
            requests.push(FetchRequest::new(QueryTemplate::meteorites(), page).and(compile(&spec)?));
        }

        let rows = self.executor.execute(requests).await?.into_rows();
        info!(rows = rows.len(), "legacy nearby search complete");
        Ok(rows)
    }

    /// Heaviest meteorites first.
    pub async fn largest(&self, limit: Option<u32>) -> Result<Vec<Record>, QueryError> {
        let page = Page::with_limits(Some(limit.unwrap_or(DEFAULT_LARGEST)), None, &self.limits);
        let request = FetchRequest::new(QueryTemplate::largest_meteorites(), page);
        let rows = self.executor.execute(vec![request]).await?.into_rows();
        info!(rows = rows.len(), "largest meteorites");
        Ok(rows)
    }

    /// Display name for a point. Only invalid coordinates fail; resolver
    /// trouble degrades to a synthesised name.
    pub async fn locate(&self, lat: f64, lon: f64) -> Result<ReverseGeocode, QueryError> {
        let at = Coordinate::new(lat, lon)?;
        Ok(self.geocoder.resolve_reverse(at).await)
    }

    /// Forward-geocode a place name through the cache.
    pub async fn coordinates(&self, place: &str) -> Result<Coordinate, QueryError> {
        Ok(self.geocoder.resolve_forward(place).await?)
    }

    /// Catalogue of dataset types that currently have rows.
    pub async fn dataset_types(&self) -> Result<Vec<DatasetInfo>, QueryError> {
        let summaries = self.store.summaries().await?;
        let infos: Vec<DatasetInfo> = summaries.iter().map(DatasetInfo::from).collect();
        info!(types = infos.len(), "dataset types");
        Ok(infos)
    }

    /// Aggregate statistics for one dataset type.
    pub async fn dataset_stats(&self, dataset_type: DatasetType) -> Result<DatasetStats, QueryError> {
        Ok(self.store.stats(dataset_type).await?)
    }

    async fn resolve_center(&self, center: Center) -> Result<(f64, f64), QueryError> {
        match center {
            Center::Coordinates { lat, lon } => Ok((lat, lon)),
            Center::Place(place) => {
                let resolved = self.geocoder.resolve_forward(&place).await?;
                debug!(place = %place, center = %resolved, "search center resolved");
                Ok((resolved.lat(), resolved.lon()))
            }
        }
    }

    async fn run(
        &self,
        template: QueryTemplate,
        filter: &FilterSpec,
        page: Page,
    ) -> Result<Vec<Record>, QueryError> {
        check_applicable(template.table, filter)?;
        let predicate = compile(filter)?;
        let request = FetchRequest::new(template, page).and(predicate);
        let rows = self.executor.execute(vec![request]).await?.into_rows();
        info!(
            table = template.table.name(),
            rows = rows.len(),
            limit = page.limit(),
            offset = page.offset(),
            "search complete"
        );
        Ok(rows)
    }
}

/// Value and dataset type columns exist only on the unified table.
fn check_applicable(table: Table, filter: &FilterSpec) -> Result<(), InvalidFilter> {
    if table == Table::Locations && (filter.has_value_range() || filter.dataset_type.is_some()) {
        return Err(InvalidFilter::Conflict(
            "value and dataset type filters apply to datasets only".into(),
        ));
    }
    Ok(())
}
