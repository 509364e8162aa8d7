use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use super::chart::ChartSpec;
use super::metric::ScalarMetric;
use super::panels::{ChartKind, MetricKind, Views};
use super::preview::to_preview;
use crate::config::DashboardConfig;
use crate::data::cache::TableCache;
use crate::data::filter::{FilterDimension, Selection, Selections};
use crate::data::model::{CellValue, DatasetKind, Table};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Dashboard session
// ---------------------------------------------------------------------------

/// Everything one user sees: cached tables, filter selections and the
/// computed panels.
///
/// Changing a selection only marks the affected dataset dirty; [`refresh`]
/// then recomputes the filtered view and the charts and metrics reading it.
/// Each panel keeps its own `Result`, so one failure never hides the rest.
///
/// [`refresh`]: DashboardSession::refresh
pub struct DashboardSession {
    config: DashboardConfig,
    cache: TableCache,
    selections: Selections,
    base: BTreeMap<DatasetKind, Result<Arc<Table>>>,
    views: BTreeMap<DatasetKind, Result<Arc<Table>>>,
    charts: BTreeMap<ChartKind, Result<ChartSpec>>,
    metrics: BTreeMap<MetricKind, Result<ScalarMetric>>,
    dirty: BTreeSet<DatasetKind>,
}

impl DashboardSession {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = TableCache::new(&config);
        Self::with_cache(config, cache)
    }

    /// A session over a prepared cache (fixtures, custom locations).
    pub fn with_cache(config: DashboardConfig, cache: TableCache) -> Self {
        Self {
            config,
            cache,
            selections: Selections::default(),
            base: BTreeMap::new(),
            views: BTreeMap::new(),
            charts: BTreeMap::new(),
            metrics: BTreeMap::new(),
            dirty: DatasetKind::ALL.into_iter().collect(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Load every dataset and compute all panels. Returns how many datasets loaded.
    pub fn load_all(&mut self) -> usize {
        self.refresh();
        self.base.values().filter(|t| t.is_ok()).count()
    }

    /// Read datasets from another directory, dropping everything cached.
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        log::info!("Switching data directory to {}", dir.display());
        self.config.data_dir = dir;
        self.cache = TableCache::new(&self.config);
        self.mark_all_dirty();
    }

    pub fn reload(&mut self, kind: DatasetKind) {
        self.cache.invalidate(kind);
        self.dirty.insert(kind);
    }

    pub fn reload_all(&mut self) {
        self.cache.invalidate_all();
        self.mark_all_dirty();
    }

    fn mark_all_dirty(&mut self) {
        self.dirty.extend(DatasetKind::ALL);
    }

    // -- Selections --

    pub fn selection(&self, dimension: FilterDimension) -> &Selection {
        self.selections.get(dimension)
    }

    pub fn set_selection(&mut self, dimension: FilterDimension, selection: Selection) {
        self.selections.set(dimension, selection);
        self.dirty.insert(dimension.dataset());
    }

    pub fn toggle(&mut self, dimension: FilterDimension, value: &CellValue) {
        let options = self.options(dimension);
        self.selections.toggle(dimension, value, &options);
        self.dirty.insert(dimension.dataset());
    }

    pub fn select_all(&mut self, dimension: FilterDimension) {
        self.set_selection(dimension, Selection::All);
    }

    pub fn select_none(&mut self, dimension: FilterDimension) {
        self.set_selection(dimension, Selection::Only(BTreeSet::new()));
    }

    /// Values offered by `dimension`'s multi-select, from the unfiltered table.
    pub fn options(&self, dimension: FilterDimension) -> BTreeSet<CellValue> {
        match self.base.get(&dimension.dataset()) {
            Some(Ok(table)) => dimension.options(table),
            _ => BTreeSet::new(),
        }
    }

    // -- Recomputation --

    /// Recompute whatever depends on a dirty dataset.
    /// Returns the number of charts and metrics recomputed.
    pub fn refresh(&mut self) -> usize {
        if self.dirty.is_empty() {
            return 0;
        }
        let dirty = std::mem::take(&mut self.dirty);

        for &kind in &dirty {
            let base = self.cache.get(kind);
            let view = base.as_ref().map_err(Clone::clone).and_then(|table| {
                self.selections
                    .apply(FilterDimension::for_dataset(kind), table)
            });
            if let Err(e) = &view {
                if base.is_ok() {
                    log::warn!("Filter on {kind} skipped: {e}");
                }
            }
            self.base.insert(kind, base);
            self.views.insert(kind, view);
        }

        let views: Views = self
            .views
            .iter()
            .filter_map(|(kind, view)| view.as_ref().ok().map(|t| (*kind, Arc::clone(t))))
            .collect();

        let mut recomputed = 0;
        for chart in ChartKind::ALL {
            if !chart.datasets().iter().any(|d| dirty.contains(d)) {
                continue;
            }
            let outcome = match self.failed_view(chart.datasets()) {
                Some(err) => Err(err),
                None => chart.compute(&views, self.config.top_n),
            };
            if let Err(e) = &outcome {
                log::warn!("Skipping chart '{}': {e}", chart.title(self.config.top_n));
            }
            self.charts.insert(chart, outcome);
            recomputed += 1;
        }

        for metric in MetricKind::ALL {
            if !dirty.contains(&metric.dataset()) {
                continue;
            }
            let outcome = match self.failed_view(&[metric.dataset()]) {
                Some(err) => Err(err),
                None => metric.compute(&views),
            };
            if let Err(e) = &outcome {
                log::warn!("Skipping metric '{}': {e}", metric.label());
            }
            self.metrics.insert(metric, outcome);
            recomputed += 1;
        }

        log::debug!("Refreshed {dirty:?}: {recomputed} panels recomputed");
        recomputed
    }

    /// The first dataset among `kinds` whose view failed, as that error.
    fn failed_view(&self, kinds: &[DatasetKind]) -> Option<DashboardError> {
        kinds.iter().find_map(|kind| match self.views.get(kind) {
            Some(Err(e)) => Some(e.clone()),
            _ => None,
        })
    }

    // -- Views for the presentation layer --

    /// Unfiltered table, or why it could not be loaded.
    pub fn base_table(&self, kind: DatasetKind) -> Option<&Result<Arc<Table>>> {
        self.base.get(&kind)
    }

    /// Filtered table for `kind`.
    pub fn view(&self, kind: DatasetKind) -> Option<&Result<Arc<Table>>> {
        self.views.get(&kind)
    }

    /// First rows of the filtered table.
    pub fn preview(&self, kind: DatasetKind) -> Option<Result<Table>> {
        self.view(kind).map(|view| {
            view.as_ref()
                .map(|table| to_preview(table, self.config.preview_rows()))
                .map_err(Clone::clone)
        })
    }

    pub fn chart(&self, chart: ChartKind) -> Option<&Result<ChartSpec>> {
        self.charts.get(&chart)
    }

    /// Charts shown in `section`, in display order.
    pub fn charts_for(&self, section: DatasetKind) -> impl Iterator<Item = (ChartKind, &Result<ChartSpec>)> {
        ChartKind::ALL
            .into_iter()
            .filter(move |chart| chart.section() == section)
            .filter_map(move |chart| self.charts.get(&chart).map(|outcome| (chart, outcome)))
    }

    pub fn metrics(&self) -> impl Iterator<Item = (MetricKind, &Result<ScalarMetric>)> {
        self.metrics.iter().map(|(kind, outcome)| (*kind, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::AggValue;

    fn t(name: &str, columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table::new(name, columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    fn fixture_cache() -> TableCache {
        let int = CellValue::Integer;
        let mut cache = TableCache::default();
        cache.insert_fixture(
            DatasetKind::Claims,
            t(
                "claims",
                &["Claim_ID", "Food_ID", "Receiver_ID", "Status"],
                vec![
                    vec![int(1), int(1), int(1), "Completed".into()],
                    vec![int(2), int(2), int(2), "Pending".into()],
                    vec![int(3), int(1), int(2), "Cancelled".into()],
                ],
            ),
        );
        cache.insert_fixture(
            DatasetKind::FoodListings,
            t(
                "food_listings",
                &["Food_ID", "Food_Name", "Quantity", "Provider_ID", "Food_Type"],
                vec![
                    vec![int(1), "Bread".into(), int(10), int(1), "Vegetarian".into()],
                    vec![int(2), "Chicken".into(), int(5), int(2), "Non-Vegetarian".into()],
                ],
            ),
        );
        cache.insert_fixture(
            DatasetKind::Providers,
            t(
                "providers",
                &["Provider_ID", "Name", "City"],
                vec![
                    vec![int(1), "Bakery".into(), "Boston".into()],
                    vec![int(2), "Butcher".into(), "Denver".into()],
                ],
            ),
        );
        cache.insert_fixture(
            DatasetKind::Receivers,
            t(
                "receivers",
                &["Receiver_ID", "City"],
                vec![vec![int(1), "Boston".into()], vec![int(2), "Denver".into()]],
            ),
        );
        cache
    }

    fn session() -> DashboardSession {
        let mut session = DashboardSession::with_cache(DashboardConfig::default(), fixture_cache());
        assert_eq!(session.load_all(), 4);
        session
    }

    #[test]
    fn everything_renders_on_first_refresh() {
        let session = session();
        for chart in ChartKind::ALL {
            assert!(matches!(session.chart(chart), Some(Ok(_))), "{chart:?}");
        }
        assert_eq!(session.metrics().count(), 4);
    }

    #[test]
    fn filter_change_recomputes_only_dependents() {
        let mut session = session();
        assert_eq!(session.refresh(), 0);

        session.toggle(FilterDimension::ProviderCity, &"Boston".into());
        // Providers by City, Top Providers by Quantity, Providers metric.
        assert_eq!(session.refresh(), 3);

        let providers = session.view(DatasetKind::Providers).unwrap().as_ref().unwrap();
        assert_eq!(providers.len(), 1);
        let claims = session.view(DatasetKind::Claims).unwrap().as_ref().unwrap();
        assert_eq!(claims.len(), 3);
    }

    #[test]
    fn city_with_no_providers_gives_empty_top_providers() {
        let mut session = session();
        session.set_selection(
            FilterDimension::ProviderCity,
            Selection::Only(BTreeSet::from([CellValue::from("Austin")])),
        );
        session.refresh();

        let chart = session.chart(ChartKind::TopProvidersByQuantity).unwrap().as_ref().unwrap();
        assert!(chart.is_empty());
    }

    #[test]
    fn select_none_empties_the_view_and_metric() {
        let mut session = session();
        session.select_none(FilterDimension::ClaimStatus);
        session.refresh();

        let status = session.chart(ChartKind::ClaimsByStatus).unwrap().as_ref().unwrap();
        assert!(status.is_empty());
        let (_, total) = session
            .metrics()
            .find(|(kind, _)| *kind == MetricKind::TotalClaims)
            .unwrap();
        assert_eq!(total.as_ref().unwrap().value, AggValue::Count(0));

        // Options still come from the unfiltered table.
        assert_eq!(session.options(FilterDimension::ClaimStatus).len(), 3);
    }

    #[test]
    fn missing_food_type_only_skips_its_chart() {
        let mut cache = fixture_cache();
        cache.insert_fixture(
            DatasetKind::FoodListings,
            t(
                "food_listings",
                &["Food_ID", "Food_Name", "Quantity", "Provider_ID"],
                vec![vec![CellValue::Integer(1), "Bread".into(), CellValue::Integer(10), CellValue::Integer(1)]],
            ),
        );
        let mut session = DashboardSession::with_cache(DashboardConfig::default(), cache);
        session.load_all();

        let err = session.chart(ChartKind::QuantityByFoodType).unwrap().as_ref().unwrap_err();
        assert_eq!(err, &DashboardError::schema_mismatch("food_listings", "Food_Type"));
        assert!(matches!(session.chart(ChartKind::TopFoodItems), Some(Ok(_))));
        assert!(matches!(session.chart(ChartKind::TopProvidersByQuantity), Some(Ok(_))));
    }

    #[test]
    fn missing_dataset_disables_only_its_section() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("receivers_data.csv"),
            "Receiver_ID,Name,City\n1,Shelter,Austin\n2,Pantry,Boston\n",
        )
        .unwrap();
        let config = DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let mut session = DashboardSession::new(config);
        assert_eq!(session.load_all(), 1);

        assert!(matches!(
            session.chart(ChartKind::ClaimsByStatus),
            Some(Err(DashboardError::DataSourceNotFound { .. }))
        ));
        assert!(matches!(session.chart(ChartKind::TopReceiverCitiesByClaims), Some(Err(_))));
        let by_city = session.chart(ChartKind::ReceiversByCity).unwrap().as_ref().unwrap();
        assert_eq!(by_city.bars.len(), 2);
        assert_eq!(session.preview(DatasetKind::Receivers).unwrap().unwrap().len(), 2);
    }

    #[test]
    fn explicit_selection_on_missing_column_is_a_schema_warning() {
        let mut cache = fixture_cache();
        cache.insert_fixture(
            DatasetKind::Receivers,
            t("receivers", &["Receiver_ID"], vec![vec![CellValue::Integer(1)]]),
        );
        let mut session = DashboardSession::with_cache(DashboardConfig::default(), cache);
        session.load_all();
        assert!(matches!(session.view(DatasetKind::Receivers), Some(Ok(_))));

        session.select_none(FilterDimension::ReceiverCity);
        session.refresh();
        let err = session.view(DatasetKind::Receivers).unwrap().as_ref().unwrap_err();
        assert_eq!(err, &DashboardError::schema_mismatch("receivers", "City"));
    }
}
