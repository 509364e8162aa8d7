use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::loader::{SourceLocation, load_source};
use super::model::{DatasetKind, Table};
use crate::config::DashboardConfig;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Session-scoped table cache
// ---------------------------------------------------------------------------

/// Loaded tables for one dashboard session.
///
/// Outcomes (successful or not) are cached per [`SourceLocation`], so a
/// missing file is reported once rather than re-read on every redraw.
/// Pointing a dataset at a different location loads it afresh.
#[derive(Debug, Default)]
pub struct TableCache {
    locations: BTreeMap<DatasetKind, SourceLocation>,
    entries: HashMap<SourceLocation, Result<Arc<Table>>>,
    fixtures: HashMap<DatasetKind, Arc<Table>>,
}

impl TableCache {
    /// A cache reading each dataset from its configured location.
    pub fn new(config: &DashboardConfig) -> Self {
        let locations = DatasetKind::ALL
            .iter()
            .map(|&kind| (kind, config.source_for(kind)))
            .collect();
        Self {
            locations,
            ..Default::default()
        }
    }

    /// Serve `kind` from an in-memory table instead of its configured source.
    pub fn insert_fixture(&mut self, kind: DatasetKind, table: Table) {
        let location = SourceLocation::Fixture(kind);
        self.entries.remove(&location);
        self.fixtures.insert(kind, Arc::new(table));
        self.locations.insert(kind, location);
    }

    pub fn set_location(&mut self, kind: DatasetKind, location: SourceLocation) {
        self.locations.insert(kind, location);
    }

    pub fn location(&self, kind: DatasetKind) -> SourceLocation {
        self.locations
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| SourceLocation::Fixture(kind))
    }

    /// The table for `kind`, loading it on first access.
    pub fn get(&mut self, kind: DatasetKind) -> Result<Arc<Table>> {
        let location = self.location(kind);
        if let Some(outcome) = self.entries.get(&location) {
            return outcome.clone();
        }

        let outcome = match (&location, self.fixtures.get(&kind)) {
            (SourceLocation::Fixture(_), Some(table)) => Ok(Arc::clone(table)),
            _ => load_source(kind, &location).map(Arc::new),
        };
        if let Err(e) = &outcome {
            log::warn!("Dataset {kind} unavailable: {e}");
        }
        self.entries.insert(location, outcome.clone());
        outcome
    }

    pub fn is_cached(&self, kind: DatasetKind) -> bool {
        self.entries.contains_key(&self.location(kind))
    }

    /// Forget the cached outcome for `kind`; the next `get` reloads it.
    pub fn invalidate(&mut self, kind: DatasetKind) {
        let location = self.location(kind);
        if self.entries.remove(&location).is_some() {
            log::debug!("Invalidated cached {kind} ({location})");
        }
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }
}
