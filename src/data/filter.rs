use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use super::model::{CellValue, DatasetKind, Table};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Row filter
// ---------------------------------------------------------------------------

/// Keep the rows whose `column` value is in `allowed`, in their original order.
///
/// An empty `allowed` set yields an empty table: unchecking every box is a
/// valid, restrictive selection. The input table is never modified.
pub fn filter(table: &Table, column: &str, allowed: &BTreeSet<CellValue>) -> Result<Table> {
    let idx = table.column_index(column)?;
    let rows = table
        .rows
        .iter()
        .filter(|row| allowed.contains(&row[idx]))
        .cloned()
        .collect();
    Ok(table.with_rows(rows))
}

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per dimension
// ---------------------------------------------------------------------------

/// The user's choice for one multi-select.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// No interaction yet: every observed value is selected.
    #[default]
    All,
    /// Explicit selection; an empty set shows nothing.
    Only(BTreeSet<CellValue>),
}

impl Selection {
    pub fn is_selected(&self, value: &CellValue) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }

    /// Number of `options` currently selected.
    pub fn selected_count(&self, options: &BTreeSet<CellValue>) -> usize {
        match self {
            Selection::All => options.len(),
            Selection::Only(set) => options.intersection(set).count(),
        }
    }

    /// Flip one value. Toggling from `All` starts from the full option set.
    pub fn toggle(&mut self, value: &CellValue, options: &BTreeSet<CellValue>) {
        if let Selection::All = self {
            *self = Selection::Only(options.clone());
        }
        if let Selection::Only(set) = self {
            if !set.remove(value) {
                set.insert(value.clone());
            }
        }
    }
}

/// The four independent filters. Each applies to its own dataset only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterDimension {
    ClaimStatus,
    FoodType,
    ProviderCity,
    ReceiverCity,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 4] = [
        FilterDimension::ClaimStatus,
        FilterDimension::FoodType,
        FilterDimension::ProviderCity,
        FilterDimension::ReceiverCity,
    ];

    pub fn dataset(self) -> DatasetKind {
        match self {
            FilterDimension::ClaimStatus => DatasetKind::Claims,
            FilterDimension::FoodType => DatasetKind::FoodListings,
            FilterDimension::ProviderCity => DatasetKind::Providers,
            FilterDimension::ReceiverCity => DatasetKind::Receivers,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            FilterDimension::ClaimStatus => "Status",
            FilterDimension::FoodType => "Food_Type",
            FilterDimension::ProviderCity | FilterDimension::ReceiverCity => "City",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterDimension::ClaimStatus => "Claim Status",
            FilterDimension::FoodType => "Food Type",
            FilterDimension::ProviderCity => "Provider City",
            FilterDimension::ReceiverCity => "Receiver City",
        }
    }

    /// The dimension filtering `kind`'s table.
    pub fn for_dataset(kind: DatasetKind) -> FilterDimension {
        match kind {
            DatasetKind::Claims => FilterDimension::ClaimStatus,
            DatasetKind::FoodListings => FilterDimension::FoodType,
            DatasetKind::Providers => FilterDimension::ProviderCity,
            DatasetKind::Receivers => FilterDimension::ReceiverCity,
        }
    }

    /// Distinct values offered in this dimension's multi-select.
    /// Empty when the table lacks the column.
    pub fn options(self, table: &Table) -> BTreeSet<CellValue> {
        table.distinct_values(self.column()).unwrap_or_default()
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-dimension selection state. Dimensions never touched read as `All`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    selected: BTreeMap<FilterDimension, Selection>,
}

static SELECT_ALL: Selection = Selection::All;

impl Selections {
    pub fn get(&self, dimension: FilterDimension) -> &Selection {
        self.selected.get(&dimension).unwrap_or(&SELECT_ALL)
    }

    pub fn set(&mut self, dimension: FilterDimension, selection: Selection) {
        self.selected.insert(dimension, selection);
    }

    pub fn toggle(&mut self, dimension: FilterDimension, value: &CellValue, options: &BTreeSet<CellValue>) {
        self.selected
            .entry(dimension)
            .or_default()
            .toggle(value, options);
    }

    pub fn select_all(&mut self, dimension: FilterDimension) {
        self.set(dimension, Selection::All);
    }

    pub fn select_none(&mut self, dimension: FilterDimension) {
        self.set(dimension, Selection::Only(BTreeSet::new()));
    }

    /// The filtered view of `table` for `dimension`'s current selection.
    ///
    /// `All` passes the table through untouched, even when it lacks the
    /// column; an explicit selection on a missing column is a schema error.
    pub fn apply(&self, dimension: FilterDimension, table: &Arc<Table>) -> Result<Arc<Table>> {
        match self.get(dimension) {
            Selection::All => Ok(Arc::clone(table)),
            Selection::Only(allowed) => filter(table, dimension.column(), allowed).map(Arc::new),
        }
    }
}
