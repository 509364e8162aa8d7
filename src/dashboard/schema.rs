use std::collections::BTreeMap;
use std::sync::Arc;

use crate::data::model::{DatasetKind, Table};
use crate::error::{DashboardError, Result};

/// A column a panel reads from a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub dataset: DatasetKind,
    pub column: &'static str,
}

pub const fn requires(dataset: DatasetKind, column: &'static str) -> Requirement {
    Requirement { dataset, column }
}

/// Outcome of checking a panel's columns before aggregating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaCheck {
    Ready,
    MissingColumn { dataset: DatasetKind, column: String },
}

impl SchemaCheck {
    pub fn into_result(self) -> Result<()> {
        match self {
            SchemaCheck::Ready => Ok(()),
            SchemaCheck::MissingColumn { dataset, column } => {
                Err(DashboardError::schema_mismatch(dataset.name(), &column))
            }
        }
    }
}

/// Check every requirement against the tables; the first gap wins.
///
/// A requirement on a dataset absent from `tables` counts as missing too,
/// though callers normally report the failed load instead.
pub fn validate(requirements: &[Requirement], tables: &BTreeMap<DatasetKind, Arc<Table>>) -> SchemaCheck {
    for req in requirements {
        let present = tables
            .get(&req.dataset)
            .is_some_and(|table| table.has_column(req.column));
        if !present {
            return SchemaCheck::MissingColumn {
                dataset: req.dataset,
                column: req.column.to_string(),
            };
        }
    }
    SchemaCheck::Ready
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> BTreeMap<DatasetKind, Arc<Table>> {
        let listings = Table::empty("food_listings", vec!["Food_ID".into(), "Food_Name".into()]);
        BTreeMap::from([(DatasetKind::FoodListings, Arc::new(listings))])
    }

    #[test]
    fn present_columns_are_ready() {
        let reqs = [requires(DatasetKind::FoodListings, "Food_Name")];
        assert_eq!(validate(&reqs, &tables()), SchemaCheck::Ready);
    }

    #[test]
    fn missing_column_names_column_and_dataset() {
        let reqs = [
            requires(DatasetKind::FoodListings, "Food_Name"),
            requires(DatasetKind::FoodListings, "Food_Type"),
        ];
        let check = validate(&reqs, &tables());
        assert_eq!(
            check,
            SchemaCheck::MissingColumn {
                dataset: DatasetKind::FoodListings,
                column: "Food_Type".into(),
            }
        );
        let msg = check.into_result().unwrap_err().to_string();
        assert!(msg.contains("Food_Type") && msg.contains("food_listings"), "{msg}");
    }
}
