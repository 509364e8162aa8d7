use std::collections::HashSet;

use crate::data::aggregate::{AggValue, sum_column};
use crate::data::model::Table;
use crate::error::Result;

/// Reduction used by a KPI tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFn {
    /// Non-null cells in the column.
    Count,
    /// Null-safe sum.
    Sum,
    /// Distinct non-null values.
    CountDistinct,
}

/// A labelled number for a KPI tile.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarMetric {
    pub label: String,
    pub value: AggValue,
}

pub fn to_scalar_metric(table: &Table, column: &str, metric: MetricFn, label: &str) -> Result<ScalarMetric> {
    let values = table.column_values(column)?;
    let value = match metric {
        MetricFn::Count => AggValue::Count(values.filter(|v| !v.is_null()).count() as u64),
        MetricFn::CountDistinct => {
            let distinct: HashSet<_> = values.filter(|v| !v.is_null()).collect();
            AggValue::Count(distinct.len() as u64)
        }
        MetricFn::Sum => sum_column(table, column)?,
    };
    Ok(ScalarMetric {
        label: label.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use crate::error::DashboardError;

    fn listings() -> Table {
        Table::new(
            "food_listings",
            vec!["Provider_ID".into(), "Quantity".into()],
            vec![
                vec![CellValue::Integer(1), CellValue::Integer(10)],
                vec![CellValue::Integer(1), CellValue::Null],
                vec![CellValue::Integer(2), CellValue::Integer(5)],
                vec![CellValue::Null, CellValue::from("lots")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn count_skips_nulls() {
        let metric = to_scalar_metric(&listings(), "Provider_ID", MetricFn::Count, "Listings").unwrap();
        assert_eq!(metric.value, AggValue::Count(3));
        assert_eq!(metric.label, "Listings");
    }

    #[test]
    fn distinct_and_sum() {
        let table = listings();
        let providers = to_scalar_metric(&table, "Provider_ID", MetricFn::CountDistinct, "Providers").unwrap();
        assert_eq!(providers.value, AggValue::Count(2));
        let quantity = to_scalar_metric(&table, "Quantity", MetricFn::Sum, "Total Quantity").unwrap();
        assert_eq!(quantity.value, AggValue::Integer(15));
    }

    #[test]
    fn distinct_counts_nan_once() {
        let table = Table::new(
            "providers",
            vec!["City".into()],
            vec![
                vec![CellValue::Float(f64::NAN)],
                vec![CellValue::Float(f64::NAN)],
                vec![CellValue::from("Austin")],
            ],
        )
        .unwrap();
        let cities = to_scalar_metric(&table, "City", MetricFn::CountDistinct, "Cities").unwrap();
        assert_eq!(cities.value, AggValue::Count(2));
    }

    #[test]
    fn missing_column_fails() {
        let err = to_scalar_metric(&listings(), "Claim_ID", MetricFn::Count, "Claims").unwrap_err();
        assert_eq!(err, DashboardError::schema_mismatch("food_listings", "Claim_ID"));
    }
}
