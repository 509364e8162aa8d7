use std::collections::BTreeMap;
use std::sync::Arc;

use palette::named;

use super::chart::{ChartSpec, to_chart_spec};
use super::color;
use super::metric::{MetricFn, ScalarMetric, to_scalar_metric};
use super::schema::{Requirement, requires, validate};
use crate::data::aggregate::{AggFn, Groups, group_count, group_sum, join_and_aggregate, top_n};
use crate::data::model::{DatasetKind, Table};
use crate::error::{DashboardError, Result};

use crate::data::model::DatasetKind::{Claims, FoodListings, Providers, Receivers};

/// Filtered tables by dataset, as fed to panel computations.
pub type Views = BTreeMap<DatasetKind, Arc<Table>>;

fn table<'a>(views: &'a Views, kind: DatasetKind) -> Result<&'a Arc<Table>> {
    views.get(&kind).ok_or_else(|| DashboardError::DataSourceNotFound {
        dataset: kind.name().to_string(),
        location: "not loaded".to_string(),
    })
}

/// A joined right-hand column keeps its name unless the left table has one too.
fn joined_column(left: &Table, column: &str) -> String {
    if left.has_column(column) {
        format!("{column}_right")
    } else {
        column.to_string()
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartKind {
    ClaimsByStatus,
    TopFoodItems,
    QuantityByFoodType,
    ProvidersByCity,
    TopProvidersByQuantity,
    ReceiversByCity,
    TopReceiverCitiesByClaims,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::ClaimsByStatus,
        ChartKind::TopFoodItems,
        ChartKind::QuantityByFoodType,
        ChartKind::ProvidersByCity,
        ChartKind::TopProvidersByQuantity,
        ChartKind::ReceiversByCity,
        ChartKind::TopReceiverCitiesByClaims,
    ];

    /// Chart title; ranked charts mention their length.
    pub fn title(self, top: usize) -> String {
        match self {
            ChartKind::ClaimsByStatus => "Claims by Status".into(),
            ChartKind::TopFoodItems => format!("Top {top} Food Items Listed"),
            ChartKind::QuantityByFoodType => "Quantity by Food Type".into(),
            ChartKind::ProvidersByCity => "Providers by City".into(),
            ChartKind::TopProvidersByQuantity => format!("Top {top} Providers by Quantity Supplied"),
            ChartKind::ReceiversByCity => "Receivers by City".into(),
            ChartKind::TopReceiverCitiesByClaims => format!("Top {top} Receiver Cities by Claims"),
        }
    }

    pub fn axis_labels(self) -> (&'static str, &'static str) {
        match self {
            ChartKind::ClaimsByStatus => ("Status", "Count"),
            ChartKind::TopFoodItems => ("Food Item", "Count"),
            ChartKind::QuantityByFoodType => ("Food Type", "Quantity"),
            ChartKind::ProvidersByCity | ChartKind::ReceiversByCity => ("City", "Count"),
            ChartKind::TopProvidersByQuantity => ("Provider", "Quantity"),
            ChartKind::TopReceiverCitiesByClaims => ("City", "Claims"),
        }
    }

    /// The dataset section the chart is shown in.
    pub fn section(self) -> DatasetKind {
        match self {
            ChartKind::ClaimsByStatus => Claims,
            ChartKind::TopFoodItems | ChartKind::QuantityByFoodType => FoodListings,
            ChartKind::ProvidersByCity | ChartKind::TopProvidersByQuantity => Providers,
            ChartKind::ReceiversByCity | ChartKind::TopReceiverCitiesByClaims => Receivers,
        }
    }

    /// Datasets whose filtered views feed this chart.
    pub fn datasets(self) -> &'static [DatasetKind] {
        match self {
            ChartKind::ClaimsByStatus => &[Claims],
            ChartKind::TopFoodItems | ChartKind::QuantityByFoodType => &[FoodListings],
            ChartKind::ProvidersByCity => &[Providers],
            ChartKind::TopProvidersByQuantity => &[FoodListings, Providers],
            ChartKind::ReceiversByCity => &[Receivers],
            ChartKind::TopReceiverCitiesByClaims => &[Claims, Receivers],
        }
    }

    pub fn requirements(self) -> &'static [Requirement] {
        const CLAIMS_BY_STATUS: &[Requirement] = &[requires(Claims, "Status")];
        const TOP_FOOD: &[Requirement] = &[requires(FoodListings, "Food_Name")];
        const QUANTITY_BY_TYPE: &[Requirement] = &[
            requires(FoodListings, "Food_Type"),
            requires(FoodListings, "Quantity"),
        ];
        const PROVIDER_CITY: &[Requirement] = &[requires(Providers, "City")];
        const TOP_PROVIDERS: &[Requirement] = &[
            requires(FoodListings, "Provider_ID"),
            requires(FoodListings, "Quantity"),
            requires(Providers, "Provider_ID"),
            requires(Providers, "Name"),
        ];
        const RECEIVER_CITY: &[Requirement] = &[requires(Receivers, "City")];
        const TOP_RECEIVER_CITIES: &[Requirement] = &[
            requires(Claims, "Receiver_ID"),
            requires(Receivers, "Receiver_ID"),
            requires(Receivers, "City"),
        ];
        match self {
            ChartKind::ClaimsByStatus => CLAIMS_BY_STATUS,
            ChartKind::TopFoodItems => TOP_FOOD,
            ChartKind::QuantityByFoodType => QUANTITY_BY_TYPE,
            ChartKind::ProvidersByCity => PROVIDER_CITY,
            ChartKind::TopProvidersByQuantity => TOP_PROVIDERS,
            ChartKind::ReceiversByCity => RECEIVER_CITY,
            ChartKind::TopReceiverCitiesByClaims => TOP_RECEIVER_CITIES,
        }
    }

    fn groups(self, views: &Views, top: usize) -> Result<Groups> {
        let groups = match self {
            ChartKind::ClaimsByStatus => group_count(table(views, Claims)?, "Status")?,
            ChartKind::TopFoodItems => top_n(group_count(table(views, FoodListings)?, "Food_Name")?, top),
            ChartKind::QuantityByFoodType => {
                group_sum(table(views, FoodListings)?, "Food_Type", "Quantity")?
            }
            ChartKind::ProvidersByCity => top_n(group_count(table(views, Providers)?, "City")?, top),
            ChartKind::TopProvidersByQuantity => {
                let listings = table(views, FoodListings)?;
                let providers = table(views, Providers)?;
                let groups = join_and_aggregate(
                    listings,
                    providers,
                    "Provider_ID",
                    &joined_column(listings, "Name"),
                    &AggFn::Sum("Quantity".into()),
                )?;
                top_n(groups, top)
            }
            ChartKind::ReceiversByCity => top_n(group_count(table(views, Receivers)?, "City")?, top),
            ChartKind::TopReceiverCitiesByClaims => {
                let claims = table(views, Claims)?;
                let receivers = table(views, Receivers)?;
                let groups = join_and_aggregate(
                    claims,
                    receivers,
                    "Receiver_ID",
                    &joined_column(claims, "City"),
                    &AggFn::Count,
                )?;
                top_n(groups, top)
            }
        };
        Ok(groups)
    }

    /// Validate the columns, aggregate, and describe the chart.
    pub fn compute(self, views: &Views, top: usize) -> Result<ChartSpec> {
        for &kind in self.datasets() {
            table(views, kind)?;
        }
        validate(self.requirements(), views).into_result()?;

        let groups = self.groups(views, top)?;
        let (x_label, y_label) = self.axis_labels();
        let chart = to_chart_spec(&groups, &self.title(top), x_label, y_label);
        let chart = match self {
            ChartKind::ClaimsByStatus => chart.with_color(color::named(named::SKYBLUE)),
            ChartKind::TopFoodItems => chart.with_color(color::named(named::LIGHTGREEN)),
            ChartKind::QuantityByFoodType => chart.with_color(color::named(named::MEDIUMSEAGREEN)),
            ChartKind::ProvidersByCity => chart.with_color(color::named(named::ORANGE)),
            ChartKind::TopProvidersByQuantity => chart.with_color(color::named(named::DARKORANGE)),
            ChartKind::ReceiversByCity => chart.with_color(color::named(named::PURPLE)),
            ChartKind::TopReceiverCitiesByClaims => chart.with_color(color::named(named::MEDIUMPURPLE)),
        };
        Ok(chart)
    }
}

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricKind {
    TotalClaims,
    TotalQuantity,
    Providers,
    Receivers,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::TotalClaims,
        MetricKind::TotalQuantity,
        MetricKind::Providers,
        MetricKind::Receivers,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::TotalClaims => "Total Claims",
            MetricKind::TotalQuantity => "Total Food Quantity",
            MetricKind::Providers => "Providers",
            MetricKind::Receivers => "Receivers",
        }
    }

    pub fn dataset(self) -> DatasetKind {
        match self {
            MetricKind::TotalClaims => Claims,
            MetricKind::TotalQuantity => FoodListings,
            MetricKind::Providers => Providers,
            MetricKind::Receivers => Receivers,
        }
    }

    fn column_and_fn(self) -> (&'static str, MetricFn) {
        match self {
            MetricKind::TotalClaims => ("Claim_ID", MetricFn::Count),
            MetricKind::TotalQuantity => ("Quantity", MetricFn::Sum),
            MetricKind::Providers => ("Provider_ID", MetricFn::CountDistinct),
            MetricKind::Receivers => ("Receiver_ID", MetricFn::CountDistinct),
        }
    }

    pub fn compute(self, views: &Views) -> Result<ScalarMetric> {
        let (column, metric) = self.column_and_fn();
        let source = table(views, self.dataset())?;
        validate(&[requires(self.dataset(), column)], views).into_result()?;
        to_scalar_metric(source, column, metric, self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::AggValue;
    use crate::data::model::CellValue;

    fn t(name: &str, columns: &[&str], rows: Vec<Vec<CellValue>>) -> Arc<Table> {
        Arc::new(Table::new(name, columns.iter().map(|c| c.to_string()).collect(), rows).unwrap())
    }

    fn views() -> Views {
        let int = CellValue::Integer;
        BTreeMap::from([
            (
                Claims,
                t(
                    "claims",
                    &["Claim_ID", "Receiver_ID", "Status"],
                    vec![
                        vec![int(1), int(1), "Completed".into()],
                        vec![int(2), int(2), "Pending".into()],
                        vec![int(3), int(1), "Completed".into()],
                    ],
                ),
            ),
            (
                FoodListings,
                t(
                    "food_listings",
                    &["Food_ID", "Food_Name", "Quantity", "Provider_ID"],
                    vec![
                        vec![int(1), "Bread".into(), int(10), int(1)],
                        vec![int(2), "Rice".into(), int(25), int(2)],
                    ],
                ),
            ),
            (
                Providers,
                t(
                    "providers",
                    &["Provider_ID", "Name", "City"],
                    vec![
                        vec![int(1), "Bakery".into(), "Austin".into()],
                        vec![int(2), "Market".into(), "Boston".into()],
                    ],
                ),
            ),
            (
                Receivers,
                t(
                    "receivers",
                    &["Receiver_ID", "City"],
                    vec![vec![int(1), "Denver".into()], vec![int(2), "Austin".into()]],
                ),
            ),
        ])
    }

    #[test]
    fn missing_food_type_skips_only_that_chart() {
        let views = views();
        let err = ChartKind::QuantityByFoodType.compute(&views, 10).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Food_Type") && msg.contains("food_listings"), "{msg}");

        let top_food = ChartKind::TopFoodItems.compute(&views, 10).unwrap();
        assert_eq!(top_food.bars.len(), 2);
    }

    #[test]
    fn status_bars_share_one_colour() {
        let chart = ChartKind::ClaimsByStatus.compute(&views(), 10).unwrap();
        assert!(!chart.is_empty());
        assert!(chart.bars.iter().all(|b| b.color == color::named(named::SKYBLUE)));
    }

    #[test]
    fn top_receiver_cities_join_claims_and_receivers() {
        let chart = ChartKind::TopReceiverCitiesByClaims.compute(&views(), 10).unwrap();
        let bars: Vec<_> = chart.bars.iter().map(|b| (b.label.as_str(), b.value)).collect();
        assert_eq!(bars, vec![("Denver", 2.0), ("Austin", 1.0)]);
        assert_eq!(chart.title, "Top 10 Receiver Cities by Claims");
    }

    #[test]
    fn top_providers_sum_quantity() {
        let chart = ChartKind::TopProvidersByQuantity.compute(&views(), 1).unwrap();
        assert_eq!(chart.bars.len(), 1);
        assert_eq!(chart.bars[0].label, "Market");
        assert_eq!(chart.bars[0].value, 25.0);
    }

    #[test]
    fn missing_dataset_is_reported_by_name() {
        let mut views = views();
        views.remove(&Providers);
        let err = ChartKind::TopProvidersByQuantity.compute(&views, 10).unwrap_err();
        assert_eq!(err.dataset(), "providers");
    }

    #[test]
    fn metrics() {
        let views = views();
        let claims = MetricKind::TotalClaims.compute(&views).unwrap();
        assert_eq!(claims.value, AggValue::Count(3));
        let quantity = MetricKind::TotalQuantity.compute(&views).unwrap();
        assert_eq!(quantity.value, AggValue::Integer(35));
    }
}
