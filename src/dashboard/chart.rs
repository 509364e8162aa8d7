use super::color::Rgb;
use crate::data::aggregate::Groups;

/// One bar: category label, height and fill.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub label: String,
    pub value: f64,
    pub color: Rgb,
}

/// Declarative bar chart handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Bars in display order.
    pub bars: Vec<ChartBar>,
}

pub const DEFAULT_BAR_COLOR: Rgb = [135, 206, 235];

/// Turn aggregation output into a chart, keeping the groups' order.
pub fn to_chart_spec(groups: &Groups, title: &str, x_label: &str, y_label: &str) -> ChartSpec {
    ChartSpec {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        bars: groups
            .iter()
            .map(|(key, value)| ChartBar {
                label: key.to_string(),
                value: value.as_f64(),
                color: DEFAULT_BAR_COLOR,
            })
            .collect(),
    }
}

impl ChartSpec {
    /// Paint every bar the same colour.
    pub fn with_color(mut self, color: Rgb) -> Self {
        for bar in &mut self.bars {
            bar.color = color;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Height of the tallest bar, 0 for an empty chart.
    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.value).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::AggValue;
    use crate::data::model::CellValue;

    #[test]
    fn chart_keeps_group_order_and_metadata() {
        let groups = vec![
            (CellValue::from("Pending"), AggValue::Count(3)),
            (CellValue::from("Completed"), AggValue::Count(5)),
        ];
        let chart = to_chart_spec(&groups, "Claims by Status", "Status", "Count");
        assert_eq!(chart.title, "Claims by Status");
        assert_eq!(chart.x_label, "Status");
        assert_eq!(chart.y_label, "Count");
        let labels: Vec<_> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Pending", "Completed"]);
        assert_eq!(chart.max_value(), 5.0);
    }

    #[test]
    fn empty_groups_give_an_empty_chart() {
        let chart = to_chart_spec(&Vec::new(), "Top Providers", "Provider", "Quantity");
        assert!(chart.is_empty());
        assert_eq!(chart.max_value(), 0.0);
    }
}
