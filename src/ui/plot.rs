use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Plot};

use food_dashboard::dashboard::color::Rgb;
use food_dashboard::dashboard::{ChartKind, ChartSpec};

const CHART_HEIGHT: f32 = 260.0;

fn color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

// ---------------------------------------------------------------------------
// Categorical bar chart
// ---------------------------------------------------------------------------

/// Render one bar chart. Categories sit at x = 0, 1, 2, ... and the x axis
/// shows their labels instead of the numbers.
pub fn bar_chart(ui: &mut Ui, kind: ChartKind, chart: &ChartSpec) {
    ui.strong(&chart.title);
    if chart.is_empty() {
        ui.label(RichText::new("No rows match the current filters.").weak());
        return;
    }

    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            Bar::new(i as f64, bar.value)
                .name(&bar.label)
                .fill(color32(bar.color))
                .width(0.7)
        })
        .collect();

    let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();

    Plot::new(("bar_chart", kind))
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}
