use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use food_dashboard::DashboardError;
use food_dashboard::dashboard::DashboardSession;
use food_dashboard::dashboard::preview::columns_json;
use food_dashboard::data::filter::FilterDimension;
use food_dashboard::data::model::{DatasetKind, Table};

use super::plot;
use crate::state::AppState;

const WARNING_COLOR: Color32 = Color32::from_rgb(230, 160, 0);

// ---------------------------------------------------------------------------
// Left side panel – section toggles and filter widgets
// ---------------------------------------------------------------------------

/// Render the left options panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Options");
    ui.separator();

    ui.strong("Show sections");
    for kind in DatasetKind::ALL {
        let mut visible = state.is_visible(kind);
        if ui.checkbox(&mut visible, kind.title()).changed() {
            state.set_visible(kind, visible);
        }
    }
    ui.separator();

    ui.heading("Filters");
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dimension in FilterDimension::ALL {
                filter_widget(ui, state, dimension);
            }
        });
}

/// One collapsible multi-select. Checkbox changes go straight to the session,
/// which recomputes the affected panels on the next frame.
fn filter_widget(ui: &mut Ui, state: &mut AppState, dimension: FilterDimension) {
    let options = state.session.options(dimension);

    // Show count of selected / total in the header
    let n_selected = state.session.selection(dimension).selected_count(&options);
    let header_text = format!("{dimension}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(dimension.label())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if options.is_empty() {
                ui.label(
                    RichText::new(format!(
                        "No '{}' values in {}",
                        dimension.column(),
                        dimension.dataset()
                    ))
                    .weak(),
                );
                return;
            }

            // Select all / none buttons
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.session.select_all(dimension);
                }
                if ui.small_button("None").clicked() {
                    state.session.select_none(dimension);
                }
            });

            for value in &options {
                let mut checked = state.session.selection(dimension).is_selected(value);
                if ui.checkbox(&mut checked, value.to_string()).changed() {
                    state.session.toggle(dimension, value);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload data").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!(
            "Data: {}",
            state.session.config().data_dir.display()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – KPI tiles, per-dataset sections
// ---------------------------------------------------------------------------

pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let session = &state.session;

    ui.heading("Local Food Wastage Management Dashboard");
    ui.add_space(6.0);
    metric_tiles(ui, session);
    ui.separator();

    available_columns(ui, session);

    for kind in DatasetKind::ALL {
        if state.is_visible(kind) {
            section(ui, session, kind);
        }
    }

    ui.separator();
    ui.label(RichText::new("Dashboard ready").weak());
}

fn metric_tiles(ui: &mut Ui, session: &DashboardSession) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (kind, outcome) in session.metrics() {
            ui.group(|ui: &mut Ui| {
                ui.vertical(|ui: &mut Ui| {
                    ui.label(kind.label());
                    match outcome {
                        Ok(metric) => {
                            ui.heading(metric.value.to_string());
                        }
                        Err(e) => warning(ui, e),
                    }
                });
            });
        }
    });
}

fn available_columns(ui: &mut Ui, session: &DashboardSession) {
    egui::CollapsingHeader::new("Available Columns in Each Dataset")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for kind in DatasetKind::ALL {
                egui::CollapsingHeader::new(format!("{} Columns", kind.title()))
                    .id_salt(("columns", kind.name()))
                    .show(ui, |ui: &mut Ui| match session.base_table(kind) {
                        Some(Ok(table)) => {
                            ui.code(columns_json(table));
                        }
                        Some(Err(e)) => warning(ui, e),
                        None => {
                            ui.label("Not loaded yet.");
                        }
                    });
            }
        });
}

fn section(ui: &mut Ui, session: &DashboardSession, kind: DatasetKind) {
    ui.add_space(12.0);
    ui.heading(kind.title());

    let mut section_error = None;
    match session.view(kind) {
        Some(Ok(view)) => {
            if let Some(Ok(base)) = session.base_table(kind) {
                ui.label(format!(
                    "{} of {} rows match the current filters",
                    view.len(),
                    base.len()
                ));
            }
            if let Some(Ok(preview)) = session.preview(kind) {
                preview_table(ui, kind, &preview);
            }
        }
        Some(Err(e)) => {
            warning(ui, e);
            section_error = Some(e);
        }
        None => {
            ui.label("Not loaded yet.");
        }
    }

    for (chart_kind, outcome) in session.charts_for(kind) {
        ui.add_space(8.0);
        match outcome {
            Ok(chart) => plot::bar_chart(ui, chart_kind, chart),
            // Already reported once for the whole section.
            Err(e) if section_error == Some(e) => {}
            Err(e) => warning(ui, e),
        }
    }
}

/// Raw rows of a filtered table.
fn preview_table(ui: &mut Ui, kind: DatasetKind, table: &Table) {
    if table.is_empty() {
        ui.label(RichText::new("No rows to show.").weak());
        return;
    }
    ui.push_id(("preview", kind.name()), |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), table.columns.len())
                .header(20.0, |mut header| {
                    for col in &table.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(col);
                        });
                    }
                })
                .body(|mut body| {
                    for row in &table.rows {
                        body.row(18.0, |mut cells| {
                            for cell in row {
                                cells.col(|ui: &mut Ui| {
                                    ui.label(cell.to_string());
                                });
                            }
                        });
                    }
                });
        });
    });
}

fn warning(ui: &mut Ui, err: &DashboardError) {
    ui.colored_label(WARNING_COLOR, format!("⚠ {err}"));
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open folder with claims / food listings / providers / receivers data")
        .pick_folder();

    if let Some(path) = folder {
        log::info!("Opening data folder {}", path.display());
        state.open_data_dir(path);
    }
}
