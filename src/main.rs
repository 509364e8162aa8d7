mod app;
mod state;
mod ui;

use anyhow::{Context, Result, bail};
use app::FoodDashboardApp;
use eframe::egui;
use food_dashboard::data::model::DatasetKind;
use food_dashboard::{DashboardConfig, DashboardSession};

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::load().context("loading dashboard configuration")?;
    let mut session = DashboardSession::new(config);

    let loaded = session.load_all();
    if loaded == 0 {
        bail!(
            "no dataset could be loaded from {}",
            session.config().data_dir.display()
        );
    }
    log::info!("{loaded} of {} datasets loaded", DatasetKind::ALL.len());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Local Food Wastage Management",
        options,
        Box::new(move |_cc| Ok(Box::new(FoodDashboardApp::new(session)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}
