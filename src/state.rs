use std::collections::BTreeSet;
use std::path::PathBuf;

use food_dashboard::DashboardSession;
use food_dashboard::data::model::DatasetKind;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Tables, selections and computed panels.
    pub session: DashboardSession,

    /// Dataset sections the user chose to show.
    pub visible_sections: BTreeSet<DatasetKind>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(session: DashboardSession) -> Self {
        Self {
            session,
            visible_sections: DatasetKind::ALL.into_iter().collect(),
            status_message: None,
        }
    }

    pub fn is_visible(&self, kind: DatasetKind) -> bool {
        self.visible_sections.contains(&kind)
    }

    pub fn set_visible(&mut self, kind: DatasetKind, visible: bool) {
        if visible {
            self.visible_sections.insert(kind);
        } else {
            self.visible_sections.remove(&kind);
        }
    }

    /// Point the session at another data directory and report what loaded.
    pub fn open_data_dir(&mut self, dir: PathBuf) {
        self.session.set_data_dir(dir);
        self.after_reload();
    }

    pub fn reload(&mut self) {
        self.session.reload_all();
        self.after_reload();
    }

    fn after_reload(&mut self) {
        let loaded = self.session.load_all();
        self.status_message = if loaded < DatasetKind::ALL.len() {
            Some(format!(
                "{} of {} datasets could not be loaded",
                DatasetKind::ALL.len() - loaded,
                DatasetKind::ALL.len()
            ))
        } else {
            None
        };
    }
}
