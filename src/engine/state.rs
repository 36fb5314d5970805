use crate::config::{Configuration, PreflightPolicy};
use crate::services::Catalog;

// What the engine tells the UI. Progress goes over the per-page
// `ProgressReporter` channels instead.
#[derive(Clone, Debug, PartialEq)]
pub enum AppState {
    Ready {
        catalog: Catalog,
        installed: Option<String>,
    },
    LoadFailed(String),
    Installed {
        version: String,
    },
    /// Close the launcher without asking.
    Exit,
}

// Actions triggered by the user from the UI layer.
#[derive(Clone, Debug)]
pub enum UserAction {
    Startup,
    Play(Configuration),
    Install {
        version: String,
        preflight: PreflightPolicy,
    },
}
