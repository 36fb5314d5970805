use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Which client library the Play button launches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DllBuild {
    #[default]
    Release,
    Beta,
    Custom,
}

impl DllBuild {
    pub const ALL: [DllBuild; 3] = [DllBuild::Release, DllBuild::Beta, DllBuild::Custom];

    pub fn label(self) -> &'static str {
        match self {
            DllBuild::Release => "Release",
            DllBuild::Beta => "Beta",
            DllBuild::Custom => "Custom",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DllBuild::Release => "Stable builds tested for the supported game version.",
            DllBuild::Beta => "Early access to new features. May be unstable.",
            DllBuild::Custom => "Launch with a library of your choice.",
        }
    }
}

/// Which installation check gates Play and Install.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreflightPolicy {
    /// Refuse unsigned installs; the beta prompt comes after the download
    /// and development-kit installs always use the beta build.
    #[default]
    Signed,
    /// Refuse only unpackaged development-kit installs; the beta prompt
    /// comes before verification.
    Packaged,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub dll_build: DllBuild,
    pub custom_dll_path: Option<PathBuf>,
    pub hardware_acceleration: bool,
    pub wait_for_initialization: bool,
    pub preflight: PreflightPolicy,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            dll_build: DllBuild::Release,
            custom_dll_path: None,
            hardware_acceleration: true,
            wait_for_initialization: true,
            preflight: PreflightPolicy::Signed,
        }
    }
}

impl Configuration {
    /// Custom path with surrounding whitespace ignored; `None` when blank.
    pub fn custom_path(&self) -> Option<&Path> {
        self.custom_dll_path
            .as_deref()
            .filter(|path| !path.as_os_str().to_string_lossy().trim().is_empty())
    }

    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("invalid settings file: {e}"))
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("unable to encode settings: {e}"))
    }
}
