use std::env;
use std::fs;
use std::path::PathBuf;

const GAME_DIR_OVERRIDE: &str = "FLARIAL_GAME_DIR";

/// Returns the root directory used by the launcher.
pub fn default_app_dir() -> PathBuf {
    let base = match env::consts::OS {
        "windows" => env::var_os("LOCALAPPDATA")
            .or_else(|| env::var_os("APPDATA"))
            .map(PathBuf::from),
        "macos" => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join("Library").join("Application Support")),
        _ => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(".local").join("share")),
    }
    .unwrap_or_else(|| PathBuf::from("."));

    base.join("flarial-launcher")
}

pub fn cache_dir() -> PathBuf {
    default_app_dir().join("cache")
}

/// Downloaded client libraries.
pub fn client_dir() -> PathBuf {
    default_app_dir().join("client")
}

pub fn settings_path() -> PathBuf {
    default_app_dir().join("settings.json")
}

/// Game install directory: `FLARIAL_GAME_DIR` when set, otherwise a
/// `game` folder next to the launcher data.
pub fn game_dir() -> PathBuf {
    env::var_os(GAME_DIR_OVERRIDE)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| default_app_dir().join("game"))
}

/// Create the on-disk folder layout expected by the launcher.
pub fn ensure_base_dirs() -> std::io::Result<()> {
    for dir in [default_app_dir(), cache_dir(), client_dir()] {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
