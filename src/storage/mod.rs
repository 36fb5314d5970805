use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use log::{debug, info, warn};
use tokio::fs;
use tokio::sync::{Mutex, mpsc};

use crate::config::Configuration;
use crate::env;
use crate::services::ConfigStore;

/// Settings persistence as pretty-printed JSON.
#[derive(Clone)]
pub struct StorageManager {
    settings_path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl StorageManager {
    pub fn new(settings_path: Option<PathBuf>) -> Self {
        if let Err(err) = env::ensure_base_dirs() {
            warn!("storage: unable to create launcher directories: {err}");
        }
        Self {
            settings_path: settings_path.unwrap_or_else(env::settings_path),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Missing settings are not an error; the defaults apply.
    pub async fn read_settings(&self) -> Result<Configuration, String> {
        let path = &self.settings_path;
        if fs::metadata(path).await.is_err() {
            info!("storage: no settings at {}; using defaults", path.display());
            return Ok(Configuration::default());
        }
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| format!("unable to read settings: {e}"))?;
        Configuration::from_json(&text)
    }

    /// Replace the settings file in one step: write a sibling temp file,
    /// then rename it over the old one. Writers take turns.
    pub async fn write_settings(&self, config: &Configuration) -> Result<(), String> {
        let text = config.to_json()?;
        let path = &self.settings_path;
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("unable to create settings dir: {e}"))?;
        }
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, text)
            .await
            .map_err(|e| format!("unable to write settings: {e}"))?;
        fs::rename(&staging, path)
            .await
            .map_err(|e| format!("unable to persist settings: {e}"))?;
        debug!("storage: settings saved to {}", path.display());
        Ok(())
    }
}

/// Persist configurations in the order they were queued. When several are
/// waiting only the newest is written. Runs until every sender is dropped.
pub async fn run_settings_writer(
    store: Arc<dyn ConfigStore>,
    mut queue: mpsc::UnboundedReceiver<Configuration>,
) {
    while let Some(mut config) = queue.recv().await {
        while let Ok(newer) = queue.try_recv() {
            config = newer;
        }
        if let Err(err) = store.save(&config).await {
            warn!("settings: {err}");
        }
    }
    debug!("storage: settings writer stopped");
}

impl ConfigStore for StorageManager {
    fn load(&self) -> BoxFuture<'_, Result<Configuration, String>> {
        Box::pin(self.read_settings())
    }

    fn save<'a>(&'a self, config: &'a Configuration) -> BoxFuture<'a, Result<(), String>> {
        Box::pin(self.write_settings(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DllBuild;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("flarial-storage-{}-{name}", std::process::id()))
            .join("settings.json")
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let storage = StorageManager::new(Some(scratch("missing")));
        assert_eq!(storage.load().await, Ok(Configuration::default()));
    }

    #[tokio::test]
    async fn saved_settings_load_back() {
        let path = scratch("roundtrip");
        let storage = StorageManager::new(Some(path.clone()));
        let config = Configuration {
            dll_build: DllBuild::Custom,
            custom_dll_path: Some(PathBuf::from("/tmp/client.dll")),
            wait_for_initialization: false,
            ..Configuration::default()
        };
        storage.save(&config).await.unwrap();
        assert_eq!(storage.load().await, Ok(config));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let path = scratch("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ nope").unwrap();
        let storage = StorageManager::new(Some(path.clone()));
        assert!(storage.load().await.is_err());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    fn with_path(length: usize) -> Configuration {
        Configuration {
            dll_build: DllBuild::Custom,
            custom_dll_path: Some(PathBuf::from("C:/dlls/".to_owned() + &"x".repeat(length))),
            ..Configuration::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_saves_never_leave_a_torn_file() {
        let path = scratch("overlap");
        let storage = StorageManager::new(Some(path.clone()));
        for _ in 0..20 {
            let writes: Vec<_> = (0..16)
                .rev()
                .map(|length| {
                    let storage = storage.clone();
                    tokio::spawn(async move { storage.write_settings(&with_path(length * 4)).await })
                })
                .collect();
            for write in writes {
                write.await.unwrap().unwrap();
            }
            let loaded = storage.read_settings().await.unwrap();
            assert_eq!(loaded.dll_build, DllBuild::Custom);
        }
        assert!(!path.with_extension("json.tmp").exists());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn writer_keeps_the_last_queued_settings() {
        let path = scratch("writer");
        let storage = StorageManager::new(Some(path.clone()));
        let (queue, pending) = mpsc::unbounded_channel();
        let writer = tokio::spawn(run_settings_writer(Arc::new(storage.clone()), pending));
        // Backspacing through a custom path sends a shrinking config per keystroke.
        for length in (1..=16).rev() {
            queue.send(with_path(length)).unwrap();
            if length % 4 == 0 {
                tokio::task::yield_now().await;
            }
        }
        drop(queue);
        writer.await.unwrap();
        assert_eq!(storage.read_settings().await, Ok(with_path(1)));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
