use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use log::{debug, info, warn};

/// Environment variable through which the game receives the client library.
pub const LIBRARY_ENV: &str = "FLARIAL_CLIENT_LIBRARY";
const INITIALIZATION_GRACE: Duration = Duration::from_secs(3);

#[derive(Clone, Debug)]
pub struct ProcessLauncher {
    game_executable: PathBuf,
}

impl ProcessLauncher {
    pub fn new(game_executable: impl Into<PathBuf>) -> Self {
        Self {
            game_executable: game_executable.into(),
        }
    }

    /// Start the game with `library` handed over in [`LIBRARY_ENV`]. With
    /// `wait_for_initialization` the call only succeeds once the process has
    /// survived its start-up window.
    pub async fn launch(&self, library: &Path, wait_for_initialization: bool) -> Result<(), String> {
        let exe = &self.game_executable;
        if !exe.is_file() {
            warn!("launch: game not found at {}", exe.display());
            return Err(format!("game executable not found at {}", exe.display()));
        }
        if !library.is_file() {
            return Err(format!("client library not found at {}", library.display()));
        }

        info!("launch: starting {} with {}", exe.display(), library.display());
        let mut command = Command::new(exe);
        command
            .env(LIBRARY_ENV, library)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = exe.parent() {
            command.current_dir(dir);
        }

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            // DETACHED_PROCESS
            command.creation_flags(0x00000008);
        }

        let mut child = command
            .spawn()
            .map_err(|e| format!("failed to start game process: {e}"))?;
        debug!("launch: pid {}", child.id());

        if wait_for_initialization {
            tokio::time::sleep(INITIALIZATION_GRACE).await;
            if let Some(status) = child
                .try_wait()
                .map_err(|e| format!("failed to query game process: {e}"))?
            {
                return Err(format!("game exited during initialization ({status})"));
            }
        }
        info!("launch: process started");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_executable_is_reported() {
        let launcher = ProcessLauncher::new("/definitely/not/here/Minecraft.Windows.exe");
        let err = launcher
            .launch(Path::new("/tmp/client.dll"), false)
            .await
            .unwrap_err();
        assert!(err.starts_with("game executable not found"));
    }
}
