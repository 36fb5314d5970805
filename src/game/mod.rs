use std::fs;
use std::path::PathBuf;

use log::debug;

use crate::env;
use crate::services::{GameInfo, GameInstallation};

pub const GAME_EXECUTABLE: &str = "Minecraft.Windows.exe";
const PACKAGE_MANIFEST: &str = "AppxManifest.xml";
const PACKAGE_SIGNATURE: &str = "AppxSignature.p7x";
const DEVELOPMENT_KIT_CONFIG: &str = "MicrosoftGame.config";

/// Game install inspected straight from its folder.
#[derive(Clone, Debug)]
pub struct LocalGame {
    dir: PathBuf,
}

impl Default for LocalGame {
    fn default() -> Self {
        Self::new(env::game_dir())
    }
}

impl LocalGame {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn executable(&self) -> PathBuf {
        self.dir.join(GAME_EXECUTABLE)
    }

    fn read_version(&self, development_kit: bool) -> Option<String> {
        let source = if development_kit {
            DEVELOPMENT_KIT_CONFIG
        } else {
            PACKAGE_MANIFEST
        };
        let text = fs::read_to_string(self.dir.join(source)).ok()?;
        identity_version(&text).map(|raw| friendly_version(&raw))
    }
}

impl GameInstallation for LocalGame {
    fn inspect(&self) -> GameInfo {
        let installed = self.executable().is_file();
        let development_kit = self.dir.join(DEVELOPMENT_KIT_CONFIG).is_file();
        let info = GameInfo {
            installed,
            signed: self.dir.join(PACKAGE_SIGNATURE).is_file(),
            packaged: self.dir.join(PACKAGE_MANIFEST).is_file(),
            development_kit,
            version: installed.then(|| self.read_version(development_kit)).flatten(),
        };
        debug!("game: {} -> {:?}", self.dir.display(), info);
        info
    }
}

/// `Version` attribute of the first `<Identity>` element.
fn identity_version(xml: &str) -> Option<String> {
    let identity = &xml[xml.find("<Identity")?..];
    let element = &identity[..identity.find('>')?];
    let start = element.find("Version=\"")? + "Version=\"".len();
    let rest = &element[start..];
    Some(rest[..rest.find('"')?].to_owned())
}

/// Package versions carry the patch number scaled by 100
/// (`1.21.5001.0` is `1.21.50`).
fn friendly_version(raw: &str) -> String {
    let parts: Vec<&str> = raw.split('.').collect();
    match parts.as_slice() {
        [major, minor, build, ..] => match build.parse::<u32>() {
            Ok(build) => format!("{major}.{minor}.{}", build / 100),
            Err(_) => raw.to_owned(),
        },
        _ => raw.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("flarial-game-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_identity_version() {
        let xml = r#"<Package><Identity Name="Microsoft.MinecraftUWP" Publisher="CN=x" Version="1.21.5001.0" /></Package>"#;
        assert_eq!(identity_version(xml).as_deref(), Some("1.21.5001.0"));
        assert_eq!(identity_version("<Package/>"), None);
    }

    #[test]
    fn scales_build_numbers() {
        assert_eq!(friendly_version("1.21.5001.0"), "1.21.50");
        assert_eq!(friendly_version("1.20.8101.0"), "1.20.81");
        assert_eq!(friendly_version("weird"), "weird");
    }

    #[test]
    fn empty_folder_is_not_installed() {
        let dir = scratch("empty");
        assert_eq!(LocalGame::new(&dir).inspect(), GameInfo::default());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn signed_package_reports_version() {
        let dir = scratch("signed");
        fs::write(dir.join(GAME_EXECUTABLE), b"MZ").unwrap();
        fs::write(dir.join(PACKAGE_SIGNATURE), b"").unwrap();
        fs::write(
            dir.join(PACKAGE_MANIFEST),
            r#"<Package><Identity Version="1.21.5001.0"/></Package>"#,
        )
        .unwrap();
        let info = LocalGame::new(&dir).inspect();
        assert!(info.installed && info.signed && info.packaged);
        assert!(!info.development_kit);
        assert_eq!(info.version.as_deref(), Some("1.21.50"));
        let _ = fs::remove_dir_all(dir);
    }
}
