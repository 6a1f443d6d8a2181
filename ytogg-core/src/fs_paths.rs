use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "YTOGG_DATA_DIR";
const SETTINGS_FILE: &str = "settings.json";

pub trait AppPaths: Send + Sync {
    fn data_dir(&self) -> PathBuf;

    fn bin_dir(&self) -> PathBuf {
        self.data_dir().join("bin")
    }

    fn settings_file(&self) -> PathBuf {
        self.data_dir().join(SETTINGS_FILE)
    }
}

pub struct DesktopPaths;

impl AppPaths for DesktopPaths {
    fn data_dir(&self) -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        dirs::data_dir()
            .map(|d| d.join("ytogg"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Paths rooted at a fixed directory, for portable installs and tests.
pub struct FixedPaths(pub PathBuf);

impl AppPaths for FixedPaths {
    fn data_dir(&self) -> PathBuf {
        self.0.clone()
    }
}
