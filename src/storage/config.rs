use std::path::Path;

use anyhow::Context;
use ytogg_core::fs_paths::AppPaths;
use ytogg_core::models::settings::AppSettings;

pub fn load_settings_from(path: &Path) -> AppSettings {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return AppSettings::default(),
        Err(e) => {
            tracing::warn!("could not read {:?}, using defaults: {}", path, e);
            return AppSettings::default();
        }
    };

    match serde_json::from_str::<AppSettings>(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("invalid settings in {:?}, using defaults: {}", path, e);
            AppSettings::default()
        }
    }
}

pub fn load_settings(paths: &dyn AppPaths) -> AppSettings {
    load_settings_from(&paths.settings_file())
}

pub fn save_settings(paths: &dyn AppPaths, settings: &AppSettings) -> anyhow::Result<()> {
    let path = paths.settings_file();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating settings directory {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json).with_context(|| format!("writing {:?}", path))?;
    Ok(())
}
