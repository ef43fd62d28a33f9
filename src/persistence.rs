use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SettingsError;
use crate::params::SimParams;

const SETTINGS_FILE: &str = "settings.json";

/// Get the data directory for storing settings
/// - If running from source (binary path contains "target") or FIRE_SMOKE_DEV is set: ./tmp/fire-smoke
/// - If installed (binary path elsewhere): ~/.local/share/fire-smoke
pub fn get_data_dir() -> PathBuf {
    let use_local_storage = std::env::var("FIRE_SMOKE_DEV").is_ok()
        || std::env::current_exe()
            .map(|p| p.iter().any(|c| c == "target"))
            .unwrap_or(false);

    if use_local_storage {
        // 'cargo run' sets CWD to the project root
        let mut path = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        path.push("tmp");
        path.push("fire-smoke");
        path
    } else {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("fire-smoke")
    }
}

pub fn settings_path() -> PathBuf {
    get_data_dir().join(SETTINGS_FILE)
}

/// Ensure the data directory exists
pub fn ensure_data_dir() -> std::io::Result<PathBuf> {
    let dir = get_data_dir();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Load saved parameters. A missing file yields the defaults.
pub fn load_settings() -> Result<SimParams, SettingsError> {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &Path) -> Result<SimParams, SettingsError> {
    if !path.exists() {
        return Ok(SimParams::default());
    }
    let content = fs::read_to_string(path)?;
    let params: SimParams = serde_json::from_str(&content)?;
    Ok(params.sanitized())
}

/// Save parameters as pretty JSON, returning the written path
pub fn save_settings(params: &SimParams) -> Result<PathBuf, SettingsError> {
    let dir = ensure_data_dir()?;
    let path = dir.join(SETTINGS_FILE);
    save_settings_to(&path, params)?;
    Ok(path)
}

pub fn save_settings_to(path: &Path, params: &SimParams) -> Result<(), SettingsError> {
    let payload = serde_json::to_string_pretty(params)?;
    fs::write(path, payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BlendMode;

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fire-smoke-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = scratch_file("does-not-exist.json");
        let params = load_settings_from(&path).unwrap();
        assert_eq!(params, SimParams::default());
    }

    #[test]
    fn test_saved_settings_reload() {
        let path = scratch_file("saved.json");
        let mut params = SimParams::default();
        params.fire.blend_mode = BlendMode::Multiply;
        params.scene.text = "FIRE".to_string();
        save_settings_to(&path, &params).unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded, params);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_loaded_values_are_sanitized() {
        let path = scratch_file("out-of-range.json");
        fs::write(&path, r#"{"smoke": {"count": 99999, "opacity": 7.0}}"#).unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.smoke.count, crate::config::limits::MAX_SMOKE_PARTICLES);
        assert_eq!(loaded.smoke.opacity, 1.0);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let path = scratch_file("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_settings_from(&path), Err(SettingsError::Json(_))));
        fs::remove_file(&path).ok();
    }
}
