use std::fs;
use std::path::{Path, PathBuf};

use bevy::log::debug;
use ig_core::GenError;
use ig_world::GenerationSettings;
use thiserror::Error;

/// Default directory for saved presets.
pub const PRESETS_DIR: &str = "assets/presets";

/// Error type for preset I/O operations.
#[derive(Debug, Error)]
pub enum SettingsIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON serialization error: {0}")]
    Ron(#[from] ron::Error),
    #[error("RON parse error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
    #[error("invalid preset: {0}")]
    Invalid(#[from] GenError),
}

/// Save generation settings to a RON file.
pub fn save_settings(path: &Path, settings: &GenerationSettings) -> Result<(), SettingsIoError> {
    let pretty_config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .separate_tuple_members(true)
        .enumerate_arrays(true);

    let ron_string = ron::ser::to_string_pretty(settings, pretty_config)?;
    fs::write(path, ron_string)?;
    debug!("Saved preset '{}' to {}", settings.name, path.display());
    Ok(())
}

/// Load generation settings from a RON file.
///
/// Fields missing from the file take their defaults. The result is
/// validated, so a preset that loads is one the pipeline accepts.
pub fn load_settings(path: &Path) -> Result<GenerationSettings, SettingsIoError> {
    let contents = fs::read_to_string(path)?;
    let settings: GenerationSettings = ron::from_str(&contents)?;
    settings.validate()?;
    debug!("Loaded preset '{}' from {}", settings.name, path.display());
    Ok(settings)
}

/// Save `settings` into `dir` under a filename derived from its name,
/// creating the directory if needed. Returns the path written.
pub fn save_preset(dir: &Path, settings: &GenerationSettings) -> Result<PathBuf, SettingsIoError> {
    ensure_presets_dir(dir)?;
    let path = preset_path(dir, &settings.name);
    save_settings(&path, settings)?;
    Ok(path)
}

/// Ensure a presets directory exists.
pub fn ensure_presets_dir(dir: &Path) -> Result<(), std::io::Error> {
    fs::create_dir_all(dir)
}

/// List all `.ron` files in `dir`, sorted. A missing directory has no presets.
pub fn list_presets(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut presets = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            presets.push(path);
        }
    }

    presets.sort();
    Ok(presets)
}

/// Generate a filename from a preset name.
pub fn preset_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}.ron", sanitized.to_lowercase())
}

/// Get the full path for a preset file in `dir`.
pub fn preset_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(preset_filename(name))
}
