//! RON save/load for generation presets.

pub mod settings_io;

pub use settings_io::{
    ensure_presets_dir, list_presets, load_settings, preset_filename, preset_path, save_preset,
    save_settings, SettingsIoError, PRESETS_DIR,
};
