//! Command-line arguments for the headless generator.

use std::path::PathBuf;

use clap::Parser;
use ig_persistence::{load_settings, SettingsIoError, PRESETS_DIR};
use ig_world::{DrawMode, GenerationSettings};

/// islegen command-line arguments.
///
/// CLI values override settings loaded from the preset file.
#[derive(Parser, Debug, Clone)]
#[command(name = "islegen", about = "Procedural island terrain generator")]
pub struct CliArgs {
    /// Preset to start from (RON). Defaults apply when omitted.
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// Generation seed. Zero picks a random one.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Cells per side.
    #[arg(long)]
    pub size: Option<usize>,

    /// Island shape id, looked up in the preset's island table.
    #[arg(long)]
    pub island: Option<u8>,

    /// What to generate, e.g. "voxels" or "colour-noise".
    #[arg(long, value_parser = parse_draw_mode)]
    pub mode: Option<DrawMode>,

    /// Write the settings actually used, with the resolved seed. Without a
    /// path the file goes into the presets directory, named after the preset.
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    pub save: Option<Option<PathBuf>>,

    /// Directory for named presets.
    #[arg(long, default_value = PRESETS_DIR)]
    pub presets_dir: PathBuf,

    /// List the presets in the presets directory and exit.
    #[arg(long)]
    pub list_presets: bool,

    /// Log at debug level.
    #[arg(long, short)]
    pub verbose: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            preset: None,
            seed: None,
            size: None,
            island: None,
            mode: None,
            save: None,
            presets_dir: PathBuf::from(PRESETS_DIR),
            list_presets: false,
            verbose: false,
        }
    }
}

impl CliArgs {
    /// Apply CLI overrides to loaded settings.
    pub fn apply_overrides(&self, settings: &mut GenerationSettings) {
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(size) = self.size {
            settings.map_size = size;
        }
        if let Some(island) = self.island {
            settings.island.island_type = island;
        }
        if let Some(mode) = self.mode {
            settings.draw_mode = mode;
        }
    }

    /// Load the preset, or start from defaults, then apply overrides.
    pub fn resolve_settings(&self) -> Result<GenerationSettings, SettingsIoError> {
        let mut settings = match &self.preset {
            Some(path) => load_settings(path)?,
            None => GenerationSettings::default(),
        };
        self.apply_overrides(&mut settings);
        Ok(settings)
    }
}

/// Match a draw mode by name, ignoring case, spaces, dashes and underscores.
fn parse_draw_mode(value: &str) -> Result<DrawMode, String> {
    let wanted: String = value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    DrawMode::all()
        .iter()
        .copied()
        .find(|mode| {
            mode.name()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .eq(wanted.chars())
        })
        .ok_or_else(|| {
            let names: Vec<_> = DrawMode::all().iter().map(|m| m.name()).collect();
            format!("unknown draw mode '{}', expected one of: {}", value, names.join(", "))
        })
}
