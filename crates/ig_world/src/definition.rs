use bevy::log::info;
use bevy::prelude::*;
use ig_core::{GenError, GenResult, Palette};
use ig_mesh::VoxelSettings;
use ig_noise::{IslandVariant, NoiseParams, PanOffset};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Everything needed to reproduce one generated map.
///
/// This is the top-level serializable structure saved as a preset. Missing
/// fields fall back to their defaults when loading.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Human-readable name for this preset.
    pub name: String,
    /// Cells per side of every generated grid.
    pub map_size: usize,
    /// Generation seed. Zero means "pick one at generation time".
    pub seed: u32,
    pub noise: NoiseSettings,
    pub island: IslandSettings,
    pub voronoi: VoronoiSettings,
    /// Terrain bands used for coloring and voxel grouping.
    pub palette: Palette,
    /// Which product a pipeline run emits.
    pub draw_mode: DrawMode,
    pub voxel: VoxelSettings,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            name: "New Island".to_string(),
            map_size: 100,
            seed: 0,
            noise: NoiseSettings::default(),
            island: IslandSettings::default(),
            voronoi: VoronoiSettings::default(),
            palette: Palette::terrain_default(),
            draw_mode: DrawMode::default(),
            voxel: VoxelSettings::default(),
        }
    }
}

impl GenerationSettings {
    /// Check every parameter that generation would otherwise reject.
    pub fn validate(&self) -> GenResult<()> {
        if self.map_size == 0 {
            return Err(GenError::invalid("map_size", "must be at least 1"));
        }
        if !self.noise.persistence.is_finite() {
            return Err(GenError::invalid("persistence", "must be finite"));
        }
        if !self.noise.lacunarity.is_finite() {
            return Err(GenError::invalid("lacunarity", "must be finite"));
        }
        if self.voronoi.site_count == 0 {
            return Err(GenError::invalid("site_count", "must be at least 1"));
        }
        self.island.variant()?;
        self.voxel.validate()
    }

    /// Noise parameters for a run with an already-resolved seed.
    pub fn noise_params(&self, seed: u32) -> NoiseParams {
        NoiseParams::with_params(
            self.map_size,
            seed,
            self.noise.scale,
            self.noise.octaves,
            self.noise.persistence,
            self.noise.lacunarity,
            self.noise.offset,
        )
    }
}

/// Substitute a random nonzero seed when `seed` is zero.
pub fn resolve_seed(seed: u32) -> u32 {
    if seed != 0 {
        return seed;
    }
    let picked = rand::thread_rng().gen_range(1..=u32::MAX);
    info!("Seed 0 requested, using random seed {}", picked);
    picked
}

/// Coherent-noise parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Zoom; larger values stretch the features.
    pub scale: f64,
    /// Number of noise layers summed per cell.
    pub octaves: u32,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    pub offset: PanOffset,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            scale: 100.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: PanOffset::default(),
        }
    }
}

/// One row of the island id table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IslandTypeEntry {
    pub id: u8,
    pub variant: IslandVariant,
}

/// Island shaping selection.
///
/// Shapes are picked by numeric id, the way a dropdown or a command line
/// would hand them over. The id table is part of the settings so presets can
/// remap ids without code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandSettings {
    /// Apply the selected mask at all.
    pub enabled: bool,
    /// Selected id, looked up in `table`.
    pub island_type: u8,
    pub table: Vec<IslandTypeEntry>,
}

impl Default for IslandSettings {
    fn default() -> Self {
        let table = [
            IslandVariant::Falloff,
            IslandVariant::Pangaea,
            IslandVariant::Round,
            IslandVariant::Ring,
            IslandVariant::Archipelago,
            IslandVariant::Lake,
        ]
        .into_iter()
        .enumerate()
        .map(|(id, variant)| IslandTypeEntry { id: id as u8, variant })
        .collect();

        Self {
            enabled: true,
            island_type: 0,
            table,
        }
    }
}

impl IslandSettings {
    /// The variant to apply. Disabled settings resolve to [`IslandVariant::None`].
    pub fn variant(&self) -> GenResult<IslandVariant> {
        if !self.enabled {
            return Ok(IslandVariant::None);
        }
        self.table
            .iter()
            .find(|entry| entry.id == self.island_type)
            .map(|entry| entry.variant)
            .ok_or_else(|| {
                GenError::invalid(
                    "island_type",
                    format!("no island shape registered for id {}", self.island_type),
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoronoiSettings {
    /// Number of random sites.
    pub site_count: usize,
}

impl Default for VoronoiSettings {
    fn default() -> Self {
        Self { site_count: 20 }
    }
}

/// Product emitted by a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawMode {
    /// Voronoi regions, one random color per site.
    VoronoiColour,
    /// Grayscale distance to the nearest Voronoi site.
    VoronoiDistance,
    /// Grayscale island mask.
    IslandMask,
    /// Grayscale raw noise.
    Noise,
    /// Shaped height map colored by palette.
    #[default]
    ColourNoise,
    /// Shaped height map as per-region voxel meshes.
    Voxels,
}

impl DrawMode {
    /// Returns all draw modes.
    pub fn all() -> &'static [DrawMode] {
        &[
            Self::VoronoiColour,
            Self::VoronoiDistance,
            Self::IslandMask,
            Self::Noise,
            Self::ColourNoise,
            Self::Voxels,
        ]
    }

    /// Returns the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VoronoiColour => "Voronoi Colour",
            Self::VoronoiDistance => "Voronoi Distance",
            Self::IslandMask => "Island Mask",
            Self::Noise => "Noise",
            Self::ColourNoise => "Colour Noise",
            Self::Voxels => "Voxels",
        }
    }

    /// True when the mode produces a color buffer rather than meshes.
    pub fn is_raster(&self) -> bool {
        !matches!(self, Self::Voxels)
    }
}
