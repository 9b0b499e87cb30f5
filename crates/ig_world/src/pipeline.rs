//! One-shot generation from a [`GenerationSettings`].

use bevy::log::{debug, info};
use ig_core::{classify_grid, ColorBuffer, GenResult, HeightGrid};
use ig_mesh::{VoxelMeshBuilder, VoxelTerrain};
use ig_noise::{apply_mask, generate_color_partition, generate_distance_field, generate_mask, NoiseField};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::definition::{resolve_seed, DrawMode, GenerationSettings};

/// What a run produced.
#[derive(Debug, Clone)]
pub enum PipelineOutput {
    Raster(ColorBuffer),
    Voxels(VoxelTerrain),
}

impl PipelineOutput {
    pub fn as_raster(&self) -> Option<&ColorBuffer> {
        match self {
            Self::Raster(buffer) => Some(buffer),
            Self::Voxels(_) => None,
        }
    }

    pub fn as_voxels(&self) -> Option<&VoxelTerrain> {
        match self {
            Self::Voxels(terrain) => Some(terrain),
            Self::Raster(_) => None,
        }
    }
}

/// Validated settings with the seed fixed for the lifetime of the pipeline.
#[derive(Debug, Clone)]
pub struct TerrainPipeline {
    settings: GenerationSettings,
    seed: u32,
}

impl TerrainPipeline {
    /// Validate `settings` and resolve a zero seed to a random one.
    pub fn new(settings: &GenerationSettings) -> GenResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings: settings.clone(),
            seed: resolve_seed(settings.seed),
        })
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// The seed every stage of this pipeline uses.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Raw normalized noise.
    pub fn noise_grid(&self) -> GenResult<HeightGrid> {
        NoiseField::new().generate(&self.settings.noise_params(self.seed))
    }

    /// Mask of the configured island shape.
    pub fn mask(&self) -> GenResult<HeightGrid> {
        generate_mask(self.settings.map_size, self.settings.island.variant()?)
    }

    /// Noise with the island mask applied, unless the shape leaves noise untouched.
    pub fn height_map(&self) -> GenResult<HeightGrid> {
        let noise = self.noise_grid()?;
        let variant = self.settings.island.variant()?;
        if variant.is_identity() {
            return Ok(noise);
        }
        apply_mask(&noise, &self.mask()?)
    }

    /// Rng for the Voronoi stages, kept apart from the noise octave stream.
    fn voronoi_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(1) as u64)
    }

    /// Produce the output selected by the draw mode.
    pub fn run(&self) -> GenResult<PipelineOutput> {
        let size = self.settings.map_size;
        let mode = self.settings.draw_mode;
        info!(
            "Generating {} ({}x{}, seed {})",
            mode.name(),
            size,
            size,
            self.seed
        );

        let output = match mode {
            DrawMode::VoronoiColour => PipelineOutput::Raster(generate_color_partition(
                size,
                self.settings.voronoi.site_count,
                &mut self.voronoi_rng(),
            )?),
            DrawMode::VoronoiDistance => PipelineOutput::Raster(generate_distance_field(
                size,
                self.settings.voronoi.site_count,
                &mut self.voronoi_rng(),
            )?),
            DrawMode::IslandMask => PipelineOutput::Raster(self.mask()?.to_grayscale()),
            DrawMode::Noise => PipelineOutput::Raster(self.noise_grid()?.to_grayscale()),
            DrawMode::ColourNoise => {
                PipelineOutput::Raster(classify_grid(&self.height_map()?, &self.settings.palette))
            }
            DrawMode::Voxels => {
                let builder = VoxelMeshBuilder::new(self.settings.voxel.clone());
                PipelineOutput::Voxels(builder.build(&self.height_map()?, &self.settings.palette)?)
            }
        };
        debug!("{} finished", mode.name());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ig_core::GenError;
    use ig_mesh::VERTICES_PER_CUBE;

    fn settings(mode: DrawMode) -> GenerationSettings {
        GenerationSettings {
            map_size: 16,
            seed: 42,
            draw_mode: mode,
            ..Default::default()
        }
    }

    #[test]
    fn every_mode_produces_its_output() {
        for &mode in DrawMode::all() {
            let output = TerrainPipeline::new(&settings(mode)).unwrap().run().unwrap();
            match output {
                PipelineOutput::Raster(buffer) => {
                    assert!(mode.is_raster(), "{} gave a raster", mode.name());
                    assert_eq!(buffer.size(), 16);
                    assert_eq!(buffer.pixels().len(), 256);
                }
                PipelineOutput::Voxels(terrain) => {
                    assert_eq!(mode, DrawMode::Voxels);
                    assert_eq!(terrain.total_vertex_count(), 256 * VERTICES_PER_CUBE);
                }
            }
        }
    }

    #[test]
    fn runs_are_reproducible() {
        for &mode in DrawMode::all() {
            if !mode.is_raster() {
                continue;
            }
            let a = TerrainPipeline::new(&settings(mode)).unwrap().run().unwrap();
            let b = TerrainPipeline::new(&settings(mode)).unwrap().run().unwrap();
            assert_eq!(a.as_raster(), b.as_raster(), "{} differs", mode.name());
        }
    }

    #[test]
    fn zero_seed_is_resolved_once() {
        let pipeline = TerrainPipeline::new(&GenerationSettings {
            map_size: 8,
            seed: 0,
            ..Default::default()
        })
        .unwrap();
        assert_ne!(pipeline.seed(), 0);
        assert_eq!(pipeline.noise_grid().unwrap(), pipeline.noise_grid().unwrap());
    }

    #[test]
    fn falloff_lowers_the_edges() {
        let pipeline = TerrainPipeline::new(&settings(DrawMode::ColourNoise)).unwrap();
        let noise = pipeline.noise_grid().unwrap();
        let shaped = pipeline.height_map().unwrap();
        for (a, b) in noise.values().iter().zip(shaped.values()) {
            assert!(b <= a, "Mask raised {} to {}", a, b);
        }
        assert_eq!(shaped.get(0, 0), Some(0.0));
    }

    #[test]
    fn identity_shapes_leave_noise_untouched() {
        let mut s = settings(DrawMode::ColourNoise);
        s.island.island_type = 1;
        let pipeline = TerrainPipeline::new(&s).unwrap();
        assert_eq!(pipeline.height_map().unwrap(), pipeline.noise_grid().unwrap());
    }

    #[test]
    fn invalid_settings_are_rejected_up_front() {
        let mut s = settings(DrawMode::VoronoiColour);
        s.voronoi.site_count = 0;
        assert!(matches!(
            TerrainPipeline::new(&s),
            Err(GenError::InvalidParameter { name: "site_count", .. })
        ));
    }
}
