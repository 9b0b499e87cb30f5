use bevy::prelude::*;

pub mod definition;
pub mod pipeline;

pub use definition::{
    resolve_seed, DrawMode, GenerationSettings, IslandSettings, IslandTypeEntry, NoiseSettings,
    VoronoiSettings,
};
pub use pipeline::{PipelineOutput, TerrainPipeline};

/// Island generation plugin.
/// Provides the generation settings resource.
pub struct IgWorldPlugin;

impl Plugin for IgWorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GenerationSettings>();
    }
}
