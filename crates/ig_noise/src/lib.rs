pub mod island;
pub mod noise_field;
pub mod voronoi;

pub use island::{apply_mask, generate_mask, shaping_curve, IslandVariant};
pub use noise_field::{NoiseField, NoiseParams, PanOffset, PerlinSource, MAX_SAMPLE_COORD, MIN_SCALE, OCTAVE_OFFSET_RANGE};
pub use voronoi::{generate_color_partition, generate_distance_field, Site, VoronoiField};
