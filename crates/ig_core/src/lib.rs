pub mod error;
pub mod grid;
pub mod noise;
pub mod region;

pub use error::{GenError, GenResult};
pub use grid::{grayscale_to_rgba, ColorBuffer, HeightGrid, Rgba};
pub use noise::CoherentNoise;
pub use region::{classify_grid, Classification, Palette, RegionSpec};
