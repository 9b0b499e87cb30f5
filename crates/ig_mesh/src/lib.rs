pub mod cube;
pub mod mesh;
pub mod voxel;

pub use cube::{unit_cube, FaceDirection, TRIANGLES_PER_CUBE, VERTICES_PER_CUBE};
pub use mesh::{TerrainMesh, MAX_MESH_VERTICES};
pub use voxel::{HeightStyle, RegionMesh, VoxelCell, VoxelMeshBuilder, VoxelSettings, VoxelTerrain};
