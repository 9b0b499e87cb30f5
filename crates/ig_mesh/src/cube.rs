//! Unit cube geometry, one quad per face.

use crate::mesh::TerrainMesh;

/// Four corners per face, six faces.
pub const VERTICES_PER_CUBE: usize = 24;

/// Two triangles per face, six faces.
pub const TRIANGLES_PER_CUBE: usize = 12;

/// One of the six directions a cube face can point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceDirection {
    /// +X direction.
    PosX,
    /// −X direction.
    NegX,
    /// +Y direction.
    PosY,
    /// −Y direction.
    NegY,
    /// +Z direction.
    PosZ,
    /// −Z direction.
    NegZ,
}

impl FaceDirection {
    /// All six directions in order.
    pub const ALL: [FaceDirection; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Returns the unit normal as `[f32; 3]` for this face direction.
    pub fn normal(self) -> [f32; 3] {
        match self {
            Self::PosX => [1.0, 0.0, 0.0],
            Self::NegX => [-1.0, 0.0, 0.0],
            Self::PosY => [0.0, 1.0, 0.0],
            Self::NegY => [0.0, -1.0, 0.0],
            Self::PosZ => [0.0, 0.0, 1.0],
            Self::NegZ => [0.0, 0.0, -1.0],
        }
    }

    /// Corners of this face on a unit cube centered at the origin,
    /// counter-clockwise when seen from outside.
    pub fn corners(self) -> [[f32; 3]; 4] {
        const H: f32 = 0.5;
        match self {
            Self::PosX => [[H, -H, H], [H, -H, -H], [H, H, -H], [H, H, H]],
            Self::NegX => [[-H, -H, -H], [-H, -H, H], [-H, H, H], [-H, H, -H]],
            Self::PosY => [[-H, H, H], [H, H, H], [H, H, -H], [-H, H, -H]],
            Self::NegY => [[-H, -H, -H], [H, -H, -H], [H, -H, H], [-H, -H, H]],
            Self::PosZ => [[-H, -H, H], [H, -H, H], [H, H, H], [-H, H, H]],
            Self::NegZ => [[H, -H, -H], [-H, -H, -H], [-H, H, -H], [H, H, -H]],
        }
    }
}

/// A unit cube centered at the origin.
pub fn unit_cube() -> TerrainMesh {
    let mut mesh = TerrainMesh::with_capacity(VERTICES_PER_CUBE, TRIANGLES_PER_CUBE);
    for (base, face) in (0u32..).step_by(4).zip(FaceDirection::ALL) {
        mesh.positions.extend_from_slice(&face.corners());
        mesh.normals.extend_from_slice(&[face.normal(); 4]);
        mesh.triangles.push([base, base + 1, base + 2]);
        mesh.triangles.push([base, base + 2, base + 3]);
    }
    mesh
}
