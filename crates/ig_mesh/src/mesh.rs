//! Renderer-neutral triangle mesh.

use bevy::math::{Mat3, Mat4, Vec3};
use bevy::render::mesh::{Indices, Mesh};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::PrimitiveTopology;
use ig_core::{GenError, GenResult};

/// Most vertices a mesh can hold with 32-bit indices.
pub const MAX_MESH_VERTICES: usize = u32::MAX as usize;

/// An indexed triangle list with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

impl TerrainMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(triangles),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Append `other` with `transform` applied to its positions and normals.
    /// Triangle indices are rebased onto this mesh's vertices.
    ///
    /// Fails without modifying `self` if the result would exceed
    /// [`MAX_MESH_VERTICES`].
    pub fn append_transformed(&mut self, other: &TerrainMesh, transform: &Mat4) -> GenResult<()> {
        let base = index_base(self.positions.len(), other.positions.len())?;
        let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

        self.positions.extend(
            other
                .positions
                .iter()
                .map(|&p| transform.transform_point3(Vec3::from(p)).to_array()),
        );
        self.normals.extend(
            other
                .normals
                .iter()
                .map(|&n| (normal_matrix * Vec3::from(n)).normalize_or_zero().to_array()),
        );
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|t| [t[0] + base, t[1] + base, t[2] + base]),
        );
        Ok(())
    }

    /// Flattened triangle indices.
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((Vec3::from(first), Vec3::from(first)), |(min, max), &p| {
                (min.min(Vec3::from(p)), max.max(Vec3::from(p)))
            });
        Some((min.to_array(), max.to_array()))
    }
}

/// Index of the first appended vertex, checked against the 32-bit index limit.
fn index_base(current: usize, adding: usize) -> GenResult<u32> {
    let total = current
        .checked_add(adding)
        .filter(|&total| total <= MAX_MESH_VERTICES);
    match total {
        Some(_) => u32::try_from(current)
            .map_err(|_| GenError::invalid("mesh", "vertex count exceeds 32-bit indices")),
        None => Err(GenError::invalid(
            "mesh",
            format!("{current} + {adding} vertices exceeds 32-bit indices"),
        )),
    }
}

impl From<&TerrainMesh> for Mesh {
    fn from(mesh: &TerrainMesh) -> Self {
        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, mesh.positions.clone())
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, mesh.normals.clone())
            .with_inserted_indices(Indices::U32(mesh.indices()))
    }
}
