//! Voxel columns for a classified height map.
//!
//! Every grid cell becomes one box. Boxes are grouped by region and each
//! group is merged into a single [`TerrainMesh`], so a renderer needs one
//! draw per region rather than one per cell.

use bevy::log::debug;
use bevy::math::{Mat4, Quat, Vec3};
use ig_core::{GenError, GenResult, HeightGrid, Palette, RegionSpec, Rgba};
use serde::{Deserialize, Serialize};

use crate::cube::{unit_cube, VERTICES_PER_CUBE};
use crate::mesh::{TerrainMesh, MAX_MESH_VERTICES};

/// How a normalized height becomes a column elevation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeightStyle {
    /// Elevation rounded to whole units (ties to even), giving a terraced look.
    #[default]
    Quantized,
    /// Elevation used as is.
    Continuous,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelSettings {
    /// Side length of the square the whole map occupies in world units.
    pub footprint: f32,
    /// Vertical extent of each column.
    pub column_height: f32,
    /// Multiplier from normalized height to world elevation.
    pub height_scale: f32,
    pub style: HeightStyle,
    /// Regions whose threshold is below this sit at elevation zero.
    pub water_cutoff: f64,
}

impl Default for VoxelSettings {
    fn default() -> Self {
        Self {
            footprint: 30.0,
            column_height: 2.0,
            height_scale: 5.0,
            style: HeightStyle::Quantized,
            water_cutoff: 0.25,
        }
    }
}

impl VoxelSettings {
    pub fn validate(&self) -> GenResult<()> {
        if !(self.footprint.is_finite() && self.footprint > 0.0) {
            return Err(GenError::invalid("footprint", format!("must be positive, got {}", self.footprint)));
        }
        if !(self.column_height.is_finite() && self.column_height > 0.0) {
            return Err(GenError::invalid(
                "column_height",
                format!("must be positive, got {}", self.column_height),
            ));
        }
        if !self.height_scale.is_finite() {
            return Err(GenError::invalid("height_scale", "must be finite"));
        }
        if self.water_cutoff.is_nan() {
            return Err(GenError::invalid("water_cutoff", "must not be NaN"));
        }
        Ok(())
    }
}

/// Placement of one column before geometry is emitted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelCell {
    pub x: usize,
    pub z: usize,
    /// Elevation of the column center.
    pub height: f32,
    /// Index into the palette the cell was classified with.
    pub region_id: usize,
}

/// All columns belonging to one region, merged.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionMesh {
    pub name: String,
    pub color: Rgba,
    pub cell_count: usize,
    pub mesh: TerrainMesh,
}

/// One merged mesh per palette region, in palette order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoxelTerrain {
    regions: Vec<RegionMesh>,
}

impl VoxelTerrain {
    pub fn regions(&self) -> &[RegionMesh] {
        &self.regions
    }

    pub fn into_regions(self) -> Vec<RegionMesh> {
        self.regions
    }

    pub fn region(&self, name: &str) -> Option<&RegionMesh> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn mesh(&self, name: &str) -> Option<&TerrainMesh> {
        self.region(name).map(|r| &r.mesh)
    }

    pub fn total_cells(&self) -> usize {
        self.regions.iter().map(|r| r.cell_count).sum()
    }

    pub fn total_vertex_count(&self) -> usize {
        self.regions.iter().map(|r| r.mesh.vertex_count()).sum()
    }

    pub fn total_triangle_count(&self) -> usize {
        self.regions.iter().map(|r| r.mesh.triangle_count()).sum()
    }
}

/// Turns a height grid and palette into per-region voxel meshes.
#[derive(Clone, Debug, Default)]
pub struct VoxelMeshBuilder {
    settings: VoxelSettings,
}

impl VoxelMeshBuilder {
    pub fn new(settings: VoxelSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &VoxelSettings {
        &self.settings
    }

    /// Elevation of a cell of the given height classified into `region`.
    pub fn cell_height(&self, height: f64, region: &RegionSpec) -> f32 {
        if region.threshold < self.settings.water_cutoff {
            return 0.0;
        }
        let raw = height as f32 * self.settings.height_scale;
        match self.settings.style {
            HeightStyle::Quantized => raw.round_ties_even(),
            HeightStyle::Continuous => raw,
        }
    }

    /// Classify and place every cell of `grid`, in grid order.
    pub fn layout(&self, grid: &HeightGrid, palette: &Palette) -> GenResult<Vec<VoxelCell>> {
        self.settings.validate()?;
        Ok(grid
            .cells()
            .map(|(x, z, h)| {
                let class = palette.classify(h);
                VoxelCell {
                    x,
                    z,
                    height: self.cell_height(h, class.region),
                    region_id: class.id,
                }
            })
            .collect())
    }

    /// World transform taking the unit cube onto `cell`'s column.
    /// The map is centered on the origin in the XZ plane.
    pub fn cell_transform(&self, cell: &VoxelCell, map_size: usize) -> Mat4 {
        let step = self.settings.footprint / map_size as f32;
        let origin = -self.settings.footprint / 2.0 + step / 2.0;
        let translation = Vec3::new(
            origin + cell.x as f32 * step,
            cell.height,
            origin + cell.z as f32 * step,
        );
        let scale = Vec3::new(step, self.settings.column_height, step);
        Mat4::from_scale_rotation_translation(scale, Quat::IDENTITY, translation)
    }

    /// Build one merged mesh per region.
    ///
    /// Meshes use 32-bit indices, so a map whose cells need more than
    /// [`MAX_MESH_VERTICES`] vertices in total is rejected.
    pub fn build(&self, grid: &HeightGrid, palette: &Palette) -> GenResult<VoxelTerrain> {
        check_vertex_budget(grid.size())?;
        let cells = self.layout(grid, palette)?;
        let cube = unit_cube();

        // Regions sharing a name share a bucket.
        let mut regions: Vec<RegionMesh> = Vec::new();
        let mut bucket_of = Vec::with_capacity(palette.len());
        for spec in palette.regions() {
            let bucket = match regions.iter().position(|r| r.name == spec.name) {
                Some(existing) => existing,
                None => {
                    regions.push(RegionMesh {
                        name: spec.name.clone(),
                        color: spec.color,
                        cell_count: 0,
                        mesh: TerrainMesh::new(),
                    });
                    regions.len() - 1
                }
            };
            bucket_of.push(bucket);
        }

        for cell in &cells {
            let region = &mut regions[bucket_of[cell.region_id]];
            region
                .mesh
                .append_transformed(&cube, &self.cell_transform(cell, grid.size()))?;
            region.cell_count += 1;
        }

        let terrain = VoxelTerrain { regions };
        debug!(
            "Built voxel terrain: {} cells, {} regions, {} vertices",
            terrain.total_cells(),
            terrain.regions().len(),
            terrain.total_vertex_count()
        );
        Ok(terrain)
    }
}

fn check_vertex_budget(map_size: usize) -> GenResult<()> {
    let vertices = map_size
        .checked_mul(map_size)
        .and_then(|cells| cells.checked_mul(VERTICES_PER_CUBE));
    match vertices {
        Some(v) if v <= MAX_MESH_VERTICES => Ok(()),
        _ => Err(GenError::invalid(
            "map_size",
            format!("{map_size}x{map_size} voxels exceed 32-bit mesh indices"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::{TRIANGLES_PER_CUBE, VERTICES_PER_CUBE};

    fn ramp(size: usize) -> HeightGrid {
        let cells = (size * size) as f64;
        HeightGrid::from_fn(size, |x, y| (x * size + y) as f64 / (cells - 1.0)).unwrap()
    }

    #[test]
    fn every_cell_lands_in_exactly_one_region() {
        let grid = ramp(6);
        let terrain = VoxelMeshBuilder::default()
            .build(&grid, &Palette::terrain_default())
            .unwrap();

        assert_eq!(terrain.total_cells(), 36);
        assert_eq!(terrain.total_vertex_count(), 36 * VERTICES_PER_CUBE);
        assert_eq!(terrain.total_triangle_count(), 36 * TRIANGLES_PER_CUBE);
    }

    #[test]
    fn empty_regions_are_still_present() {
        let grid = HeightGrid::filled(3, 0.5).unwrap();
        let palette = Palette::terrain_default();
        let terrain = VoxelMeshBuilder::default().build(&grid, &palette).unwrap();

        assert_eq!(terrain.regions().len(), palette.len());
        assert_eq!(terrain.region("High Land").map(|r| r.cell_count), Some(9));
        let deep = terrain.mesh("Deep Water").unwrap();
        assert!(deep.is_empty());
    }

    #[test]
    fn regions_follow_palette_order() {
        let palette = Palette::terrain_default();
        let terrain = VoxelMeshBuilder::default()
            .build(&ramp(4), &palette)
            .unwrap();
        let names: Vec<_> = terrain.regions().iter().map(|r| r.name.as_str()).collect();
        let expected: Vec<_> = palette.regions().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn duplicate_region_names_share_a_mesh() {
        let palette = Palette::new(vec![
            RegionSpec::new("Water", 0.2, [0, 0, 255, 255]),
            RegionSpec::new("Land", 0.5, [0, 255, 0, 255]),
            RegionSpec::new("Water", 1.0, [0, 0, 200, 255]),
        ])
        .unwrap();
        let terrain = VoxelMeshBuilder::default()
            .build(&ramp(3), &palette)
            .unwrap();

        assert_eq!(terrain.regions().len(), 2);
        assert_eq!(terrain.total_cells(), 9);
    }

    #[test]
    fn water_is_pinned_to_zero() {
        let palette = Palette::terrain_default();
        let builder = VoxelMeshBuilder::new(VoxelSettings {
            style: HeightStyle::Continuous,
            ..Default::default()
        });
        let deep = palette.classify(0.1).region;
        assert_eq!(builder.cell_height(0.1, deep), 0.0);

        let land = palette.classify(0.5).region;
        assert_eq!(builder.cell_height(0.5, land), 2.5);
    }

    #[test]
    fn quantized_rounds_continuous_does_not() {
        let region = RegionSpec::new("Land", 0.6, [0, 255, 0, 255]);
        let quantized = VoxelMeshBuilder::default();
        let continuous = VoxelMeshBuilder::new(VoxelSettings {
            style: HeightStyle::Continuous,
            ..Default::default()
        });

        assert_eq!(quantized.cell_height(0.58, &region), 3.0);
        assert!((continuous.cell_height(0.58, &region) - 2.9).abs() < 1e-5);
    }

    #[test]
    fn quantized_ties_round_to_even() {
        let region = RegionSpec::new("Land", 0.9, [0, 255, 0, 255]);
        let builder = VoxelMeshBuilder::default();
        assert_eq!(builder.cell_height(0.5, &region), 2.0);

        let tall = VoxelMeshBuilder::new(VoxelSettings {
            height_scale: 10.0,
            ..Default::default()
        });
        assert_eq!(tall.cell_height(0.25, &region), 2.0);
        assert_eq!(tall.cell_height(0.75, &region), 8.0);
    }

    #[test]
    fn columns_fill_the_footprint() {
        let grid = ramp(2);
        let terrain = VoxelMeshBuilder::default()
            .build(&grid, &Palette::terrain_default())
            .unwrap();

        for region in terrain.regions() {
            if let Some((min, max)) = region.mesh.bounds() {
                for axis in [0, 2] {
                    assert!(min[axis] >= -15.0 - 1e-4, "{} min {:?}", region.name, min);
                    assert!(max[axis] <= 15.0 + 1e-4, "{} max {:?}", region.name, max);
                }
            }
        }

        let corner = VoxelCell { x: 0, z: 0, height: 0.0, region_id: 0 };
        let center = VoxelMeshBuilder::default()
            .cell_transform(&corner, 2)
            .transform_point3(Vec3::ZERO);
        assert_eq!(center, Vec3::new(-7.5, 0.0, -7.5));
    }

    #[test]
    fn layout_is_grid_ordered() {
        let grid = ramp(3);
        let cells = VoxelMeshBuilder::default()
            .layout(&grid, &Palette::terrain_default())
            .unwrap();
        assert_eq!(cells.len(), 9);
        assert_eq!((cells[1].x, cells[1].z), (0, 1));
        assert_eq!((cells[3].x, cells[3].z), (1, 0));
    }

    #[test]
    fn vertex_budget_follows_index_width() {
        assert!(check_vertex_budget(100).is_ok());
        assert!(check_vertex_budget(13_377).is_ok());
        assert!(matches!(
            check_vertex_budget(13_378),
            Err(GenError::InvalidParameter { name: "map_size", .. })
        ));
        assert!(check_vertex_budget(usize::MAX).is_err());
    }

    #[test]
    fn rejects_degenerate_settings() {
        let builder = VoxelMeshBuilder::new(VoxelSettings {
            footprint: 0.0,
            ..Default::default()
        });
        let err = builder
            .build(&ramp(2), &Palette::terrain_default())
            .unwrap_err();
        assert!(matches!(err, GenError::InvalidParameter { name: "footprint", .. }));
    }
}
