use bevy::log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::grid::{ColorBuffer, HeightGrid, Rgba};

/// A named height band.
///
/// A height belongs to the first band (in ascending threshold order) whose
/// threshold is at least that height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub name: String,
    pub threshold: f64,
    pub color: Rgba,
}

impl RegionSpec {
    pub fn new(name: impl Into<String>, threshold: f64, color: Rgba) -> Self {
        Self {
            name: name.into(),
            threshold,
            color,
        }
    }
}

/// Result of classifying one height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification<'a> {
    /// Position of the region inside the palette.
    pub id: usize,
    pub region: &'a RegionSpec,
}

/// An ordered, non-empty set of regions.
///
/// Construction sorts by ascending threshold (stable, so equal thresholds keep
/// their given order) and rejects an empty list, which makes [`Palette::classify`]
/// total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RegionSpec>", into = "Vec<RegionSpec>")]
pub struct Palette {
    regions: Vec<RegionSpec>,
}

impl Palette {
    pub fn new(mut regions: Vec<RegionSpec>) -> GenResult<Self> {
        if regions.is_empty() {
            return Err(GenError::invalid("palette", "must contain at least one region"));
        }
        if let Some(bad) = regions.iter().find(|r| r.threshold.is_nan()) {
            return Err(GenError::invalid(
                "palette",
                format!("region `{}` has a NaN threshold", bad.name),
            ));
        }

        regions.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));

        let top = regions[regions.len() - 1].threshold;
        if top < 1.0 {
            warn!(
                "palette tops out at {top}; heights above it fall back to `{}`",
                regions[regions.len() - 1].name
            );
        }

        Ok(Self { regions })
    }

    /// The eight-band island palette.
    pub fn terrain_default() -> Self {
        Self {
            regions: vec![
                RegionSpec::new("Deep Water", 0.15, [24, 58, 140, 255]),
                RegionSpec::new("Water", 0.24, [54, 103, 199, 255]),
                RegionSpec::new("Sand", 0.3, [210, 208, 125, 255]),
                RegionSpec::new("Low Land", 0.45, [86, 152, 23, 255]),
                RegionSpec::new("High Land", 0.6, [62, 107, 18, 255]),
                RegionSpec::new("Stone", 0.75, [95, 74, 67, 255]),
                RegionSpec::new("Mountain", 0.9, [75, 60, 55, 255]),
                RegionSpec::new("Mountain Tip", 1.0, [255, 255, 255, 255]),
            ],
        }
    }

    pub fn regions(&self) -> &[RegionSpec] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// A palette is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn region(&self, id: usize) -> Option<&RegionSpec> {
        self.regions.get(id)
    }

    /// Find the region a height belongs to.
    ///
    /// Heights above every threshold clamp to the last region.
    pub fn classify(&self, height: f64) -> Classification<'_> {
        let last = self.regions.len() - 1;
        let id = self
            .regions
            .iter()
            .position(|r| height <= r.threshold)
            .unwrap_or(last);
        Classification {
            id,
            region: &self.regions[id],
        }
    }

    pub fn classify_color(&self, height: f64) -> Rgba {
        self.classify(height).region.color
    }
}

impl TryFrom<Vec<RegionSpec>> for Palette {
    type Error = GenError;

    fn try_from(regions: Vec<RegionSpec>) -> Result<Self, Self::Error> {
        Self::new(regions)
    }
}

impl From<Palette> for Vec<RegionSpec> {
    fn from(palette: Palette) -> Self {
        palette.regions
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::terrain_default()
    }
}

/// Color every cell of a height grid by its region.
pub fn classify_grid(grid: &HeightGrid, palette: &Palette) -> ColorBuffer {
    grid.map_colors(|h| palette.classify_color(h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_land() -> Palette {
        Palette::new(vec![
            RegionSpec::new("water", 0.3, [0, 0, 255, 255]),
            RegionSpec::new("land", 1.0, [0, 255, 0, 255]),
        ])
        .unwrap()
    }

    #[test]
    fn water_below_threshold() {
        assert_eq!(water_land().classify(0.25).region.name, "water");
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(water_land().classify(0.3).region.name, "water");
    }

    #[test]
    fn land_above_water() {
        let palette = water_land();
        let hit = palette.classify(0.9);
        assert_eq!(hit.region.name, "land");
        assert_eq!(hit.id, 1);
    }

    #[test]
    fn out_of_range_clamps_to_top() {
        assert_eq!(water_land().classify(1.5).region.name, "land");
    }

    #[test]
    fn empty_palette_is_rejected() {
        let err = Palette::new(Vec::new()).unwrap_err();
        assert!(matches!(err, GenError::InvalidParameter { name: "palette", .. }));
    }

    #[test]
    fn regions_are_sorted_on_construction() {
        let palette = Palette::new(vec![
            RegionSpec::new("high", 1.0, [0; 4]),
            RegionSpec::new("low", 0.2, [0; 4]),
        ])
        .unwrap();
        assert_eq!(palette.regions()[0].name, "low");
        assert_eq!(palette.classify(0.1).region.name, "low");
    }

    #[test]
    fn classification_is_total_over_unit_range() {
        let palette = Palette::terrain_default();
        for i in 0..=1000 {
            let h = i as f64 / 1000.0;
            let hit = palette.classify(h);
            assert!(hit.id < palette.len());
            assert_eq!(palette.region(hit.id), Some(hit.region));
        }
    }

    #[test]
    fn default_palette_reaches_one() {
        let palette = Palette::terrain_default();
        assert_eq!(palette.len(), 8);
        assert!(palette.regions().last().unwrap().threshold >= 1.0);
        // Constructing through `new` must not reorder the defaults.
        let rebuilt = Palette::new(palette.regions().to_vec()).unwrap();
        assert_eq!(rebuilt, palette);
    }

    #[test]
    fn classify_grid_colors_each_cell() {
        let grid = HeightGrid::from_values(2, vec![0.1, 0.9, 0.3, 2.0]).unwrap();
        let colors = classify_grid(&grid, &water_land());
        assert_eq!(colors.get(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(colors.get(0, 1), Some([0, 255, 0, 255]));
        assert_eq!(colors.get(1, 0), Some([0, 0, 255, 255]));
        assert_eq!(colors.get(1, 1), Some([0, 255, 0, 255]));
    }
}
