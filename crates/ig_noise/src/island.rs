//! Island masks: shaping grids subtracted from a noise field to carve a
//! landmass silhouette.

use bevy::log::debug;
use ig_core::{GenError, GenResult, HeightGrid};
use serde::{Deserialize, Serialize};

/// Smooth S-curve shared by every mask.
///
/// `a` controls steepness and `b` moves the inflection point. Maps 0 to 0 and
/// 1 to 1.
pub fn shaping_curve(value: f64, a: f64, b: f64) -> f64 {
    let va = value.powf(a);
    va / (va + (b - b * value).powf(a))
}

/// Silhouette applied on top of the noise field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IslandVariant {
    /// No shaping.
    #[default]
    None,
    /// Square falloff toward every edge.
    #[serde(alias = "Regular")]
    Falloff,
    /// Recognized, currently identity.
    Pangaea,
    /// Circular island.
    Round,
    /// Recognized, currently identity.
    Ring,
    /// Recognized, currently identity.
    Archipelago,
    /// Land ring around a central lake.
    Lake,
}

impl IslandVariant {
    /// Returns all variants.
    pub fn all() -> &'static [IslandVariant] {
        &[
            Self::None,
            Self::Falloff,
            Self::Pangaea,
            Self::Round,
            Self::Ring,
            Self::Archipelago,
            Self::Lake,
        ]
    }

    /// Returns the display name for this variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Falloff => "Falloff",
            Self::Pangaea => "Pangaea",
            Self::Round => "Round",
            Self::Ring => "Ring",
            Self::Archipelago => "Archipelago",
            Self::Lake => "Lake",
        }
    }

    /// True for variants that leave the noise field untouched.
    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            Self::None | Self::Pangaea | Self::Ring | Self::Archipelago
        )
    }

    /// Mask value for cell `(i, j)` of a `size × size` grid, in [0, 1].
    pub fn shape(&self, i: usize, j: usize, size: usize) -> f64 {
        let n = size as f64;
        let raw = match self {
            Self::None | Self::Pangaea | Self::Ring | Self::Archipelago => 0.0,
            Self::Falloff => {
                let x = i as f64 / n * 2.0 - 1.0;
                let y = j as f64 / n * 2.0 - 1.0;
                shaping_curve(x.abs().max(y.abs()), 3.0, 2.2)
            }
            Self::Round => {
                let d = center_distance(i, j, size) / n;
                let v = if 1.0 - d >= 0.0 { 0.375 + d } else { 0.0 };
                shaping_curve(v, 3.0, 3.0)
            }
            Self::Lake => {
                let d = center_distance(i, j, size) / n;
                let v = if 1.0 - d >= 0.0 { 1.0 - d } else { 0.0 };
                shaping_curve(v, 4.0, 3.5)
            }
        };
        // Round overshoots 1 near its rim; combination clamps anyway.
        raw.clamp(0.0, 1.0)
    }
}

fn center_distance(i: usize, j: usize, size: usize) -> f64 {
    let center = size as f64 / 2.0;
    (i as f64 - center).hypot(j as f64 - center)
}

/// Build the mask grid for a variant.
pub fn generate_mask(size: usize, variant: IslandVariant) -> GenResult<HeightGrid> {
    let mask = HeightGrid::from_fn(size, |i, j| variant.shape(i, j, size))?;
    debug!("island mask {} at {size}x{size}", variant.name());
    Ok(mask)
}

/// Subtract a mask from a noise grid, clamping to [0, 1].
pub fn apply_mask(noise: &HeightGrid, mask: &HeightGrid) -> GenResult<HeightGrid> {
    if noise.size() != mask.size() {
        return Err(GenError::invalid(
            "mask",
            format!(
                "mask is {0}x{0} but noise grid is {1}x{1}",
                mask.size(),
                noise.size()
            ),
        ));
    }

    let values = noise
        .values()
        .iter()
        .zip(mask.values())
        .map(|(n, m)| (n - m).clamp(0.0, 1.0))
        .collect();
    HeightGrid::from_values(noise.size(), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn curve_pins_endpoints() {
        assert_eq!(shaping_curve(0.0, 3.0, 2.2), 0.0);
        assert_eq!(shaping_curve(1.0, 3.0, 2.2), 1.0);
        let mid = shaping_curve(0.5, 3.0, 2.2);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn curve_is_monotonic_on_unit_range() {
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = shaping_curve(i as f64 / 100.0, 4.0, 3.5);
            assert!(v >= prev, "curve dropped at {i}: {v} < {prev}");
            prev = v;
        }
    }

    #[test]
    fn falloff_is_low_in_center_and_high_at_edges() {
        let mask = generate_mask(64, IslandVariant::Falloff).unwrap();
        assert!(mask.get(32, 32).unwrap() < 0.01);
        assert_eq!(mask.get(0, 0).unwrap(), 1.0);
        assert_eq!(mask.get(0, 32).unwrap(), 1.0);
    }

    #[test]
    fn falloff_is_mirror_symmetric() {
        let size = 33;
        let mask = generate_mask(size, IslandVariant::Falloff).unwrap();
        // Cell i sits at i/size*2-1, so the mirror of i is size - i.
        for i in 1..size {
            for j in 1..size {
                let v = mask.get(i, j).unwrap();
                assert!((v - mask.get(size - i, j).unwrap()).abs() < EPS);
                assert!((v - mask.get(i, size - j).unwrap()).abs() < EPS);
                assert_eq!(v, mask.get(j, i).unwrap());
            }
        }
    }

    #[test]
    fn identity_variants_leave_noise_untouched() {
        let noise = HeightGrid::from_fn(16, |x, y| ((x * 16 + y) as f64) / 255.0).unwrap();
        for variant in IslandVariant::all().iter().filter(|v| v.is_identity()) {
            let mask = generate_mask(16, *variant).unwrap();
            assert!(mask.values().iter().all(|&v| v == 0.0));
            assert_eq!(apply_mask(&noise, &mask).unwrap(), noise, "{:?}", variant);
        }
    }

    #[test]
    fn round_is_radially_symmetric() {
        let size = 40;
        let mask = generate_mask(size, IslandVariant::Round).unwrap();
        assert_eq!(mask.get(10, 20), mask.get(30, 20));
        assert_eq!(mask.get(20, 10), mask.get(20, 30));
        assert!(mask.get(20, 20).unwrap() < mask.get(0, 20).unwrap());
    }

    #[test]
    fn lake_is_high_in_the_center() {
        let mask = generate_mask(40, IslandVariant::Lake).unwrap();
        assert_eq!(mask.get(20, 20).unwrap(), 1.0);
        assert!(mask.get(0, 0).unwrap() < mask.get(20, 20).unwrap());
    }

    #[test]
    fn every_mask_is_in_unit_range() {
        for variant in IslandVariant::all() {
            let mask = generate_mask(25, *variant).unwrap();
            for (x, y, v) in mask.cells() {
                assert!((0.0..=1.0).contains(&v), "{:?} ({x}, {y}) = {v}", variant);
            }
        }
    }

    #[test]
    fn apply_mask_clamps_to_zero() {
        let noise = HeightGrid::from_values(2, vec![0.2, 0.9, 0.5, 1.0]).unwrap();
        let mask = HeightGrid::from_values(2, vec![0.5, 0.1, 0.5, 0.0]).unwrap();
        let out = apply_mask(&noise, &mask).unwrap();
        assert_eq!(out.values()[0], 0.0);
        assert!((out.values()[1] - 0.8).abs() < EPS);
        assert_eq!(out.values()[2], 0.0);
        assert_eq!(out.values()[3], 1.0);
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let noise = HeightGrid::filled(4, 0.5).unwrap();
        let mask = HeightGrid::filled(3, 0.0).unwrap();
        assert!(apply_mask(&noise, &mask).is_err());
    }

    #[test]
    fn regular_is_accepted_as_falloff() {
        let parsed: IslandVariant = ron::from_str("Regular").unwrap();
        assert_eq!(parsed, IslandVariant::Falloff);
    }
}
