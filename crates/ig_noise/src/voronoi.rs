//! Nearest-site partitions of a square grid.

use bevy::log::debug;
use ig_core::{grayscale_to_rgba, ColorBuffer, GenError, GenResult, HeightGrid, Rgba};
use rand::Rng;
use rayon::prelude::*;

/// A partition seed point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Site {
    pub x: usize,
    pub y: usize,
}

impl Site {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    fn distance_squared(&self, x: usize, y: usize) -> u64 {
        let dx = self.x.abs_diff(x) as u64;
        let dy = self.y.abs_diff(y) as u64;
        dx * dx + dy * dy
    }
}

/// Sites placed on a `size × size` grid.
///
/// Nearest-site lookup is a brute-force scan. Distances are compared as exact
/// integers, and a tie goes to the site with the lowest index.
#[derive(Clone, Debug, PartialEq)]
pub struct VoronoiField {
    size: usize,
    sites: Vec<Site>,
}

impl VoronoiField {
    /// Use explicit sites.
    pub fn from_sites(size: usize, sites: Vec<Site>) -> GenResult<Self> {
        if size == 0 {
            return Err(GenError::invalid("map_size", "must be at least 1"));
        }
        if sites.is_empty() {
            return Err(GenError::invalid("site_count", "must be at least 1"));
        }
        if let Some(site) = sites.iter().find(|s| s.x >= size || s.y >= size) {
            return Err(GenError::invalid(
                "sites",
                format!("site ({}, {}) lies outside a {size}x{size} grid", site.x, site.y),
            ));
        }
        Ok(Self { size, sites })
    }

    /// Place `site_count` sites uniformly at random.
    pub fn random(size: usize, site_count: usize, rng: &mut impl Rng) -> GenResult<Self> {
        check_counts(size, site_count)?;
        let sites = (0..site_count)
            .map(|_| Site::new(rng.gen_range(0..size), rng.gen_range(0..size)))
            .collect();
        Self::from_sites(size, sites)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Index of the closest site and its squared distance.
    pub fn nearest(&self, x: usize, y: usize) -> (usize, u64) {
        let mut best = 0;
        let mut best_dist = u64::MAX;
        for (i, site) in self.sites.iter().enumerate() {
            let d = site.distance_squared(x, y);
            if d < best_dist {
                best = i;
                best_dist = d;
            }
        }
        (best, best_dist)
    }

    /// Nearest-site index for every cell, laid out `x * size + y`.
    pub fn nearest_indices(&self) -> Vec<usize> {
        self.par_cells(|x, y| self.nearest(x, y).0)
    }

    /// Euclidean distance to the nearest site, divided by the largest such
    /// distance in the grid. When every cell is a site the grid is all zero.
    pub fn distance_field(&self) -> GenResult<HeightGrid> {
        let raw = self.par_cells(|x, y| (self.nearest(x, y).1 as f64).sqrt());
        let max = raw.iter().copied().fold(0.0, f64::max);
        let values = if max > 0.0 {
            raw.into_iter().map(|d| d / max).collect()
        } else {
            raw
        };
        HeightGrid::from_values(self.size, values)
    }

    /// Color each cell with the color of its nearest site.
    pub fn color_partition(&self, site_colors: &[Rgba]) -> GenResult<ColorBuffer> {
        if site_colors.len() != self.sites.len() {
            return Err(GenError::invalid(
                "site_colors",
                format!("expected {} colors, got {}", self.sites.len(), site_colors.len()),
            ));
        }
        let pixels = self
            .nearest_indices()
            .into_iter()
            .map(|i| site_colors[i])
            .collect();
        ColorBuffer::from_pixels(self.size, pixels)
    }

    fn par_cells<T: Send>(&self, f: impl Fn(usize, usize) -> T + Sync) -> Vec<T> {
        let size = self.size;
        (0..size)
            .into_par_iter()
            .map(|x| (0..size).map(|y| f(x, y)).collect::<Vec<T>>())
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }
}

fn check_counts(size: usize, site_count: usize) -> GenResult<()> {
    if size == 0 {
        return Err(GenError::invalid("map_size", "must be at least 1"));
    }
    if site_count == 0 {
        return Err(GenError::invalid("site_count", "must be at least 1"));
    }
    Ok(())
}

/// Random sites, each with a random opaque color, rendered as flat regions.
pub fn generate_color_partition(
    size: usize,
    site_count: usize,
    rng: &mut impl Rng,
) -> GenResult<ColorBuffer> {
    check_counts(size, site_count)?;

    let mut sites = Vec::with_capacity(site_count);
    let mut colors: Vec<Rgba> = Vec::with_capacity(site_count);
    for _ in 0..site_count {
        sites.push(Site::new(rng.gen_range(0..size), rng.gen_range(0..size)));
        colors.push([rng.gen(), rng.gen(), rng.gen(), 255]);
    }

    let field = VoronoiField::from_sites(size, sites)?;
    debug!("voronoi color partition {size}x{size} with {site_count} sites");
    field.color_partition(&colors)
}

/// Random sites rendered as a grayscale distance-to-nearest-site map.
pub fn generate_distance_field(
    size: usize,
    site_count: usize,
    rng: &mut impl Rng,
) -> GenResult<ColorBuffer> {
    let field = VoronoiField::random(size, site_count, rng)?;
    debug!("voronoi distance field {size}x{size} with {site_count} sites");
    Ok(field
        .distance_field()?
        .map_colors(|v| grayscale_to_rgba(v, 0.0, 1.0)))
}
