use bevy::log::{debug, warn};
use ig_core::{CoherentNoise, GenError, GenResult, HeightGrid};
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Scale substituted when the caller passes a non-positive one.
pub const MIN_SCALE: f64 = 0.0001;

/// Per-octave sample offsets are drawn from `[-OCTAVE_OFFSET_RANGE, OCTAVE_OFFSET_RANGE]`.
pub const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// Largest absolute coordinate handed to the noise primitive. Past this an
/// f64 has no fractional bits left and lattice lookups overflow.
pub const MAX_SAMPLE_COORD: f64 = (1u64 << 52) as f64;

/// The Perlin permutation table is fixed; the generation seed only moves the
/// sampling window.
const PERLIN_PERMUTATION_SEED: u32 = 0;

/// Caller-controlled pan of the sampling window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PanOffset {
    pub x: f64,
    pub y: f64,
}

impl PanOffset {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Perlin noise from the `noise` crate, remapped from [-1, 1] to [0, 1].
pub struct PerlinSource {
    perlin: Perlin,
}

impl PerlinSource {
    pub fn new() -> Self {
        Self {
            perlin: Perlin::new(PERLIN_PERMUTATION_SEED),
        }
    }
}

impl Default for PerlinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CoherentNoise for PerlinSource {
    fn sample(&self, x: f64, y: f64) -> f64 {
        ((self.perlin.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    fn name(&self) -> &'static str {
        "Perlin"
    }
}

/// Parameters for one noise-field generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Cells per side.
    pub map_size: usize,
    /// Seed for the octave offsets. Zero is not special here; callers that
    /// treat it as "pick one for me" must substitute before calling.
    pub seed: u32,
    /// Zoom; larger values stretch the features.
    pub scale: f64,
    /// Number of noise layers summed per cell.
    pub octaves: u32,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    pub offset: PanOffset,
}

impl NoiseParams {
    pub fn new(map_size: usize, seed: u32) -> Self {
        Self {
            map_size,
            seed,
            scale: 100.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: PanOffset::default(),
        }
    }

    pub fn with_params(
        map_size: usize,
        seed: u32,
        scale: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
        offset: PanOffset,
    ) -> Self {
        Self {
            map_size,
            seed,
            scale,
            octaves,
            persistence,
            lacunarity,
            offset,
        }
    }
}

/// Seeded multi-octave height field, normalized to [0, 1].
pub struct NoiseField<N = PerlinSource> {
    source: N,
}

impl NoiseField<PerlinSource> {
    pub fn new() -> Self {
        Self {
            source: PerlinSource::new(),
        }
    }
}

impl Default for NoiseField<PerlinSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: CoherentNoise> NoiseField<N> {
    /// Use a different coherent-noise primitive.
    pub fn with_source(source: N) -> Self {
        Self { source }
    }

    /// Sample offset for each octave.
    ///
    /// The caller's pan is added on x but subtracted on y, so that raising
    /// `offset.y` moves the view the same way on screen as raising `offset.x`.
    pub fn octave_offsets(seed: u32, octaves: u32, offset: PanOffset) -> Vec<(f64, f64)> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
        (0..octaves)
            .map(|_| {
                let draw_x = rng.gen_range(-OCTAVE_OFFSET_RANGE..=OCTAVE_OFFSET_RANGE);
                let draw_y = rng.gen_range(-OCTAVE_OFFSET_RANGE..=OCTAVE_OFFSET_RANGE);
                (draw_x as f64 + offset.x, draw_y as f64 - offset.y)
            })
            .collect()
    }

    /// Generate a normalized height grid.
    ///
    /// Zero octaves give an all-zero grid. A grid whose raw heights are all
    /// equal normalizes to 0.5 everywhere.
    pub fn generate(&self, params: &NoiseParams) -> GenResult<HeightGrid> {
        let size = params.map_size;
        if size == 0 {
            return Err(GenError::invalid("map_size", "must be at least 1"));
        }
        if !params.persistence.is_finite() {
            return Err(GenError::invalid("persistence", "must be finite"));
        }
        if !params.lacunarity.is_finite() {
            return Err(GenError::invalid("lacunarity", "must be finite"));
        }
        if params.octaves == 0 {
            debug!("noise field {size}x{size} has zero octaves, returning a flat grid");
            return HeightGrid::filled(size, 0.0);
        }

        let scale = if params.scale > 0.0 && params.scale.is_finite() {
            params.scale
        } else {
            warn!("noise scale {} is not positive, using {MIN_SCALE}", params.scale);
            MIN_SCALE
        };

        let offsets = Self::octave_offsets(params.seed, params.octaves, params.offset);
        let half = size as f64 / 2.0;
        check_sample_reach(&offsets, half, scale, params.lacunarity)?;

        // Every cell is independent; rows are filled in parallel and joined in order.
        let raw: Vec<f64> = (0..size)
            .into_par_iter()
            .map(|x| {
                (0..size)
                    .map(|y| self.fbm(x as f64 - half, y as f64 - half, scale, &offsets, params))
                    .collect::<Vec<f64>>()
            })
            .collect::<Vec<_>>()
            .concat();

        let (min, max) = raw
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let range = max - min;

        let values = if range > 0.0 {
            raw.into_iter().map(|v| (v - min) / range).collect()
        } else {
            vec![0.5; raw.len()]
        };

        debug!(
            "noise field {size}x{size}: seed {}, {} octaves via {}, raw range [{min:.4}, {max:.4}]",
            params.seed,
            params.octaves,
            self.source.name()
        );

        HeightGrid::from_values(size, values)
    }

    /// Sum the octaves at one centered cell position.
    fn fbm(&self, cx: f64, cy: f64, scale: f64, offsets: &[(f64, f64)], params: &NoiseParams) -> f64 {
        let mut height = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for &(ox, oy) in offsets {
            let sx = (cx + ox) / scale * frequency;
            let sy = (cy + oy) / scale * frequency;
            let sample = self.source.sample(sx, sy) * 2.0 - 1.0;
            height += sample * amplitude;
            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }

        height
    }
}

/// Reject parameters that would push any octave's sample coordinates past
/// [`MAX_SAMPLE_COORD`] or to a non-finite value.
fn check_sample_reach(offsets: &[(f64, f64)], half: f64, scale: f64, lacunarity: f64) -> GenResult<()> {
    let mut frequency = 1.0_f64;
    for (octave, &(ox, oy)) in offsets.iter().enumerate() {
        let reach = (half + ox.abs().max(oy.abs())) / scale * frequency;
        if !reach.is_finite() || reach > MAX_SAMPLE_COORD {
            return Err(if octave == 0 {
                GenError::invalid(
                    "offset",
                    format!("sample coordinates reach {reach:e} at this scale"),
                )
            } else {
                GenError::invalid(
                    "octaves",
                    format!("octave {octave} samples at {reach:e}, lower octaves or lacunarity"),
                )
            });
        }
        frequency *= lacunarity.abs();
    }
    Ok(())
}
