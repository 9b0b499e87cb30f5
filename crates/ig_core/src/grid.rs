use crate::error::{GenError, GenResult};

/// An RGBA color, one byte per channel.
pub type Rgba = [u8; 4];

/// Convert a grayscale value to RGBA.
///
/// An empty or inverted range maps everything to mid gray.
pub fn grayscale_to_rgba(value: f64, min: f64, max: f64) -> Rgba {
    let range = max - min;
    let normalized = if range > 0.0 {
        ((value - min) / range).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let gray = (normalized * 255.0) as u8;
    [gray, gray, gray, 255]
}

fn check_size(size: usize) -> GenResult<()> {
    if size == 0 {
        return Err(GenError::invalid("map_size", "must be at least 1"));
    }
    Ok(())
}

/// A square grid of height values.
///
/// Cells are stored flat with index `x * size + y`, the same layout as
/// [`ColorBuffer`]. Grids produced by the noise field hold values in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    size: usize,
    values: Vec<f64>,
}

impl HeightGrid {
    /// Create a grid with every cell set to `value`.
    pub fn filled(size: usize, value: f64) -> GenResult<Self> {
        check_size(size)?;
        Ok(Self {
            size,
            values: vec![value; size * size],
        })
    }

    /// Wrap existing values laid out as `x * size + y`.
    pub fn from_values(size: usize, values: Vec<f64>) -> GenResult<Self> {
        check_size(size)?;
        if values.len() != size * size {
            return Err(GenError::invalid(
                "values",
                format!("expected {} cells, got {}", size * size, values.len()),
            ));
        }
        Ok(Self { size, values })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> f64) -> GenResult<Self> {
        check_size(size)?;
        let mut values = Vec::with_capacity(size * size);
        for x in 0..size {
            for y in 0..size {
                values.push(f(x, y));
            }
        }
        Ok(Self { size, values })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Flat index of a cell.
    pub fn index(&self, x: usize, y: usize) -> usize {
        x * self.size + y
    }

    /// Get the value at specific coordinates.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x < self.size && y < self.size {
            Some(self.values[self.index(x, y)])
        } else {
            None
        }
    }

    /// Iterate `(x, y, value)` in storage order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let size = self.size;
        self.values
            .iter()
            .enumerate()
            .map(move |(idx, &v)| (idx / size, idx % size, v))
    }

    /// Lowest and highest value in the grid.
    pub fn min_max(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Color every cell with `f(value)`.
    pub fn map_colors(&self, f: impl Fn(f64) -> Rgba) -> ColorBuffer {
        ColorBuffer {
            size: self.size,
            pixels: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Render the grid as a black-to-white gradient.
    pub fn to_grayscale(&self) -> ColorBuffer {
        self.map_colors(|v| grayscale_to_rgba(v, 0.0, 1.0))
    }
}

/// A square buffer of RGBA colors, indexed `x * size + y`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBuffer {
    size: usize,
    pixels: Vec<Rgba>,
}

impl ColorBuffer {
    pub fn from_pixels(size: usize, pixels: Vec<Rgba>) -> GenResult<Self> {
        check_size(size)?;
        if pixels.len() != size * size {
            return Err(GenError::invalid(
                "pixels",
                format!("expected {} pixels, got {}", size * size, pixels.len()),
            ));
        }
        Ok(Self { size, pixels })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Get the color at specific coordinates.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        if x < self.size && y < self.size {
            Some(self.pixels[x * self.size + y])
        } else {
            None
        }
    }

    /// Flatten into RGBA image bytes, four per pixel.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            data.extend_from_slice(color);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        assert!(HeightGrid::filled(0, 0.0).is_err());
        assert!(HeightGrid::from_fn(0, |_, _| 0.0).is_err());
        assert!(ColorBuffer::from_pixels(0, Vec::new()).is_err());
    }

    #[test]
    fn layout_is_x_major() {
        let grid = HeightGrid::from_fn(3, |x, y| (x * 10 + y) as f64).unwrap();
        assert_eq!(grid.values()[grid.index(2, 1)], 21.0);
        assert_eq!(grid.get(2, 1), Some(21.0));
        assert_eq!(grid.get(3, 0), None);

        let (x, y, v) = grid.cells().nth(5).unwrap();
        assert_eq!((x, y, v), (1, 2, 12.0));
    }

    #[test]
    fn wrong_value_count_is_rejected() {
        let err = HeightGrid::from_values(2, vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, GenError::InvalidParameter { name: "values", .. }));
    }

    #[test]
    fn grayscale_maps_extremes() {
        let grid = HeightGrid::from_values(1, vec![1.0]).unwrap();
        assert_eq!(grid.to_grayscale().get(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(grayscale_to_rgba(0.0, 0.0, 1.0), [0, 0, 0, 255]);
    }

    #[test]
    fn rgba_bytes_have_four_channels() {
        let buffer = ColorBuffer::from_pixels(2, vec![[1, 2, 3, 4]; 4]).unwrap();
        let bytes = buffer.to_rgba_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn degenerate_gray_range_is_mid_gray() {
        assert_eq!(grayscale_to_rgba(0.3, 0.3, 0.3), [127, 127, 127, 255]);
        assert_eq!(grayscale_to_rgba(0.3, 1.0, 0.0), [127, 127, 127, 255]);
        assert_eq!(grayscale_to_rgba(1.0, 0.0, 1.0), [255, 255, 255, 255]);
    }
}
