/// A coherent 2D noise primitive.
///
/// Implementations must be deterministic: the same coordinates always give the
/// same value, on every platform. The grid generators rely on this for
/// reproducible output.
pub trait CoherentNoise: Send + Sync {
    /// Sample the noise at a point.
    ///
    /// # Returns
    /// A value in [0.0, 1.0].
    fn sample(&self, x: f64, y: f64) -> f64;

    /// Returns the name of this primitive for debugging.
    fn name(&self) -> &'static str {
        "CoherentNoise"
    }
}
