/// Randomness seam for experiment-group assignment.
pub trait ExperimentSource {
    /// Uniform draw in `[0, 1)`.
    fn draw(&self) -> f64;
}
