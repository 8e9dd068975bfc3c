//! Tapering windows applied before the transform

/// Window applied to a segment before computing its spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowFunction {
    /// No tapering
    Rectangular,
    /// Raised cosine, zero at both ends
    #[default]
    Hann,
}

impl WindowFunction {
    /// Window coefficients for a segment of `length` samples
    pub fn coefficients(&self, length: usize) -> Vec<f64> {
        match self {
            WindowFunction::Rectangular => vec![1.0; length],
            WindowFunction::Hann => {
                if length < 2 {
                    return vec![1.0; length];
                }
                let denom = (length - 1) as f64;
                (0..length)
                    .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / denom).cos()))
                    .collect()
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WindowFunction::Rectangular => "rectangular",
            WindowFunction::Hann => "hann",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hann_shape() {
        let w = WindowFunction::Hann.coefficients(5);
        assert_abs_diff_eq!(w[0], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(w[2], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(w[4], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(w[1], w[3], epsilon = 1e-15);
    }

    #[test]
    fn test_rectangular_is_flat() {
        assert_eq!(WindowFunction::Rectangular.coefficients(3), vec![1.0, 1.0, 1.0]);
    }
}
