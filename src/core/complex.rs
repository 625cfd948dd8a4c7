/// Complex amplitude for the statevector backend.
///
/// The reversible primitives only permute amplitudes, so the arithmetic
/// surface stays small: the Born weight and real scaling for
/// renormalization after a collapse.
use std::fmt;

#[derive(Debug, Clone, Copy, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex::new(0.0, 0.0);
    pub const ONE: Complex = Complex::new(1.0, 0.0);

    #[inline(always)]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// |z|², the probability weight of a basis state.
    #[inline(always)]
    pub fn norm_sq(self) -> f64 {
        self.re.mul_add(self.re, self.im * self.im)
    }

    #[inline(always)]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.re * factor, self.im * factor)
    }
}

/// Approximate equality; amplitudes only ever differ by rounding.
impl PartialEq for Complex {
    fn eq(&self, other: &Self) -> bool {
        const EPS: f64 = 1e-10;
        (self.re - other.re).abs() < EPS && (self.im - other.im).abs() < EPS
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}{:+.4}i", self.re, self.im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_sq() {
        assert!((Complex::new(3.0, 4.0).norm_sq() - 25.0).abs() < 1e-10);
        assert_eq!(Complex::default(), Complex::ZERO);
    }

    #[test]
    fn test_scale_keeps_phase() {
        let z = Complex::new(0.6, -0.8).scale(0.5);
        assert_eq!(z, Complex::new(0.3, -0.4));
        assert!((z.norm_sq() - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_display() {
        assert_eq!(Complex::new(0.5, -0.25).to_string(), "0.5000-0.2500i");
        assert_eq!(Complex::ONE.to_string(), "1.0000+0.0000i");
    }
}
