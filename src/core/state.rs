/// Statevector storage: 2^n complex amplitudes over n binary cells.
///
/// Invariant: Σ|αᵢ|² = 1. Gates permute amplitudes and preserve it by
/// construction; only measurement breaks it, and `collapse` re-establishes it
/// before returning.
use super::complex::Complex;
use crate::error::{Result, TapeError};
use std::fmt;

/// 2^30 amplitudes is 16 GiB; anything beyond is refused outright.
pub const MAX_STATEVECTOR_CELLS: usize = 30;

/// Below this total probability the state is treated as numerically dead.
const DEGENERATE_NORM_SQ: f64 = 1e-10;

#[derive(Clone)]
pub struct StateVector {
    pub num_qubits: usize,
    pub amplitudes: Vec<Complex>,
}

impl StateVector {
    /// Allocate |0...0⟩ over `num_qubits` cells.
    ///
    /// Allocation goes through `try_reserve_exact` so an oversized request is
    /// reported instead of aborting the process.
    pub fn new(num_qubits: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(TapeError::NoCells);
        }
        if num_qubits > MAX_STATEVECTOR_CELLS {
            return Err(TapeError::TooManyCells {
                requested: num_qubits,
                max: MAX_STATEVECTOR_CELLS,
            });
        }

        let dim = 1usize << num_qubits;
        let mut amplitudes = Vec::new();
        amplitudes
            .try_reserve_exact(dim)
            .map_err(|_| TapeError::Allocation { cells: num_qubits })?;
        amplitudes.resize(dim, Complex::ZERO);
        amplitudes[0] = Complex::ONE;

        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn total_probability(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sq()).sum()
    }

    /// Qubit 0 is the least-significant bit of the basis index.
    #[inline(always)]
    pub fn qubit_bit(basis_idx: usize, qubit: usize) -> bool {
        (basis_idx >> qubit) & 1 == 1
    }

    /// Basis index as a ket label, qubit 0 rightmost.
    pub fn basis_label(&self, index: usize) -> String {
        (0..self.num_qubits)
            .rev()
            .map(|q| if Self::qubit_bit(index, q) { '1' } else { '0' })
            .collect()
    }

    /// Probability that `qubit` reads 0: the weight of every basis state
    /// with that bit clear.
    pub fn probability_zero(&self, qubit: usize) -> f64 {
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| !Self::qubit_bit(*i, qubit))
            .map(|(_, a)| a.norm_sq())
            .sum()
    }

    /// Non-collapsing marginal probability that `qubit` reads 1.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        (1.0 - self.probability_zero(qubit)).clamp(0.0, 1.0)
    }

    /// Projective measurement of `qubit` under the Born rule.
    ///
    /// `sample` must be uniform in [0, 1); the outcome is 0 when
    /// `sample < P(0)`. Amplitudes inconsistent with the outcome are zeroed
    /// and the survivors renormalized.
    pub fn collapse(&mut self, qubit: usize, sample: f64) -> bool {
        let outcome = sample >= self.probability_zero(qubit);

        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if Self::qubit_bit(i, qubit) != outcome {
                *amp = Complex::ZERO;
            }
        }

        self.renormalize();
        outcome
    }

    /// Rescale to unit length. A degenerate state (total probability ≈ 0)
    /// is reset to |0...0⟩ rather than divided by zero.
    ///
    /// Returns `false` when the fallback reset happened.
    pub fn renormalize(&mut self) -> bool {
        let total = self.total_probability();
        if total < DEGENERATE_NORM_SQ {
            tracing::warn!(
                cells = self.num_qubits,
                total,
                "degenerate statevector after collapse, resetting to |0…0⟩"
            );
            self.reset();
            return false;
        }
        let inv_norm = 1.0 / total.sqrt();
        for amp in self.amplitudes.iter_mut() {
            *amp = amp.scale(inv_norm);
        }
        true
    }

    pub fn reset(&mut self) {
        for amp in self.amplitudes.iter_mut() {
            *amp = Complex::ZERO;
        }
        self.amplitudes[0] = Complex::ONE;
    }
}

impl fmt::Debug for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateVector")
            .field("num_qubits", &self.num_qubits)
            .field("dim", &self.dim())
            .finish()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "StateVector ({} cells, dim={}):", self.num_qubits, self.dim())?;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            let prob = amp.norm_sq();
            if prob > 1e-12 {
                writeln!(
                    f,
                    "  |{}⟩  amplitude: {}  probability: {:.4}",
                    self.basis_label(i),
                    amp,
                    prob
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equal_superposition(num_qubits: usize) -> StateVector {
        let mut sv = StateVector::new(num_qubits).unwrap();
        let amp = Complex::new(1.0 / (sv.dim() as f64).sqrt(), 0.0);
        for a in sv.amplitudes.iter_mut() {
            *a = amp;
        }
        sv
    }

    #[test]
    fn test_initial_state() {
        let sv = StateVector::new(2).unwrap();
        assert_eq!(sv.dim(), 4);
        assert_eq!(sv.amplitudes[0], Complex::ONE);
        assert!((sv.total_probability() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_rejects_zero_and_oversized() {
        assert_eq!(StateVector::new(0).unwrap_err(), TapeError::NoCells);
        assert_eq!(
            StateVector::new(31).unwrap_err(),
            TapeError::TooManyCells { requested: 31, max: 30 }
        );
    }

    #[test]
    fn test_basis_label() {
        let sv = StateVector::new(3).unwrap();
        assert_eq!(sv.basis_label(0), "000");
        assert_eq!(sv.basis_label(5), "101");
    }

    #[test]
    fn test_probability_zero_of_superposition() {
        let sv = equal_superposition(2);
        assert!((sv.probability_zero(0) - 0.5).abs() < 1e-10);
        assert!((sv.probability_one(1) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_collapse_follows_sample() {
        let mut sv = equal_superposition(1);
        // P(0) = 0.5: a sample below it selects 0
        assert!(!sv.collapse(0, 0.25));
        assert_eq!(sv.amplitudes[0], Complex::ONE);
        assert_eq!(sv.amplitudes[1], Complex::ZERO);

        let mut sv = equal_superposition(1);
        assert!(sv.collapse(0, 0.75));
        assert_eq!(sv.amplitudes[1], Complex::ONE);
    }

    #[test]
    fn test_collapse_certain_outcome_ignores_sample() {
        let mut sv = StateVector::new(2).unwrap();
        sv.amplitudes[0] = Complex::ZERO;
        sv.amplitudes[2] = Complex::ONE; // |10⟩
        for sample in [0.0, 0.5, 0.999_999] {
            assert!(sv.collapse(1, sample));
            assert!(!sv.collapse(0, sample));
        }
        assert!((sv.total_probability() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_renormalize_degenerate_resets() {
        let mut sv = StateVector::new(2).unwrap();
        sv.amplitudes[0] = Complex::ZERO;
        assert!(!sv.renormalize());
        assert_eq!(sv.amplitudes[0], Complex::ONE);
    }

    #[test]
    fn test_renormalize_rescales() {
        let mut sv = StateVector::new(1).unwrap();
        sv.amplitudes[0] = Complex::new(2.0, 0.0);
        assert!(sv.renormalize());
        assert!((sv.total_probability() - 1.0).abs() < 1e-10);
    }
}
