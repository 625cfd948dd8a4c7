/// Statevector backend: quantum-style simulation of the reversible primitives.
///
/// Wraps a `StateVector` with a ChaCha RNG used for Born-rule sampling.
/// A fixed seed gives reproducible measurement sequences; without one the
/// RNG is seeded from OS entropy. Cloning copies the RNG state, so a clone
/// and its origin draw identical samples from the point of the split.
use super::backend::{BackendKind, StateBackend};
use super::gates::{apply_ccnot, apply_cnot, apply_not, apply_swap};
use super::state::StateVector;
use crate::error::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Above this many cells the 2^n amplitude vector gets expensive.
const LARGE_STATEVECTOR_CELLS: usize = 20;

#[derive(Debug, Clone)]
pub struct StatevectorBackend {
    state: StateVector,
    rng: ChaCha8Rng,
}

impl StatevectorBackend {
    pub fn new(cells: usize, seed: Option<u64>) -> Result<Self> {
        let state = StateVector::new(cells)?;
        if cells > LARGE_STATEVECTOR_CELLS {
            tracing::warn!(
                cells,
                bytes = state.dim() * std::mem::size_of::<super::complex::Complex>(),
                "large statevector allocated"
            );
        }
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self { state, rng })
    }
}

impl StateBackend for StatevectorBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Statevector
    }

    fn num_cells(&self) -> usize {
        self.state.num_qubits
    }

    fn ccnot(&mut self, a: usize, b: usize, c: usize) {
        apply_ccnot(&mut self.state, a, b, c);
    }

    fn cnot(&mut self, a: usize, b: usize) {
        apply_cnot(&mut self.state, a, b);
    }

    fn not(&mut self, a: usize) {
        apply_not(&mut self.state, a);
    }

    fn swap(&mut self, a: usize, b: usize) {
        apply_swap(&mut self.state, a, b);
    }

    fn measure(&mut self, cell: usize) -> bool {
        let sample = self.rng.gen::<f64>();
        self.state.collapse(cell, sample)
    }

    fn read(&mut self, cell: usize) -> bool {
        // no non-collapsing peek exists for a quantum register
        self.measure(cell)
    }

    fn probability_one(&self, cell: usize) -> f64 {
        self.state.probability_one(cell)
    }

    fn box_clone(&self) -> Box<dyn StateBackend> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::complex::Complex;

    fn nearly_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    fn superposed(seed: u64) -> StatevectorBackend {
        let mut backend = StatevectorBackend::new(2, Some(seed)).unwrap();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        backend.state.amplitudes[0b00] = Complex::new(h, 0.0);
        backend.state.amplitudes[0b11] = Complex::new(h, 0.0);
        backend
    }

    #[test]
    fn test_toffoli_chain_collapses_with_certainty() {
        let mut backend = StatevectorBackend::new(3, Some(7)).unwrap();
        backend.not(0);
        backend.cnot(0, 1);
        backend.ccnot(0, 1, 2);
        assert!(nearly_eq(backend.probability_one(2), 1.0));
        assert!(backend.measure(2));
        assert!(nearly_eq(backend.state.total_probability(), 1.0));
    }

    #[test]
    fn test_measurement_collapses_entangled_partner() {
        let mut backend = superposed(11);
        let first = backend.measure(0);
        // |00⟩ + |11⟩: cell 1 must now agree with cell 0 on every read
        for _ in 0..8 {
            assert_eq!(backend.read(1), first);
        }
        assert!(nearly_eq(backend.state.total_probability(), 1.0));
    }

    #[test]
    fn test_probability_one_does_not_collapse() {
        let backend = superposed(3);
        assert!(nearly_eq(backend.probability_one(0), 0.5));
        assert!(nearly_eq(backend.state.amplitudes[0b00].norm_sq(), 0.5));
        assert!(nearly_eq(backend.state.amplitudes[0b11].norm_sq(), 0.5));
    }

    #[test]
    fn test_same_seed_same_outcomes() {
        let outcomes = |seed| {
            (0..16)
                .map(|_| superposed(seed).measure(0))
                .collect::<Vec<_>>()
        };
        assert_eq!(outcomes(42), outcomes(42));
    }

    #[test]
    fn test_clone_shares_future_samples() {
        let mut original = superposed(5);
        let mut fork = original.clone();
        assert_eq!(original.measure(1), fork.measure(1));
    }
}
