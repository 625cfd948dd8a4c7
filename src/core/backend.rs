/// The state backend seam.
///
/// A runtime owns exactly one backend for its whole life. The concrete type
/// is picked once, at construction, from a `BackendKind`; after that every
/// gate goes through the `StateBackend` trait object.
///
/// | Kind          | Storage                 | `read`            |
/// |---------------|-------------------------|-------------------|
/// | `Classical`   | one bit per cell        | pure observation  |
/// | `Statevector` | 2^n complex amplitudes  | measures (collapses) |
use super::classical::ClassicalBackend;
use super::statevector::StatevectorBackend;
use crate::error::{Result, TapeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability set of a backend.
///
/// Operands are validated by the dispatcher before any of these are called;
/// implementations may assume `index < num_cells()` and distinct operands.
pub trait StateBackend: fmt::Debug + Send {
    fn kind(&self) -> BackendKind;
    fn num_cells(&self) -> usize;

    fn ccnot(&mut self, a: usize, b: usize, c: usize);
    fn cnot(&mut self, a: usize, b: usize);
    fn not(&mut self, a: usize);
    fn swap(&mut self, a: usize, b: usize);

    /// Measure `cell`, collapsing the state where the representation has
    /// anything to collapse.
    fn measure(&mut self, cell: usize) -> bool;

    /// Observe `cell`. Only the classical backend can do this without
    /// disturbing state; the statevector backend measures.
    fn read(&mut self, cell: usize) -> bool;

    /// Non-collapsing probability that `cell` reads 1. Exactly 0.0 or 1.0
    /// on the classical backend.
    fn probability_one(&self, cell: usize) -> f64;

    /// Deep copy, for branch and what-if exploration.
    fn box_clone(&self) -> Box<dyn StateBackend>;
}

impl Clone for Box<dyn StateBackend> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Classical,
    Statevector,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::Classical, BackendKind::Statevector];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Classical => "Classical (direct bits)",
            BackendKind::Statevector => "Statevector (quantum simulation)",
        }
    }

    pub fn is_quantum(self) -> bool {
        matches!(self, BackendKind::Statevector)
    }

    /// Allocate a zero-initialized backend of this kind.
    ///
    /// `seed` fixes the measurement RNG of the statevector backend and is
    /// ignored by the classical one.
    pub fn create(self, cells: usize, seed: Option<u64>) -> Result<Box<dyn StateBackend>> {
        Ok(match self {
            BackendKind::Classical => Box::new(ClassicalBackend::new(cells)?),
            BackendKind::Statevector => Box::new(StatevectorBackend::new(cells, seed)?),
        })
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Classical => write!(f, "classical"),
            BackendKind::Statevector => write!(f, "statevector"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = TapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classical" => Ok(BackendKind::Classical),
            "statevector" | "simulator" => Ok(BackendKind::Statevector),
            other => Err(TapeError::UnknownBackend(other.to_string())),
        }
    }
}

/// Human-readable names of every backend compiled into this crate.
pub fn available_backends() -> Vec<&'static str> {
    BackendKind::ALL.iter().map(|k| k.name()).collect()
}
