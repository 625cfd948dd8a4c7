/// Classical backend: N independent bits, O(1) gates, no randomness.
use super::backend::{BackendKind, StateBackend};
use crate::error::{Result, TapeError};
use bitvec::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicalBackend {
    bits: BitVec<u8, Lsb0>,
}

impl ClassicalBackend {
    pub fn new(cells: usize) -> Result<Self> {
        if cells == 0 {
            return Err(TapeError::NoCells);
        }
        let words = cells.div_ceil(8);
        let mut storage: Vec<u8> = Vec::new();
        storage
            .try_reserve_exact(words)
            .map_err(|_| TapeError::Allocation { cells })?;
        storage.resize(words, 0);

        let mut bits = BitVec::from_vec(storage);
        bits.truncate(cells);
        Ok(Self { bits })
    }

    fn flip(&mut self, cell: usize) {
        let value = self.bits[cell];
        self.bits.set(cell, !value);
    }
}

impl StateBackend for ClassicalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Classical
    }

    fn num_cells(&self) -> usize {
        self.bits.len()
    }

    fn ccnot(&mut self, a: usize, b: usize, c: usize) {
        if self.bits[a] && self.bits[b] {
            self.flip(c);
        }
    }

    fn cnot(&mut self, a: usize, b: usize) {
        if self.bits[a] {
            self.flip(b);
        }
    }

    fn not(&mut self, a: usize) {
        self.flip(a);
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.bits.swap(a, b);
    }

    fn measure(&mut self, cell: usize) -> bool {
        self.bits[cell]
    }

    fn read(&mut self, cell: usize) -> bool {
        self.bits[cell]
    }

    fn probability_one(&self, cell: usize) -> f64 {
        if self.bits[cell] {
            1.0
        } else {
            0.0
        }
    }

    fn box_clone(&self) -> Box<dyn StateBackend> {
        Box::new(self.clone())
    }
}
