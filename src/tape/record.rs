/// Operation records: the code-as-data unit stored on the tape.
///
/// A record names one of the four reversible primitives plus up to three
/// operand cells. Every primitive is its own inverse, so undoing a record
/// means applying it again.
use crate::error::{Result, TapeError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    Ccnot,
    Cnot,
    Not,
    Swap,
}

impl Gate {
    /// Numeric tag used by the meta-modify rule language.
    pub const fn code(self) -> usize {
        match self {
            Gate::Ccnot => 0,
            Gate::Cnot => 1,
            Gate::Not => 2,
            Gate::Swap => 3,
        }
    }

    pub fn from_code(code: usize) -> Result<Self> {
        match code {
            0 => Ok(Gate::Ccnot),
            1 => Ok(Gate::Cnot),
            2 => Ok(Gate::Not),
            3 => Ok(Gate::Swap),
            other => Err(TapeError::InvalidGateCode(other)),
        }
    }

    /// Number of operand cells the gate reads or writes.
    pub const fn arity(self) -> usize {
        match self {
            Gate::Ccnot => 3,
            Gate::Cnot | Gate::Swap => 2,
            Gate::Not => 1,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gate::Ccnot => "CCNOT",
            Gate::Cnot => "CNOT",
            Gate::Not => "NOT",
            Gate::Swap => "SWAP",
        };
        f.write_str(name)
    }
}

/// One executed (or executable) primitive.
///
/// Operand fields past the gate's arity are carried but ignored, so
/// patching `gate` in place keeps whatever operands were already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpRecord {
    pub gate: Gate,
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl OpRecord {
    pub const fn ccnot(a: usize, b: usize, c: usize) -> Self {
        Self { gate: Gate::Ccnot, a, b, c }
    }

    pub const fn cnot(a: usize, b: usize) -> Self {
        Self { gate: Gate::Cnot, a, b, c: 0 }
    }

    pub const fn not(a: usize) -> Self {
        Self { gate: Gate::Not, a, b: 0, c: 0 }
    }

    pub const fn swap(a: usize, b: usize) -> Self {
        Self { gate: Gate::Swap, a, b, c: 0 }
    }

    /// Meta-modify rule: "set the gate kind of slot `slot` to `gate`".
    pub const fn patch_rule(slot: usize, gate: Gate) -> Self {
        Self { gate: Gate::Ccnot, a: slot, b: gate.code(), c: 0 }
    }

    /// The operand cells the gate actually uses, in order.
    pub fn operands(&self) -> impl Iterator<Item = usize> {
        [self.a, self.b, self.c].into_iter().take(self.gate.arity())
    }
}

impl fmt::Display for OpRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate)?;
        for operand in self.operands() {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_codes_round_trip() {
        for gate in [Gate::Ccnot, Gate::Cnot, Gate::Not, Gate::Swap] {
            assert_eq!(Gate::from_code(gate.code()).unwrap(), gate);
        }
        assert_eq!(Gate::from_code(4).unwrap_err(), TapeError::InvalidGateCode(4));
    }

    #[test]
    fn test_operands_follow_arity() {
        assert_eq!(OpRecord::ccnot(1, 2, 3).operands().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(OpRecord::cnot(4, 5).operands().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(OpRecord::not(6).operands().collect::<Vec<_>>(), vec![6]);
    }

    #[test]
    fn test_display() {
        assert_eq!(OpRecord::ccnot(0, 1, 2).to_string(), "CCNOT 0 1 2");
        assert_eq!(OpRecord::swap(3, 1).to_string(), "SWAP 3 1");
        assert_eq!(OpRecord::not(7).to_string(), "NOT 7");
    }

    #[test]
    fn test_patch_rule_encoding() {
        let rule = OpRecord::patch_rule(12, Gate::Swap);
        assert_eq!(rule.gate, Gate::Ccnot);
        assert_eq!(rule.a, 12);
        assert_eq!(rule.b, 3);
    }
}
