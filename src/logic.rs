/// Irreversible boolean gates built from the reversible primitives.
///
/// Each gate writes its result into a separate cell `out`, which is cleared
/// first (read it, NOT it if set). Every primitive goes through the runtime,
/// so the composition is recorded on the tape like any other program.
///
/// | Gate | Composition on a cleared `out`          |
/// |------|-----------------------------------------|
/// | AND  | CCNOT a b out                           |
/// | XOR  | CNOT a out, CNOT b out                  |
/// | OR   | XOR, then CCNOT a b out                 |
/// | NAND | AND, then NOT out                       |
/// | NOR  | OR, then NOT out                        |
///
/// On the statevector backend the clearing read is a measurement.
///
/// [`Maybe`] is the third truth value next to these gates: a named condition
/// that stays unresolved until something outside the runtime decides it,
/// with a confidence attached.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tape::TapeRuntime;

fn clear(rt: &mut TapeRuntime, out: usize) -> Result<()> {
    if rt.read(out)? {
        rt.not(out)?;
    }
    Ok(())
}

pub fn and(rt: &mut TapeRuntime, a: usize, b: usize, out: usize) -> Result<()> {
    clear(rt, out)?;
    rt.ccnot(a, b, out)?;
    Ok(())
}

pub fn xor(rt: &mut TapeRuntime, a: usize, b: usize, out: usize) -> Result<()> {
    clear(rt, out)?;
    rt.cnot(a, out)?.cnot(b, out)?;
    Ok(())
}

pub fn or(rt: &mut TapeRuntime, a: usize, b: usize, out: usize) -> Result<()> {
    // a ⊕ b ⊕ ab
    xor(rt, a, b, out)?;
    rt.ccnot(a, b, out)?;
    Ok(())
}

pub fn nand(rt: &mut TapeRuntime, a: usize, b: usize, out: usize) -> Result<()> {
    and(rt, a, b, out)?;
    rt.not(out)?;
    Ok(())
}

pub fn nor(rt: &mut TapeRuntime, a: usize, b: usize, out: usize) -> Result<()> {
    or(rt, a, b, out)?;
    rt.not(out)?;
    Ok(())
}

// ── Trinary MAYBE ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaybeState {
    False,
    True,
    Unresolved,
}

impl fmt::Display for MaybeState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            MaybeState::False => "FALSE",
            MaybeState::True => "TRUE",
            MaybeState::Unresolved => "UNRESOLVED",
        };
        write!(f, "{s}")
    }
}

/// A named condition that is true, false, or not yet known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maybe {
    condition: String,
    state: MaybeState,
    /// In [0, 1]; 0 while unresolved.
    confidence: f64,
    reasoning: Option<String>,
}

impl Maybe {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            state: MaybeState::Unresolved,
            confidence: 0.0,
            reasoning: None,
        }
    }

    /// Settle the condition. Resolving again replaces the earlier answer.
    /// Confidence is clamped to [0, 1]; NaN counts as 0.
    pub fn resolve(
        &mut self,
        value: bool,
        confidence: f64,
        reasoning: Option<&str>,
    ) -> &mut Self {
        self.state = if value { MaybeState::True } else { MaybeState::False };
        self.confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };
        self.reasoning = reasoning.map(str::to_owned);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.state != MaybeState::Unresolved
    }

    pub fn state(&self) -> MaybeState {
        self.state
    }

    pub fn value(&self) -> Option<bool> {
        match self.state {
            MaybeState::True => Some(true),
            MaybeState::False => Some(false),
            MaybeState::Unresolved => None,
        }
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn reasoning(&self) -> Option<&str> {
        self.reasoning.as_deref()
    }

    /// Load a resolved value into `cell` through the runtime; the ops that
    /// set it are recorded. An unresolved condition leaves the cell alone.
    pub fn load(&self, rt: &mut TapeRuntime, cell: usize) -> Result<Option<bool>> {
        let Some(value) = self.value() else {
            return Ok(None);
        };
        clear(rt, cell)?;
        if value {
            rt.not(cell)?;
        }
        Ok(Some(value))
    }
}

impl fmt::Display for Maybe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {}", self.condition, self.state)?;
        if self.is_resolved() {
            write!(f, " ({:.2})", self.confidence)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BackendKind;

    type GateFn = fn(&mut TapeRuntime, usize, usize, usize) -> Result<()>;

    fn truth_table(gate: GateFn, kind: BackendKind) -> [bool; 4] {
        let mut table = [false; 4];
        for (row, entry) in table.iter_mut().enumerate() {
            let mut rt = TapeRuntime::with_backend(kind, 3, 0).unwrap();
            if row & 1 != 0 {
                rt.not(0).unwrap();
            }
            if row & 2 != 0 {
                rt.not(1).unwrap();
            }
            // dirty output cell must not leak into the result
            rt.not(2).unwrap();
            gate(&mut rt, 0, 1, 2).unwrap();
            *entry = rt.read(2).unwrap();
        }
        table
    }

    #[test]
    fn test_truth_tables() {
        for kind in BackendKind::ALL {
            // rows: (a,b) = 00, 10, 01, 11
            assert_eq!(truth_table(and, kind), [false, false, false, true]);
            assert_eq!(truth_table(or, kind), [false, true, true, true]);
            assert_eq!(truth_table(xor, kind), [false, true, true, false]);
            assert_eq!(truth_table(nand, kind), [true, true, true, false]);
            assert_eq!(truth_table(nor, kind), [true, false, false, false]);
        }
    }

    #[test]
    fn test_composition_is_recorded() {
        let mut rt = TapeRuntime::new(3, 0).unwrap();
        rt.not(0).unwrap();
        or(&mut rt, 0, 1, 2).unwrap();
        // NOT 0, then CNOT 0 2, CNOT 1 2, CCNOT 0 1 2 (out was already clear)
        assert_eq!(rt.total_ops(), 4);
        assert_eq!(rt.read_slot(3).map(|r| r.to_string()).as_deref(), Some("CCNOT 0 1 2"));
    }

    #[test]
    fn test_out_must_be_distinct() {
        let mut rt = TapeRuntime::new(2, 0).unwrap();
        assert!(and(&mut rt, 0, 1, 1).is_err());
    }

    #[test]
    fn test_maybe_starts_unresolved() {
        let m = Maybe::new("network_reachable");
        assert_eq!(m.state(), MaybeState::Unresolved);
        assert!(!m.is_resolved());
        assert_eq!(m.value(), None);
        assert_eq!(m.confidence(), 0.0);
        assert_eq!(m.to_string(), "network_reachable = UNRESOLVED");
    }

    #[test]
    fn test_maybe_resolve_and_clamp() {
        let mut m = Maybe::new("user_authenticated");
        m.resolve(true, 0.95, Some("session active"));
        assert_eq!(m.value(), Some(true));
        assert_eq!(m.reasoning(), Some("session active"));
        assert_eq!(m.to_string(), "user_authenticated = TRUE (0.95)");

        m.resolve(false, 3.0, None);
        assert_eq!(m.state(), MaybeState::False);
        assert_eq!(m.confidence(), 1.0);
        assert_eq!(m.reasoning(), None);

        m.resolve(false, f64::NAN, None);
        assert_eq!(m.confidence(), 0.0);
        m.resolve(true, -0.5, None);
        assert_eq!(m.confidence(), 0.0);
    }

    #[test]
    fn test_maybe_load_into_cell() {
        let mut rt = TapeRuntime::new(2, 0).unwrap();
        let mut m = Maybe::new("has_admin_permission");
        assert_eq!(m.load(&mut rt, 0).unwrap(), None);
        assert_eq!(rt.total_ops(), 0);

        m.resolve(true, 0.7, None);
        assert_eq!(m.load(&mut rt, 0).unwrap(), Some(true));
        assert!(rt.read(0).unwrap());
        m.resolve(false, 0.7, None);
        m.load(&mut rt, 0).unwrap();
        assert!(!rt.read(0).unwrap());
        assert!(m.load(&mut rt, 5).is_err());
    }

    #[test]
    fn test_maybe_state_serde_names() {
        let json = serde_json::to_string(&MaybeState::Unresolved).unwrap();
        assert_eq!(json, "\"unresolved\"");
    }
}
