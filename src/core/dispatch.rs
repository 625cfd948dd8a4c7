/// Gate dispatcher: the backend-agnostic entry points.
///
/// Every call validates its operands against the backend's cell count and
/// rejects a gate that names one cell twice, then forwards to the active
/// backend. Validation happens before anything is touched, so a rejected
/// call leaves state exactly as it was.
use super::backend::StateBackend;
use crate::error::{Result, TapeError};
use crate::tape::record::{Gate, OpRecord};

/// Check that `op` can run on a backend with `cells` cells.
pub fn validate(op: &OpRecord, cells: usize) -> Result<()> {
    if let Some(index) = op.operands().find(|&i| i >= cells) {
        return Err(TapeError::OperandOutOfRange { index, cells });
    }
    let used = [op.a, op.b, op.c];
    let used = &used[..op.gate.arity()];
    let aliased = used
        .iter()
        .enumerate()
        .any(|(i, x)| used[i + 1..].contains(x));
    if aliased {
        return Err(TapeError::AliasedOperands {
            gate: op.gate,
            operands: used.to_vec(),
        });
    }
    Ok(())
}

/// Validate and apply one primitive to `backend`.
pub fn apply(backend: &mut dyn StateBackend, op: &OpRecord) -> Result<()> {
    validate(op, backend.num_cells())?;
    forward(backend, op);
    Ok(())
}

/// Apply an already-validated primitive.
pub(crate) fn forward(backend: &mut dyn StateBackend, op: &OpRecord) {
    match op.gate {
        Gate::Ccnot => backend.ccnot(op.a, op.b, op.c),
        Gate::Cnot => backend.cnot(op.a, op.b),
        Gate::Not => backend.not(op.a),
        Gate::Swap => backend.swap(op.a, op.b),
    }
}

pub fn ccnot(backend: &mut dyn StateBackend, a: usize, b: usize, c: usize) -> Result<()> {
    apply(backend, &OpRecord::ccnot(a, b, c))
}

pub fn cnot(backend: &mut dyn StateBackend, a: usize, b: usize) -> Result<()> {
    apply(backend, &OpRecord::cnot(a, b))
}

pub fn not(backend: &mut dyn StateBackend, a: usize) -> Result<()> {
    apply(backend, &OpRecord::not(a))
}

pub fn swap(backend: &mut dyn StateBackend, a: usize, b: usize) -> Result<()> {
    apply(backend, &OpRecord::swap(a, b))
}

fn check_cell(backend: &dyn StateBackend, cell: usize) -> Result<()> {
    let cells = backend.num_cells();
    if cell >= cells {
        return Err(TapeError::OperandOutOfRange { index: cell, cells });
    }
    Ok(())
}

pub fn measure(backend: &mut dyn StateBackend, cell: usize) -> Result<bool> {
    check_cell(backend, cell)?;
    Ok(backend.measure(cell))
}

pub fn read(backend: &mut dyn StateBackend, cell: usize) -> Result<bool> {
    check_cell(backend, cell)?;
    Ok(backend.read(cell))
}

pub fn probability_one(backend: &dyn StateBackend, cell: usize) -> Result<f64> {
    check_cell(backend, cell)?;
    Ok(backend.probability_one(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::BackendKind;

    #[test]
    fn test_same_sequence_on_both_backends() {
        for kind in BackendKind::ALL {
            let mut backend = kind.create(3, Some(9)).unwrap();
            not(backend.as_mut(), 0).unwrap();
            cnot(backend.as_mut(), 0, 1).unwrap();
            ccnot(backend.as_mut(), 0, 1, 2).unwrap();
            assert!(read(backend.as_mut(), 2).unwrap(), "{kind} backend");
        }
    }

    #[test]
    fn test_out_of_range_is_rejected_before_mutation() {
        let mut backend = BackendKind::Classical.create(2, None).unwrap();
        not(backend.as_mut(), 0).unwrap();
        let err = cnot(backend.as_mut(), 0, 2).unwrap_err();
        assert_eq!(err, TapeError::OperandOutOfRange { index: 2, cells: 2 });
        assert!(read(backend.as_mut(), 0).unwrap());
        assert!(!read(backend.as_mut(), 1).unwrap());
        assert!(measure(backend.as_mut(), 5).is_err());
    }

    #[test]
    fn test_aliased_operands_rejected() {
        let mut backend = BackendKind::Statevector.create(3, Some(0)).unwrap();
        let err = ccnot(backend.as_mut(), 0, 1, 0).unwrap_err();
        assert!(matches!(err, TapeError::AliasedOperands { gate: Gate::Ccnot, .. }));
        assert!(swap(backend.as_mut(), 2, 2).is_err());
    }

    #[test]
    fn test_unused_operands_are_not_validated() {
        // NOT only uses `a`; leftover b/c fields never count as operands
        let op = OpRecord { gate: Gate::Not, a: 1, b: 99, c: 1 };
        assert!(validate(&op, 2).is_ok());
    }
}
