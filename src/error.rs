/// Error type shared by the backends, the gate dispatcher and the tape runtime.
///
/// Nothing in the crate retries: every failure is returned to the caller of
/// the operation that failed, and a rejected call leaves state untouched
/// unless the variant says otherwise.
use thiserror::Error;

use crate::tape::fitness::ParamField;
use crate::tape::record::Gate;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TapeError {
    /// A runtime needs at least one cell.
    #[error("a runtime needs at least one cell")]
    NoCells,

    /// Statevector storage grows as 2^n; `max` is the hard ceiling.
    #[error("{requested} cells exceeds the backend limit of {max}")]
    TooManyCells { requested: usize, max: usize },

    /// Backend storage could not be allocated.
    #[error("failed to allocate backend storage for {cells} cells")]
    Allocation { cells: usize },

    #[error("operand {index} is out of range for {cells} cells")]
    OperandOutOfRange { index: usize, cells: usize },

    #[error("{gate} names the same cell twice: {operands:?}")]
    AliasedOperands { gate: Gate, operands: Vec<usize> },

    #[error("unknown backend '{0}' (available: classical, statevector)")]
    UnknownBackend(String),

    /// Tuning rejected these fields; every other field was applied.
    #[error("rejected fitness parameters: {fields:?} (valid fields were applied)")]
    RejectedParams { fields: Vec<ParamField> },

    /// More than one full wrap separates the checkpoint from the present.
    #[error(
        "checkpoint at op {checkpoint} is out of reach: {total_ops} ops recorded, tape holds {capacity}"
    )]
    CheckpointExpired {
        checkpoint: u64,
        total_ops: u64,
        capacity: usize,
    },

    /// The checkpoint lies after the current position (it was already undone).
    #[error("checkpoint at op {checkpoint} is ahead of the current position {total_ops}")]
    CheckpointAhead { checkpoint: u64, total_ops: u64 },

    /// The checkpoint was walked over by a restore to an earlier one.
    #[error("checkpoint at op {checkpoint} was undone by an earlier restore")]
    UndoneCheckpoint { checkpoint: u64 },

    /// The head slot is already pinned with a record and cannot take the
    /// first op after a new checkpoint.
    #[error("slot {position} is sealed; a checkpoint there could not record its boundary")]
    SealedSlot { position: usize },

    #[error("checkpoint belongs to runtime instance {found}, not {expected}")]
    ForeignCheckpoint { expected: u32, found: u32 },

    /// A slot on the restore path was evicted, skipped or rewritten since it
    /// recorded op `expected_seq`.
    #[error("slot {position} no longer holds op {expected_seq}; restore would replay the wrong inverse")]
    StaleSlot { position: usize, expected_seq: u64 },

    #[error("gate code {0} is not one of 0=CCNOT, 1=CNOT, 2=NOT, 3=SWAP")]
    InvalidGateCode(usize),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_values() {
        let err = TapeError::OperandOutOfRange { index: 9, cells: 4 };
        assert_eq!(err.to_string(), "operand 9 is out of range for 4 cells");

        let err = TapeError::StaleSlot { position: 12, expected_seq: 1036 };
        assert!(err.to_string().contains("slot 12"));
        assert!(err.to_string().contains("1036"));
    }

    #[test]
    fn test_checkpoint_errors_display() {
        let err = TapeError::SealedSlot { position: 7 };
        assert!(err.to_string().starts_with("slot 7 is sealed"));

        let err = TapeError::UndoneCheckpoint { checkpoint: 40 };
        assert_eq!(err.to_string(), "checkpoint at op 40 was undone by an earlier restore");
    }

    #[test]
    fn test_aliased_operands_display() {
        let err = TapeError::AliasedOperands { gate: Gate::Cnot, operands: vec![2, 2] };
        assert_eq!(err.to_string(), "CNOT names the same cell twice: [2, 2]");
    }
}
