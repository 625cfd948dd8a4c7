/// The tape-loop runtime.
///
/// Owns one state backend and a fixed 1024-slot circular log of executed
/// operations. Every primitive runs in a fixed order:
///
///   1. dispatch: validate operands, mutate backend state
///   2. score: fitness of the new record against the post-gate state
///   3. record: write (or drop) the record at the head, advance counters
///   4. prune: every `prune_interval` ops, evict low-fitness slots
///
/// Checkpoint/restore rewinds by re-applying recorded operations backwards;
/// each primitive is self-inverse. Every slot remembers which execution
/// wrote it (`Slot::seq`), and restore refuses to walk over a slot that no
/// longer holds the operation executed there.
///
/// All operations run to completion synchronously. The runtime is one
/// exclusively owned unit; share it across threads behind a single lock.
use super::fitness::{self, FitnessParams, TapeStats};
use super::record::{Gate, OpRecord};
use super::slot::{Slot, Tape, TAPE_CAPACITY};
use crate::config::RuntimeConfig;
use crate::core::{dispatch, BackendKind, StateBackend};
use crate::error::{Result, TapeError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

/// A restore target: the head position at checkpoint time plus the op index
/// it corresponds to. `stamp` ties it to the boundary pin it placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checkpoint {
    instance_id: u32,
    position: usize,
    op_index: u64,
    stamp: u64,
}

impl Checkpoint {
    /// Tape position of the boundary slot.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Value of `total_ops` when the checkpoint was taken.
    pub fn op_index(&self) -> u64 {
        self.op_index
    }

    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }
}

#[derive(Debug, Clone)]
pub struct TapeRuntime {
    instance_id: u32,
    backend: Box<dyn StateBackend>,
    tape: Tape,
    total_ops: u64,
    tape_head: usize,
    wrapped: bool,
    pruning_cycles: u64,
    last_prune_op: u64,
    checkpoints_taken: u64,
    params: FitnessParams,
}

impl TapeRuntime {
    /// Classical runtime over `cells` bits with default fitness parameters.
    pub fn new(cells: usize, instance_id: u32) -> Result<Self> {
        Self::with_backend(BackendKind::Classical, cells, instance_id)
    }

    pub fn with_backend(kind: BackendKind, cells: usize, instance_id: u32) -> Result<Self> {
        let backend = kind.create(cells, None)?;
        Self::assemble(backend, instance_id, FitnessParams::default())
    }

    /// Build from a full configuration. Invalid fitness fields fail creation.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        let backend = config.backend.create(config.cells, config.seed)?;
        let mut params = FitnessParams::default();
        let rejected = params.merge(&config.fitness);
        if !rejected.is_empty() {
            return Err(TapeError::RejectedParams { fields: rejected });
        }
        Self::assemble(backend, config.instance_id, params)
    }

    fn assemble(
        backend: Box<dyn StateBackend>,
        instance_id: u32,
        params: FitnessParams,
    ) -> Result<Self> {
        let tape = Tape::new()?;
        info!(
            instance_id,
            backend = %backend.kind(),
            cells = backend.num_cells(),
            "tape runtime created"
        );
        Ok(Self {
            instance_id,
            backend,
            tape,
            total_ops: 0,
            tape_head: 0,
            wrapped: false,
            pruning_cycles: 0,
            last_prune_op: 0,
            checkpoints_taken: 0,
            params,
        })
    }

    // ── Execution ─────────────────────────────────────────────────────────

    /// Execute one primitive and record it on the tape.
    pub fn execute(&mut self, op: OpRecord) -> Result<&mut Self> {
        dispatch::apply(self.backend.as_mut(), &op)?;
        let candidate = self.score_candidate(&op);
        self.record(op, candidate);
        Ok(self)
    }

    pub fn ccnot(&mut self, a: usize, b: usize, c: usize) -> Result<&mut Self> {
        self.execute(OpRecord::ccnot(a, b, c))
    }

    pub fn cnot(&mut self, a: usize, b: usize) -> Result<&mut Self> {
        self.execute(OpRecord::cnot(a, b))
    }

    pub fn not(&mut self, a: usize) -> Result<&mut Self> {
        self.execute(OpRecord::not(a))
    }

    pub fn swap(&mut self, a: usize, b: usize) -> Result<&mut Self> {
        self.execute(OpRecord::swap(a, b))
    }

    /// Measure a cell. Not recorded: measurement is not reversible.
    pub fn measure(&mut self, cell: usize) -> Result<bool> {
        dispatch::measure(self.backend.as_mut(), cell)
    }

    /// Read a cell; collapses on the statevector backend.
    pub fn read(&mut self, cell: usize) -> Result<bool> {
        dispatch::read(self.backend.as_mut(), cell)
    }

    /// Non-collapsing probability that `cell` reads 1.
    pub fn probability_one(&self, cell: usize) -> Result<f64> {
        dispatch::probability_one(self.backend.as_ref(), cell)
    }

    /// Fitness of `op` as if it had just been recorded, against current state.
    fn score_candidate(&self, op: &OpRecord) -> f64 {
        fitness::score(
            &self.params,
            op,
            self.total_ops,
            self.total_ops,
            self.backend.as_ref(),
        )
    }

    fn record(&mut self, op: OpRecord, candidate: f64) {
        let seq = self.total_ops;
        let head = self.tape_head;
        let standing = *self.tape.get(head);

        let write = if standing.essential {
            standing.accepts_boundary()
        } else if !self.wrapped {
            true
        } else {
            let current =
                fitness::slot_fitness(&self.params, &standing, seq, self.backend.as_ref());
            candidate >= current
        };

        if write {
            let slot = self.tape.get_mut(head);
            slot.record = Some(op);
            slot.last_touched = seq;
            slot.seq = Some(seq);
            if slot.essential {
                slot.armed = false;
            } else {
                slot.fitness = candidate;
            }
            trace!(slot = head, seq, %op, fitness = candidate, "recorded");
        } else if standing.essential {
            trace!(slot = head, seq, %op, "essential slot kept, record dropped");
        } else {
            trace!(slot = head, seq, %op, fitness = candidate, "low-fitness record skipped");
        }

        self.tape_head = Tape::position(head + 1);
        self.total_ops += 1;
        if self.tape_head == 0 {
            self.wrapped = true;
        }

        if self.total_ops.saturating_sub(self.last_prune_op) >= self.params.prune_interval {
            self.prune();
        }
    }

    // ── Reversibility ─────────────────────────────────────────────────────

    /// Pin the head slot as a restore boundary.
    ///
    /// The pinned slot still takes the next recording (the first operation
    /// after the checkpoint); from then on it is never overwritten or evicted
    /// until a restore undoes the checkpoint. Checkpointing twice without an
    /// operation in between returns the same boundary. A head slot that is
    /// already sealed (marked essential, or the boundary of an older
    /// checkpoint) cannot take the boundary record and is refused.
    pub fn checkpoint(&mut self) -> Result<Checkpoint> {
        let position = self.tape_head;
        let slot = *self.tape.get(position);

        let stamp = match slot.boundary {
            Some(stamp) if slot.armed => stamp,
            _ if slot.is_sealed() => {
                warn!(position, "checkpoint refused on sealed slot");
                return Err(TapeError::SealedSlot { position });
            }
            _ => {
                self.checkpoints_taken += 1;
                self.tape.arm_boundary(position, self.checkpoints_taken);
                self.checkpoints_taken
            }
        };

        debug!(position, op_index = self.total_ops, stamp, "checkpoint");
        Ok(Checkpoint {
            instance_id: self.instance_id,
            position,
            op_index: self.total_ops,
            stamp,
        })
    }

    /// Undo every operation recorded since `checkpoint`.
    ///
    /// The whole backward path is validated before any state changes; on
    /// error the runtime is untouched. Walked slots are emptied (a marked
    /// slot keeps its record) and the boundaries of every later checkpoint
    /// are released, so those checkpoints become invalid.
    pub fn restore(&mut self, checkpoint: &Checkpoint) -> Result<()> {
        let steps = self.restore_steps(checkpoint).map_err(|err| {
            warn!(error = %err, "restore rejected");
            err
        })?;

        // a checkpoint taken at the head and not yet reached by any op
        if steps > 0 && self.tape.get(self.tape_head).armed {
            self.release_later_boundary(self.tape_head, checkpoint);
        }

        for _ in 0..steps {
            self.tape_head = Tape::previous(self.tape_head);
            let position = self.tape_head;
            let slot = self.tape.get_mut(position);
            let record = slot.record;
            if slot.marked {
                slot.seq = None;
            } else {
                self.tape.clear(position);
            }
            if let Some(record) = record {
                dispatch::forward(self.backend.as_mut(), &record);
            }
            self.release_later_boundary(position, checkpoint);
            self.total_ops -= 1;
        }

        self.tape.arm_boundary(checkpoint.position, checkpoint.stamp);
        debug!(steps, position = self.tape_head, total_ops = self.total_ops, "restored");
        Ok(())
    }

    fn release_later_boundary(&mut self, position: usize, checkpoint: &Checkpoint) {
        let slot = self.tape.get(position);
        if slot.boundary.is_some_and(|stamp| stamp != checkpoint.stamp) {
            trace!(slot = position, "checkpoint boundary released by restore");
            self.tape.release_boundary(position);
            let released = *self.tape.get(position);
            if !released.essential {
                // drop the pinned 1.0
                self.tape.get_mut(position).fitness = fitness::slot_fitness(
                    &self.params,
                    &released,
                    self.total_ops,
                    self.backend.as_ref(),
                );
            }
        }
    }

    fn restore_steps(&self, checkpoint: &Checkpoint) -> Result<u64> {
        if checkpoint.instance_id != self.instance_id {
            return Err(TapeError::ForeignCheckpoint {
                expected: self.instance_id,
                found: checkpoint.instance_id,
            });
        }
        if checkpoint.op_index > self.total_ops {
            return Err(TapeError::CheckpointAhead {
                checkpoint: checkpoint.op_index,
                total_ops: self.total_ops,
            });
        }
        let steps = self.total_ops - checkpoint.op_index;
        if steps >= TAPE_CAPACITY as u64 {
            return Err(TapeError::CheckpointExpired {
                checkpoint: checkpoint.op_index,
                total_ops: self.total_ops,
                capacity: TAPE_CAPACITY,
            });
        }

        if self.tape.get(checkpoint.position).boundary != Some(checkpoint.stamp) {
            return Err(TapeError::UndoneCheckpoint {
                checkpoint: checkpoint.op_index,
            });
        }

        let mut position = self.tape_head;
        for back in 1..=steps {
            position = Tape::previous(position);
            let expected_seq = self.total_ops - back;
            let slot = self.tape.get(position);
            if slot.seq != Some(expected_seq) || slot.record.is_none() {
                return Err(TapeError::StaleSlot {
                    position,
                    expected_seq,
                });
            }
        }
        Ok(steps)
    }

    // ── Self-modification ─────────────────────────────────────────────────

    /// Record stored at `index mod capacity`, if any.
    pub fn read_slot(&self, index: usize) -> Option<OpRecord> {
        self.tape.get(index).record
    }

    /// Overwrite a slot's record directly, bypassing fitness and pins.
    ///
    /// The slot stops counting as executed history, so a later restore over
    /// it fails with `StaleSlot` instead of replaying the new record.
    pub fn write_slot(&mut self, index: usize, record: OpRecord) {
        let now = self.total_ops;
        let slot = self.tape.get_mut(index);
        slot.record = Some(record);
        slot.last_touched = now;
        slot.seq = None;
        trace!(slot = Tape::position(index), %record, "homoiconic write");
    }

    /// Run a rule list against the tape itself.
    ///
    /// A CCNOT rule `(a, b, _)` sets the gate kind of slot `a` to gate code
    /// `b`; every other rule kind is a no-op. All rules are checked before
    /// any slot changes. Empty target slots are skipped. Returns the number
    /// of slots patched; `total_ops` is never touched.
    pub fn meta_modify(&mut self, rules: &[OpRecord]) -> Result<usize> {
        let patches = rules
            .iter()
            .filter(|rule| rule.gate == Gate::Ccnot)
            .map(|rule| Gate::from_code(rule.b).map(|gate| (rule.a, gate)))
            .collect::<Result<Vec<_>>>()?;

        let now = self.total_ops;
        let mut patched = 0;
        for (index, gate) in patches {
            let slot = self.tape.get_mut(index);
            if let Some(record) = slot.record.as_mut() {
                record.gate = gate;
                slot.last_touched = now;
                slot.seq = None;
                patched += 1;
            }
        }
        debug!(rules = rules.len(), patched, "meta-modify");
        Ok(patched)
    }

    // ── Fitness & pruning ─────────────────────────────────────────────────

    /// Pin `index mod capacity` as it stands: fitness 1.0, never evicted or
    /// overwritten.
    pub fn mark_essential(&mut self, index: usize) {
        self.tape.mark(index);
    }

    /// Fitness of a slot under the current parameters and state, without
    /// storing it.
    pub fn fitness(&self, index: usize) -> f64 {
        fitness::slot_fitness(
            &self.params,
            self.tape.get(index),
            self.total_ops,
            self.backend.as_ref(),
        )
    }

    /// One compaction cycle: rescore, rank, and clear every non-essential
    /// slot outside the retained fraction. Slots are cleared in place.
    pub fn prune(&mut self) {
        fitness::rescore(
            &mut self.tape,
            &self.params,
            self.total_ops,
            self.backend.as_ref(),
        );

        let mut evicted = 0usize;
        for index in fitness::eviction_set(&self.tape, &self.params) {
            evicted += usize::from(!self.tape.get(index).is_empty());
            self.tape.clear(index);
        }

        self.pruning_cycles += 1;
        self.last_prune_op = self.total_ops;
        debug!(
            cycle = self.pruning_cycles,
            evicted,
            total_ops = self.total_ops,
            "prune cycle"
        );
    }

    pub fn fitness_params(&self) -> FitnessParams {
        self.params
    }

    /// Replace fitness parameters and rescore every standing slot.
    ///
    /// Invalid fields are rejected individually; the valid ones still take
    /// effect and the rescore still happens before the error is returned.
    pub fn tune(&mut self, params: FitnessParams) -> Result<()> {
        let rejected = self.params.merge(&params);
        fitness::rescore(
            &mut self.tape,
            &self.params,
            self.total_ops,
            self.backend.as_ref(),
        );
        debug!(params = ?self.params, "fitness tuned");

        if rejected.is_empty() {
            Ok(())
        } else {
            warn!(fields = ?rejected, "fitness parameters rejected");
            Err(TapeError::RejectedParams { fields: rejected })
        }
    }

    pub fn stats(&self) -> TapeStats {
        TapeStats::collect(&self.tape, self.pruning_cycles)
    }

    // ── Introspection ─────────────────────────────────────────────────────

    /// Full slot at `index mod capacity`.
    pub fn slot(&self, index: usize) -> &Slot {
        self.tape.get(index)
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn num_cells(&self) -> usize {
        self.backend.num_cells()
    }

    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    pub fn total_ops(&self) -> u64 {
        self.total_ops
    }

    pub fn tape_head(&self) -> usize {
        self.tape_head
    }

    pub fn wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn pruning_cycles(&self) -> u64 {
        self.pruning_cycles
    }

    pub fn last_prune_op(&self) -> u64 {
        self.last_prune_op
    }

    pub fn capacity(&self) -> usize {
        self.tape.capacity()
    }

    /// Independent copy of the whole runtime (backend, tape, counters) for
    /// what-if exploration.
    pub fn fork(&self) -> Self {
        self.clone()
    }
}
