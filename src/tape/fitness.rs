/// Fitness scoring and the pruning policy.
///
/// Fitness is a weighted sum of three components, each in [0, 1]:
///
/// | Component  | Value                                                  |
/// |------------|--------------------------------------------------------|
/// | recency    | 1 at age 0, else 1 / (1 + age/100)                     |
/// | activity   | 0.3·P(a=1) + 0.3·P(b=1) + 0.2·P(c=1), used operands only |
/// | gate       | CCNOT 0.4, CNOT 0.3, SWAP 0.2, NOT 0.1                 |
///
/// Everything here is a pure function of its arguments; the runtime owns
/// the state and decides when to call in.
use super::record::{Gate, OpRecord};
use super::slot::{Slot, Tape};
use crate::core::StateBackend;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Weight of each operand position in the activity component.
const OPERAND_ACTIVITY: [f64; 3] = [0.3, 0.3, 0.2];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessParams {
    pub recency_weight: f64,
    pub activity_weight: f64,
    pub gate_weight: f64,
    /// Operations between automatic pruning cycles.
    pub prune_interval: u64,
    /// Fraction of the tape's ranks kept on each pruning cycle.
    pub prune_threshold: f64,
}

impl Default for FitnessParams {
    fn default() -> Self {
        Self {
            recency_weight: 0.5,
            activity_weight: 0.3,
            gate_weight: 0.2,
            prune_interval: 256,
            prune_threshold: 0.75,
        }
    }
}

impl FitnessParams {
    /// Default pruning schedule with the given weights (normalized on tune).
    pub fn with_weights(recency: f64, activity: f64, gate: f64) -> Self {
        Self {
            recency_weight: recency,
            activity_weight: activity,
            gate_weight: gate,
            ..Self::default()
        }
    }

    pub fn with_prune(mut self, interval: u64, threshold: f64) -> Self {
        self.prune_interval = interval;
        self.prune_threshold = threshold;
        self
    }

    /// Number of top-ranked slots a pruning cycle keeps.
    pub fn retained_slots(&self, capacity: usize) -> usize {
        ((capacity as f64) * self.prune_threshold).floor() as usize
    }

    /// Apply every valid field of `proposed`, returning the rejected ones.
    ///
    /// Weights are taken together: all finite, none negative, sum > 0, and
    /// they are normalized to sum to 1.
    pub fn merge(&mut self, proposed: &FitnessParams) -> Vec<ParamField> {
        let mut rejected = Vec::new();

        let weights = [
            proposed.recency_weight,
            proposed.activity_weight,
            proposed.gate_weight,
        ];
        let total: f64 = weights.iter().sum();
        if weights.iter().all(|w| w.is_finite() && *w >= 0.0) && total > 0.0 {
            self.recency_weight = weights[0] / total;
            self.activity_weight = weights[1] / total;
            self.gate_weight = weights[2] / total;
        } else {
            rejected.push(ParamField::Weights);
        }

        if proposed.prune_interval > 0 {
            self.prune_interval = proposed.prune_interval;
        } else {
            rejected.push(ParamField::PruneInterval);
        }

        let t = proposed.prune_threshold;
        if t > 0.0 && t <= 1.0 {
            self.prune_threshold = t;
        } else {
            rejected.push(ParamField::PruneThreshold);
        }

        rejected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamField {
    Weights,
    PruneInterval,
    PruneThreshold,
}

pub fn gate_priority(gate: Gate) -> f64 {
    match gate {
        Gate::Ccnot => 0.4,
        Gate::Cnot => 0.3,
        Gate::Swap => 0.2,
        Gate::Not => 0.1,
    }
}

pub fn recency(age: u64) -> f64 {
    if age == 0 {
        1.0
    } else {
        1.0 / (1.0 + age as f64 / 100.0)
    }
}

/// How "hot" the cells an operation touches currently are.
pub fn activity(record: &OpRecord, backend: &dyn StateBackend) -> f64 {
    let cells = backend.num_cells();
    record
        .operands()
        .zip(OPERAND_ACTIVITY)
        .filter(|(cell, _)| *cell < cells)
        .map(|(cell, weight)| weight * backend.probability_one(cell))
        .sum()
}

/// Fitness of `record` last touched at op `last_touched`, seen at op `now`.
pub fn score(
    params: &FitnessParams,
    record: &OpRecord,
    last_touched: u64,
    now: u64,
    backend: &dyn StateBackend,
) -> f64 {
    let age = now.saturating_sub(last_touched);
    let fitness = params.recency_weight * recency(age)
        + params.activity_weight * activity(record, backend)
        + params.gate_weight * gate_priority(record.gate);
    fitness.clamp(0.0, 1.0)
}

/// Current fitness of a slot: 1.0 when essential, 0.0 when empty.
pub fn slot_fitness(
    params: &FitnessParams,
    slot: &Slot,
    now: u64,
    backend: &dyn StateBackend,
) -> f64 {
    if slot.essential {
        return 1.0;
    }
    match &slot.record {
        Some(record) => score(params, record, slot.last_touched, now, backend),
        None => 0.0,
    }
}

/// Refresh the stored fitness of every non-essential slot.
pub fn rescore(tape: &mut Tape, params: &FitnessParams, now: u64, backend: &dyn StateBackend) {
    for slot in tape.iter_mut().filter(|s| !s.essential) {
        slot.fitness = slot_fitness(params, slot, now, backend);
    }
}

/// Slot positions ordered by stored fitness, best first. Ties keep slot
/// order (the sort is stable), so ranking is deterministic.
pub fn rank(tape: &Tape) -> Vec<usize> {
    let mut order: Vec<usize> = (0..tape.capacity()).collect();
    order.sort_by(|&i, &j| {
        tape.get(j)
            .fitness
            .partial_cmp(&tape.get(i).fitness)
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// Positions a pruning cycle evicts: non-essential slots ranked at or below
/// the retention cut.
pub fn eviction_set(tape: &Tape, params: &FitnessParams) -> Vec<usize> {
    let keep = params.retained_slots(tape.capacity());
    rank(tape)
        .into_iter()
        .skip(keep)
        .filter(|&i| !tape.get(i).essential)
        .collect()
}

/// Snapshot of tape health for introspection and tuning decisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TapeStats {
    pub avg_fitness: f64,
    pub min_fitness: f64,
    pub max_fitness: f64,
    pub essential_count: usize,
    /// Slots holding a record.
    pub active_count: usize,
    pub pruning_cycles: u64,
}

impl TapeStats {
    pub fn collect(tape: &Tape, pruning_cycles: u64) -> Self {
        let mut sum = 0.0;
        let mut min_fitness = f64::INFINITY;
        let mut max_fitness = f64::NEG_INFINITY;
        let mut essential_count = 0;
        let mut active_count = 0;

        for slot in tape.iter() {
            sum += slot.fitness;
            min_fitness = min_fitness.min(slot.fitness);
            max_fitness = max_fitness.max(slot.fitness);
            essential_count += usize::from(slot.essential);
            active_count += usize::from(!slot.is_empty());
        }

        Self {
            avg_fitness: sum / tape.capacity() as f64,
            min_fitness,
            max_fitness,
            essential_count,
            active_count,
            pruning_cycles,
        }
    }
}
