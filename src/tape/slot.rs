/// The fixed-capacity circular tape and its slots.
///
/// Positions are always taken modulo `TAPE_CAPACITY`; there is no way to
/// address a slot outside the ring.
use super::record::OpRecord;
use crate::error::{Result, TapeError};
use serde::Serialize;

pub const TAPE_CAPACITY: usize = 1024;

/// One tape entry.
///
/// `seq` is the op index (value of `total_ops` before the increment) of the
/// execution that wrote `record`. It is cleared whenever the record is
/// replaced by anything other than recording (eviction, homoiconic write,
/// meta-modify, restore), which is how restore detects a slot it can no
/// longer trust.
///
/// `essential` is set while either pin is held: `marked` (from
/// `mark_essential`, permanent) or `boundary` (the stamp of the checkpoint
/// this slot starts, released when a restore undoes that checkpoint).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slot {
    pub record: Option<OpRecord>,
    pub fitness: f64,
    pub last_touched: u64,
    pub essential: bool,
    pub seq: Option<u64>,
    pub(crate) marked: bool,
    pub(crate) boundary: Option<u64>,
    /// Boundary slot still waiting for the first op after its checkpoint.
    pub(crate) armed: bool,
}

impl Slot {
    pub const EMPTY: Slot = Slot {
        record: None,
        fitness: 0.0,
        last_touched: 0,
        essential: false,
        seq: None,
        marked: false,
        boundary: None,
        armed: false,
    };

    pub fn is_empty(&self) -> bool {
        self.record.is_none()
    }

    /// Whether a recording may land on this essential slot: only the single
    /// record an armed boundary is waiting for.
    pub(crate) fn accepts_boundary(&self) -> bool {
        self.essential && self.armed
    }

    /// Essential and closed to recording.
    pub(crate) fn is_sealed(&self) -> bool {
        self.essential && !self.armed
    }

    fn sync_essential(&mut self) {
        self.essential = self.marked || self.boundary.is_some();
        if self.essential {
            self.fitness = 1.0;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tape {
    slots: Vec<Slot>,
}

impl Tape {
    pub fn new() -> Result<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(TAPE_CAPACITY)
            .map_err(|_| TapeError::Allocation { cells: TAPE_CAPACITY })?;
        slots.resize(TAPE_CAPACITY, Slot::EMPTY);
        Ok(Self { slots })
    }

    pub const fn capacity(&self) -> usize {
        TAPE_CAPACITY
    }

    #[inline(always)]
    pub const fn position(index: usize) -> usize {
        index % TAPE_CAPACITY
    }

    /// Position one step behind `position`, wrapping at zero.
    #[inline(always)]
    pub const fn previous(position: usize) -> usize {
        (position + TAPE_CAPACITY - 1) % TAPE_CAPACITY
    }

    pub fn get(&self, index: usize) -> &Slot {
        &self.slots[Self::position(index)]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Slot {
        &mut self.slots[Self::position(index)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        self.slots.iter_mut()
    }

    /// Empty a slot in place. Pins are left alone.
    pub fn clear(&mut self, index: usize) {
        let slot = self.get_mut(index);
        slot.record = None;
        slot.fitness = 0.0;
        slot.last_touched = 0;
        slot.seq = None;
        slot.sync_essential();
    }

    /// Pin a slot permanently as it stands: fitness 1.0, sealed, never
    /// evicted or released by restore.
    pub fn mark(&mut self, index: usize) {
        let slot = self.get_mut(index);
        slot.marked = true;
        slot.armed = false;
        slot.sync_essential();
    }

    /// Make a slot the armed boundary of checkpoint `stamp`. It accepts one
    /// more recording, then seals.
    pub(crate) fn arm_boundary(&mut self, index: usize, stamp: u64) {
        let slot = self.get_mut(index);
        slot.boundary = Some(stamp);
        slot.armed = !slot.marked;
        slot.sync_essential();
    }

    /// Drop a checkpoint pin. A `mark` on the same slot survives.
    pub(crate) fn release_boundary(&mut self, index: usize) {
        let slot = self.get_mut(index);
        slot.boundary = None;
        slot.armed = false;
        slot.sync_essential();
    }
}
