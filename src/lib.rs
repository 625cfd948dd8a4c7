//! # revtape
//!
//! Reversible tape-loop runtime: a small register of cells driven by the four
//! self-inverse primitives (CCNOT, CNOT, NOT, SWAP), with every executed
//! operation logged on a 1024-slot circular tape.
//!
//! The tape is both history and program text. Slots carry a fitness score,
//! low-fitness slots are evicted periodically, checkpoints rewind state by
//! replaying the log backwards, and the log can be read and rewritten in
//! place.
//!
//! ## Quick Start
//!
//! ```rust
//! use revtape::TapeRuntime;
//!
//! let mut rt = TapeRuntime::new(4, 1).unwrap();
//! let cp = rt.checkpoint().unwrap();
//!
//! rt.not(0).unwrap().cnot(0, 1).unwrap().swap(0, 1).unwrap();
//! assert!(rt.read(0).unwrap() && rt.read(1).unwrap());
//! println!("slot 1: {}", rt.read_slot(1).unwrap()); // CNOT 0 1
//!
//! // Rewind everything since the checkpoint
//! rt.restore(&cp).unwrap();
//! assert!(!rt.read(0).unwrap());
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod logic;
pub mod tape;

pub use crate::config::RuntimeConfig;
pub use crate::core::{available_backends, BackendKind, StateBackend};
pub use crate::error::{Result, TapeError};
pub use crate::logic::{Maybe, MaybeState};
pub use crate::tape::{
    Checkpoint, FitnessParams, Gate, OpRecord, Slot, TapeRuntime, TapeStats, TAPE_CAPACITY,
};
