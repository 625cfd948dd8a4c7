pub mod fitness;
pub mod record;
pub mod runtime;
pub mod slot;

pub use fitness::{FitnessParams, ParamField, TapeStats};
pub use record::{Gate, OpRecord};
pub use runtime::{Checkpoint, TapeRuntime};
pub use slot::{Slot, Tape, TAPE_CAPACITY};
