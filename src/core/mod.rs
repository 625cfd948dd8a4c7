pub mod backend;
pub mod classical;
pub mod complex;
pub mod dispatch;
pub mod gates;
pub mod state;
pub mod statevector;

// Convenience re-exports for library users
pub use backend::{available_backends, BackendKind, StateBackend};
pub use classical::ClassicalBackend;
pub use complex::Complex;
pub use state::StateVector;
pub use statevector::StatevectorBackend;
