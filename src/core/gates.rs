/// Reversible primitive kernels over a statevector.
///
/// Every primitive is a permutation of basis states: it flips (or exchanges)
/// bits of the basis index, so applying it means swapping amplitude pairs.
/// Normalization is preserved without any rescaling, and each kernel is its
/// own inverse.
///
/// Callers validate operands; the kernels only debug-assert them.
use super::state::StateVector;

/// NOT: flip `target` in every basis index.
pub fn apply_not(state: &mut StateVector, target: usize) {
    debug_assert!(target < state.num_qubits);
    let target_mask = 1usize << target;

    for i in 0..state.dim() {
        if i & target_mask == 0 {
            state.amplitudes.swap(i, i | target_mask);
        }
    }
}

/// CNOT: flip `target` where `control` is set.
pub fn apply_cnot(state: &mut StateVector, control: usize, target: usize) {
    debug_assert!(control < state.num_qubits && target < state.num_qubits);
    debug_assert_ne!(control, target);

    let control_mask = 1usize << control;
    let target_mask = 1usize << target;

    for i in 0..state.dim() {
        if (i & control_mask != 0) && (i & target_mask == 0) {
            state.amplitudes.swap(i, i | target_mask);
        }
    }
}

/// CCNOT (Toffoli): flip `target` where both controls are set.
pub fn apply_ccnot(state: &mut StateVector, control0: usize, control1: usize, target: usize) {
    debug_assert!(control0 != control1 && control0 != target && control1 != target);

    let c0_mask = 1usize << control0;
    let c1_mask = 1usize << control1;
    let t_mask = 1usize << target;

    for i in 0..state.dim() {
        if (i & c0_mask != 0) && (i & c1_mask != 0) && (i & t_mask == 0) {
            state.amplitudes.swap(i, i | t_mask);
        }
    }
}

/// SWAP: exchange bits `qubit_a` and `qubit_b` of every basis index.
pub fn apply_swap(state: &mut StateVector, qubit_a: usize, qubit_b: usize) {
    debug_assert_ne!(qubit_a, qubit_b);

    let mask_a = 1usize << qubit_a;
    let mask_b = 1usize << qubit_b;

    for i in 0..state.dim() {
        // visit each differing pair once, from the side with a=1, b=0
        if (i & mask_a != 0) && (i & mask_b == 0) {
            let j = (i & !mask_a) | mask_b;
            state.amplitudes.swap(i, j);
        }
    }
}
