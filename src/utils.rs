use ark_ff::Field;
use itertools::iterate;

/// Build the exponent table `[1, w, w^2, ..., w^{len-1}]`.
pub fn build_exp_table<F: Field>(w: &F, len: usize) -> Vec<F> {
    let w = *w;
    iterate(F::one(), move |x| *x * w).take(len).collect()
}

/// Permute a slice into bit-reversed index order. The length must be a
/// power of two.
pub fn bit_reverse<T>(v: &mut [T]) {
    let n = v.len();
    assert!(n.is_power_of_two());
    if n == 1 {
        return;
    }
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = (i.reverse_bits() >> (usize::BITS - bits)) as usize;
        if i < j {
            v.swap(i, j);
        }
    }
}
