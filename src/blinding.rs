use ark_ff::FftField;
use ark_std::rand::{CryptoRng, RngCore};

use crate::errors::{NumeratorError, Result};
use crate::polynomial::FpPolynomial;

/// Zero-knowledge blinding polynomials masking the wire polynomials and the
/// grand-product accumulator. They are mutated in place during the coset
/// loop (scaled, then unscaled), and must be bit-identical to their initial
/// values once the loop has finished and the global restoration ran.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlindingPolys<F: FftField> {
    pub bl: FpPolynomial<F>,
    pub br: FpPolynomial<F>,
    pub bo: FpPolynomial<F>,
    pub bz: FpPolynomial<F>,
}

impl<F: FftField> BlindingPolys<F> {
    /// Sample fresh small-degree blinding polynomials: degree 1 for the
    /// wires, degree 2 for the accumulator.
    pub fn sample<R: CryptoRng + RngCore>(prng: &mut R) -> Self {
        BlindingPolys {
            bl: FpPolynomial::random(prng, 1),
            br: FpPolynomial::random(prng, 1),
            bo: FpPolynomial::random(prng, 1),
            bz: FpPolynomial::random(prng, 2),
        }
    }

    /// All-zero blinding (no hiding), degree matching [`Self::sample`].
    pub fn none() -> Self {
        BlindingPolys {
            bl: FpPolynomial::zero(2),
            br: FpPolynomial::zero(2),
            bo: FpPolynomial::zero(2),
            bz: FpPolynomial::zero(3),
        }
    }

    fn each_mut(&mut self, mut f: impl FnMut(&mut FpPolynomial<F>)) {
        f(&mut self.bl);
        f(&mut self.br);
        f(&mut self.bo);
        f(&mut self.bz);
    }

    /// Scale coefficient `j` of each polynomial by `v * shifter^j`, where
    /// `v = coset^n - 1` is the vanishing value on the current coset. The
    /// `shifter^j` part telescopes with the running coset scaling of the
    /// wire buffers.
    pub fn scale_for_coset(&mut self, v: &F, shifter: &F) {
        self.each_mut(|poly| {
            let mut acc = *v;
            for coef in poly.coefs.iter_mut() {
                *coef *= acc;
                acc *= shifter;
            }
        });
    }

    /// Undo the `v` part of [`Self::scale_for_coset`]; must run once per
    /// coset iteration so the vanishing values cancel per iteration rather
    /// than accumulate.
    pub fn unscale(&mut self, v: &F) -> Result<()> {
        let v_inv = v.inverse().ok_or(NumeratorError::DivisionByZero)?;
        self.each_mut(|poly| poly.mul_scalar_assign(&v_inv));
        Ok(())
    }

    /// Undo the accumulated shifter powers after the full coset loop:
    /// `correction = (prod shifters)^{-1}`.
    pub fn restore(&mut self, correction: &F) {
        self.each_mut(|poly| poly.mul_var_assign(correction));
    }
}

/// One-time correction of the shifted accumulator before the coset loop:
/// add to `zs` coefficient `i` the evaluation of `bz` one domain step
/// ahead, `bz(w^{(i+1) mod n})`. A cyclic shift is not expressible as an
/// elementwise vector operation, so this step runs on the host, scalar.
pub fn shifted_bz_correction<F: FftField>(
    zs: &mut FpPolynomial<F>,
    bz: &FpPolynomial<F>,
    twiddles: &[F],
) {
    let n = twiddles.len();
    for i in 0..n {
        let y = bz.eval(&twiddles[(i + 1) % n]);
        zs.add_coef_assign(&y, i);
    }
}
