use ark_ff::FftField;
use ark_std::rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// Basis a polynomial buffer is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Basis {
    /// Coefficients, low order first.
    Canonical,
    /// Evaluations over the base domain.
    Lagrange,
    /// Evaluations over a multiplicative coset of the base domain.
    LagrangeCoset,
}

/// Ordering of the buffer entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    Natural,
    BitReversed,
}

/// Field polynomial tagged with the basis and layout of its buffer.
///
/// Buffers are fixed width: no coefficient trimming is performed, so a
/// scale/unscale round trip restores the buffer bit for bit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpPolynomial<F> {
    /// Coefficients (or evaluations) of the polynomial.
    pub coefs: Vec<F>,
    pub basis: Basis,
    pub layout: Layout,
}

impl<F: FftField> FpPolynomial<F> {
    /// Build a polynomial from the coefficient vector, low-order coefficient first.
    /// # Example
    /// ```
    /// use plonk_numerator::polynomial::{Basis, FpPolynomial, Layout};
    /// use ark_bn254::Fr;
    /// use ark_ff::One;
    /// let poly = FpPolynomial::from_coefs(vec![Fr::one(), Fr::one()]);
    /// assert_eq!(poly.basis, Basis::Canonical);
    /// assert_eq!(poly.layout, Layout::Natural);
    /// assert_eq!(poly.degree(), 1);
    /// ```
    pub fn from_coefs(coefs: Vec<F>) -> Self {
        FpPolynomial {
            coefs,
            basis: Basis::Canonical,
            layout: Layout::Natural,
        }
    }

    /// Build a polynomial from its evaluations over the base domain,
    /// natural order.
    pub fn from_evals(evals: Vec<F>) -> Self {
        FpPolynomial {
            coefs: evals,
            basis: Basis::Lagrange,
            layout: Layout::Natural,
        }
    }

    /// The zero polynomial over a buffer of length `len`.
    pub fn zero(len: usize) -> Self {
        Self::from_coefs(vec![F::zero(); len])
    }

    /// A polynomial with `degree + 1` uniformly random coefficients.
    pub fn random<R: CryptoRng + RngCore>(prng: &mut R, degree: usize) -> Self {
        let coefs = (0..degree + 1).map(|_| F::rand(prng)).collect();
        Self::from_coefs(coefs)
    }

    /// Return the polynomial coefs reference.
    pub fn get_coefs_ref(&self) -> &[F] {
        self.coefs.as_slice()
    }

    pub fn degree(&self) -> usize {
        let mut d = self.coefs.len();
        while d > 1 && self.coefs[d - 1].is_zero() {
            d -= 1;
        }
        d - 1
    }

    /// Evaluate at a point, Horner form. Only meaningful in the canonical
    /// basis.
    pub fn eval(&self, point: &F) -> F {
        debug_assert_eq!(self.basis, Basis::Canonical);
        let mut result = F::zero();
        for coef in self.coefs.iter().rev() {
            result *= point;
            result += coef;
        }
        result
    }

    /// Add another polynomial to self. Basis and layout must match; callers
    /// are responsible for conversion.
    pub fn add_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.basis, other.basis);
        debug_assert_eq!(self.layout, other.layout);
        if self.coefs.len() < other.coefs.len() {
            self.coefs.resize(other.coefs.len(), F::zero());
        }
        for (self_coef, other_coef) in self.coefs.iter_mut().zip(other.coefs.iter()) {
            *self_coef += other_coef;
        }
    }

    /// Subtract another polynomial from self. Basis and layout must match.
    pub fn sub_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.basis, other.basis);
        debug_assert_eq!(self.layout, other.layout);
        if self.coefs.len() < other.coefs.len() {
            self.coefs.resize(other.coefs.len(), F::zero());
        }
        for (self_coef, other_coef) in self.coefs.iter_mut().zip(other.coefs.iter()) {
            *self_coef -= other_coef;
        }
    }

    /// Add `coef` to the coefficient of order `order`, growing the buffer if
    /// needed.
    pub fn add_coef_assign(&mut self, coef: &F, order: usize) {
        if self.coefs.len() <= order {
            self.coefs.resize(order + 1, F::zero());
        }
        self.coefs[order] += coef;
    }

    /// Multiply every coefficient by a constant scalar.
    pub fn mul_scalar_assign(&mut self, scalar: &F) {
        for coef in self.coefs.iter_mut() {
            *coef *= scalar;
        }
    }

    /// Multiply the polynomial variable by a scalar:
    /// `mul_var(\sum a_i X^i, b) = \sum a_i b^i X^i`.
    ///
    /// This is the coset scaling primitive: scaling by a coset
    /// representative `s` and transforming over the base domain yields the
    /// evaluations on the coset `s * H`.
    /// # Example
    /// ```
    /// use plonk_numerator::polynomial::FpPolynomial;
    /// use ark_bn254::Fr;
    /// use ark_ff::One;
    /// let two = Fr::one() + Fr::one();
    /// let mut poly = FpPolynomial::from_coefs(vec![Fr::one(), Fr::one(), Fr::one()]);
    /// poly.mul_var_assign(&two);
    /// assert_eq!(poly.coefs, vec![Fr::one(), two, two + two]);
    /// ```
    pub fn mul_var_assign(&mut self, scalar: &F) {
        let mut r = F::one();
        for coef in self.coefs.iter_mut() {
            *coef *= r;
            r *= scalar;
        }
    }

    /// Zero-pad the buffer to length `n`.
    pub fn pad_to(&mut self, n: usize) {
        if self.coefs.len() < n {
            self.coefs.resize(n, F::zero());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ark_bn254::Fr;
    use ark_ff::{One, Zero};
    use ark_std::rand::SeedableRng;
    use ark_std::UniformRand;
    use rand_chacha::ChaChaRng;

    #[test]
    fn test_eval() {
        let one = Fr::one();
        let two = one + one;
        let five = two + two + one;
        // 1 + X^2
        let poly = FpPolynomial::from_coefs(vec![one, Fr::zero(), one]);
        assert_eq!(poly.eval(&Fr::zero()), one);
        assert_eq!(poly.eval(&one), two);
        assert_eq!(poly.eval(&two), five);
    }

    #[test]
    fn test_mul_var_matches_shifted_eval() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let poly = FpPolynomial::<Fr>::random(&mut prng, 7);
        let shift = Fr::rand(&mut prng);
        let point = Fr::rand(&mut prng);

        let mut scaled = poly.clone();
        scaled.mul_var_assign(&shift);
        assert_eq!(scaled.eval(&point), poly.eval(&(shift * point)));
    }

    #[test]
    fn test_scale_unscale_bit_exact() {
        let mut prng = ChaChaRng::from_seed([7u8; 32]);
        let poly = FpPolynomial::<Fr>::random(&mut prng, 15);
        let shift = Fr::rand(&mut prng);
        let shift_inv = ark_ff::Field::inverse(&shift).unwrap();

        let mut scaled = poly.clone();
        scaled.mul_var_assign(&shift);
        scaled.mul_var_assign(&shift_inv);
        assert_eq!(scaled, poly);
    }

    #[test]
    fn test_add_sub_assign() {
        let one = Fr::one();
        let two = one + one;
        let mut a = FpPolynomial::from_coefs(vec![one, two]);
        let b = FpPolynomial::from_coefs(vec![two, one, one]);
        a.add_assign(&b);
        assert_eq!(a.coefs, vec![two + one, two + one, one]);
        a.sub_assign(&b);
        assert_eq!(a.coefs, vec![one, two, Fr::zero()]);
    }
}
