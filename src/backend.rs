use ark_ff::FftField;
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};

use crate::errors::{NumeratorError, Result};
use crate::polynomial::Layout;

/// Direction of a number-theoretic transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformDirection {
    /// Coefficients to evaluations.
    Forward,
    /// Evaluations to coefficients.
    Inverse,
}

/// Vector/NTT compute engine behind the numerator computation.
///
/// Buffers are opaque and possibly device resident. Transfers and
/// transforms may execute asynchronously relative to the caller; results
/// are only guaranteed visible after [`VectorBackend::join`] returns. A
/// pure-CPU engine makes every call synchronous and `join` a no-op, but
/// callers must still follow the submit-then-join contract so both kinds of
/// engine satisfy the same ordering guarantees.
///
/// Elementwise operations require equal-length buffers; any failure
/// reported by the engine is fatal to the whole computation.
pub trait VectorBackend<F: FftField> {
    type Buffer: Clone + Send + Sync;

    /// Transfer a host vector into an engine buffer.
    fn upload(&self, host: &[F]) -> Result<Self::Buffer>;

    /// Transfer an engine buffer back to the host.
    fn download(&self, buffer: &Self::Buffer) -> Result<Vec<F>>;

    fn add_assign(&self, acc: &mut Self::Buffer, other: &Self::Buffer) -> Result<()>;
    fn sub_assign(&self, acc: &mut Self::Buffer, other: &Self::Buffer) -> Result<()>;
    fn mul_assign(&self, acc: &mut Self::Buffer, other: &Self::Buffer) -> Result<()>;

    /// In-place transform of one base-domain-sized buffer.
    fn transform_in_place(
        &self,
        buffer: &mut Self::Buffer,
        direction: TransformDirection,
    ) -> Result<()>;

    /// Layout the engine's transforms produce.
    fn layout(&self) -> Layout;

    /// Wait for all previously submitted asynchronous work.
    fn join(&self) -> Result<()>;
}

/// In-memory batch engine over a fixed base domain. All calls complete
/// synchronously and transforms are in natural order.
#[derive(Clone, Debug)]
pub struct CpuBackend<F: FftField> {
    domain: Radix2EvaluationDomain<F>,
}

impl<F: FftField> CpuBackend<F> {
    pub fn new(domain: Radix2EvaluationDomain<F>) -> Self {
        CpuBackend { domain }
    }

    pub fn size(&self) -> usize {
        self.domain.size()
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.domain.size() {
            return Err(NumeratorError::BackendError(format!(
                "transform over buffer of length {} on a domain of size {}",
                len,
                self.domain.size()
            )));
        }
        Ok(())
    }
}

fn check_pair(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(NumeratorError::LengthMismatch(a, b));
    }
    Ok(())
}

impl<F: FftField> VectorBackend<F> for CpuBackend<F> {
    type Buffer = Vec<F>;

    fn upload(&self, host: &[F]) -> Result<Self::Buffer> {
        Ok(host.to_vec())
    }

    fn download(&self, buffer: &Self::Buffer) -> Result<Vec<F>> {
        Ok(buffer.clone())
    }

    fn add_assign(&self, acc: &mut Self::Buffer, other: &Self::Buffer) -> Result<()> {
        check_pair(acc.len(), other.len())?;
        for (a, b) in acc.iter_mut().zip(other.iter()) {
            *a += b;
        }
        Ok(())
    }

    fn sub_assign(&self, acc: &mut Self::Buffer, other: &Self::Buffer) -> Result<()> {
        check_pair(acc.len(), other.len())?;
        for (a, b) in acc.iter_mut().zip(other.iter()) {
            *a -= b;
        }
        Ok(())
    }

    fn mul_assign(&self, acc: &mut Self::Buffer, other: &Self::Buffer) -> Result<()> {
        check_pair(acc.len(), other.len())?;
        for (a, b) in acc.iter_mut().zip(other.iter()) {
            *a *= b;
        }
        Ok(())
    }

    fn transform_in_place(
        &self,
        buffer: &mut Self::Buffer,
        direction: TransformDirection,
    ) -> Result<()> {
        self.check_len(buffer.len())?;
        *buffer = match direction {
            TransformDirection::Forward => self.domain.fft(buffer),
            TransformDirection::Inverse => self.domain.ifft(buffer),
        };
        Ok(())
    }

    fn layout(&self) -> Layout {
        Layout::Natural
    }

    fn join(&self) -> Result<()> {
        Ok(())
    }
}

/// Evaluate a polynomial of degree up to `rho * n - 1` on the coset
/// `shift * H` of the size-`n` domain `H`, using a single size-`n`
/// transform: coefficient `j` is rescaled by `shift^j` and the rescaled
/// coefficients are folded modulo `X^n - shift^n`.
pub fn evaluate_on_coset<F: FftField>(
    coefs: &[F],
    domain: &Radix2EvaluationDomain<F>,
    shift: &F,
) -> Vec<F> {
    let n = domain.size();
    let mut folded = vec![F::zero(); n];
    let mut acc = F::one();
    for (j, coef) in coefs.iter().enumerate() {
        folded[j % n] += acc * coef;
        acc *= shift;
    }
    domain.fft(&folded)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::domain::Domains;
    use crate::polynomial::FpPolynomial;
    use ark_bn254::Fr;
    use ark_ff::One;
    use ark_std::rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    #[test]
    fn test_transform_round_trip() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let domains = Domains::<Fr>::new(16, 4).unwrap();
        let backend = CpuBackend::new(domains.base);

        let poly = FpPolynomial::<Fr>::random(&mut prng, 15);
        let mut buffer = backend.upload(&poly.coefs).unwrap();
        backend
            .transform_in_place(&mut buffer, TransformDirection::Forward)
            .unwrap();
        backend
            .transform_in_place(&mut buffer, TransformDirection::Inverse)
            .unwrap();
        backend.join().unwrap();
        assert_eq!(backend.download(&buffer).unwrap(), poly.coefs);
    }

    #[test]
    fn test_vector_ops_length_contract() {
        let domains = Domains::<Fr>::new(4, 4).unwrap();
        let backend = CpuBackend::new(domains.base);
        let mut a = vec![Fr::one(); 4];
        let b = vec![Fr::one(); 3];
        assert!(backend.add_assign(&mut a, &b).is_err());
        assert!(backend.transform_in_place(&mut vec![Fr::one(); 3], TransformDirection::Forward)
            .is_err());
    }

    /// Evaluating a random polynomial of degree < rho * n directly at an
    /// extended-domain point must equal the rescale + size-n transform
    /// result, for every coset.
    #[test]
    fn test_coset_decomposition_round_trip() {
        let mut prng = ChaChaRng::from_seed([1u8; 32]);
        let n = 8;
        let rho = 4;
        let domains = Domains::<Fr>::new(n, rho).unwrap();
        let poly = FpPolynomial::<Fr>::random(&mut prng, rho * n - 1);

        let twiddles = domains.twiddles();
        let shifters = domains.shifters();
        let mut coset = Fr::one();
        for shifter in shifters.iter() {
            coset *= shifter;
            let evals = evaluate_on_coset(&poly.coefs, &domains.base, &coset);
            for (k, eval) in evals.iter().enumerate() {
                assert_eq!(*eval, poly.eval(&(coset * twiddles[k])));
            }
        }
    }

    #[test]
    fn test_coset_decomposition_degenerate_domain() {
        let mut prng = ChaChaRng::from_seed([2u8; 32]);
        let domains = Domains::<Fr>::new(1, 4).unwrap();
        let poly = FpPolynomial::<Fr>::random(&mut prng, 3);
        let shift = domains.coset_generator_factor();
        let evals = evaluate_on_coset(&poly.coefs, &domains.base, &shift);
        assert_eq!(evals.len(), 1);
        assert_eq!(evals[0], poly.eval(&shift));
    }
}
