use ark_ff::FftField;
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};

use crate::errors::{NumeratorError, Result};
use crate::polynomial::Layout;
use crate::utils::{bit_reverse, build_exp_table};

/// The base evaluation domain (circuit size `n`) together with its
/// `rho`-fold multiplicative extension.
///
/// The extended domain is walked as `rho` disjoint cosets of the base
/// domain: coset `i` is `g * w1^i * H`, where `g` is the field's
/// multiplicative generator, `w1` the extended-domain generator and `H` the
/// base domain.
#[derive(Clone, Debug)]
pub struct Domains<F: FftField> {
    pub base: Radix2EvaluationDomain<F>,
    pub extended: Radix2EvaluationDomain<F>,
    pub rho: usize,
}

impl<F: FftField> Domains<F> {
    /// Build the base domain of size `n` and the extended domain of size
    /// `rho * n`. Degenerate parameters are fatal and reported, not retried.
    pub fn new(n: usize, rho: usize) -> Result<Self> {
        if rho == 0 {
            return Err(NumeratorError::DomainSizeMismatch(n, 0));
        }
        let base =
            Radix2EvaluationDomain::<F>::new(n).ok_or(NumeratorError::GroupNotFound(n))?;
        let extended = Radix2EvaluationDomain::<F>::new(rho * n)
            .ok_or(NumeratorError::GroupNotFound(rho * n))?;
        if extended.size() != rho * base.size() {
            return Err(NumeratorError::DomainSizeMismatch(
                base.size(),
                extended.size(),
            ));
        }
        Ok(Domains {
            base,
            extended,
            rho,
        })
    }

    pub fn size(&self) -> usize {
        self.base.size()
    }

    /// Multiplicative generator factor of the extended coset walk, `cs` in
    /// the ordering constraint. Its square is `css`.
    pub fn coset_generator_factor(&self) -> F {
        F::GENERATOR
    }

    /// Coset table `[1, g, g^2, ...]`, length `n`: the Lagrange-coset
    /// evaluation nodes divided by the base domain, and the coefficient
    /// scaling vector for coset 0.
    pub fn coset_table(&self) -> Vec<F> {
        build_exp_table(&F::GENERATOR, self.size())
    }

    /// Bit-reversed twin of the coset table.
    pub fn coset_table_bitrev(&self) -> Vec<F> {
        let mut table = self.coset_table();
        bit_reverse(&mut table);
        table
    }

    /// The `rho` coset shifters: `shifters[0]` is the multiplicative
    /// generator factor, `shifters[1..]` the extended-domain generator.
    /// The running product after `i + 1` steps is the representative of
    /// coset `i`.
    pub fn shifters(&self) -> Vec<F> {
        let mut shifters = vec![self.extended.group_gen; self.rho];
        shifters[0] = F::GENERATOR;
        shifters
    }

    /// Per-coset coefficient scaling vector.
    ///
    /// Coset 0 reuses the canonical coset table; cosets >= 1 scale by the
    /// exponent table of the extended domain's own generator, on top of the
    /// scaling already carried by the buffers from the previous coset. The
    /// two regimes must not be mixed.
    pub fn scaling_vector(&self, coset_index: usize, layout: Layout) -> Vec<F> {
        let mut table = if coset_index == 0 {
            self.coset_table()
        } else {
            build_exp_table(&self.extended.group_gen, self.size())
        };
        if layout == Layout::BitReversed {
            bit_reverse(&mut table);
        }
        table
    }

    /// Powers of the base-domain generator, length `n`. A single-element
    /// domain yields the single unit twiddle.
    pub fn twiddles(&self) -> Vec<F> {
        if self.size() == 1 {
            return vec![F::one()];
        }
        build_exp_table(&self.base.group_gen, self.size())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ark_bn254::Fr;
    use ark_ff::{Field, One};

    #[test]
    fn test_shifters_walk_the_extended_domain() {
        let domains = Domains::<Fr>::new(8, 4).unwrap();
        let shifters = domains.shifters();
        assert_eq!(shifters.len(), 4);
        assert_eq!(shifters[0], Fr::GENERATOR);
        for s in &shifters[1..] {
            assert_eq!(*s, domains.extended.group_gen);
        }

        // the running products are g * w1^i, pairwise distinct cosets
        let mut coset = Fr::one();
        let mut reps = vec![];
        for s in &shifters {
            coset *= s;
            reps.push(coset);
        }
        // quotients of distinct representatives never land in the base domain
        for i in 0..reps.len() {
            for j in 0..i {
                let q = reps[i] * reps[j].inverse().unwrap();
                assert_ne!(q.pow([domains.size() as u64]), Fr::one());
            }
        }
    }

    #[test]
    fn test_scaling_vector_regimes() {
        let domains = Domains::<Fr>::new(4, 4).unwrap();
        let regime0 = domains.scaling_vector(0, Layout::Natural);
        assert_eq!(regime0, domains.coset_table());
        let regime1 = domains.scaling_vector(1, Layout::Natural);
        assert_eq!(regime1[1], domains.extended.group_gen);
        assert_eq!(regime1, domains.scaling_vector(3, Layout::Natural));

        let mut rev = regime0.clone();
        crate::utils::bit_reverse(&mut rev);
        assert_eq!(rev, domains.scaling_vector(0, Layout::BitReversed));
    }

    #[test]
    fn test_single_element_domain_twiddles() {
        let domains = Domains::<Fr>::new(1, 4).unwrap();
        assert_eq!(domains.twiddles(), vec![Fr::one()]);
        assert_eq!(domains.extended.size(), 4);
    }

    #[test]
    fn test_degenerate_parameters() {
        assert!(Domains::<Fr>::new(8, 0).is_err());
        // no power-of-two subgroup this large
        assert!(Domains::<Fr>::new(1 << 40, 4).is_err());
    }
}
