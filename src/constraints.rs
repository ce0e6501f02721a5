use ark_ff::FftField;
use serde::{Deserialize, Serialize};

use crate::backend::VectorBackend;
use crate::errors::Result;

/// Identifiers for the per-coset evaluation buffers. Custom-gate selector
/// pairs live past the fixed slots and are addressed through
/// [`Arena::custom_pair`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    L,
    R,
    O,
    Z,
    Zs,
    Ql,
    Qr,
    Qm,
    Qo,
    Qk,
    S1,
    S2,
    S3,
    Id,
    LOne,
}

pub const N_FIXED_SLOTS: usize = 15;

impl Slot {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Arena of per-polynomial buffers, one slot per session polynomial plus
/// `2 * k` trailing buffers for the custom selector pairs. Buffers are
/// exclusively owned by the computation for the loop's duration.
pub struct Arena<Buf> {
    pub bufs: Vec<Buf>,
}

impl<Buf> Arena<Buf> {
    pub fn new(bufs: Vec<Buf>) -> Self {
        assert!(bufs.len() >= N_FIXED_SLOTS);
        assert_eq!((bufs.len() - N_FIXED_SLOTS) % 2, 0);
        Arena { bufs }
    }

    pub fn get(&self, slot: Slot) -> &Buf {
        &self.bufs[slot.index()]
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut Buf {
        &mut self.bufs[slot.index()]
    }

    pub fn n_custom_pairs(&self) -> usize {
        (self.bufs.len() - N_FIXED_SLOTS) / 2
    }

    pub fn custom_pair(&self, k: usize) -> (&Buf, &Buf) {
        let base = N_FIXED_SLOTS + 2 * k;
        (&self.bufs[base], &self.bufs[base + 1])
    }
}

/// Challenge scalars broadcast to base-domain length, resident on the
/// compute engine. `cs` is the extended-domain multiplicative generator
/// factor and `css` its square; `res` is the expected grand-product result.
pub struct ChallengeVectors<Buf> {
    pub alpha: Buf,
    pub beta: Buf,
    pub gamma: Buf,
    pub cs: Buf,
    pub css: Buf,
    pub res: Buf,
}

/// Gate constraint
/// `Ql*L + Qr*R + Qm*L*R + Qo*O + Qk + sum_k Qc_k*Qci_k`.
pub fn gate_constraint<F: FftField, B: VectorBackend<F>>(
    backend: &B,
    arena: &Arena<B::Buffer>,
) -> Result<B::Buffer> {
    let mut ic = arena.get(Slot::Ql).clone();
    backend.mul_assign(&mut ic, arena.get(Slot::L))?;

    let mut tmp = arena.get(Slot::Qr).clone();
    backend.mul_assign(&mut tmp, arena.get(Slot::R))?;
    backend.add_assign(&mut ic, &tmp)?;

    let mut tmp = arena.get(Slot::Qm).clone();
    backend.mul_assign(&mut tmp, arena.get(Slot::L))?;
    backend.mul_assign(&mut tmp, arena.get(Slot::R))?;
    backend.add_assign(&mut ic, &tmp)?;

    let mut tmp = arena.get(Slot::Qo).clone();
    backend.mul_assign(&mut tmp, arena.get(Slot::O))?;
    backend.add_assign(&mut ic, &tmp)?;

    backend.add_assign(&mut ic, arena.get(Slot::Qk))?;

    for k in 0..arena.n_custom_pairs() {
        let (qc, qci) = arena.custom_pair(k);
        let mut tmp = qc.clone();
        backend.mul_assign(&mut tmp, qci)?;
        backend.add_assign(&mut ic, &tmp)?;
    }

    Ok(ic)
}

/// Copy/permutation constraint
/// `(L+b*ID+g)(R+b*cs*ID+g)(O+b*css*ID+g)*Z - (L+b*S1+g)(R+b*S2+g)(O+b*S3+g)*ZS`,
/// checking the identity-permutation accumulator against the accumulator
/// shifted one domain step ahead and built from the circuit's wiring.
pub fn ordering_constraint<F: FftField, B: VectorBackend<F>>(
    backend: &B,
    arena: &Arena<B::Buffer>,
    challenges: &ChallengeVectors<B::Buffer>,
) -> Result<B::Buffer> {
    let factor = |column: Slot, id_scale: Option<&B::Buffer>| -> Result<B::Buffer> {
        let mut f = arena.get(Slot::Id).clone();
        if let Some(scale) = id_scale {
            backend.mul_assign(&mut f, scale)?;
        }
        backend.mul_assign(&mut f, &challenges.beta)?;
        backend.add_assign(&mut f, arena.get(column))?;
        backend.add_assign(&mut f, &challenges.gamma)?;
        Ok(f)
    };

    let mut identity_side = factor(Slot::L, None)?;
    let b = factor(Slot::R, Some(&challenges.cs))?;
    let c = factor(Slot::O, Some(&challenges.css))?;
    backend.mul_assign(&mut identity_side, &b)?;
    backend.mul_assign(&mut identity_side, &c)?;
    backend.mul_assign(&mut identity_side, arena.get(Slot::Z))?;

    let sigma_factor = |column: Slot, sigma: Slot| -> Result<B::Buffer> {
        let mut f = arena.get(sigma).clone();
        backend.mul_assign(&mut f, &challenges.beta)?;
        backend.add_assign(&mut f, arena.get(column))?;
        backend.add_assign(&mut f, &challenges.gamma)?;
        Ok(f)
    };

    let mut sigma_side = sigma_factor(Slot::L, Slot::S1)?;
    let b = sigma_factor(Slot::R, Slot::S2)?;
    let c = sigma_factor(Slot::O, Slot::S3)?;
    backend.mul_assign(&mut sigma_side, &b)?;
    backend.mul_assign(&mut sigma_side, &c)?;
    backend.mul_assign(&mut sigma_side, arena.get(Slot::Zs))?;

    backend.sub_assign(&mut identity_side, &sigma_side)?;
    Ok(identity_side)
}

/// Ratio constraint `(Z - res) * LOne`: the accumulator must open to `res`
/// at the first domain point.
pub fn ratio_constraint<F: FftField, B: VectorBackend<F>>(
    backend: &B,
    arena: &Arena<B::Buffer>,
    challenges: &ChallengeVectors<B::Buffer>,
) -> Result<B::Buffer> {
    let mut res = arena.get(Slot::Z).clone();
    backend.sub_assign(&mut res, &challenges.res)?;
    backend.mul_assign(&mut res, arena.get(Slot::LOne))?;
    Ok(res)
}

/// Fold the three constraint families in Horner form:
/// `total = gate + alpha * (ordering + alpha * ratio)`.
pub fn fold_constraints<F: FftField, B: VectorBackend<F>>(
    backend: &B,
    gate: &B::Buffer,
    ordering: &B::Buffer,
    ratio: B::Buffer,
    alpha: &B::Buffer,
) -> Result<B::Buffer> {
    let mut total = ratio;
    backend.mul_assign(&mut total, alpha)?;
    backend.add_assign(&mut total, ordering)?;
    backend.mul_assign(&mut total, alpha)?;
    backend.add_assign(&mut total, gate)?;
    Ok(total)
}

/// Evaluate and aggregate all three constraint families for one coset.
pub fn evaluate_constraints<F: FftField, B: VectorBackend<F>>(
    backend: &B,
    arena: &Arena<B::Buffer>,
    challenges: &ChallengeVectors<B::Buffer>,
) -> Result<B::Buffer> {
    let gate = gate_constraint(backend, arena)?;
    let ordering = ordering_constraint(backend, arena, challenges)?;
    let ratio = ratio_constraint(backend, arena, challenges)?;
    fold_constraints(backend, &gate, &ordering, ratio, &challenges.alpha)
}
