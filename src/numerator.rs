use ark_ff::FftField;
use ark_std::{end_timer, start_timer};
use std::sync::{Condvar, Mutex};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::backend::{TransformDirection, VectorBackend};
use crate::blinding::{shifted_bz_correction, BlindingPolys};
use crate::constraints::{evaluate_constraints, Arena, ChallengeVectors, Slot};
use crate::domain::Domains;
use crate::errors::{NumeratorError, Result};
use crate::polynomial::{Basis, FpPolynomial};
use crate::utils::build_exp_table;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GateState {
    Pending,
    Ready,
    Cancelled,
}

/// Single-fire readiness/cancellation gate. The computation blocks on
/// [`StartGate::wait`] until either the upstream public-input binding has
/// completed (`ready`) or the proof session is cancelled (`cancel`).
/// Firing a signal before the wait begins is not a missed wake: the state
/// is inspected under the lock before blocking.
pub struct StartGate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl StartGate {
    pub fn new() -> Self {
        StartGate {
            state: Mutex::new(GateState::Pending),
            cond: Condvar::new(),
        }
    }

    fn fire(&self, target: GateState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == GateState::Pending {
            *state = target;
            self.cond.notify_all();
        }
    }

    /// Signal that the selector bound to the public inputs is final.
    pub fn ready(&self) {
        self.fire(GateState::Ready);
    }

    /// Signal cooperative cancellation; only observed before the
    /// computation starts.
    pub fn cancel(&self) {
        self.fire(GateState::Cancelled);
    }

    /// Block until one of the two signals fires. Returns `true` on
    /// readiness, `false` on cancellation.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        while *state == GateState::Pending {
            state = self
                .cond
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
        *state == GateState::Ready
    }
}

impl Default for StartGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Fiat-Shamir challenges consumed by the numerator computation, opaque
/// outputs of the transcript collaborator.
#[derive(Clone, Copy, Debug)]
pub struct Challenges<F> {
    /// Constraint-family aggregation challenge.
    pub alpha: F,
    /// Permutation challenges.
    pub beta: F,
    pub gamma: F,
}

/// The proving session's polynomials, exclusively owned by the numerator
/// computation for its duration.
///
/// Every entry except `id` is expected in canonical coefficients or base
/// domain evaluations (normalized to canonical at upload); `id` is the
/// domain's natural enumeration in the evaluation basis and is never
/// transformed. On success all entries besides `id` are handed back in
/// canonical form, bit-identical to an entry that was canonical already.
#[derive(Clone, Debug)]
pub struct SessionPolys<F: FftField> {
    pub l: FpPolynomial<F>,
    pub r: FpPolynomial<F>,
    pub o: FpPolynomial<F>,
    pub z: FpPolynomial<F>,
    pub zs: FpPolynomial<F>,
    pub ql: FpPolynomial<F>,
    pub qr: FpPolynomial<F>,
    pub qm: FpPolynomial<F>,
    pub qo: FpPolynomial<F>,
    pub qk: FpPolynomial<F>,
    pub s1: FpPolynomial<F>,
    pub s2: FpPolynomial<F>,
    pub s3: FpPolynomial<F>,
    pub id: FpPolynomial<F>,
    pub l_one: FpPolynomial<F>,
    pub custom: Vec<(FpPolynomial<F>, FpPolynomial<F>)>,
}

impl<F: FftField> SessionPolys<F> {
    /// Slot-ordered views; fixed slots first, then the custom selector
    /// pairs flattened.
    fn slots(&self) -> Vec<&FpPolynomial<F>> {
        let mut slots = vec![
            &self.l, &self.r, &self.o, &self.z, &self.zs, &self.ql, &self.qr, &self.qm,
            &self.qo, &self.qk, &self.s1, &self.s2, &self.s3, &self.id, &self.l_one,
        ];
        for (qc, qci) in self.custom.iter() {
            slots.push(qc);
            slots.push(qci);
        }
        slots
    }

    fn slots_mut(&mut self) -> Vec<&mut FpPolynomial<F>> {
        let mut slots = vec![
            &mut self.l,
            &mut self.r,
            &mut self.o,
            &mut self.z,
            &mut self.zs,
            &mut self.ql,
            &mut self.qr,
            &mut self.qm,
            &mut self.qo,
            &mut self.qk,
            &mut self.s1,
            &mut self.s2,
            &mut self.s3,
            &mut self.id,
            &mut self.l_one,
        ];
        for (qc, qci) in self.custom.iter_mut() {
            slots.push(qc);
            slots.push(qci);
        }
        slots
    }
}

/// Upload one slot polynomial, zero-padded to the base domain size, and
/// normalize it to canonical coefficients. `id` is excluded by the caller.
fn upload_slot<F: FftField, B: VectorBackend<F>>(
    backend: &B,
    poly: &FpPolynomial<F>,
    n: usize,
    normalize: bool,
) -> Result<B::Buffer> {
    if poly.coefs.len() > n {
        return Err(NumeratorError::LengthMismatch(poly.coefs.len(), n));
    }
    let mut coefs = poly.coefs.clone();
    coefs.resize(n, F::zero());
    let mut buffer = backend.upload(&coefs)?;
    if normalize && poly.basis != Basis::Canonical {
        backend.transform_in_place(&mut buffer, TransformDirection::Inverse)?;
    }
    Ok(buffer)
}

fn broadcast_vector<F: FftField, B: VectorBackend<F>>(
    backend: &B,
    value: F,
    n: usize,
) -> Result<B::Buffer> {
    backend.upload(&vec![value; n])
}

/// Fold a blinding polynomial's (already scaled) coefficients modulo
/// `X^n - 1`, transform to the current coset's evaluations and add them
/// into the target wire/accumulator buffer. The returned evaluations are
/// kept so they can be removed again after constraint evaluation.
fn inject_blinding<F: FftField, B: VectorBackend<F>>(
    backend: &B,
    arena: &mut Arena<B::Buffer>,
    bp: &FpPolynomial<F>,
    slot: Slot,
    n: usize,
) -> Result<B::Buffer> {
    let mut folded = vec![F::zero(); n];
    for (j, coef) in bp.coefs.iter().enumerate() {
        folded[j % n] += coef;
    }
    let mut evals = backend.upload(&folded)?;
    backend.transform_in_place(&mut evals, TransformDirection::Forward)?;
    backend.add_assign(arena.get_mut(slot), &evals)?;
    Ok(evals)
}

/// Fan out the per-coset transform over every slot except `id`: inverse
/// transform back to (scaled) coefficients, apply the scaling vector, and
/// transform forward into the coset's evaluation form. The fan-out is
/// embarrassingly parallel; all tasks are joined before constraint
/// evaluation proceeds.
fn batch_transform<F: FftField, B: VectorBackend<F> + Sync>(
    backend: &B,
    arena: &mut Arena<B::Buffer>,
    scaling: &B::Buffer,
    skip_inverse: bool,
) -> Result<()> {
    let op = |(idx, buf): (usize, &mut B::Buffer)| -> Result<()> {
        if idx == Slot::Id.index() {
            return Ok(());
        }
        if !skip_inverse {
            backend.transform_in_place(buf, TransformDirection::Inverse)?;
        }
        backend.mul_assign(buf, scaling)?;
        backend.transform_in_place(buf, TransformDirection::Forward)
    };

    #[cfg(feature = "parallel")]
    arena.bufs.par_iter_mut().enumerate().try_for_each(op)?;
    #[cfg(not(feature = "parallel"))]
    arena.bufs.iter_mut().enumerate().try_for_each(op)?;

    backend.join()
}

/// Evaluate the aggregated constraint (numerator) polynomial over the
/// rho-fold extension of the base domain.
///
/// Blocks until `gate` reports readiness; a cancellation observed there
/// returns `Ok(None)` (a cooperative early exit, not a failure). Any
/// domain or backend error after that point is fatal: the session must be
/// discarded, as the blinding polynomials may be left in a scaled state.
///
/// On success the session polynomials are restored (canonical form,
/// original values) and the output carries the first base-domain's worth
/// of interleaved extended-domain samples in the Lagrange-coset basis.
pub fn compute_numerator<F: FftField, B: VectorBackend<F> + Sync>(
    domains: &Domains<F>,
    session: &mut SessionPolys<F>,
    blinding: &mut BlindingPolys<F>,
    challenges: &Challenges<F>,
    backend: &B,
    gate: &StartGate,
) -> Result<Option<FpPolynomial<F>>> {
    // WaitingForInput: the one blocking suspension point.
    let wait_timer = start_timer!(|| "Numerator::WaitingForInput");
    let ready = gate.wait();
    end_timer!(wait_timer);
    if !ready {
        return Ok(None);
    }

    let n = domains.size();
    let rho = domains.rho;
    let layout = backend.layout();

    // ExtendingDomain: coset tables, broadcast challenges, ZS correction.
    let extend_timer = start_timer!(|| "Numerator::ExtendingDomain");
    let mut scaling = backend.upload(&domains.scaling_vector(0, layout))?;
    let twiddles = domains.twiddles();
    shifted_bz_correction(&mut session.zs, &blinding.bz, &twiddles);

    let cs = domains.coset_generator_factor();
    let challenge_vectors = ChallengeVectors {
        alpha: broadcast_vector(backend, challenges.alpha, n)?,
        beta: broadcast_vector(backend, challenges.beta, n)?,
        gamma: broadcast_vector(backend, challenges.gamma, n)?,
        cs: broadcast_vector(backend, cs, n)?,
        css: broadcast_vector(backend, cs * cs, n)?,
        res: broadcast_vector(backend, F::one(), n)?,
    };

    let host_slots = session.slots();
    let host_lens: Vec<usize> = host_slots.iter().map(|p| p.coefs.len()).collect();
    let mut bufs = Vec::with_capacity(host_slots.len());
    for (idx, poly) in host_slots.iter().enumerate() {
        let normalize = idx != Slot::Id.index();
        bufs.push(upload_slot(backend, poly, n, normalize)?);
    }
    let mut arena = Arena::new(bufs);
    backend.join()?;
    end_timer!(extend_timer);

    // PerCosetLoop: strictly sequential, the running coset scalar and the
    // telescoping blinding scale carry across iterations.
    let loop_timer = start_timer!(|| "Numerator::PerCosetLoop");
    let shifters = domains.shifters();
    let mut coset = F::one();
    let mut out = vec![F::zero(); rho * n];

    for i in 0..rho {
        coset *= &shifters[i];
        let v = coset.pow([n as u64]) - F::one();

        blinding.scale_for_coset(&v, &shifters[i]);

        if i == 1 {
            // switch to the extended-domain-generator scaling regime
            scaling = backend.upload(&domains.scaling_vector(i, layout))?;
        }

        batch_transform(backend, &mut arena, &scaling, i == 0)?;

        let bl_evals = inject_blinding(backend, &mut arena, &blinding.bl, Slot::L, n)?;
        let br_evals = inject_blinding(backend, &mut arena, &blinding.br, Slot::R, n)?;
        let bo_evals = inject_blinding(backend, &mut arena, &blinding.bo, Slot::O, n)?;
        let bz_evals = inject_blinding(backend, &mut arena, &blinding.bz, Slot::Z, n)?;
        backend.join()?;

        let total = evaluate_constraints(backend, &arena, &challenge_vectors)?;
        backend.join()?;

        // remove the injected evaluations so later cosets do not double
        // count the blinding, pairing with the v / v^{-1} coefficient cycle
        backend.sub_assign(arena.get_mut(Slot::L), &bl_evals)?;
        backend.sub_assign(arena.get_mut(Slot::R), &br_evals)?;
        backend.sub_assign(arena.get_mut(Slot::O), &bo_evals)?;
        backend.sub_assign(arena.get_mut(Slot::Z), &bz_evals)?;

        blinding.unscale(&v)?;

        let total_host = backend.download(&total)?;
        if total_host.len() != n {
            return Err(NumeratorError::LengthMismatch(total_host.len(), n));
        }
        for (k, value) in total_host.iter().enumerate() {
            out[k * rho + i] = *value;
        }
    }
    end_timer!(loop_timer);

    // RestoringBasis: undo the accumulated coset scaling everywhere.
    let restore_timer = start_timer!(|| "Numerator::RestoringBasis");
    let mut shifter_product = F::one();
    for s in shifters.iter() {
        shifter_product *= s;
    }
    let correction = shifter_product
        .inverse()
        .ok_or(NumeratorError::DivisionByZero)?;
    let correction_powers = backend.upload(&build_exp_table(&correction, n))?;

    for (idx, buf) in arena.bufs.iter_mut().enumerate() {
        if idx == Slot::Id.index() {
            continue;
        }
        backend.transform_in_place(buf, TransformDirection::Inverse)?;
        backend.mul_assign(buf, &correction_powers)?;
    }
    backend.join()?;

    for (idx, poly) in session.slots_mut().into_iter().enumerate() {
        if idx == Slot::Id.index() {
            continue;
        }
        let mut coefs = backend.download(&arena.bufs[idx])?;
        coefs.truncate(host_lens[idx]);
        poly.coefs = coefs;
        poly.basis = Basis::Canonical;
    }

    blinding.restore(&correction);

    for value in out.iter_mut() {
        *value *= correction;
    }
    end_timer!(restore_timer);

    // Done: emit the numerator samples, ready for vanishing-polynomial
    // division by the caller.
    out.truncate(n);
    Ok(Some(FpPolynomial {
        coefs: out,
        basis: Basis::LagrangeCoset,
        layout,
    }))
}
