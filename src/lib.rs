#![allow(clippy::needless_borrow)]

pub mod backend;
pub mod blinding;
pub mod constraints;
pub mod domain;
pub mod errors;
pub mod numerator;
pub mod polynomial;
pub mod utils;

pub use crate::backend::{CpuBackend, TransformDirection, VectorBackend};
pub use crate::blinding::BlindingPolys;
pub use crate::domain::Domains;
pub use crate::errors::NumeratorError;
pub use crate::numerator::{compute_numerator, Challenges, SessionPolys, StartGate};
pub use crate::polynomial::{Basis, FpPolynomial, Layout};
