use std::fmt;

pub(crate) type Result<T> = core::result::Result<T, NumeratorError>;

/// Errors surfaced by the numerator computation. Cancellation before the
/// computation starts is not an error and is reported by returning no result.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum NumeratorError {
    /// No multiplicative subgroup of the requested size exists.
    GroupNotFound(usize),
    /// The extended domain is not an exact multiple of the base domain.
    DomainSizeMismatch(usize, usize),
    /// Elementwise vector operation over buffers of different lengths.
    LengthMismatch(usize, usize),
    /// The vector/transform backend failed to execute a requested operation.
    BackendError(String),
    /// Division by zero.
    DivisionByZero,
}

impl fmt::Display for NumeratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumeratorError::GroupNotFound(n) => {
                write!(f, "no multiplicative subgroup of size {}", n)
            }
            NumeratorError::DomainSizeMismatch(base, extended) => {
                write!(
                    f,
                    "extended domain of size {} is not a multiple of the base domain of size {}",
                    extended, base
                )
            }
            NumeratorError::LengthMismatch(a, b) => {
                write!(f, "vector operation over lengths {} and {}", a, b)
            }
            NumeratorError::BackendError(msg) => write!(f, "backend error: {}", msg),
            NumeratorError::DivisionByZero => write!(f, "division by zero"),
        }
    }
}

impl std::error::Error for NumeratorError {}
