/// Error kinds produced by the color chain.
///
/// These mirror the propagation policy of the subsystem this crate
/// implements: allocation failures and out-of-range parameters are
/// reported to the caller (who is responsible for unwinding any
/// in-progress link construction), interrupts are surfaced only at
/// cooperative yield points, and `Internal` covers assertion-class
/// failures that are never silently swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DccError {
    /// A `Dcilut`, cache tier, or link allocation could not be satisfied.
    OutOfMemory,

    /// A parameter was outside its valid range (e.g. a `ContoneMask`
    /// value at or beyond the "clear" threshold).
    Range(&'static str),

    /// A user interrupt was observed at a cooperative yield point during
    /// recombine or preconvert.
    Interrupt,

    /// An invariant the design otherwise guards with assertions was
    /// violated; promoted to a normal error return rather than a panic
    /// so that callers outside of debug builds still get a result.
    Internal(&'static str),
}

impl std::fmt::Display for DccError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::Range(msg) => write!(f, "parameter out of range: {msg}"),
            Self::Interrupt => write!(f, "interrupted"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for DccError {}

pub type DccResult<T> = Result<T, DccError>;
