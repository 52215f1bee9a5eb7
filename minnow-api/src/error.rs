//! Error handling for the minnow kernel.
//!
//! Every recoverable failure in the process subsystem is one of the
//! variants below, returned synchronously to the immediate caller.
//! Nothing here is retried automatically; retry policy belongs to the
//! caller. Invariant violations (a lookup that cannot fail by
//! construction failing anyway) are not represented: those panic the
//! responsible subsystem instead of pretending to be recoverable.

use core::fmt;

/// POSIX errno values surfaced at the system-call boundary.
pub mod errno {
    /// No such process
    pub const ESRCH: i32 = 3;
    /// Resource temporarily unavailable
    pub const EAGAIN: i32 = 11;
    /// Invalid argument
    pub const EINVAL: i32 = 22;
}

/// Represents a kernel error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// The process table has no free slot
    OutOfProcesses,
    /// Malformed argument (e.g. non-zero wait options)
    InvalidArgument,
    /// Unknown or already-reaped process
    NoSuchProcess,
    /// Target exists but the caller is not its parent
    NotMyChild,
}

impl KernelError {
    /// The errno reported at the system-call boundary.
    ///
    /// `NotMyChild` maps to the same code as `NoSuchProcess`: a caller
    /// that is not the parent must not be able to distinguish a live
    /// foreign process from one that never existed.
    pub const fn errno(self) -> i32 {
        match self {
            KernelError::OutOfProcesses => errno::EAGAIN,
            KernelError::InvalidArgument => errno::EINVAL,
            KernelError::NoSuchProcess => errno::ESRCH,
            KernelError::NotMyChild => errno::ESRCH,
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::OutOfProcesses => write!(f, "Process table full"),
            KernelError::InvalidArgument => write!(f, "Invalid argument"),
            KernelError::NoSuchProcess => write!(f, "No such process"),
            KernelError::NotMyChild => write!(f, "No such process"),
        }
    }
}

/// Result type for operations that can fail
pub type Result<T> = core::result::Result<T, KernelError>;
