//! Process identifiers and the encoded wait-status word.
//!
//! The status word follows the classic POSIX layout: the low seven bits
//! carry the terminating signal (or the stop marker `0x7f`), bits 8..16
//! carry the exit or stop code. The kernel stores exactly one of these
//! words per terminated process; the decode helpers below are what the
//! userland wait wrappers are built from.

use static_assertions::const_assert_eq;

/// Process ID type
pub type Pid = usize;

/// Low bits of the status word: terminating signal, or `0x7f` when stopped.
const SIG_MASK: i32 = 0x7f;

/// Marker in the signal field meaning "stopped, not terminated".
const STOP_MARKER: i32 = 0x7f;

/// Exit/stop code field, bits 8..16.
const CODE_MASK: i32 = 0xff;
const CODE_SHIFT: u32 = 8;

// The two fields must not overlap.
const_assert_eq!(SIG_MASK & (CODE_MASK << CODE_SHIFT), 0);

/// How a process ended: the classification produced by the exit path
/// and consumed by a waiting parent.
///
/// Modeled as a tagged value rather than a raw status word so the exit
/// collaborator cannot hand the table a malformed encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDisposition {
    /// Normal exit with the given code (truncated to 8 bits).
    Exited(i32),
    /// Terminated by the given signal (truncated to 7 bits, must be non-zero).
    Signaled(i32),
    /// Stopped by the given signal.
    Stopped(i32),
}

impl ExitDisposition {
    /// Encode into the status word a parent retrieves through wait.
    pub const fn encode(self) -> i32 {
        match self {
            ExitDisposition::Exited(code) => (code & CODE_MASK) << CODE_SHIFT,
            ExitDisposition::Signaled(sig) => sig & SIG_MASK,
            ExitDisposition::Stopped(sig) => ((sig & CODE_MASK) << CODE_SHIFT) | STOP_MARKER,
        }
    }
}

/// Did the process exit normally?
#[inline]
pub const fn wifexited(status: i32) -> bool {
    (status & SIG_MASK) == 0
}

/// Exit code of a normally exited process.
#[inline]
pub const fn wexitstatus(status: i32) -> i32 {
    (status >> CODE_SHIFT) & CODE_MASK
}

/// Was the process terminated by a signal?
#[inline]
pub const fn wifsignaled(status: i32) -> bool {
    !wifexited(status) && !wifstopped(status)
}

/// Signal that terminated the process.
#[inline]
pub const fn wtermsig(status: i32) -> i32 {
    status & SIG_MASK
}

/// Was the process stopped rather than terminated?
#[inline]
pub const fn wifstopped(status: i32) -> bool {
    (status & SIG_MASK) == STOP_MARKER
}

/// Signal that stopped the process.
#[inline]
pub const fn wstopsig(status: i32) -> i32 {
    wexitstatus(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_survives_encoding() {
        let status = ExitDisposition::Exited(5).encode();
        assert!(wifexited(status));
        assert!(!wifsignaled(status));
        assert_eq!(wexitstatus(status), 5);
    }

    #[test]
    fn signal_and_stop_are_distinct() {
        let killed = ExitDisposition::Signaled(9).encode();
        assert!(wifsignaled(killed));
        assert!(!wifexited(killed));
        assert!(!wifstopped(killed));
        assert_eq!(wtermsig(killed), 9);

        let stopped = ExitDisposition::Stopped(17).encode();
        assert!(wifstopped(stopped));
        assert!(!wifexited(stopped));
        assert!(!wifsignaled(stopped));
        assert_eq!(wstopsig(stopped), 17);
    }

    #[test]
    fn exit_code_is_truncated_to_a_byte() {
        let status = ExitDisposition::Exited(0x1ff).encode();
        assert_eq!(wexitstatus(status), 0xff);
    }
}
