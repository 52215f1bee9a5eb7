//! Process management system calls
//!
//! The thin layer the trap handler binds to. Argument validation
//! happens here, before the process table's gate is ever touched; the
//! lifecycle semantics live in [`crate::process`].

use minnow_api::{ExitDisposition, KernelError, Pid, Result};

use crate::process;

/// exit system call: record the caller's termination.
///
/// The trap layer has already torn down the address space and context;
/// this is the final bookkeeping step and cannot fail.
pub fn sys_exit(caller: Pid, code: i32) {
    process::terminate(caller, ExitDisposition::Exited(code));
}

/// waitpid system call: block until `target` exits, then reap it.
///
/// `options` must be zero; anything else is rejected before the table
/// lock is taken, so an invalid call never blocks and never learns
/// whether `target` exists. On success the raw status word is stored
/// through `status_out` and the reaped pid is returned.
pub fn sys_waitpid(caller: Pid, target: Pid, status_out: &mut i32, options: i32) -> Result<Pid> {
    if options != 0 {
        return Err(KernelError::InvalidArgument);
    }
    let status = process::wait(caller, target)?;
    *status_out = status;
    Ok(target)
}

/// getpid system call: the caller's own identifier.
///
/// The identity comes from the trap context, not the table, so this
/// never takes the lock and never fails.
pub fn sys_getpid(caller: Pid) -> Pid {
    caller
}
