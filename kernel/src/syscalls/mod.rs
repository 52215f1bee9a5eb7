//! System call interface
//!
//! Implementations of the process-lifecycle system calls. The
//! platform's trap handler decodes the trap frame, resolves the caller
//! pid and user pointers, and calls through here; everything below
//! this layer works on plain Rust types.

mod process;

pub use process::{sys_exit, sys_getpid, sys_waitpid};
