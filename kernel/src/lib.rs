//! Minnow Kernel Library
//!
//! This crate is the process-lifecycle core of the minnow teaching
//! kernel: the shared process table, the zombie/orphan state machine,
//! and the blocking wait/reap protocol.
//!
//! # Architecture
//!
//! - **Synchronization** (`sync`): spinlock mutex and condition
//!   variable; the pair guarding the process table is the only gate in
//!   this crate.
//! - **Process Management** (`process`): the table, the lifecycle
//!   protocol (register, terminate, orphan reparenting, wait-and-reap)
//!   and the global manager instance.
//! - **System Calls** (`syscalls`): the thin surface the trap handler
//!   binds to.
//!
//! Address-space handling, context switching and executable loading
//! live with the platform layers that embed this crate; they interact
//! with the table only through `process::register`,
//! `process::unregister` and `process::terminate`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

/// Hashing support for const-initialized hashbrown maps
pub mod compat;

/// Process management and lifecycle bookkeeping
pub mod process;

/// Synchronization primitives
pub mod sync;

/// System call interface
pub mod syscalls;
