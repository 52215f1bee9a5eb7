//! Minnow API
//!
//! Core types shared between the minnow kernel and anything that embeds
//! or tests it: process identifiers, the encoded wait-status word, and
//! the kernel error taxonomy with its POSIX errno mapping.
//!
//! This crate is deliberately leaf-level: no allocation, no statics, no
//! synchronization. Kernel subsystems depend on it; it depends on
//! nothing but core.

#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod process;

pub use error::{KernelError, Result};
pub use process::{ExitDisposition, Pid};
