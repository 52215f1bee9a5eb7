//! Process management
//!
//! The process table and the lifecycle protocol around it: creation
//! registers an entry, termination turns it into a zombie (or drops it
//! outright when orphaned), and a waiting parent reaps it exactly once.
//! All of it is serialized by one table-wide gate; see [`manager`].

pub mod manager;

pub use manager::{
    NPROC, Parent, ProcInfo, ProcManager, ProcState, init, proc_count, register, terminate,
    unregister, wait,
};
