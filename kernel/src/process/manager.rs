//! Core Process Management
//!
//! This module provides the process table and the lifecycle protocol
//! around it:
//! - registration of new processes (fork-time bookkeeping)
//! - the zombie transition at termination
//! - orphan reparenting and cleanup
//! - blocking wait-and-reap by the parent
//!
//! Everything is serialized by a single gate: one [`Mutex`] owning the
//! table plus one [`CondVar`] signalled on every zombie transition. No
//! entry field is read or written without holding that mutex, and the
//! only suspension point is inside [`ProcManager::wait`]. An entry
//! leaves the table through exactly one of three paths - orphaned
//! self-removal at termination, the orphan sweep of a dying parent, or
//! a parent's reap - and all three funnel through one removal routine.

extern crate alloc;

use alloc::vec::Vec;
use hashbrown::HashMap;
use spin::Once;
use static_assertions::const_assert;

use crate::compat::DefaultHasherBuilder;
use crate::sync::{CondVar, Mutex};
use minnow_api::{ExitDisposition, KernelError, Pid, Result};

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of processes
pub const NPROC: usize = 64;

const_assert!(NPROC >= 2);

// ============================================================================
// Types
// ============================================================================

/// Parent link of a table entry.
///
/// A tagged state instead of a sentinel pid, so a missed case fails to
/// compile rather than comparing against a magic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Created by the given process, which may still wait for this entry
    Proc(Pid),
    /// No parent will ever wait for this entry
    Orphan,
}

/// Process state
///
/// Transitions are monotonic: `Running -> Zombie` exactly once, never
/// back. `Unused` is slot bookkeeping only and is never reachable
/// through the pid index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    Unused,
    Running,
    Zombie,
}

/// Process control block
#[derive(Debug, Clone, Copy)]
struct Proc {
    pid: Pid,
    parent: Parent,
    state: ProcState,
    /// Encoded exit disposition; meaningful only once `state` is `Zombie`
    xstate: i32,
}

impl Proc {
    const UNUSED: Proc = Proc {
        pid: 0,
        parent: Parent::Orphan,
        state: ProcState::Unused,
        xstate: 0,
    };
}

/// Point-in-time view of one table entry, taken under the table lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcInfo {
    pub pid: Pid,
    pub parent: Parent,
    pub state: ProcState,
}

// ============================================================================
// Process Table
// ============================================================================

/// Process table with O(1) average-case PID lookup
///
/// Slots come from a fixed pool; exhaustion of the pool is the
/// `OutOfProcesses` failure mode of registration. A pid is present in
/// `pid_to_index` iff its entry is live, which makes that map the
/// ledger for the removed-exactly-once invariant.
struct ProcTable {
    procs: [Proc; NPROC],
    next_pid: Pid,
    pid_to_index: HashMap<Pid, usize, DefaultHasherBuilder>,
    /// O(children) orphan sweep instead of a full-table scan.
    /// Orphaned entries are indexed under no parent.
    parent_to_children: HashMap<Pid, Vec<Pid>, DefaultHasherBuilder>,
    free_list: Vec<usize>,
    seeded: bool,
}

impl ProcTable {
    /// Create a new process table for static initialization
    const fn const_new() -> Self {
        Self {
            procs: [Proc::UNUSED; NPROC],
            next_pid: 1,
            pid_to_index: HashMap::with_hasher(DefaultHasherBuilder),
            parent_to_children: HashMap::with_hasher(DefaultHasherBuilder),
            free_list: Vec::new(),
            seeded: false,
        }
    }

    /// Number of live entries
    fn len(&self) -> usize {
        self.pid_to_index.len()
    }

    /// Allocate a fresh entry - O(1) with free list
    ///
    /// All-or-nothing: on a full table nothing is mutated.
    fn alloc(&mut self, parent: Parent) -> Option<Pid> {
        if !self.seeded {
            // Seed the free list on first use; const_new cannot build
            // a populated Vec.
            for idx in (0..NPROC).rev() {
                self.free_list.push(idx);
            }
            self.seeded = true;
        }

        let idx = self.free_list.pop()?;
        debug_assert_eq!(self.procs[idx].state, ProcState::Unused);

        // Pids increase monotonically and are never reused.
        let pid = self.next_pid;
        self.next_pid += 1;

        self.procs[idx] = Proc {
            pid,
            parent,
            state: ProcState::Running,
            xstate: 0,
        };
        self.pid_to_index.insert(pid, idx);
        if let Parent::Proc(ppid) = parent {
            self.parent_to_children.entry(ppid).or_default().push(pid);
        }
        Some(pid)
    }

    /// Find entry by PID - O(1) average-case
    fn find(&mut self, pid: Pid) -> Option<&mut Proc> {
        let idx = *self.pid_to_index.get(&pid)?;
        Some(&mut self.procs[idx])
    }

    /// Find entry by PID (immutable) - O(1) average-case
    fn find_ref(&self, pid: Pid) -> Option<&Proc> {
        let idx = *self.pid_to_index.get(&pid)?;
        Some(&self.procs[idx])
    }

    /// Remove child from parent's children list
    fn remove_child_from_parent(&mut self, parent_pid: Pid, child_pid: Pid) {
        if let Some(children) = self.parent_to_children.get_mut(&parent_pid) {
            children.retain(|&pid| pid != child_pid);
            // Drop empty parent entries to keep the index small
            if children.is_empty() {
                self.parent_to_children.remove(&parent_pid);
            }
        }
    }

    /// Detach and return the children list of a dying process
    fn take_children(&mut self, pid: Pid) -> Option<Vec<Pid>> {
        self.parent_to_children.remove(&pid)
    }

    /// Remove and free one entry.
    ///
    /// The single removal point for all three removal paths; callers
    /// have already looked the pid up under the same critical section.
    fn free(&mut self, pid: Pid) {
        let Some(idx) = self.pid_to_index.remove(&pid) else {
            return;
        };
        if let Parent::Proc(ppid) = self.procs[idx].parent {
            self.remove_child_from_parent(ppid, pid);
        }
        self.procs[idx] = Proc::UNUSED;
        self.free_list.push(idx);
    }
}

// ============================================================================
// Lifecycle Protocol
// ============================================================================

/// The process-lifecycle manager: the table plus its gate.
///
/// The kernel proper uses the [`struct@PROC`] singleton through the
/// free functions below; tests construct private instances.
pub struct ProcManager {
    table: Mutex<ProcTable>,
    /// Signalled (broadcast) on every zombie transition
    exited: CondVar,
}

impl ProcManager {
    /// Create an empty manager
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(ProcTable::const_new()),
            exited: CondVar::new(),
        }
    }

    /// Register a newly created process and return its pid.
    ///
    /// Fails with `OutOfProcesses` when the table is full; nothing is
    /// mutated on that path, so the caller can simply abort creation.
    pub fn register(&self, parent: Parent) -> Result<Pid> {
        let mut table = self.table.lock();
        match table.alloc(parent) {
            Some(pid) => {
                log::trace!("process: registered pid {pid} (parent {parent:?})");
                Ok(pid)
            }
            None => Err(KernelError::OutOfProcesses),
        }
    }

    /// Back out a registration whose creation protocol failed later on.
    ///
    /// The creating subsystem must call this before reporting its own
    /// error; otherwise the half-created process sits in the table as a
    /// running entry nobody can ever terminate or reap.
    pub fn unregister(&self, pid: Pid) -> Result<()> {
        let mut table = self.table.lock();
        if table.find_ref(pid).is_none() {
            return Err(KernelError::NoSuchProcess);
        }
        table.free(pid);
        log::warn!("process: creation backed out, pid {pid} unregistered");
        Ok(())
    }

    /// Record the termination of `pid`.
    ///
    /// Called exactly once per process, after its execution context and
    /// other resources are gone. An orphaned process removes itself on
    /// the spot; one with a live parent becomes a zombie and wakes all
    /// waiters. Either way its children are reparented in the same
    /// critical section, so no wait call can observe a child pointing
    /// at a parent that is no longer in the table.
    ///
    /// # Panics
    ///
    /// Panics if `pid` has no table entry. Registration and termination
    /// are paired by construction, so a miss here is corrupted kernel
    /// state, not a recoverable condition.
    pub fn terminate(&self, pid: Pid, disposition: ExitDisposition) {
        let mut table = self.table.lock();
        let (parent, state) = match table.find_ref(pid) {
            Some(entry) => (entry.parent, entry.state),
            None => panic!("terminate: pid {pid} has no table entry"),
        };
        debug_assert_eq!(state, ProcState::Running, "terminate: pid {pid} ended twice");

        match parent {
            Parent::Orphan => {
                // No parent will ever wait for this entry; drop it now.
                table.free(pid);
                reparent_children(&mut table, pid);
                log::debug!("process: orphan pid {pid} exited, entry dropped");
            }
            Parent::Proc(_) => {
                let status = disposition.encode();
                if let Some(entry) = table.find(pid) {
                    entry.xstate = status;
                    entry.state = ProcState::Zombie;
                }
                reparent_children(&mut table, pid);
                // Status write and wakeup share one critical section:
                // no waiter can see the zombie without being woken.
                // Broadcast, not single-wake: distinct parents block on
                // distinct children through this one condition variable.
                self.exited.broadcast();
                log::debug!("process: pid {pid} zombied (status {status:#x})");
            }
        }
    }

    /// Block until `target` terminates, then reap it.
    ///
    /// Validation order: entry absent gives `NoSuchProcess`; caller is
    /// not the parent gives `NotMyChild` (externally identical to the
    /// former). Only a valid call blocks. After every wakeup the target
    /// is revalidated from scratch, because the broadcast wakes every
    /// waiter on every child and a sibling waiter may have reaped the
    /// entry first.
    pub fn wait(&self, caller: Pid, target: Pid) -> Result<i32> {
        let mut table = self.table.lock();
        loop {
            let (parent, state, xstate) = match table.find_ref(target) {
                Some(entry) => (entry.parent, entry.state, entry.xstate),
                None => return Err(KernelError::NoSuchProcess),
            };
            if parent != Parent::Proc(caller) {
                return Err(KernelError::NotMyChild);
            }
            match state {
                ProcState::Running => {
                    table = self.exited.wait(table);
                }
                ProcState::Zombie => {
                    table.free(target);
                    log::debug!("process: pid {caller} reaped pid {target} (status {xstate:#x})");
                    return Ok(xstate);
                }
                ProcState::Unused => unreachable!("pid {target} indexed but slot unused"),
            }
        }
    }

    /// Snapshot one entry, or `None` if the pid is not live
    pub fn inspect(&self, pid: Pid) -> Option<ProcInfo> {
        let table = self.table.lock();
        table.find_ref(pid).map(|entry| ProcInfo {
            pid: entry.pid,
            parent: entry.parent,
            state: entry.state,
        })
    }

    /// Number of live entries
    pub fn proc_count(&self) -> usize {
        self.table.lock().len()
    }
}

impl Default for ProcManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Detach every child of a terminating process.
///
/// Runs inside the terminating process's critical section so no wait
/// call can observe a stale parent link between termination and
/// reparenting. Zombie children have no possible waiter left and are
/// dropped on the spot; running children self-remove when they
/// eventually terminate.
fn reparent_children(table: &mut ProcTable, dead_pid: Pid) {
    let Some(children) = table.take_children(dead_pid) else {
        return;
    };
    for child in children {
        let state = match table.find(child) {
            Some(entry) => {
                entry.parent = Parent::Orphan;
                entry.state
            }
            None => unreachable!("child {child} of pid {dead_pid} missing from table"),
        };
        if state == ProcState::Zombie {
            table.free(child);
            log::trace!("process: dropped orphaned zombie pid {child}");
        }
    }
}

// ============================================================================
// Global State
// ============================================================================

/// Global process manager
pub static PROC: ProcManager = ProcManager::new();

static ROOT: Once<Pid> = Once::new();

/// Initialize the process subsystem: registers the root process.
///
/// The root has no parent that could wait for it, so it registers as
/// an orphan and its own exit takes the immediate-removal path like
/// any other orphan. Safe to call more than once; later calls return
/// the same pid.
pub fn init() -> Pid {
    *ROOT.call_once(|| {
        let pid = PROC
            .register(Parent::Orphan)
            .expect("boot: process table full before the first process");
        log::info!("process: root process created (pid={pid})");
        pid
    })
}

// ============================================================================
// Public API
// ============================================================================

/// Register a new process in the global table
pub fn register(parent: Parent) -> Result<Pid> {
    PROC.register(parent)
}

/// Back out a failed creation in the global table
pub fn unregister(pid: Pid) -> Result<()> {
    PROC.unregister(pid)
}

/// Record a termination in the global table
pub fn terminate(pid: Pid, disposition: ExitDisposition) {
    PROC.terminate(pid, disposition)
}

/// Wait for and reap a child in the global table
pub fn wait(caller: Pid, target: Pid) -> Result<i32> {
    PROC.wait(caller, target)
}

/// Number of live entries in the global table
pub fn proc_count() -> usize {
    PROC.proc_count()
}
