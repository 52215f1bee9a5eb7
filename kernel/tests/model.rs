//! Model-based tests for the process table.
//!
//! Randomized register/terminate/reap sequences run against both a
//! real `ProcManager` and a naive in-memory model, checking after each
//! step that live pids, parent links and zombie statuses agree. Waits
//! are only issued where the model proves they cannot block, so the
//! whole exercise stays single-threaded and deterministic.

use proptest::prelude::*;

use kernel::process::{NPROC, Parent, ProcManager, ProcState};
use minnow_api::{ExitDisposition, KernelError, Pid};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ModelState {
    Running,
    Zombie(i32),
}

#[derive(Debug, Clone, Copy)]
struct ModelEntry {
    pid: Pid,
    parent: Option<Pid>,
    state: ModelState,
}

/// The naive reference: a flat list with the same lifecycle rules.
#[derive(Debug, Default)]
struct Model {
    entries: Vec<ModelEntry>,
}

impl Model {
    fn running(&self) -> Vec<Pid> {
        self.entries
            .iter()
            .filter(|entry| entry.state == ModelState::Running)
            .map(|entry| entry.pid)
            .collect()
    }

    /// Zombies whose parent is still live, i.e. reapable right now.
    fn reapable(&self) -> Vec<(Pid, Pid, i32)> {
        self.entries
            .iter()
            .filter_map(|entry| match (entry.parent, entry.state) {
                (Some(parent), ModelState::Zombie(code)) => Some((parent, entry.pid, code)),
                _ => None,
            })
            .collect()
    }

    fn register(&mut self, pid: Pid, parent: Option<Pid>) {
        self.entries.push(ModelEntry {
            pid,
            parent,
            state: ModelState::Running,
        });
    }

    fn terminate(&mut self, pid: Pid, code: i32) {
        // Orphan the children; zombie children lose their last
        // possible waiter and disappear.
        for entry in &mut self.entries {
            if entry.parent == Some(pid) {
                entry.parent = None;
            }
        }
        self.entries.retain(|entry| {
            !(entry.parent.is_none() && matches!(entry.state, ModelState::Zombie(_)))
        });

        let idx = self
            .entries
            .iter()
            .position(|entry| entry.pid == pid)
            .expect("model: terminate of unknown pid");
        if self.entries[idx].parent.is_none() {
            self.entries.remove(idx);
        } else {
            self.entries[idx].state = ModelState::Zombie(code);
        }
    }

    fn reap(&mut self, pid: Pid) {
        self.entries.retain(|entry| entry.pid != pid);
    }
}

/// One randomized step; indices are reduced modulo whatever pool the
/// interpreter picks from.
#[derive(Debug, Clone, Copy)]
enum Op {
    Register { parent_choice: usize, orphan: bool },
    Terminate { victim_choice: usize, code: i32 },
    Reap { zombie_choice: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), any::<bool>())
            .prop_map(|(parent_choice, orphan)| Op::Register { parent_choice, orphan }),
        (any::<usize>(), 0..256i32)
            .prop_map(|(victim_choice, code)| Op::Terminate { victim_choice, code }),
        any::<usize>().prop_map(|zombie_choice| Op::Reap { zombie_choice }),
    ]
}

fn check_agreement(manager: &ProcManager, model: &Model) {
    assert_eq!(manager.proc_count(), model.entries.len());
    for entry in &model.entries {
        let info = manager
            .inspect(entry.pid)
            .unwrap_or_else(|| panic!("pid {} live in model, gone in table", entry.pid));
        match entry.parent {
            Some(parent) => assert_eq!(info.parent, Parent::Proc(parent)),
            None => assert_eq!(info.parent, Parent::Orphan),
        }
        match entry.state {
            ModelState::Running => assert_eq!(info.state, ProcState::Running),
            ModelState::Zombie(_) => assert_eq!(info.state, ProcState::Zombie),
        }
    }
}

proptest! {
    #[test]
    fn random_lifecycles_match_the_model(ops in proptest::collection::vec(op_strategy(), 1..120)) {
        let manager = ProcManager::new();
        let mut model = Model::default();
        let mut last_pid = 0;

        for op in ops {
            match op {
                Op::Register { parent_choice, orphan } => {
                    let running = model.running();
                    let parent = if orphan || running.is_empty() {
                        None
                    } else {
                        Some(running[parent_choice % running.len()])
                    };
                    let link = match parent {
                        Some(pid) => Parent::Proc(pid),
                        None => Parent::Orphan,
                    };
                    match manager.register(link) {
                        Ok(pid) => {
                            // Pids are unique and strictly increasing.
                            prop_assert!(pid > last_pid);
                            last_pid = pid;
                            model.register(pid, parent);
                        }
                        Err(err) => {
                            prop_assert_eq!(err, KernelError::OutOfProcesses);
                            prop_assert_eq!(model.entries.len(), NPROC);
                        }
                    }
                }
                Op::Terminate { victim_choice, code } => {
                    let running = model.running();
                    if running.is_empty() {
                        continue;
                    }
                    let victim = running[victim_choice % running.len()];
                    manager.terminate(victim, ExitDisposition::Exited(code));
                    model.terminate(victim, code);
                }
                Op::Reap { zombie_choice } => {
                    let reapable = model.reapable();
                    if reapable.is_empty() {
                        // Nothing can be reaped; a wait on a long-gone
                        // pid must fail without blocking.
                        prop_assert_eq!(
                            manager.wait(1, last_pid + 1),
                            Err(KernelError::NoSuchProcess)
                        );
                        continue;
                    }
                    let (parent, zombie, code) = reapable[zombie_choice % reapable.len()];
                    let status = manager.wait(parent, zombie);
                    prop_assert_eq!(status, Ok(ExitDisposition::Exited(code).encode()));
                    model.reap(zombie);
                }
            }
            check_agreement(&manager, &model);
        }
    }
}
