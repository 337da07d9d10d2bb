//! Delayed one-shot tasks.
//!
//! A task holds entity ids, never entity references, and is scheduled on
//! the server clock independently of the tick. Due tasks run at the start
//! of the next tick; a task whose target entity no longer exists simply
//! finds nothing in the registry and becomes a no-op. A destroyed entity
//! can never be resurrected by a stale timer because ids are never reused.

use crate::script::ScriptCtx;

type Task = Box<dyn FnOnce(&mut ScriptCtx)>;

struct ScheduledTask {
    due: f64,
    task: Task,
}

/// Schedules one-shot callbacks against server uptime.
#[derive(Default)]
pub struct TaskScheduler {
    pending: Vec<ScheduledTask>,
}

impl TaskScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once, roughly `delay` seconds from `now`. Fires on the
    /// first tick at or past the deadline.
    pub fn schedule_in(
        &mut self,
        now: f64,
        delay: f64,
        task: impl FnOnce(&mut ScriptCtx) + 'static,
    ) {
        self.pending.push(ScheduledTask {
            due: now + delay,
            task: Box::new(task),
        });
    }

    /// Take every task due at `now`, in scheduling order.
    pub(crate) fn take_due(&mut self, now: f64) -> Vec<Task> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.remove(i).task);
            } else {
                i += 1;
            }
        }
        due
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("pending", &self.pending.len())
            .finish()
    }
}
