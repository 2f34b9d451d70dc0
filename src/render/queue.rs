//! Render task queue
//!
//! An explicit, caller-owned queue of pending paint operations. Tasks run
//! one at a time from a single consumer, highest priority first and FIFO
//! within a priority. Between tasks the queue invokes an injected yield
//! callback so a host can hand control back to its UI loop; no scheduler
//! primitive is hardwired here.
//!
//! A failing task is logged and draining continues with the next task.

use std::fmt::Display;

#[derive(Debug)]
struct QueuedTask<T> {
    priority: i32,
    seq: u64,
    task: T,
}

/// Priority queue of pending render operations
#[derive(Debug)]
pub struct RenderQueue<T> {
    tasks: Vec<QueuedTask<T>>,
    next_seq: u64,
}

impl<T> RenderQueue<T> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_seq: 0,
        }
    }

    /// Enqueue a task. Higher priorities drain first; equal priorities
    /// drain in insertion order.
    pub fn push(&mut self, priority: i32, task: T) {
        self.tasks.push(QueuedTask {
            priority,
            seq: self.next_seq,
            task,
        });
        self.next_seq += 1;
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every queued task through `run`, one at a time, calling
    /// `yield_between` between consecutive tasks. Task errors are logged
    /// and do not stop the drain.
    pub fn drain<E: Display>(
        &mut self,
        mut yield_between: impl FnMut(),
        mut run: impl FnMut(T) -> Result<(), E>,
    ) {
        let mut first = true;
        while let Some(task) = self.pop_next() {
            if !first {
                yield_between();
            }
            first = false;

            if let Err(err) = run(task) {
                log::error!("render task failed: {err}");
            }
        }
    }

    /// Remove and return the next task: highest priority, oldest first.
    fn pop_next(&mut self) -> Option<T> {
        let best = self
            .tasks
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.priority
                    .cmp(&b.priority)
                    .then(b.seq.cmp(&a.seq))
            })
            .map(|(index, _)| index)?;
        Some(self.tasks.remove(best).task)
    }
}

impl<T> Default for RenderQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
