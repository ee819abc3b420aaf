//! Scheduler - single-threaded cooperative task queue
//!
//! A tick runs the tasks queued before it started. Tasks deferred while
//! ticking wait for the next tick.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use contracts::SchedulerConfig;
use tracing::{debug, trace};

use crate::error::SchedulerError;

type Task = Box<dyn FnOnce()>;

struct SchedulerInner {
    tasks: RefCell<VecDeque<Task>>,
    config: SchedulerConfig,
    ticks: Cell<u64>,
}

/// Deferred task queue.
///
/// Cheap to clone: clones share one queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending_tasks", &self.pending_tasks())
            .field("ticks", &self.inner.ticks.get())
            .field("max_ticks", &self.inner.config.max_ticks)
            .finish()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                tasks: RefCell::new(VecDeque::new()),
                config,
                ticks: Cell::new(0),
            }),
        }
    }

    /// Queue `task` for the next tick
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.inner.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Run the tasks queued so far. Returns how many ran.
    pub fn tick(&self) -> usize {
        let batch = std::mem::take(&mut *self.inner.tasks.borrow_mut());
        let ran = batch.len();
        if ran == 0 {
            return 0;
        }

        for task in batch {
            task();
        }

        self.inner.ticks.set(self.inner.ticks.get() + 1);
        observability::record_scheduler_tick(ran);
        trace!(tasks = ran, "Tick complete");
        ran
    }

    /// Tick until no task is left. Returns the number of ticks taken.
    ///
    /// # Errors
    /// `TickBudgetExhausted` when work remains after `max_ticks` ticks.
    pub fn run_until_idle(&self) -> Result<usize, SchedulerError> {
        let mut ticks = 0;
        while !self.is_idle() {
            self.check_budget(ticks)?;
            self.tick();
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Like [`run_until_idle`](Self::run_until_idle), yielding to the tokio
    /// runtime between ticks.
    pub async fn drive(&self) -> Result<usize, SchedulerError> {
        let mut ticks = 0;
        while !self.is_idle() {
            self.check_budget(ticks)?;
            self.tick();
            ticks += 1;
            tokio::task::yield_now().await;
        }
        Ok(ticks)
    }

    fn check_budget(&self, ticks: usize) -> Result<(), SchedulerError> {
        if ticks >= self.inner.config.max_ticks {
            debug!(
                ticks,
                pending = self.pending_tasks(),
                "Tick budget exhausted"
            );
            return Err(SchedulerError::TickBudgetExhausted { ticks });
        }
        Ok(())
    }

    pub fn is_idle(&self) -> bool {
        self.inner.tasks.borrow().is_empty()
    }

    pub fn pending_tasks(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Ticks run since creation
    pub fn total_ticks(&self) -> u64 {
        self.inner.ticks.get()
    }
}
