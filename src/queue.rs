//! The deferred task queue. Every handler a promise runs goes through a
//! [`Scheduler`], so nothing runs on the stack that settled the promise or
//! registered the handler.
//!
use log::trace;
use std::{cell::RefCell, collections::VecDeque, fmt, rc::Rc};

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Where promises send their handlers to be run later.
///
/// Tasks handed to one scheduler must run in the order they were scheduled.
pub trait Scheduler {
    fn schedule(&self, task: Task);

    /// Runs queued tasks, including the ones they schedule, until none are
    /// left. Returns how many tasks ran.
    fn run_until_stalled(&self) -> usize;
}

/// A FIFO [`Scheduler`]. Clones share the same queue.
///
/// # Examples
///
/// ```
/// use promise_chain::{Scheduler, TaskQueue};
/// use std::{cell::Cell, rc::Rc};
///
/// let queue = TaskQueue::new();
/// let hits = Rc::new(Cell::new(0));
/// let counter = hits.clone();
/// queue.schedule(Box::new(move || counter.set(counter.get() + 1)));
/// assert_eq!(hits.get(), 0);
/// assert_eq!(queue.run_until_stalled(), 1);
/// assert_eq!(hits.get(), 1);
/// ```
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

thread_local! {
    static CURRENT: TaskQueue = TaskQueue::new();
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The calling thread's default queue, used by [`Promise::new`].
    ///
    /// [`Promise::new`]: crate::Promise::new
    pub fn current() -> Self {
        CURRENT.with(|queue| queue.clone())
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Pops and runs the oldest task. Returns `false` if there was none.
    pub fn run_next(&self) -> bool {
        // The borrow must end before the task runs; tasks schedule more tasks.
        let task = self.tasks.borrow_mut().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&self, task: Task) {
        let mut tasks = self.tasks.borrow_mut();
        tasks.push_back(task);
        trace!("task scheduled; {} queued", tasks.len());
    }

    fn run_until_stalled(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        if ran > 0 {
            trace!("task queue stalled after {} task(s)", ran);
        }
        ran
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue").field("queued", &self.len()).finish()
    }
}
