//! A dedicated UI thread draining a FIFO mailbox, with timers.
//!
//! Hosts without an event loop of their own (and tests) use this as the UI
//! thread. Immediate tasks run in the order they were posted. Delayed tasks
//! wait in a deadline heap; equal deadlines run in posting order. A panic in
//! any task is reported through the uncaught handler and the loop carries on.

use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, JoinHandle, ThreadId},
    time::{Duration, Instant},
};

use crossbeam_channel::{self as chan, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info, trace};

use crate::{
    error::{Error, Result},
    executor::{UiExecutor, UiTask, panic_message},
};

/// Callback invoked with failures from work nobody is waiting on.
pub type UncaughtHandler = Arc<dyn Fn(&Error) + Send + Sync>;

/// Messages consumed by the loop thread.
enum Msg {
    /// Run as soon as possible.
    Run(UiTask),
    /// Run once `at` has passed.
    RunAt {
        /// Earliest start time.
        at: Instant,
        /// Work to run.
        task: UiTask,
    },
    /// Stop the loop; pending timers are dropped.
    Shutdown,
}

/// A delayed task waiting in the heap.
struct Timer {
    /// Earliest start time.
    at: Instant,
    /// Posting sequence, used to keep equal deadlines FIFO.
    seq: u64,
    /// Work to run.
    task: UiTask,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    // Reversed so the std max-heap pops the earliest deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Route a failure to the installed handler, or log it.
fn report(handler: Option<&UncaughtHandler>, failure: &Error) {
    match handler {
        Some(h) => h(failure),
        None => error!(%failure, "uncaught_ui_task_failure"),
    }
}

/// Run one task, isolating panics from the loop.
fn run_task(task: UiTask, handler: Option<&UncaughtHandler>) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
        let failure = Error::Panicked {
            message: panic_message(payload.as_ref()),
        };
        report(handler, &failure);
    }
}

/// Body of the UI thread.
fn run_loop(rx: &Receiver<Msg>, handler: Option<&UncaughtHandler>) {
    let mut timers: BinaryHeap<Timer> = BinaryHeap::new();
    let mut seq: u64 = 0;
    loop {
        let now = Instant::now();
        while timers.peek().is_some_and(|t| t.at <= now) {
            if let Some(t) = timers.pop() {
                run_task(t.task, handler);
            }
        }

        let next = match timers.peek() {
            Some(t) => match rx.recv_deadline(t.at) {
                Ok(msg) => msg,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(msg) => msg,
                Err(_) => break,
            },
        };

        match next {
            Msg::Run(task) => run_task(task, handler),
            Msg::RunAt { at, task } => {
                seq += 1;
                timers.push(Timer { at, seq, task });
            }
            Msg::Shutdown => break,
        }
    }
    debug!(dropped_timers = timers.len(), "ui_loop_exit");
}

/// Configuration for spawning an [`EventLoop`].
pub struct EventLoopBuilder {
    /// OS thread name.
    name: String,
    /// Optional replacement for the logging uncaught handler.
    uncaught: Option<UncaughtHandler>,
}

impl Default for EventLoopBuilder {
    fn default() -> Self {
        Self {
            name: "ui-thread".to_string(),
            uncaught: None,
        }
    }
}

impl EventLoopBuilder {
    /// Set the UI thread's name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Install a handler for failures in fire-and-forget work.
    #[must_use]
    pub fn uncaught_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.uncaught = Some(Arc::new(f));
        self
    }

    /// Start the UI thread.
    pub fn spawn(self) -> Result<EventLoop> {
        let (tx, rx) = chan::unbounded::<Msg>();
        let handler = self.uncaught.clone();
        let join = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || run_loop(&rx, handler.as_ref()))?;
        let thread = join.thread().id();
        info!(name = %self.name, "ui_loop_started");
        Ok(EventLoop {
            handle: EventLoopHandle {
                tx,
                thread,
                uncaught: self.uncaught,
            },
            join: Some(join),
        })
    }
}

/// Owner of the UI thread. Dropping it stops the loop.
pub struct EventLoop {
    /// Handle shared with callers.
    handle: EventLoopHandle,
    /// Join handle for the loop thread, taken on shutdown.
    join: Option<JoinHandle<()>>,
}

impl EventLoop {
    /// Start configuring a loop.
    pub fn builder() -> EventLoopBuilder {
        EventLoopBuilder::default()
    }

    /// Start a loop with default settings.
    pub fn spawn() -> Result<Self> {
        Self::builder().spawn()
    }

    /// A cheap, clonable executor handle for this loop.
    pub fn handle(&self) -> EventLoopHandle {
        self.handle.clone()
    }

    /// Stop the loop after the work already queued ahead of the request.
    ///
    /// Delayed tasks that have not come due are dropped.
    pub fn shutdown(mut self) {
        self.stop();
    }

    /// Send the shutdown message and join, unless we are the UI thread.
    fn stop(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        // Send fails only if the loop already exited.
        if self.handle.tx.send(Msg::Shutdown).is_err() {
            trace!("ui_loop_already_stopped");
        }
        if thread::current().id() == self.handle.thread {
            return;
        }
        if join.join().is_err() {
            error!("ui_loop_thread_panicked");
        }
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Clonable executor for an [`EventLoop`].
#[derive(Clone)]
pub struct EventLoopHandle {
    /// Mailbox of the loop thread.
    tx: Sender<Msg>,
    /// Identity of the loop thread.
    thread: ThreadId,
    /// Handler shared with the loop thread.
    uncaught: Option<UncaughtHandler>,
}

impl fmt::Debug for EventLoopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoopHandle")
            .field("thread", &self.thread)
            .field("queued", &self.tx.len())
            .finish()
    }
}

impl UiExecutor for EventLoopHandle {
    fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.thread
    }

    fn post(&self, task: UiTask) -> Result<()> {
        self.tx.send(Msg::Run(task)).map_err(|_| Error::Closed)
    }

    fn post_delayed(&self, delay: Duration, task: UiTask) -> Result<()> {
        let at = Instant::now() + delay;
        self.tx
            .send(Msg::RunAt { at, task })
            .map_err(|_| Error::Closed)
    }

    fn report_uncaught(&self, failure: &Error) {
        report(self.uncaught.as_ref(), failure);
    }
}
