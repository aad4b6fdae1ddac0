use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::domain::{Direction, Record};
use crate::error::{CiteError, FetchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

#[derive(Debug)]
pub enum TaskStatus {
    Running,
    Succeeded(Vec<Record>),
    Failed(FetchError),
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Running)
    }
}

#[derive(Debug)]
pub struct TaskEvent {
    pub task: TaskId,
    pub lane: Direction,
    pub status: TaskStatus,
}

pub type FetchWork = Box<dyn FnOnce() -> Result<Vec<Record>, FetchError> + Send + 'static>;

/// Runs fetch work away from the interactive thread.
///
/// For every submission the executor emits `Running` followed by exactly one of
/// `Succeeded` or `Failed`. Events only become visible to the owner through
/// [`TaskExecutor::try_drain`], which is called from the interactive thread.
pub trait TaskExecutor {
    fn submit(&self, lane: Direction, work: FetchWork) -> TaskId;
    fn try_drain(&self) -> Vec<TaskEvent>;
}

pub struct ThreadExecutor {
    next_id: AtomicU64,
    sender: Sender<TaskEvent>,
    receiver: Receiver<TaskEvent>,
}

impl ThreadExecutor {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            next_id: AtomicU64::new(1),
            sender,
            receiver,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<TaskEvent> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Default for ThreadExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskExecutor for ThreadExecutor {
    fn submit(&self, lane: Direction, work: FetchWork) -> TaskId {
        let task = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let tx = self.sender.clone();
        tracing::debug!(%task, %lane, "spawning fetch worker");
        thread::spawn(move || {
            // The owner may already be gone; its events are simply dropped.
            let _ = tx.send(TaskEvent {
                task,
                lane,
                status: TaskStatus::Running,
            });
            let status = match panic::catch_unwind(AssertUnwindSafe(work)) {
                Ok(Ok(records)) => TaskStatus::Succeeded(records),
                Ok(Err(err)) => TaskStatus::Failed(err),
                Err(payload) => {
                    TaskStatus::Failed(CiteError::WorkerPanic(panic_message(&*payload)))
                }
            };
            let _ = tx.send(TaskEvent { task, lane, status });
        });
        task
    }

    fn try_drain(&self) -> Vec<TaskEvent> {
        self.receiver.try_iter().collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic".to_string()
}
