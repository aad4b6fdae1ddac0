#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use citation_relations::domain::{Direction, Doi, Record, RecordRef};
use citation_relations::error::{CiteError, FetchError};
use citation_relations::executor::{FetchWork, TaskEvent, TaskExecutor, TaskId, TaskStatus};
use citation_relations::fetcher::RelationFetcher;
use citation_relations::surface::PresentationSurface;

pub fn record(doi: &str) -> RecordRef {
    let doi: Doi = doi.parse().unwrap();
    Arc::new(Record::from_doi(doi).with_title("Source"))
}

pub fn titled(title: &str) -> Record {
    Record::default().with_title(title)
}

pub fn untitled() -> Record {
    Record::default()
}

type Respond = Box<dyn Fn() -> Result<Vec<Record>, FetchError> + Send + Sync>;

/// Fetcher whose answer is fixed by the test.
pub struct ScriptedFetcher {
    direction: Direction,
    respond: Respond,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn returning(direction: Direction, records: Vec<Record>) -> Arc<Self> {
        Arc::new(Self {
            direction,
            respond: Box::new(move || Ok(records.clone())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(direction: Direction) -> Arc<Self> {
        Arc::new(Self {
            direction,
            respond: Box::new(|| Err(CiteError::CitationHttp("connection reset".to_string()))),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn with(
        direction: Direction,
        respond: impl Fn() -> Result<Vec<Record>, FetchError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            direction,
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RelationFetcher for ScriptedFetcher {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn perform_search(&self, _record: &Record) -> Result<Vec<Record>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)()
    }
}

struct Submission {
    task: TaskId,
    lane: Direction,
    work: Option<FetchWork>,
}

/// Executor that runs nothing until the test says so, all on the test thread.
#[derive(Default)]
pub struct ManualExecutor {
    next: Cell<u64>,
    submissions: RefCell<Vec<Submission>>,
    ready: RefCell<VecDeque<TaskEvent>>,
}

impl ManualExecutor {
    pub fn submissions(&self) -> usize {
        self.submissions.borrow().len()
    }

    pub fn last_task(&self, lane: Direction) -> Option<TaskId> {
        self.submissions
            .borrow()
            .iter()
            .rev()
            .find(|submission| submission.lane == lane)
            .map(|submission| submission.task)
    }

    /// Queues the `Running` notification for `task`.
    pub fn start(&self, task: TaskId) {
        let lane = self.lane_of(task);
        self.ready.borrow_mut().push_back(TaskEvent {
            task,
            lane,
            status: TaskStatus::Running,
        });
    }

    /// Runs the work of `task` and queues its outcome.
    pub fn finish(&self, task: TaskId) {
        let (lane, work) = {
            let mut submissions = self.submissions.borrow_mut();
            let submission = submissions
                .iter_mut()
                .find(|submission| submission.task == task)
                .expect("unknown task");
            (submission.lane, submission.work.take().expect("task already finished"))
        };
        let status = match work() {
            Ok(records) => TaskStatus::Succeeded(records),
            Err(err) => TaskStatus::Failed(err),
        };
        self.ready
            .borrow_mut()
            .push_back(TaskEvent { task, lane, status });
    }

    pub fn run(&self, task: TaskId) {
        self.start(task);
        self.finish(task);
    }

    fn lane_of(&self, task: TaskId) -> Direction {
        self.submissions
            .borrow()
            .iter()
            .find(|submission| submission.task == task)
            .map(|submission| submission.lane)
            .expect("unknown task")
    }
}

impl TaskExecutor for ManualExecutor {
    fn submit(&self, lane: Direction, work: FetchWork) -> TaskId {
        let id = self.next.get() + 1;
        self.next.set(id);
        let task = TaskId::new(id);
        self.submissions.borrow_mut().push(Submission {
            task,
            lane,
            work: Some(work),
        });
        task
    }

    fn try_drain(&self) -> Vec<TaskEvent> {
        self.ready.borrow_mut().drain(..).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Busy(bool),
    Start(bool),
    Refresh(bool),
    Items(Vec<String>),
    Error,
}

/// Surface that remembers every call made to it.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
}

impl PresentationSurface for RecordingSurface {
    fn show_busy(&mut self, visible: bool) {
        self.calls.push(SurfaceCall::Busy(visible));
    }

    fn show_start_affordance(&mut self, visible: bool) {
        self.calls.push(SurfaceCall::Start(visible));
    }

    fn show_refresh_affordance(&mut self, visible: bool) {
        self.calls.push(SurfaceCall::Refresh(visible));
    }

    fn render_items(&mut self, items: &[String]) {
        self.calls.push(SurfaceCall::Items(items.to_vec()));
    }

    fn render_error(&mut self) {
        self.calls.push(SurfaceCall::Error);
    }
}
