use std::sync::Arc;

use serde::Serialize;

use crate::domain::{Direction, Record, RecordRef, RelationQuery};
use crate::executor::{TaskEvent, TaskExecutor, TaskId, TaskStatus};
use crate::fetcher::RelationFetcher;
use crate::surface::PresentationSurface;

pub const NO_RESULTS: &str = "No articles found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub busy: bool,
    pub start: bool,
    pub refresh: bool,
}

impl Phase {
    pub fn affordances(self) -> Affordances {
        match self {
            Phase::Idle => Affordances {
                busy: false,
                start: true,
                refresh: false,
            },
            Phase::Running => Affordances {
                busy: true,
                start: false,
                refresh: false,
            },
            Phase::Loaded | Phase::Failed => Affordances {
                busy: false,
                start: false,
                refresh: true,
            },
        }
    }

    pub fn accepts_request(self) -> bool {
        !matches!(self, Phase::Running)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Loaded => "loaded",
            Phase::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LaneState {
    phase: Phase,
    items: Vec<String>,
    last_query: Option<RelationQuery>,
}

impl LaneState {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            items: Vec::new(),
            last_query: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn last_query(&self) -> Option<&RelationQuery> {
        self.last_query.as_ref()
    }
}

pub fn project_titles(records: &[Record]) -> Vec<String> {
    let titles: Vec<String> = records
        .iter()
        .filter_map(|record| record.display_title().map(str::to_string))
        .collect();
    if titles.is_empty() {
        return vec![NO_RESULTS.to_string()];
    }
    titles
}

pub struct LaneController<S> {
    direction: Direction,
    record: RecordRef,
    fetcher: Arc<dyn RelationFetcher>,
    state: LaneState,
    outstanding: Option<TaskId>,
    surface: S,
}

impl<S: PresentationSurface> LaneController<S> {
    pub fn new(
        direction: Direction,
        record: RecordRef,
        fetcher: Arc<dyn RelationFetcher>,
        surface: S,
    ) -> Self {
        debug_assert_eq!(fetcher.direction(), direction);
        let mut lane = Self {
            direction,
            record,
            fetcher,
            state: LaneState::new(),
            outstanding: None,
            surface,
        };
        lane.push_affordances();
        lane
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> &LaneState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn outstanding(&self) -> Option<TaskId> {
        self.outstanding
    }

    pub fn press<E: TaskExecutor + ?Sized>(&mut self, executor: &E) -> bool {
        let direction = self
            .state
            .last_query
            .as_ref()
            .map(RelationQuery::direction)
            .unwrap_or(self.direction);
        let query = RelationQuery::new(self.record.clone(), direction);
        self.request_fetch(query, executor)
    }

    pub fn request_fetch<E: TaskExecutor + ?Sized>(
        &mut self,
        query: RelationQuery,
        executor: &E,
    ) -> bool {
        if !self.state.phase.accepts_request() {
            tracing::debug!(
                lane = %self.direction,
                phase = self.state.phase.label(),
                "fetch already running, ignoring request"
            );
            return false;
        }
        if query.direction() != self.direction {
            tracing::warn!(
                lane = %self.direction,
                requested = %query.direction(),
                "query direction does not match lane"
            );
            return false;
        }

        self.state.phase = Phase::Running;
        self.state.last_query = Some(query.clone());
        self.push_affordances();

        let fetcher = self.fetcher.clone();
        let task = executor.submit(
            self.direction,
            Box::new(move || fetcher.perform_search(query.source())),
        );
        self.outstanding = Some(task);
        tracing::info!(lane = %self.direction, %task, "fetch submitted");
        true
    }

    pub fn handle(&mut self, event: TaskEvent) -> bool {
        if event.lane != self.direction || self.outstanding != Some(event.task) {
            tracing::debug!(lane = %self.direction, task = %event.task, "ignoring stale notification");
            return false;
        }

        match event.status {
            TaskStatus::Running => {
                self.push_affordances();
            }
            TaskStatus::Succeeded(records) => {
                self.outstanding = None;
                self.state.items = project_titles(&records);
                self.state.phase = Phase::Loaded;
                tracing::debug!(
                    lane = %self.direction,
                    phase = self.state.phase.label(),
                    fetched = records.len(),
                    shown = self.state.items.len(),
                    "fetch loaded"
                );
                self.push_affordances();
                self.surface.render_items(&self.state.items);
            }
            TaskStatus::Failed(err) => {
                self.outstanding = None;
                self.state.phase = Phase::Failed;
                tracing::error!(
                    lane = %self.direction,
                    phase = self.state.phase.label(),
                    error = %err,
                    "error while fetching {} articles",
                    self.direction.label().to_lowercase()
                );
                self.push_affordances();
                self.surface.render_error();
            }
        }
        true
    }

    fn push_affordances(&mut self) {
        let affordances = self.state.phase.affordances();
        self.surface.show_busy(affordances.busy);
        self.surface.show_start_affordance(affordances.start);
        self.surface.show_refresh_affordance(affordances.refresh);
    }
}
