use std::sync::Arc;

use crate::config::Preferences;
use crate::domain::{Direction, RecordRef};
use crate::executor::{TaskEvent, TaskExecutor};
use crate::fetcher::RelationFetcher;
use crate::lane::{LaneController, Phase};
use crate::surface::PresentationSurface;

pub type FetcherFactory = Box<dyn Fn(Direction) -> Arc<dyn RelationFetcher>>;

struct Lanes<S> {
    record: RecordRef,
    citing: LaneController<S>,
    cited_by: LaneController<S>,
}

impl<S> Lanes<S> {
    fn get(&self, direction: Direction) -> &LaneController<S> {
        match direction {
            Direction::Citing => &self.citing,
            Direction::CitedBy => &self.cited_by,
        }
    }

    fn get_mut(&mut self, direction: Direction) -> &mut LaneController<S> {
        match direction {
            Direction::Citing => &mut self.citing,
            Direction::CitedBy => &mut self.cited_by,
        }
    }
}

pub struct CitationRelationsTab<E, S> {
    preferences: Preferences,
    executor: E,
    fetchers: FetcherFactory,
    lanes: Option<Lanes<S>>,
}

impl<E, S> CitationRelationsTab<E, S>
where
    E: TaskExecutor,
    S: PresentationSurface + Default,
{
    pub fn new<F>(preferences: Preferences, executor: E, fetchers: F) -> Self
    where
        F: Fn(Direction) -> Arc<dyn RelationFetcher> + 'static,
    {
        Self {
            preferences,
            executor,
            fetchers: Box::new(fetchers),
            lanes: None,
        }
    }

    pub fn should_show(&self) -> bool {
        self.preferences.show_citation_relations_tab
    }

    pub fn bind(&mut self, record: RecordRef) {
        tracing::debug!(record = %record.describe(), "binding citation relations");
        let lane = |direction: Direction| {
            LaneController::new(
                direction,
                record.clone(),
                (self.fetchers)(direction),
                S::default(),
            )
        };
        let citing = lane(Direction::Citing);
        let cited_by = lane(Direction::CitedBy);
        self.lanes = Some(Lanes {
            record,
            citing,
            cited_by,
        });
    }

    pub fn unbind(&mut self) {
        self.lanes = None;
    }

    pub fn record(&self) -> Option<&RecordRef> {
        self.lanes.as_ref().map(|lanes| &lanes.record)
    }

    pub fn lane(&self, direction: Direction) -> Option<&LaneController<S>> {
        self.lanes.as_ref().map(|lanes| lanes.get(direction))
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn press(&mut self, direction: Direction) -> bool {
        let executor = &self.executor;
        match self.lanes.as_mut() {
            Some(lanes) => lanes.get_mut(direction).press(executor),
            None => false,
        }
    }

    pub fn deliver(&mut self, event: TaskEvent) -> bool {
        match self.lanes.as_mut() {
            Some(lanes) => lanes.get_mut(event.lane).handle(event),
            None => false,
        }
    }

    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        for event in self.executor.try_drain() {
            if self.deliver(event) {
                applied += 1;
            }
        }
        applied
    }

    pub fn is_running(&self, direction: Direction) -> bool {
        self.lane(direction)
            .is_some_and(|lane| lane.phase() == Phase::Running)
    }
}
