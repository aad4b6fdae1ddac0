use std::sync::Arc;
use std::time::Duration;

use crate::config::{HttpSettings, ResolvedConfig};
use crate::domain::{Direction, Doi, Record, RecordRef};
use crate::error::CiteError;
use crate::executor::ThreadExecutor;
use crate::fetcher::RelationFetcher;
use crate::output::TabSnapshot;
use crate::providers::crossref::CrossrefClient;
use crate::providers::opencitations::OpenCitationsFetcher;
use crate::surface::LaneView;
use crate::tab::CitationRelationsTab;

const WAIT_SLICE: Duration = Duration::from_millis(250);

pub type Tab = CitationRelationsTab<ThreadExecutor, LaneView>;

pub struct App {
    tab: Tab,
}

impl App {
    pub fn new(config: &ResolvedConfig) -> Result<Self, CiteError> {
        let citing: Arc<dyn RelationFetcher> =
            Arc::new(OpenCitationsFetcher::new(Direction::Citing, &config.http)?);
        let cited_by: Arc<dyn RelationFetcher> =
            Arc::new(OpenCitationsFetcher::new(Direction::CitedBy, &config.http)?);
        let tab = CitationRelationsTab::new(
            config.preferences,
            ThreadExecutor::new(),
            move |direction| match direction {
                Direction::Citing => citing.clone(),
                Direction::CitedBy => cited_by.clone(),
            },
        );
        Ok(Self::from_tab(tab))
    }

    pub fn from_tab(tab: Tab) -> Self {
        Self { tab }
    }

    pub fn tab_mut(&mut self) -> &mut Tab {
        &mut self.tab
    }

    pub fn resolve_record(
        settings: &HttpSettings,
        doi: Doi,
        title: Option<String>,
    ) -> Result<RecordRef, CiteError> {
        if let Some(title) = title {
            return Ok(Arc::new(Record::from_doi(doi).with_title(title)));
        }
        let crossref = CrossrefClient::new(settings)?;
        let record = match crossref.lookup(&doi) {
            Ok(Some(record)) => record,
            Ok(None) => Record::from_doi(doi),
            Err(err) => {
                tracing::warn!(%doi, error = %err, "could not look up record, continuing with DOI only");
                Record::from_doi(doi)
            }
        };
        Ok(Arc::new(record))
    }

    /// Presses each requested lane and waits until none of them is running.
    ///
    /// There is no deadline: a fetch that never reports back keeps this
    /// waiting.
    pub fn collect(&mut self, directions: &[Direction]) -> TabSnapshot {
        for direction in directions {
            self.tab.press(*direction);
        }
        while directions
            .iter()
            .any(|direction| self.tab.is_running(*direction))
        {
            if let Some(event) = self.tab.executor().recv_timeout(WAIT_SLICE) {
                self.tab.deliver(event);
            }
        }
        TabSnapshot::capture(&self.tab, directions)
    }
}
