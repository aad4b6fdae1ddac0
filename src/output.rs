use std::io::{self, Write};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::{Direction, Record};
use crate::executor::TaskExecutor;
use crate::lane::Phase;
use crate::surface::PresentationSurface;
use crate::tab::CitationRelationsTab;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabSnapshot {
    pub source: Option<Record>,
    pub lanes: Vec<LaneSnapshot>,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaneSnapshot {
    pub direction: Direction,
    pub phase: Phase,
    pub items: Vec<String>,
    pub error: bool,
}

impl TabSnapshot {
    pub fn capture<E, S>(tab: &CitationRelationsTab<E, S>, directions: &[Direction]) -> Self
    where
        E: TaskExecutor,
        S: PresentationSurface + Default,
    {
        let lanes = directions
            .iter()
            .filter_map(|direction| tab.lane(*direction))
            .map(|lane| LaneSnapshot {
                direction: lane.direction(),
                phase: lane.phase(),
                items: lane.state().items().to_vec(),
                error: lane.phase() == Phase::Failed,
            })
            .collect();
        Self {
            source: tab.record().map(|record| record.as_ref().clone()),
            lanes,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_snapshot(snapshot: &TabSnapshot) -> io::Result<()> {
        Self::print_json(snapshot)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
