use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CiteError;

const DOI_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

fn doi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^10\.\d{4,9}/\S+$").expect("DOI pattern compiles"))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Doi(String);

impl Doi {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Doi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Doi {
    type Err = CiteError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_lowercase();
        let stripped = DOI_PREFIXES
            .iter()
            .find_map(|prefix| lowered.strip_prefix(prefix))
            .unwrap_or(lowered.as_str())
            .trim();
        if !doi_pattern().is_match(stripped) {
            return Err(CiteError::InvalidDoi(value.to_string()));
        }
        Ok(Self(stripped.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Citing,
    CitedBy,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Citing, Direction::CitedBy];

    pub fn label(self) -> &'static str {
        match self {
            Direction::Citing => "Citing",
            Direction::CitedBy => "Cited By",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub doi: Option<Doi>,
    pub title: Option<String>,
    pub year: Option<i32>,
}

impl Record {
    pub fn from_doi(doi: Doi) -> Self {
        Self {
            doi: Some(doi),
            title: None,
            year: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }

    pub fn describe(&self) -> String {
        match (self.display_title(), &self.doi) {
            (Some(title), Some(doi)) => format!("{title} ({doi})"),
            (Some(title), None) => title.to_string(),
            (None, Some(doi)) => doi.to_string(),
            (None, None) => "untitled record".to_string(),
        }
    }
}

pub type RecordRef = Arc<Record>;

#[derive(Debug, Clone)]
pub struct RelationQuery {
    source: RecordRef,
    direction: Direction,
}

impl RelationQuery {
    pub fn new(source: RecordRef, direction: Direction) -> Self {
        Self { source, direction }
    }

    pub fn source(&self) -> &RecordRef {
        &self.source
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}
