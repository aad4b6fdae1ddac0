use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CiteError {
    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("citation index request failed: {0}")]
    CitationHttp(String),

    #[error("citation index returned status {status}: {message}")]
    CitationStatus { status: u16, message: String },

    #[error("Crossref request failed: {0}")]
    CrossrefHttp(String),

    #[error("Crossref returned status {status}: {message}")]
    CrossrefStatus { status: u16, message: String },

    #[error("fetch worker panicked: {0}")]
    WorkerPanic(String),

    #[error("citation relations tab is disabled by configuration")]
    #[diagnostic(help("set show_citation_relations_tab to true in cite-rel.json"))]
    TabDisabled,
}

pub type FetchError = CiteError;
