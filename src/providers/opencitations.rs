use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::HttpSettings;
use crate::domain::{Direction, Doi, Record};
use crate::error::{CiteError, FetchError};
use crate::fetcher::RelationFetcher;
use crate::providers::crossref::{CrossrefClient, build_client, encode_doi};

#[derive(Debug, Clone)]
pub struct OpenCitationsFetcher {
    client: Client,
    base: String,
    direction: Direction,
    crossref: CrossrefClient,
}

impl OpenCitationsFetcher {
    pub fn new(direction: Direction, settings: &HttpSettings) -> Result<Self, CiteError> {
        let client = build_client(settings)?;
        let crossref = CrossrefClient::with_client(client.clone(), &settings.crossref_base);
        Ok(Self {
            client,
            base: settings.opencitations_base.trim_end_matches('/').to_string(),
            direction,
            crossref,
        })
    }

    pub fn relation_url(&self, doi: &Doi) -> String {
        let endpoint = match self.direction {
            Direction::Citing => "references",
            Direction::CitedBy => "citations",
        };
        format!("{}/{}/{}", self.base, endpoint, encode_doi(doi))
    }

    fn fetch_links(&self, doi: &Doi) -> Result<Vec<Doi>, CiteError> {
        let url = self.relation_url(doi);
        tracing::debug!(%url, "opencitations.request");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| CiteError::CitationHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "citation index request failed".to_string());
            return Err(CiteError::CitationStatus { status, message });
        }
        let rows: Vec<CitationRow> = response
            .json()
            .map_err(|err| CiteError::CitationHttp(err.to_string()))?;
        Ok(related_dois(&rows, self.direction))
    }
}

impl RelationFetcher for OpenCitationsFetcher {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn perform_search(&self, record: &Record) -> Result<Vec<Record>, FetchError> {
        let Some(doi) = record.doi.as_ref() else {
            tracing::debug!(direction = %self.direction, "record has no DOI, nothing to search");
            return Ok(Vec::new());
        };

        let start = std::time::Instant::now();
        let links = self.fetch_links(doi)?;
        tracing::debug!(
            direction = %self.direction,
            links = links.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "opencitations.response"
        );

        Ok(resolve_links(&links, |related| self.crossref.resolve(related)))
    }
}

// A failed lookup costs that one title, not the titles already resolved.
fn resolve_links(
    links: &[Doi],
    resolve: impl Fn(&Doi) -> Result<Record, CiteError>,
) -> Vec<Record> {
    links
        .iter()
        .map(|related| {
            resolve(related).unwrap_or_else(|err| {
                tracing::warn!(doi = %related, error = %err, "crossref.lookup_failed");
                Record::from_doi(related.clone())
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct CitationRow {
    #[serde(default)]
    citing: Option<String>,
    #[serde(default)]
    cited: Option<String>,
}

pub(crate) fn related_dois(rows: &[CitationRow], direction: Direction) -> Vec<Doi> {
    rows.iter()
        .filter_map(|row| match direction {
            Direction::Citing => row.cited.as_deref(),
            Direction::CitedBy => row.citing.as_deref(),
        })
        .filter_map(first_doi)
        .collect()
}

fn first_doi(raw: &str) -> Option<Doi> {
    raw.split_whitespace()
        .filter(|token| *token != "=>")
        .find_map(|token| token.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(json: &str) -> Vec<CitationRow> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn citing_reads_cited_column() {
        let rows = rows(
            r#"[
                {"citing": "10.1000/source", "cited": "10.1000/a"},
                {"citing": "10.1000/source", "cited": "10.1000/b"}
            ]"#,
        );
        let dois = related_dois(&rows, Direction::Citing);
        let dois: Vec<&str> = dois.iter().map(Doi::as_str).collect();
        assert_eq!(dois, vec!["10.1000/a", "10.1000/b"]);
    }

    #[test]
    fn cited_by_reads_citing_column() {
        let rows = rows(r#"[{"citing": "coci => 10.1000/X", "cited": "10.1000/source"}]"#);
        let dois = related_dois(&rows, Direction::CitedBy);
        assert_eq!(dois.len(), 1);
        assert_eq!(dois[0].as_str(), "10.1000/x");
    }

    #[test]
    fn mixed_identifier_lists_use_first_doi() {
        let rows = rows(r#"[{"cited": "omid:br/0612 doi:10.1000/y pmid:123"}]"#);
        let dois = related_dois(&rows, Direction::Citing);
        assert_eq!(dois.len(), 1);
        assert_eq!(dois[0].as_str(), "10.1000/y");
    }

    #[test]
    fn rows_without_doi_are_skipped() {
        let rows = rows(r#"[{"cited": "omid:br/0612"}, {"citing": "10.1000/z"}]"#);
        assert!(related_dois(&rows, Direction::Citing).is_empty());
    }

    #[test]
    fn failed_lookup_leaves_one_untitled_record() {
        let links: Vec<Doi> = ["10.1000/a", "10.1000/b", "10.1000/c"]
            .iter()
            .map(|doi| doi.parse().unwrap())
            .collect();

        let records = resolve_links(&links, |doi| {
            if doi.as_str() == "10.1000/b" {
                return Err(CiteError::CrossrefStatus {
                    status: 503,
                    message: "busy".to_string(),
                });
            }
            Ok(Record::from_doi(doi.clone()).with_title(doi.as_str().to_uppercase()))
        });

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].display_title(), Some("10.1000/A"));
        assert_eq!(records[1].display_title(), None);
        assert_eq!(records[1].doi.as_ref().map(Doi::as_str), Some("10.1000/b"));
        assert_eq!(records[2].display_title(), Some("10.1000/C"));
    }

    #[test]
    fn relation_url_depends_on_direction() {
        let settings = HttpSettings::default();
        let doi: Doi = "10.1000/xyz".parse().unwrap();
        let citing = OpenCitationsFetcher::new(Direction::Citing, &settings).unwrap();
        let cited_by = OpenCitationsFetcher::new(Direction::CitedBy, &settings).unwrap();
        assert!(citing.relation_url(&doi).ends_with("/references/10.1000/xyz"));
        assert!(cited_by.relation_url(&doi).ends_with("/citations/10.1000/xyz"));
    }

    #[test]
    fn record_without_doi_yields_nothing() {
        let fetcher =
            OpenCitationsFetcher::new(Direction::CitedBy, &HttpSettings::default()).unwrap();
        let found = fetcher
            .perform_search(&Record::default().with_title("No identifiers"))
            .unwrap();
        assert!(found.is_empty());
    }
}
