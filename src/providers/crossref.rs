use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::config::HttpSettings;
use crate::domain::{Doi, Record};
use crate::error::CiteError;

#[derive(Debug, Clone)]
pub struct CrossrefClient {
    client: Client,
    base: String,
}

impl CrossrefClient {
    pub fn new(settings: &HttpSettings) -> Result<Self, CiteError> {
        let client = build_client(settings)?;
        Ok(Self::with_client(client, &settings.crossref_base))
    }

    pub fn with_client(client: Client, base: &str) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn work_url(&self, doi: &Doi) -> String {
        format!("{}/works/{}", self.base, encode_doi(doi))
    }

    pub fn lookup(&self, doi: &Doi) -> Result<Option<Record>, CiteError> {
        let url = self.work_url(doi);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| CiteError::CrossrefHttp(err.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(%doi, "crossref has no record");
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Crossref request failed".to_string());
            return Err(CiteError::CrossrefStatus { status, message });
        }
        let payload: CrossrefResponse = response
            .json()
            .map_err(|err| CiteError::CrossrefHttp(err.to_string()))?;
        Ok(Some(payload.message.into_record(doi.clone())))
    }

    pub fn resolve(&self, doi: &Doi) -> Result<Record, CiteError> {
        Ok(self
            .lookup(doi)?
            .unwrap_or_else(|| Record::from_doi(doi.clone())))
    }
}

pub(crate) fn build_client(settings: &HttpSettings) -> Result<Client, CiteError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&settings.user_agent)
            .map_err(|err| CiteError::ConfigParse(err.to_string()))?,
    );
    Client::builder()
        .default_headers(headers)
        .timeout(settings.timeout)
        .build()
        .map_err(|err| CiteError::CrossrefHttp(err.to_string()))
}

#[derive(Debug, Deserialize)]
struct CrossrefResponse {
    message: CrossrefMessage,
}

#[derive(Debug, Deserialize)]
struct CrossrefMessage {
    title: Option<Vec<String>>,
    issued: Option<CrossrefDate>,
}

#[derive(Debug, Deserialize)]
struct CrossrefDate {
    #[serde(rename = "date-parts")]
    date_parts: Option<Vec<Vec<Option<i32>>>>,
}

impl CrossrefMessage {
    fn into_record(self, doi: Doi) -> Record {
        let title = self
            .title
            .and_then(|titles| titles.into_iter().find(|title| !title.trim().is_empty()))
            .map(|title| collapse_whitespace(&title));
        let year = self
            .issued
            .and_then(|issued| issued.date_parts)
            .and_then(|parts| parts.into_iter().next())
            .and_then(|first| first.into_iter().next())
            .flatten();
        Record {
            doi: Some(doi),
            title,
            year,
        }
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn encode_doi(doi: &Doi) -> String {
    let mut out = String::new();
    for byte in doi.as_str().as_bytes() {
        let ch = *byte as char;
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '~' | '/') {
            out.push(ch);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}
