use std::sync::Arc;

use citation_relations::config::HttpSettings;
use citation_relations::domain::{Direction, Doi, Record};
use citation_relations::fetcher::RelationFetcher;
use citation_relations::lane::project_titles;
use citation_relations::providers::crossref::CrossrefClient;
use citation_relations::providers::opencitations::OpenCitationsFetcher;

#[test]
#[ignore]
fn fetch_real_references() {
    let settings = HttpSettings::default();
    let doi: Doi = "10.1038/nature12373".parse().unwrap();
    let fetcher = OpenCitationsFetcher::new(Direction::Citing, &settings).unwrap();

    let records = fetcher.perform_search(&Record::from_doi(doi)).unwrap();
    assert!(!records.is_empty());
    assert!(!project_titles(&records).is_empty());
}

#[test]
#[ignore]
fn lookup_real_record() {
    let client = CrossrefClient::new(&HttpSettings::default()).unwrap();
    let doi: Doi = "10.1038/nature12373".parse().unwrap();
    let record = Arc::new(client.resolve(&doi).unwrap());
    assert!(record.display_title().is_some());
}
