pub mod crossref;
pub mod opencitations;
