use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

pub mod diagnostics;
pub mod extract;
pub mod formats;
pub mod names;
pub mod parse;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use formats::{AuthorInput, Journal, ResolveError, RosterAffiliations};
pub use parse::{parse_affiliations, AffiliationMap};

pub fn hash_affiliation(affiliation: &str) -> String {
    format!("{:016x}", xxh3_64(affiliation.as_bytes()))
}

/// One author/institution pair, the row written by `resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorAffiliationRecord {
    pub article_id: String,
    pub journal: Journal,
    pub author_idx: usize,
    pub author_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_key: String,
    pub affiliation_idx: usize,
    pub affiliation: String,
    pub affiliation_hash: String,
}
