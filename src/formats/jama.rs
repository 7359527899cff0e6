//! JAMA: "Author Affiliations: Department of X, Y University, City (Drs Smith
//! and Lee); Z Institute, City (Ms Jones)." Authors are keyed by last name.

use super::{align_by_substring, RosterAffiliations};
use crate::diagnostics::DiagnosticSink;
use crate::names::{discard_leading, AuthorCleaner};
use crate::parse::parse_affiliations;

/// Drops the "Author Affiliations:" preamble and splits the rest into blocks.
pub fn blocks(affiliations: &str) -> Vec<String> {
    let body = affiliations
        .split_once(": ")
        .map_or(affiliations, |(_, rest)| rest)
        .trim_end();
    let body = body.strip_suffix('.').unwrap_or(body);

    let mut blocks: Vec<String> = body.split("; ").map(String::from).collect();
    if let Some(last) = blocks.last_mut() {
        *last = discard_leading("and ", last).to_string();
    }
    blocks
}

pub fn resolve(roster: &[String], affiliations: &str, sink: &dyn DiagnosticSink) -> RosterAffiliations {
    let map = parse_affiliations(&blocks(affiliations), &AuthorCleaner::default(), None, sink);
    align_by_substring(roster, map, sink)
}
