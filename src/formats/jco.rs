//! JCO: one CSV record per line, each a comma-delimited list of author names
//! followed by the institution they share. Quoted fields may hold commas or
//! line breaks.
//!
//! Cleaning splits fields on "and" as well as commas, which also breaks up
//! institution names such as "University and Medical Center". The institution
//! is rebuilt against the record's original text before authors are assigned.

use regex::Regex;
use std::sync::LazyLock;

use super::{align_by_substring, RosterAffiliations};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::names::clean_author;
use crate::parse::AffiliationMap;

static FRAGMENT_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",? ").unwrap());

/// Optional comma, whitespace, then any (possibly empty) run of a dropped word.
const TOLERANT_BOUNDARY: &str = r",?\s\S*\s*";

/// Finds where the institution starts in `fields` and rebuilds its full name.
///
/// The institution begins after the last field that is verbatim in the
/// roster; with no such field it begins at index 1. Returns `None` when no
/// fields are left for it.
pub fn coalesce_institution(
    fields: &[String],
    roster: &[String],
    source: &str,
) -> Option<(usize, String)> {
    let start = fields
        .iter()
        .rposition(|field| roster.contains(field))
        .map_or(1, |idx| idx + 1);
    if start >= fields.len() {
        return None;
    }

    let proto = fields[start..].join(", ");
    let pattern = FRAGMENT_BOUNDARY
        .split(&proto)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(TOLERANT_BOUNDARY);

    let institution = Regex::new(&pattern)
        .ok()
        .and_then(|re| re.find(source).map(|m| m.as_str().to_string()))
        .unwrap_or(proto);

    Some((start, institution))
}

/// Builds the cleaned-author -> institutions map for a whole JCO block.
///
/// Records are read with one CSV reader over the block, so a quoted
/// institution may span lines. Each record's raw text is kept for coalescing.
pub fn parse_records(
    roster: &[String],
    affiliations: &str,
    sink: &dyn DiagnosticSink,
) -> AffiliationMap {
    let mut map = AffiliationMap::new();
    let block = affiliations.trim();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(block.as_bytes());
    let mut record = csv::StringRecord::new();

    loop {
        let from = reader.position().byte() as usize;
        let read = reader.read_record(&mut record);
        let to = (reader.position().byte() as usize).min(block.len());
        let source = block.get(from..to).unwrap_or_default().trim();

        match read {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                tracing::debug!("csv error in {:?}: {}", source, e);
                sink.report(Diagnostic::MalformedBlock {
                    block: source.to_string(),
                });
                if to <= from {
                    break;
                }
                continue;
            }
        }

        let cleaned: Vec<String> = record
            .iter()
            .flat_map(|field| clean_author(field, false))
            .filter(|item| !item.is_empty())
            .collect();
        if cleaned.is_empty() {
            continue;
        }

        let Some((start, institution)) = coalesce_institution(&cleaned, roster, source) else {
            sink.report(Diagnostic::MalformedBlock {
                block: source.to_string(),
            });
            continue;
        };

        for author in &cleaned[..start] {
            map.get_or_insert(author).push(institution.clone());
        }
    }

    map
}

pub fn resolve(roster: &[String], affiliations: &str, sink: &dyn DiagnosticSink) -> RosterAffiliations {
    let map = parse_records(roster, affiliations, sink);
    align_by_substring(roster, map, sink)
}
