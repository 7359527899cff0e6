use serde_json::Value;
use tracing::info_span;

use crate::diagnostics::DiagnosticSink;
use crate::formats::{AuthorInput, Journal, ResolveError};
use crate::{hash_affiliation, AuthorAffiliationRecord};

fn extract_id(record: &Value) -> Option<String> {
    record.get("id").and_then(Value::as_str).map(String::from)
}

/// Handles both a joined byline string and an array of names
fn extract_authors(record: &Value) -> Option<AuthorInput> {
    match record.get("authors")? {
        Value::String(s) => Some(AuthorInput::Joined(s.clone())),
        Value::Array(arr) => Some(AuthorInput::Roster(
            arr.iter().filter_map(Value::as_str).map(String::from).collect(),
        )),
        _ => None,
    }
}

/// Array form is one affiliation line per entry
fn extract_affiliation_text(record: &Value) -> Option<String> {
    match record.get("affiliations")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(arr) => Some(
            arr.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        _ => None,
    }
}

/// Resolves one scraped article into author/affiliation rows.
///
/// Authors without a resolved affiliation produce no rows.
pub fn parse_record(
    record: &Value,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<AuthorAffiliationRecord>, ResolveError> {
    let article_id = extract_id(record).ok_or(ResolveError::MissingField("id"))?;
    let journal: Journal = record
        .get("journal")
        .and_then(Value::as_str)
        .ok_or(ResolveError::MissingField("journal"))?
        .parse()?;
    let authors = extract_authors(record).ok_or(ResolveError::MissingField("authors"))?;
    let affiliations =
        extract_affiliation_text(record).ok_or(ResolveError::MissingField("affiliations"))?;

    let _span = info_span!("article", id = %article_id, %journal).entered();
    let resolved = journal.resolve(&authors, &affiliations, sink);

    let mut results = Vec::new();
    for (author_idx, author_name) in resolved.roster.iter().enumerate() {
        for (affiliation_idx, affiliation) in resolved.affiliations[author_idx].iter().enumerate() {
            if affiliation.is_empty() {
                continue;
            }
            results.push(AuthorAffiliationRecord {
                article_id: article_id.clone(),
                journal,
                author_idx,
                author_name: author_name.clone(),
                author_key: resolved.keys[author_idx].clone(),
                affiliation_idx,
                affiliation: affiliation.clone(),
                affiliation_hash: hash_affiliation(affiliation),
            });
        }
    }

    Ok(results)
}
