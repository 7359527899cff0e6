//! Format-independent affiliation parsing.
//!
//! An affiliation block takes one of two shapes:
//!
//! - simple: `dept/division + institution (author, author and author)`
//! - complex: `dept (authors), another dept (authors), ... institution`,
//!   possibly repeated for several institutions and closed by `all in <city>`.
//!
//! In a complex block the institution comes after the departments that belong
//! to it, so each (author, department) pair waits in a queue until the next
//! institution name turns up.

mod map;
mod strategy;

pub use map::AffiliationMap;
pub use strategy::{AuthorProcessor, Identity, InstitutionSplitter, SplitOn};

use tracing::trace;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::names::{discard_leading, namelist_split, trim_punctuation};

/// Em-dash used by NEJM between a department and its sub-units.
const EM_DASH_SEPARATOR: &str = " \u{2014}";
const LOCATION_PREFIX: &str = "all in ";

fn is_complex(block: &str) -> bool {
    block.matches(')').count() > 1
}

fn clean_department(text: &str) -> String {
    discard_leading("the ", discard_leading("and ", text)).replace("Departments", "Department")
}

fn collect_authors(
    list: &str,
    process_author: &dyn AuthorProcessor,
    sink: &dyn DiagnosticSink,
) -> Vec<String> {
    let mut authors = Vec::new();
    for fragment in namelist_split(list) {
        match process_author.process(fragment) {
            Ok(names) => authors.extend(names),
            Err(e) => sink.report(Diagnostic::ProcessorContract {
                fragment: fragment.to_string(),
                reason: e.to_string(),
            }),
        }
    }
    authors
}

fn flush(
    map: &mut AffiliationMap,
    deferred: &mut Vec<(String, String)>,
    institution: &str,
    location: &str,
) {
    for (author, department) in deferred.drain(..) {
        map.get_or_insert(&author)
            .push(format!("{}, {}{}", department, institution, location));
    }
}

fn parse_complex(
    block: &str,
    map: &mut AffiliationMap,
    process_author: &dyn AuthorProcessor,
    split_institution: Option<&dyn InstitutionSplitter>,
    sink: &dyn DiagnosticSink,
) {
    let block = block.replace(EM_DASH_SEPARATOR, ",");
    let mut fragments: Vec<Vec<&str>> = block
        .split("), ")
        .map(|fragment| fragment.split(" (").collect())
        .collect();

    // the last author list keeps the block's closing parenthesis
    if let Some(last) = fragments.last_mut() {
        if last.len() > 1 {
            if let Some(item) = last.last_mut() {
                let current: &str = *item;
                *item = current.strip_suffix(')').unwrap_or(current);
            }
        }
    }

    let location = fragments
        .last()
        .and_then(|fragment| fragment[0].strip_prefix(LOCATION_PREFIX))
        .map(|place| format!(", {}", place));
    if location.is_some() {
        fragments.pop();
    }
    let location = location.unwrap_or_default();

    let mut deferred: Vec<(String, String)> = Vec::new();

    for fragment in &fragments {
        if fragment.len() == 1 {
            flush(map, &mut deferred, fragment[0], &location);
            continue;
        }
        // a stray parenthesis inside a department; only the outer pieces are used
        if fragment.len() > 2 {
            sink.report(Diagnostic::MalformedBlock {
                block: block.clone(),
            });
        }

        let mut department_text = fragment[0].to_string();
        if let Some(splitter) = split_institution {
            let parts = splitter.split(&department_text);
            if parts.len() > 1 {
                flush(map, &mut deferred, &parts[0], &location);
                department_text = parts[1].clone();
            }
        }

        let department = clean_department(&department_text);
        let authors = collect_authors(fragment[fragment.len() - 1], process_author, sink);
        for author in authors {
            map.get_or_insert(&author);
            deferred.push((author, department.clone()));
        }
    }

    if !deferred.is_empty() {
        sink.report(Diagnostic::UnresolvedDeferred {
            block: block.clone(),
            pending: deferred,
        });
    }
}

/// Returns false when the block does not have the `affiliation (authors)` shape.
fn parse_simple(
    block: &str,
    map: &mut AffiliationMap,
    process_author: &dyn AuthorProcessor,
    sink: &dyn DiagnosticSink,
) -> bool {
    let Some(body) = block.strip_suffix(')') else {
        return false;
    };
    let Some((affiliation, author_list)) = body.rsplit_once(" (") else {
        return false;
    };

    let affiliation = discard_leading("the ", discard_leading("and ", trim_punctuation(affiliation)));
    for author in collect_authors(author_list, process_author, sink) {
        map.get_or_insert(&author).push(affiliation.to_string());
    }
    true
}

/// Parses affiliation blocks into an author -> institutions map.
///
/// Keys are whatever `process_author` produces, so last names in and last
/// names out, initials in and initials out.
pub fn parse_affiliations<S: AsRef<str>>(
    blocks: &[S],
    process_author: &dyn AuthorProcessor,
    split_institution: Option<&dyn InstitutionSplitter>,
    sink: &dyn DiagnosticSink,
) -> AffiliationMap {
    let mut map = AffiliationMap::new();

    for block in blocks {
        let block = block.as_ref();
        if is_complex(block) {
            trace!("complex affiliation block: {}", block);
            parse_complex(block, &mut map, process_author, split_institution, sink);
        } else if !parse_simple(block, &mut map, process_author, sink) {
            sink.report(Diagnostic::MalformedBlock {
                block: block.to_string(),
            });
        }
    }

    map
}
