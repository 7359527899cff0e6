//! NEJM: bylines list each author followed by degrees ("Jane Doe, M.D., Ph.D."),
//! and affiliations are `; `-joined blocks keyed by author initials.

use std::collections::HashMap;

use super::RosterAffiliations;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::names::{discard_leading, initials, namelist_split};
use crate::parse::{parse_affiliations, Identity, SplitOn};

/// Author names from a joined byline, without degrees.
pub fn roster(authors: &str) -> Vec<String> {
    namelist_split(authors)
        .into_iter()
        .filter(|token| !token.is_empty() && !token.ends_with('.'))
        .map(|token| discard_leading("and ", token).to_string())
        .collect()
}

/// Splits "From the Department of ... (A.B.); and the ... (C.D.)." into blocks.
pub fn blocks(affiliations: &str) -> Vec<String> {
    let text = affiliations.trim();
    let text = text.strip_suffix('.').unwrap_or(text);

    let mut blocks: Vec<String> = text.split("; ").map(String::from).collect();
    if let Some(first) = blocks.first_mut() {
        *first = discard_leading("From ", first).to_string();
    }
    if let Some(last) = blocks.last_mut() {
        *last = discard_leading("and ", last).to_string();
    }
    blocks
}

pub fn resolve(authors: &str, affiliations: &str, sink: &dyn DiagnosticSink) -> RosterAffiliations {
    let roster = roster(authors);
    let map = parse_affiliations(
        &blocks(affiliations),
        &Identity,
        Some(&SplitOn::new(", the ")),
        sink,
    );

    // two authors can share initials, e.g. John and Jane Smith
    let mut by_initials: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, name) in roster.iter().enumerate() {
        by_initials.entry(initials(name)).or_default().push(idx);
    }

    let mut resolved = RosterAffiliations::empty(roster);
    for (key, institutions) in map {
        match by_initials.get(&key).map(Vec::as_slice) {
            Some(&[idx]) => resolved.assign(idx, key, institutions),
            Some(candidates) => sink.report(Diagnostic::AmbiguousAuthorMatch {
                key,
                matches: candidates.len(),
            }),
            None => sink.report(Diagnostic::UnresolvedAuthor { key }),
        }
    }
    resolved
}
