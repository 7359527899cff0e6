//! Journal-specific adapters.
//!
//! Each adapter turns its journal's author and affiliation text into the
//! common [`RosterAffiliations`] shape, aligned to roster position.

pub mod jama;
pub mod jco;
pub mod nejm;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::names::{discard_leading, namelist_split};
use crate::parse::AffiliationMap;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown journal format: {0:?} (expected nejm, jama or jco)")]
    UnknownJournal(String),

    #[error("article record has no usable {0:?} field")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Journal {
    Nejm,
    Jama,
    Jco,
}

impl FromStr for Journal {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nejm" => Ok(Journal::Nejm),
            "jama" => Ok(Journal::Jama),
            "jco" => Ok(Journal::Jco),
            _ => Err(ResolveError::UnknownJournal(s.to_string())),
        }
    }
}

impl fmt::Display for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Journal::Nejm => "nejm",
            Journal::Jama => "jama",
            Journal::Jco => "jco",
        };
        f.write_str(name)
    }
}

/// Author text as handed over by the scraper: either the journal's joined
/// byline or an already split roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorInput {
    Joined(String),
    Roster(Vec<String>),
}

impl AuthorInput {
    fn joined(&self) -> String {
        match self {
            AuthorInput::Joined(s) => s.clone(),
            AuthorInput::Roster(names) => names.join(", "),
        }
    }

    fn roster(&self) -> Vec<String> {
        match self {
            AuthorInput::Joined(s) => namelist_split(s)
                .into_iter()
                .map(|name| discard_leading("and ", name).trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            AuthorInput::Roster(names) => names.clone(),
        }
    }
}

/// Per-author results aligned to the roster; unmatched positions stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterAffiliations {
    pub roster: Vec<String>,
    /// The author key matched at each position (initials, last name or
    /// cleaned name, depending on the journal).
    pub keys: Vec<String>,
    pub affiliations: Vec<Vec<String>>,
}

impl RosterAffiliations {
    pub fn empty(roster: Vec<String>) -> Self {
        let len = roster.len();
        Self {
            roster,
            keys: vec![String::new(); len],
            affiliations: vec![Vec::new(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    fn assign(&mut self, idx: usize, key: String, institutions: Vec<String>) {
        self.keys[idx] = key;
        self.affiliations[idx] = institutions;
    }
}

impl Journal {
    pub fn resolve(
        &self,
        authors: &AuthorInput,
        affiliations: &str,
        sink: &dyn DiagnosticSink,
    ) -> RosterAffiliations {
        match self {
            Journal::Nejm => nejm::resolve(&authors.joined(), affiliations, sink),
            Journal::Jama => jama::resolve(&authors.roster(), affiliations, sink),
            Journal::Jco => jco::resolve(&authors.roster(), affiliations, sink),
        }
    }
}

/// Places each key at the one roster entry containing it.
///
/// Zero or several candidates leave the key unassigned.
pub(crate) fn align_by_substring(
    roster: &[String],
    map: AffiliationMap,
    sink: &dyn DiagnosticSink,
) -> RosterAffiliations {
    let mut resolved = RosterAffiliations::empty(roster.to_vec());

    for (key, institutions) in map {
        let hits: Vec<usize> = roster
            .iter()
            .enumerate()
            .filter(|(_, name)| name.contains(key.as_str()))
            .map(|(idx, _)| idx)
            .collect();

        if hits.len() != 1 {
            sink.report(Diagnostic::AmbiguousAuthorMatch {
                key,
                matches: hits.len(),
            });
            continue;
        }
        resolved.assign(hits[0], key, institutions);
    }

    resolved
}
