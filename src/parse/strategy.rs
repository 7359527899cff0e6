use anyhow::Result;

use crate::names::AuthorCleaner;

/// Turns one fragment of a parenthesized author list into author keys.
///
/// An `Err` means the processor could not produce a list; the parser reports
/// it and the fragment contributes no authors.
pub trait AuthorProcessor {
    fn process(&self, fragment: &str) -> Result<Vec<String>>;
}

/// Splits department text that carries the previous institution in front of it,
/// e.g. "Harvard Medical School, the Department of Surgery".
pub trait InstitutionSplitter {
    fn split(&self, text: &str) -> Vec<String>;
}

/// Uses each fragment verbatim as the author key.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl AuthorProcessor for Identity {
    fn process(&self, fragment: &str) -> Result<Vec<String>> {
        Ok(vec![fragment.to_string()])
    }
}

impl AuthorProcessor for AuthorCleaner {
    fn process(&self, fragment: &str) -> Result<Vec<String>> {
        Ok(self.clean(fragment))
    }
}

impl<F> AuthorProcessor for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn process(&self, fragment: &str) -> Result<Vec<String>> {
        Ok(self(fragment))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOn(pub String);

impl SplitOn {
    pub fn new(separator: &str) -> Self {
        Self(separator.to_string())
    }
}

impl InstitutionSplitter for SplitOn {
    fn split(&self, text: &str) -> Vec<String> {
        text.split(self.0.as_str()).map(String::from).collect()
    }
}

impl<F> InstitutionSplitter for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn split(&self, text: &str) -> Vec<String> {
        self(text)
    }
}
