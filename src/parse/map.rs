use std::collections::HashMap;

/// Author key -> institutions, both in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffiliationMap {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl AffiliationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the list for `key`, creating an empty one on first use.
    pub fn get_or_insert(&mut self, key: &str) -> &mut Vec<String> {
        let idx = match self.index.get(key).copied() {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), Vec::new()));
                let idx = self.entries.len() - 1;
                self.index.insert(key.to_string(), idx);
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.index
            .get(key)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, institutions)| (key.as_str(), institutions.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for AffiliationMap {
    type Item = (String, Vec<String>);
    type IntoIter = std::vec::IntoIter<(String, Vec<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
