//! Flat registry of registered `(path, verbs)` pairs.
//!
//! The index mirrors the handler maps stored in the trie: for every node that carries handlers there is
//! exactly one entry, keyed by the node's registered path, whose verb set equals the node's verbs. It is
//! used to reject duplicate registrations and to list routes without walking the trie.

use crate::Verb;
use serde::Serialize;
use std::collections::{btree_map, BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct RouteIndex {
    routes: BTreeMap<String, BTreeSet<Verb>>,
}

/// One registered route as listed by [`RouteIndex::iter`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry<'a> {
    pub path: &'a str,
    pub verbs: &'a BTreeSet<Verb>,
}

impl RouteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `verb` for `path`. Returns false when the pair was already recorded.
    pub fn add(&mut self, path: &str, verb: Verb) -> bool {
        match self.routes.get_mut(path) {
            Some(verbs) => verbs.insert(verb),
            None => {
                self.routes.insert(path.to_owned(), BTreeSet::from([verb]));
                true
            }
        }
    }

    /// Replaces the verb set recorded for `path`, returning the previous one
    pub fn replace(&mut self, path: &str, verbs: BTreeSet<Verb>) -> Option<BTreeSet<Verb>> {
        self.routes.insert(path.to_owned(), verbs)
    }

    /// Drops the entry for `path`
    pub fn remove(&mut self, path: &str) -> Option<BTreeSet<Verb>> {
        self.routes.remove(path)
    }

    pub fn contains(&self, path: &str, verb: Verb) -> bool {
        self.routes.get(path).is_some_and(|verbs| verbs.contains(&verb))
    }

    pub fn verbs(&self, path: &str) -> Option<&BTreeSet<Verb>> {
        self.routes.get(path)
    }

    /// Returns the number of registered paths
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Lazily iterates the entries in path order. Each call starts a fresh pass.
    pub fn iter(&self) -> Iter<'_> {
        Iter { inner: self.routes.iter() }
    }
}

impl<'a> IntoIterator for &'a RouteIndex {
    type Item = RouteEntry<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, BTreeSet<Verb>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = RouteEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(path, verbs)| RouteEntry { path, verbs })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::RouteIndex;
    use crate::Verb;
    use std::collections::BTreeSet;

    #[test]
    fn test_add_rejects_duplicate_pair() {
        let mut index = RouteIndex::new();
        assert!(index.add("/users", Verb::Get));
        assert!(index.add("/users", Verb::Post));
        assert!(!index.add("/users", Verb::Get));

        assert_eq!(index.len(), 1);
        assert!(index.contains("/users", Verb::Post));
        assert!(!index.contains("/users", Verb::Put));
        assert!(!index.contains("/nope", Verb::Get));
    }

    #[test]
    fn test_replace() {
        let mut index = RouteIndex::new();
        index.add("/a", Verb::Get);

        let previous = index.replace("/a", BTreeSet::from([Verb::Any, Verb::Put]));
        assert_eq!(previous, Some(BTreeSet::from([Verb::Get])));
        assert_eq!(index.verbs("/a"), Some(&BTreeSet::from([Verb::Any, Verb::Put])));
    }

    #[test]
    fn test_iter_is_restartable() {
        let mut index = RouteIndex::new();
        index.add("/b", Verb::Get);
        index.add("/a", Verb::Delete);
        index.add("/a", Verb::Get);

        let first = index.iter().map(|entry| entry.path).collect::<Vec<_>>();
        let second = (&index).into_iter().map(|entry| entry.path).collect::<Vec<_>>();
        assert_eq!(first, vec!["/a", "/b"]);
        assert_eq!(first, second);
        assert_eq!(index.iter().len(), 2);
    }

    #[test]
    fn test_entry_serializes() {
        let mut index = RouteIndex::new();
        index.add("/a", Verb::Post);
        index.add("/a", Verb::Get);

        let json = serde_json::to_value(index.iter().collect::<Vec<_>>()).unwrap();
        assert_eq!(json, serde_json::json!([{ "path": "/a", "verbs": ["GET", "POST"] }]));
    }
}
