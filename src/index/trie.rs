use std::collections::HashMap;

use crate::index::posting::DocTermOccurrence;

/// Prefix tree over the code points of term strings. Terminal nodes
/// hold a posting list sorted ascending by document key; internal
/// nodes are indistinguishable from absence of a value.
#[derive(Default)]
pub struct RuneTrie {
    value: Option<Vec<DocTermOccurrence>>,
    children: HashMap<char, RuneTrie>,
}

impl RuneTrie {
    pub fn new() -> Self {
        RuneTrie::default()
    }

    /// Posting list stored at `key`, if any.
    pub fn get(&self, key: &str) -> Option<&[DocTermOccurrence]> {
        let mut node = self;
        for c in key.chars() {
            node = node.children.get(&c)?;
        }
        node.value.as_deref()
    }

    /// Insert `value` at `key`, replacing any existing list. Returns
    /// true if the put added a new value rather than replacing one.
    pub fn put(&mut self, key: &str, value: Vec<DocTermOccurrence>) -> bool {
        let node = self.descend(key);
        let is_new = node.value.is_none();
        node.value = Some(value);
        is_new
    }

    /// Insert one posting into the list at `key`, keeping the list
    /// sorted ascending by document key. A posting for an already
    /// present document key replaces the existing entry.
    pub fn add(&mut self, key: &str, occurrence: DocTermOccurrence) {
        let node = self.descend(key);
        let postings = node.value.get_or_insert_with(Vec::new);
        let idx = postings.partition_point(|p| p.key() < occurrence.key());
        if idx < postings.len() && postings[idx].key() == occurrence.key() {
            postings[idx] = occurrence;
        } else {
            postings.insert(idx, occurrence);
        }
    }

    /// Remove the value at `key`, pruning branches that become both
    /// childless and valueless. Returns true if a value was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let chars: Vec<char> = key.chars().collect();
        let (found, _) = Self::remove(self, &chars);
        found
    }

    /// Depth-first traversal over every (term, posting list) pair.
    /// No ordering guarantee.
    pub fn walk(&self, visit: &mut impl FnMut(&str, &[DocTermOccurrence])) {
        let mut key = String::new();
        self.walk_node(&mut key, visit);
    }

    fn walk_node(&self, key: &mut String, visit: &mut impl FnMut(&str, &[DocTermOccurrence])) {
        if let Some(value) = &self.value {
            visit(key, value);
        }
        for (c, child) in &self.children {
            key.push(*c);
            child.walk_node(key, visit);
            key.pop();
        }
    }

    fn descend(&mut self, key: &str) -> &mut RuneTrie {
        let mut node = self;
        for c in key.chars() {
            node = node.children.entry(c).or_default();
        }
        node
    }

    /// Returns (value removed, subtree is now empty and prunable).
    fn remove(node: &mut RuneTrie, key: &[char]) -> (bool, bool) {
        match key.split_first() {
            None => {
                let found = node.value.take().is_some();
                (found, node.children.is_empty())
            }
            Some((c, rest)) => {
                let Some(child) = node.children.get_mut(c) else {
                    return (false, false);
                };
                let (found, prune) = Self::remove(child, rest);
                if prune {
                    node.children.remove(c);
                }
                (found, node.children.is_empty() && node.value.is_none())
            }
        }
    }
}
