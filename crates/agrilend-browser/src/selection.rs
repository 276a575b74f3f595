//! Selected-record set, tracked by record key.

use std::collections::BTreeSet;

/// Keys of the records the user has checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    keys: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    /// Adds every key in `keys`.
    pub fn select_all<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.keys.extend(keys.into_iter().map(Into::into));
    }

    pub fn select_none(&mut self) {
        self.keys.clear();
    }

    /// Flips one key. Returns `true` if it is now selected.
    pub fn toggle(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.keys.remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    /// Header checkbox: selects all of `keys` unless they are all selected
    /// already, in which case it deselects them.
    pub fn toggle_all<'k>(&mut self, keys: &[&'k str]) {
        if self.all_selected(keys) {
            for key in keys {
                self.keys.remove(*key);
            }
        } else {
            self.select_all(keys.iter().copied());
        }
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// `true` when `keys` is non-empty and every key is selected.
    pub fn all_selected(&self, keys: &[&str]) -> bool {
        !keys.is_empty() && keys.iter().all(|k| self.keys.contains(*k))
    }

    /// Mixed header-checkbox state: `0 < selected < total`.
    pub fn is_indeterminate(&self, total: usize) -> bool {
        let n = self.keys.len();
        n > 0 && n < total
    }

    /// Drops keys not accepted by `keep`. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.keys.len();
        self.keys.retain(|k| keep(k));
        before - self.keys.len()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_and_removes() {
        let mut s = Selection::new();
        assert!(s.toggle("a"));
        assert!(s.is_selected("a"));
        assert!(!s.toggle("a"));
        assert!(s.is_empty());
    }

    #[test]
    fn select_all_then_none() {
        let mut s = Selection::new();
        s.select_all(["1", "2", "3"]);
        assert_eq!(s.len(), 3);
        s.select_none();
        assert!(s.is_empty());
    }

    #[test]
    fn toggle_all_flips_the_page() {
        let mut s = Selection::new();
        s.toggle("x");
        s.toggle_all(&["1", "2"]);
        assert!(s.all_selected(&["1", "2"]));
        assert!(s.is_selected("x"));

        s.toggle_all(&["1", "2"]);
        assert!(!s.is_selected("1"));
        assert!(s.is_selected("x"));
    }

    #[test]
    fn indeterminate_between_none_and_all() {
        let mut s = Selection::new();
        assert!(!s.is_indeterminate(3));
        s.toggle("1");
        assert!(s.is_indeterminate(3));
        s.select_all(["2", "3"]);
        assert!(!s.is_indeterminate(3));
    }

    #[test]
    fn retain_prunes() {
        let mut s = Selection::new();
        s.select_all(["1", "2", "3"]);
        assert_eq!(s.retain(|k| k != "2"), 1);
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["1", "3"]);
    }
}
