//! Selection tracker.
//!
//! None of these operations fail: calls that make no sense in the current
//! mode (toggling while selection is off, select-all outside multi mode) are
//! silent no-ops.

use std::collections::HashSet;

use fahndung_core::models::SelectionMode;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionTracker {
    mode: SelectionMode,
    /// Selected ids in the order they were selected
    selected: Vec<String>,
}

impl SelectionTracker {
    pub fn new(mode: SelectionMode) -> Self {
        SelectionTracker {
            mode,
            selected: Vec::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switch mode. Switching to `None` clears the selection; switching to
    /// `Single` keeps at most the most recently selected id.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        match mode {
            SelectionMode::None => self.selected.clear(),
            SelectionMode::Single => {
                if self.selected.len() > 1 {
                    let last = self.selected.split_off(self.selected.len() - 1);
                    self.selected = last;
                }
            }
            SelectionMode::Multi => {}
        }
    }

    /// In single mode this selects `id` (re-selecting the sole member keeps it
    /// selected); in multi mode it flips membership.
    pub fn toggle(&mut self, id: &str) {
        match self.mode {
            SelectionMode::None => {}
            SelectionMode::Single => {
                self.selected.clear();
                self.selected.push(id.to_string());
            }
            SelectionMode::Multi => {
                if let Some(pos) = self.selected.iter().position(|s| s == id) {
                    self.selected.remove(pos);
                } else {
                    self.selected.push(id.to_string());
                }
            }
        }
    }

    /// Add every visible id to the selection. Earlier selections that are not
    /// visible are kept. Multi mode only.
    pub fn select_all<I, S>(&mut self, visible_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.mode != SelectionMode::Multi {
            return;
        }
        let mut present: HashSet<String> = self.selected.iter().cloned().collect();
        for id in visible_ids {
            let id = id.as_ref();
            if present.insert(id.to_string()) {
                self.selected.push(id.to_string());
            }
        }
    }

    /// Empty the selection regardless of mode.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop `id` from the selection if present. Returns whether it was.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s != id);
        before != self.selected.len()
    }

    /// Keep only ids for which `keep` returns true. Returns how many were pruned.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.selected.len();
        self.selected.retain(|s| keep(s));
        before - self.selected.len()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// True only in multi mode while fewer than `visible_count` are selected.
    pub fn can_select_more(&self, visible_count: usize) -> bool {
        self.mode == SelectionMode::Multi && self.selected.len() < visible_count
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_noop_when_off() {
        let mut sel = SelectionTracker::default();
        sel.toggle("x");
        assert!(sel.is_empty());
        assert_eq!(sel.mode(), SelectionMode::None);
    }

    #[test]
    fn test_single_mode_replaces() {
        let mut sel = SelectionTracker::new(SelectionMode::Single);
        sel.toggle("x");
        sel.toggle("y");
        assert_eq!(sel.selected_ids(), ["y".to_string()]);

        // re-selecting the sole member keeps it selected
        sel.toggle("y");
        assert!(sel.is_selected("y"));
        assert_eq!(sel.count(), 1);
    }

    #[test]
    fn test_multi_mode_toggles() {
        let mut sel = SelectionTracker::new(SelectionMode::Multi);
        sel.toggle("x");
        sel.toggle("y");
        assert_eq!(sel.count(), 2);
        sel.toggle("x");
        assert!(!sel.is_selected("x"));
        sel.toggle("y");
        assert!(sel.is_empty());
    }

    #[test]
    fn test_switching_to_none_clears() {
        let mut sel = SelectionTracker::new(SelectionMode::Multi);
        sel.toggle("a");
        sel.toggle("b");
        sel.set_mode(SelectionMode::None);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_switching_to_single_keeps_latest() {
        let mut sel = SelectionTracker::new(SelectionMode::Multi);
        sel.toggle("a");
        sel.toggle("b");
        sel.set_mode(SelectionMode::Single);
        assert_eq!(sel.selected_ids(), ["b".to_string()]);
    }

    #[test]
    fn test_select_all_is_additive_and_multi_only() {
        let mut sel = SelectionTracker::new(SelectionMode::Single);
        sel.select_all(["a", "b"]);
        assert!(sel.is_empty());

        sel.set_mode(SelectionMode::Multi);
        sel.toggle("hidden");
        sel.select_all(["a", "b", "a"]);
        assert_eq!(
            sel.selected_ids(),
            ["hidden".to_string(), "a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_clear_ignores_mode() {
        let mut sel = SelectionTracker::new(SelectionMode::Single);
        sel.toggle("a");
        sel.clear();
        assert!(sel.is_empty());
        assert_eq!(sel.mode(), SelectionMode::Single);
    }

    #[test]
    fn test_can_select_more() {
        let mut sel = SelectionTracker::new(SelectionMode::Multi);
        assert!(sel.can_select_more(2));
        sel.select_all(["a", "b"]);
        assert!(!sel.can_select_more(2));

        let single = SelectionTracker::new(SelectionMode::Single);
        assert!(!single.can_select_more(10));
    }

    #[test]
    fn test_retain_and_remove() {
        let mut sel = SelectionTracker::new(SelectionMode::Multi);
        sel.select_all(["a", "b", "c"]);
        assert!(sel.remove("b"));
        assert!(!sel.remove("b"));
        assert_eq!(sel.retain(|id| id == "c"), 1);
        assert_eq!(sel.selected_ids(), ["c".to_string()]);
    }
}
