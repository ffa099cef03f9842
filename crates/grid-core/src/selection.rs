//! Row selection for tables with bulk actions

use ahash::AHashSet;

/// Set of selected row ids
///
/// "Select all" only ever looks at the rows currently loaded. It is not a
/// selection across pages.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: AHashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Every loaded row selected already → select none, otherwise select the loaded rows
    pub fn toggle_all<'a>(&mut self, loaded: impl IntoIterator<Item = &'a str>) {
        let loaded: Vec<&str> = loaded.into_iter().collect();
        if self.all_selected(loaded.iter().copied()) {
            self.selected.clear();
        } else {
            self.selected = loaded.into_iter().map(str::to_string).collect();
        }
    }

    /// Whether every id in `loaded` is selected (false for no rows)
    pub fn all_selected<'a>(&self, loaded: impl IntoIterator<Item = &'a str>) -> bool {
        let mut any = false;
        for id in loaded {
            if !self.selected.contains(id) {
                return false;
            }
            any = true;
        }
        any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_all_flips_between_loaded_and_none() {
        let mut selection = Selection::new();
        let loaded = ["HH-1", "HH-2", "HH-3"];

        selection.toggle("HH-2");
        selection.toggle_all(loaded);
        assert_eq!(selection.len(), 3);
        assert!(selection.all_selected(loaded));

        selection.toggle_all(loaded);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_drops_rows_from_other_pages() {
        let mut selection = Selection::new();
        selection.toggle("HH-99");
        selection.toggle_all(["HH-1"]);

        assert!(selection.is_selected("HH-1"));
        assert!(!selection.is_selected("HH-99"));
    }

    #[test]
    fn test_toggle_all_on_empty_page_selects_nothing() {
        let mut selection = Selection::new();
        selection.toggle("HH-1");
        selection.toggle_all(std::iter::empty());
        assert!(selection.is_empty());
    }
}
