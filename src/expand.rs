use std::collections::HashSet;

pub const MORE_LABEL: &str = "Read more";
pub const LESS_LABEL: &str = "Show less";

/// Show/hide state of long elements, one flag per element id.
#[derive(Debug, Default)]
pub struct ExpandState {
    expanded: HashSet<usize>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: usize) -> bool {
        self.expanded.contains(&id)
    }

    /// Flips the element and returns whether it is now expanded.
    pub fn toggle(&mut self, id: usize) -> bool {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
            return true;
        }
        false
    }

    pub fn label(&self, id: usize) -> &'static str {
        if self.is_expanded(id) { LESS_LABEL } else { MORE_LABEL }
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }
}
