//! Widget ids scoped to one table instance
//!
//! Several tables share a screen, so every stateful widget (combo boxes,
//! scroll areas, table column widths) is keyed by the table it belongs to.

use egui::Id;
use std::fmt::Display;

/// Widget ID builder that combines a base with extra components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetId {
    components: Vec<String>,
}

impl WidgetId {
    pub fn new(base: impl Display) -> Self {
        Self {
            components: vec![base.to_string()],
        }
    }

    /// Add a component to the ID
    pub fn with(&self, component: impl Display) -> Self {
        let mut components = self.components.clone();
        components.push(component.to_string());
        Self { components }
    }

    /// Add an index to the ID (useful in loops)
    pub fn index(&self, idx: usize) -> Self {
        self.with(format!("idx_{}", idx))
    }

    pub fn build(&self) -> String {
        self.components.join("_")
    }

    pub fn id(&self) -> Id {
        Id::new(self.build())
    }
}

impl Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.build())
    }
}
