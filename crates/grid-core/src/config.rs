//! Per-table configuration

use serde::{Deserialize, Serialize};

use crate::query::PageStyle;
use crate::sort::OrderByFormat;

/// Configuration for a table instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Key the adapter nests the connection under
    pub queried_object_name: String,
    /// Optional heading, shown with the total count
    pub title: Option<String>,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub page_style: PageStyle,
    pub order_by_format: OrderByFormat,
    /// Show checkboxes and keep a selection
    pub selectable: bool,
    /// Text shown when the result set is empty
    pub empty_message: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            queried_object_name: String::new(),
            title: None,
            page_size: 10,
            page_size_options: vec![5, 10, 15, 20],
            page_style: PageStyle::FirstOffset,
            order_by_format: OrderByFormat::SnakeCase,
            selectable: false,
            empty_message: "No results".to_string(),
        }
    }
}

impl TableConfig {
    pub fn new(queried_object_name: impl Into<String>) -> Self {
        Self {
            queried_object_name: queried_object_name.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Parse from JSON, filling unspecified fields with defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
