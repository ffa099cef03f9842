//! Column definitions for table headers

use serde::{Deserialize, Serialize};

/// A header cell: column id, visible label and whether it can be sorted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadCell {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub sortable: bool,
    /// Right-align the column (amounts, counts)
    #[serde(default)]
    pub numeric: bool,
    /// Field used for ordering when it differs from `id`
    #[serde(default)]
    pub order_by: Option<String>,
}

impl HeadCell {
    /// A sortable text column
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            sortable: true,
            numeric: false,
            order_by: None,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Field name the order-by token is built from
    pub fn sort_field(&self) -> &str {
        self.order_by.as_deref().unwrap_or(&self.id)
    }
}
