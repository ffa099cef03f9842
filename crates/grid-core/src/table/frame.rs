//! Render model produced by a table for the UI layer to draw

use serde_json::Value;

use crate::sort::SortDirection;

/// A row entity the table can select and key
pub trait TableRow {
    /// Stable id of the row (used for selection and widget keys)
    fn row_id(&self) -> String;
}

impl TableRow for Value {
    fn row_id(&self) -> String {
        match self.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// Turns a row entity into cell texts, one per head cell
pub trait RowRenderer<R> {
    fn render_row(&self, row: &R) -> Vec<String>;
}

impl<R, F> RowRenderer<R> for F
where
    F: Fn(&R) -> Vec<String>,
{
    fn render_row(&self, row: &R) -> Vec<String> {
        self(row)
    }
}

/// One visible body row
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub id: String,
    pub cells: Vec<String>,
    pub selected: bool,
}

/// One header cell with its current sort indicator
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub id: String,
    pub label: String,
    pub sortable: bool,
    pub numeric: bool,
    pub sort: Option<SortDirection>,
}

/// What goes where the rows would be
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Placeholder rows while a fetch is in flight, one per requested row
    Skeleton { rows: usize },
    /// Result set is empty
    Empty { message: String },
    Rows(Vec<RenderedRow>),
    /// Fetch failed and there is nothing previous to show
    Unavailable,
}

/// Footer state for pagination controls
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationView {
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub total_count: Option<usize>,
    pub first_item: usize,
    pub last_item: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationView {
    /// `"11-20 of 22"`
    pub fn label(&self) -> String {
        match self.total_count {
            Some(total) => format!("{}-{} of {}", self.first_item, self.last_item, total),
            None => String::from("-"),
        }
    }
}

/// Checkbox state for the select-all header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionView {
    pub selected: usize,
    pub all_selected: bool,
}

/// Everything needed to draw a table for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct TableFrame {
    pub title: Option<String>,
    pub header: Vec<HeaderCell>,
    pub body: Body,
    pub loading: bool,
    /// Inline error indicator text
    pub error: Option<String>,
    /// `None` when the empty placeholder is shown
    pub pagination: Option<PaginationView>,
    /// `None` for tables without selection
    pub selection: Option<SelectionView>,
}

impl TableFrame {
    pub fn rows(&self) -> &[RenderedRow] {
        match &self.body {
            Body::Rows(rows) => rows,
            _ => &[],
        }
    }

    pub fn is_empty_state(&self) -> bool {
        matches!(self.body, Body::Empty { .. })
    }
}
